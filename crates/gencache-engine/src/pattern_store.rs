//! Per-category store of learned examples
//!
//! Patterns are indexed by a coarse bucket key derived from their context.
//! The key only narrows storage: lookups scan every pattern and rank by
//! [`similarity`](crate::similarity::similarity). A bucket holds a single
//! pattern; a later example landing in the same bucket replaces the earlier
//! one and inherits its use counter.

use crate::similarity::similarity;
use gencache_core::{Context, GenerationOutput};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One learned example
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pattern {
    /// Input that produced the example
    pub input_text: String,

    /// Context frozen at insertion time
    pub context: Context,

    /// The generation result
    pub output: GenerationOutput,

    /// Quality score at insertion time
    pub quality: f64,

    /// Times this bucket was written or selected as best match
    pub uses: u64,
}

/// Coarse index key: rounded sentiment, raw length, first two keywords
pub fn bucket_key(context: &Context) -> String {
    // Round first, then add 0.0 so tiny negatives never format as "-0.0"
    let sentiment = (context.sentiment * 10.0).round() / 10.0 + 0.0;

    let mut key = format!("{:.1}-{}", sentiment, context.length);
    for keyword in context.keywords.iter().take(2) {
        key.push('-');
        key.push_str(keyword);
    }
    key
}

/// Best-matching pattern for a query
#[derive(Debug, Clone)]
pub struct BestMatch<'a> {
    /// Bucket the pattern is stored under
    pub key: &'a str,
    /// The pattern itself
    pub pattern: &'a Pattern,
    /// Similarity to the query context
    pub score: f64,
}

/// Bucketed pattern table for one category
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatternStore {
    patterns: BTreeMap<String, Pattern>,
}

impl PatternStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an example, replacing whatever occupied its bucket
    ///
    /// Returns the bucket key.
    pub fn insert(
        &mut self,
        context: Context,
        output: GenerationOutput,
        quality: f64,
        input_text: impl Into<String>,
    ) -> String {
        let key = bucket_key(&context);
        let uses = self.patterns.get(&key).map_or(0, |p| p.uses) + 1;

        self.patterns.insert(
            key.clone(),
            Pattern {
                input_text: input_text.into(),
                context,
                output,
                quality,
                uses,
            },
        );
        key
    }

    /// Insert a fully formed pattern under an explicit key (snapshot restore)
    pub fn restore(&mut self, key: impl Into<String>, pattern: Pattern) {
        self.patterns.insert(key.into(), pattern);
    }

    /// Highest-scoring pattern whose similarity exceeds `threshold`
    pub fn find_best_match(&self, context: &Context, threshold: f64) -> Option<BestMatch<'_>> {
        let mut best: Option<BestMatch<'_>> = None;

        for (key, pattern) in &self.patterns {
            let score = similarity(context, &pattern.context);
            if score <= threshold {
                continue;
            }
            if best.as_ref().map_or(true, |b| score > b.score) {
                best = Some(BestMatch {
                    key,
                    pattern,
                    score,
                });
            }
        }

        best
    }

    /// Count a reuse of the pattern in `key`
    pub fn record_use(&mut self, key: &str) {
        if let Some(pattern) = self.patterns.get_mut(key) {
            pattern.uses += 1;
        }
    }

    /// Pattern stored under `key`
    pub fn get(&self, key: &str) -> Option<&Pattern> {
        self.patterns.get(key)
    }

    /// Iterate over (bucket key, pattern) pairs in key order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Pattern)> {
        self.patterns.iter()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ContextExtractor;
    use gencache_core::VoiceOutput;

    fn voice(tag: &str) -> GenerationOutput {
        GenerationOutput::Voice(VoiceOutput {
            voice: Some(tag.to_string()),
            ..Default::default()
        })
    }

    #[test]
    fn test_bucket_key_shape() {
        let ex = ContextExtractor::new(5).unwrap();
        let ctx = ex.extract("A beautiful sunset over calm water");
        assert_eq!(bucket_key(&ctx), "0.2-34-beautiful-sunset");

        assert_eq!(bucket_key(&Context::empty()), "0.0-0");
    }

    #[test]
    fn test_bucket_key_ignores_word_order_of_hits() {
        let ex = ContextExtractor::new(5).unwrap();
        let a = ex.extract("great great great bad bad bad");
        let b = ex.extract("bad bad bad great great great");

        assert_eq!(bucket_key(&a), "0.0-29-great-great");
        assert_eq!(bucket_key(&a), bucket_key(&b));
    }

    #[test]
    fn test_bucket_key_normalises_tiny_negatives() {
        for sentiment in [-5.5e-17, -0.0, -0.04, 5.5e-17] {
            let ctx = Context {
                length: 7,
                sentiment,
                ..Context::empty()
            };
            assert_eq!(bucket_key(&ctx), "0.0-7");
        }

        let ctx = Context {
            length: 7,
            sentiment: -0.6000000000000001,
            ..Context::empty()
        };
        assert_eq!(bucket_key(&ctx), "-0.6-7");
    }

    #[test]
    fn test_colliding_inputs_overwrite() {
        let ex = ContextExtractor::new(5).unwrap();
        // Same rounded sentiment, same length, same first two keywords
        let first = "storm clouds gather slowly";
        let second = "storm clouds gather softly";
        let (a, b) = (ex.extract(first), ex.extract(second));
        assert_eq!(bucket_key(&a), bucket_key(&b));

        let mut store = PatternStore::new();
        let key = store.insert(a, voice("first"), 0.5, first);
        store.insert(b, voice("second"), 0.6, second);

        assert_eq!(store.len(), 1);
        let kept = store.get(&key).unwrap();
        assert_eq!(kept.input_text, second);
        assert_eq!(kept.output, voice("second"));
        assert_eq!(kept.uses, 2);
    }

    #[test]
    fn test_best_match_scans_all_buckets() {
        let ex = ContextExtractor::new(5).unwrap();
        let mut store = PatternStore::new();
        store.insert(
            ex.extract("gentle piano melody at night"),
            voice("piano"),
            0.5,
            "gentle piano melody at night",
        );
        store.insert(
            ex.extract("terrible awful noise"),
            voice("noise"),
            0.5,
            "terrible awful noise",
        );

        let query = ex.extract("gentle piano melody at dawn");
        let found = store.find_best_match(&query, 0.6).unwrap();
        assert_eq!(found.pattern.output, voice("piano"));
        assert!(found.score > 0.6);
    }

    #[test]
    fn test_no_match_below_threshold() {
        let ex = ContextExtractor::new(5).unwrap();
        let mut store = PatternStore::new();
        store.insert(
            ex.extract("amazing wonderful great beautiful excellent"),
            voice("happy"),
            0.5,
            "amazing wonderful great beautiful excellent",
        );

        let query = ex.extract("bad");
        assert!(store.find_best_match(&query, 0.6).is_none());
        assert!(PatternStore::new().find_best_match(&query, 0.6).is_none());
    }

    #[test]
    fn test_record_use() {
        let ex = ContextExtractor::new(5).unwrap();
        let mut store = PatternStore::new();
        let key = store.insert(ex.extract("hello world"), voice("a"), 0.5, "hello world");

        store.record_use(&key);
        store.record_use("missing-bucket");
        assert_eq!(store.get(&key).unwrap().uses, 2);
    }
}
