//! Context extraction
//!
//! Turns raw input text into the fixed-shape [`Context`] used for bucketing
//! and similarity. Sentiment is lexicon-based: each whitespace token that is
//! exactly a listed word moves the score by a fixed step.

use aho_corasick::{AhoCorasick, Anchored, Input, MatchKind, StartKind};
use gencache_core::{Context, Error, Result};
use regex::Regex;

/// Sentiment change per matched lexicon word
pub const SENTIMENT_STEP: f64 = 0.2;

const POSITIVE_WORDS: &[&str] = &[
    "good",
    "great",
    "amazing",
    "beautiful",
    "excellent",
    "wonderful",
    "fantastic",
];

const NEGATIVE_WORDS: &[&str] = &[
    "bad",
    "terrible",
    "awful",
    "horrible",
    "ugly",
    "disappointing",
];

/// Words shorter than or equal to this are never keywords
const MIN_KEYWORD_EXCLUSIVE: usize = 3;

pub struct ContextExtractor {
    max_keywords: usize,
    positive: AhoCorasick,
    negative: AhoCorasick,
    special_chars: Regex,
}

impl ContextExtractor {
    pub fn new(max_keywords: usize) -> Result<Self> {
        let positive = build_lexicon(POSITIVE_WORDS)
            .map_err(|e| Error::internal(format!("Failed to build positive lexicon: {e}")))?;
        let negative = build_lexicon(NEGATIVE_WORDS)
            .map_err(|e| Error::internal(format!("Failed to build negative lexicon: {e}")))?;
        let special_chars = Regex::new(r#"[!@#$%^&*(),.?":{}|<>]"#)
            .map_err(|e| Error::internal(format!("Failed to build punctuation matcher: {e}")))?;

        Ok(Self {
            max_keywords,
            positive,
            negative,
            special_chars,
        })
    }

    /// Derive the context of `input`
    pub fn extract(&self, input: &str) -> Context {
        let lowered = input.to_lowercase();
        let tokens: Vec<&str> = lowered.split_whitespace().collect();

        let keywords = tokens
            .iter()
            .filter(|t| t.chars().count() > MIN_KEYWORD_EXCLUSIVE)
            .take(self.max_keywords)
            .map(|t| t.to_string())
            .collect();

        Context {
            keywords,
            length: input.chars().count(),
            sentiment: self.sentiment(&tokens),
            has_numbers: input.chars().any(|c| c.is_ascii_digit()),
            has_special_chars: self.special_chars.is_match(input),
        }
    }

    fn sentiment(&self, tokens: &[&str]) -> f64 {
        // Net hit count, scaled once so word order cannot leave float residue
        let hits: i64 = tokens
            .iter()
            .map(|token| {
                if is_whole_word(&self.positive, token) {
                    1
                } else if is_whole_word(&self.negative, token) {
                    -1
                } else {
                    0
                }
            })
            .sum();

        (hits as f64 * SENTIMENT_STEP).clamp(-1.0, 1.0)
    }
}

fn build_lexicon(words: &[&str]) -> std::result::Result<AhoCorasick, aho_corasick::BuildError> {
    AhoCorasick::builder()
        .match_kind(MatchKind::LeftmostLongest)
        .start_kind(StartKind::Anchored)
        .build(words)
}

/// True when the whole token is one lexicon word
fn is_whole_word(lexicon: &AhoCorasick, token: &str) -> bool {
    lexicon
        .try_find(Input::new(token).anchored(Anchored::Yes))
        .ok()
        .flatten()
        .is_some_and(|m| m.end() == token.len())
}
