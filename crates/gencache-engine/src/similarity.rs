//! Context similarity scoring

use gencache_core::Context;
use std::collections::HashSet;

const SENTIMENT_WEIGHT: f64 = 0.4;
const LENGTH_WEIGHT: f64 = 0.3;
const KEYWORD_WEIGHT: f64 = 0.3;

/// Weighted similarity of two contexts in [0, 1]
///
/// Combines sentiment closeness, relative length closeness, and Jaccard
/// overlap of keyword sets. Two keyword-less contexts share no keywords, so
/// such pairs top out at 0.7.
pub fn similarity(a: &Context, b: &Context) -> f64 {
    let sentiment_sim = 1.0 - (a.sentiment - b.sentiment).abs();

    let longest = a.length.max(b.length);
    let length_sim = if longest == 0 {
        1.0
    } else {
        1.0 - a.length.abs_diff(b.length) as f64 / longest as f64
    };

    let score = SENTIMENT_WEIGHT * sentiment_sim
        + LENGTH_WEIGHT * length_sim
        + KEYWORD_WEIGHT * keyword_similarity(&a.keywords, &b.keywords);

    score.clamp(0.0, 1.0)
}

/// Jaccard index over keyword sets; empty against empty is 0
pub fn keyword_similarity(a: &[String], b: &[String]) -> f64 {
    let a: HashSet<&str> = a.iter().map(String::as_str).collect();
    let b: HashSet<&str> = b.iter().map(String::as_str).collect();

    let union = a.union(&b).count();
    if union == 0 {
        return 0.0;
    }

    a.intersection(&b).count() as f64 / union as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(keywords: &[&str], length: usize, sentiment: f64) -> Context {
        Context {
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            length,
            sentiment,
            ..Context::empty()
        }
    }

    #[test]
    fn test_identical_contexts() {
        let a = ctx(&["storm", "coast"], 40, 0.2);
        assert!((similarity(&a, &a) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_weighted_components() {
        let a = ctx(&["storm", "coast"], 40, 0.0);
        let b = ctx(&["storm", "harbor"], 20, 0.4);

        // sentiment 0.6, length 0.5, keywords 1/3
        let expected = 0.4 * 0.6 + 0.3 * 0.5 + 0.3 * (1.0 / 3.0);
        assert!((similarity(&a, &b) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_zero_lengths_do_not_divide_by_zero() {
        let empty = Context::empty();
        let score = similarity(&empty, &empty);
        assert!((score - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_keyword_jaccard_ignores_duplicates() {
        let a = vec!["rain".to_string(), "rain".to_string()];
        let b = vec!["rain".to_string()];
        assert_eq!(keyword_similarity(&a, &b), 1.0);
        assert_eq!(keyword_similarity(&[], &[]), 0.0);
    }

    #[test]
    fn test_opposite_sentiment_scores_low() {
        let a = ctx(&["city"], 10, 1.0);
        let b = ctx(&["ocean"], 10, -1.0);
        // sentiment term goes negative and the total is floored at zero
        assert_eq!(similarity(&a, &b), 0.0);
    }
}
