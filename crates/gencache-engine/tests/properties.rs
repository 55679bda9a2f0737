//! Property tests for similarity and accuracy growth

use gencache_core::{Category, GenerationOutput};
use gencache_engine::{similarity, ContextExtractor, EngineConfig, ModelState};
use proptest::prelude::*;

fn extractor() -> ContextExtractor {
    ContextExtractor::new(5).unwrap()
}

proptest! {
    #[test]
    fn prop_input_with_keyword_is_fully_similar_to_itself(
        words in prop::collection::vec("[a-z]{1,10}", 0..12),
        keyword in "[a-z]{4,12}",
    ) {
        let mut tokens = words;
        tokens.push(keyword);
        let ctx = extractor().extract(&tokens.join(" "));

        prop_assert!(!ctx.keywords.is_empty());
        prop_assert!((similarity(&ctx, &ctx) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn prop_similarity_is_bounded_and_symmetric(a in ".{0,80}", b in ".{0,80}") {
        let ex = extractor();
        let (ca, cb) = (ex.extract(&a), ex.extract(&b));
        let ab = similarity(&ca, &cb);

        prop_assert!((0.0..=1.0).contains(&ab));
        prop_assert!((ab - similarity(&cb, &ca)).abs() < 1e-12);
    }

    #[test]
    fn prop_sentiment_stays_in_range(input in ".{0,200}") {
        let sentiment = extractor().extract(&input).sentiment;
        prop_assert!((-1.0..=1.0).contains(&sentiment));
    }

    #[test]
    fn prop_accuracy_monotonic_and_capped(qualities in prop::collection::vec(0.0f64..=1.0, 1..300)) {
        let config = EngineConfig::default();
        let ex = extractor();
        let mut model = ModelState::new(Category::Voice, &config);

        let mut previous = model.accuracy;
        for (i, quality) in qualities.into_iter().enumerate() {
            let input = format!("utterance {i}");
            let outcome = model.train(
                &config,
                &input,
                ex.extract(&input),
                GenerationOutput::Voice(Default::default()),
                quality,
            );
            prop_assert!(outcome.accuracy >= previous);
            prop_assert!(outcome.accuracy <= config.accuracy_ceiling);
            prop_assert_eq!(outcome.training_count, (i + 1) as u64);
            previous = outcome.accuracy;
        }
    }
}
