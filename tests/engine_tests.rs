//! End-to-end tests for the quiz engine over both store implementations

mod common;

use chrono::{TimeZone, Utc};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::HashSet;
use std::sync::Arc;

use common::{kanji, memory_store, numbered, reference_catalog, seed};
use tango_recall::{
    build_pool, init_tracing, Collection, Config, Direction, EngineConfig, EngineError, ItemStore, Level, PoolTier,
    QuizMode, QuizOutcome, QuizRequest, RecallEngine, SqliteStore,
};

const TOLERANCE: f64 = 1e-12;

fn learning(level: Level) -> QuizRequest {
    QuizRequest::new(level, Direction::PrimaryToAttributes, QuizMode::Learning)
}

fn random(level: Level) -> QuizRequest {
    QuizRequest::new(level, Direction::PrimaryToAttributes, QuizMode::Random)
}

fn weighted_n5() -> Vec<tango_recall::LearningItem> {
    [0.9, 0.1, 0.5, 0.3, 0.7]
        .iter()
        .enumerate()
        .map(|(i, &w)| kanji(i as i64 + 1, &format!("字{}", i + 1), Level::N5, w))
        .collect()
}

#[test]
fn test_weakest_item_is_quizzed_and_weight_persists() {
    let store = memory_store(&weighted_n5(), &[]);

    let top = store.top_by_weight(Level::N5, 10).unwrap();
    assert_eq!(top[0].id, 1);
    assert_eq!(top[0].weight, 0.9);

    let config = EngineConfig {
        priority_limit: 1,
        ..EngineConfig::default()
    };
    let engine = RecallEngine::new(store, config);
    let mut rng = ChaCha8Rng::seed_from_u64(9);

    let quiz = engine
        .request_quiz(learning(Level::N5), &mut rng)
        .unwrap()
        .into_quiz()
        .expect("five items fill a quiz");
    assert_eq!(quiz.item_id, 1);
    assert_eq!(quiz.prompt, "字1");
    assert_eq!(quiz.options[quiz.correct_index], quiz.answer);

    let outcome = engine.report_answer(quiz.item_id, true, quiz.item_weight).unwrap();
    assert!((outcome.new_weight - 0.576).abs() < TOLERANCE);

    let stored = engine.store().by_id(Collection::Personal, 1).unwrap().unwrap();
    assert!((stored.weight - 0.576).abs() < TOLERANCE);

    // 0.7 is now the weakest item
    let top = engine.store().top_by_weight(Level::N5, 1).unwrap();
    assert_eq!(top[0].id, 5);
}

#[test]
fn test_default_learning_mode_quizzes_any_priority_item() {
    let engine = RecallEngine::with_defaults(memory_store(&weighted_n5(), &[]));
    let mut rng = ChaCha8Rng::seed_from_u64(21);

    for _ in 0..20 {
        let quiz = engine
            .request_quiz(learning(Level::N5), &mut rng)
            .unwrap()
            .into_quiz()
            .unwrap();
        assert!((1..=5).contains(&quiz.item_id));
        assert!(!quiz.is_hybrid);
    }
}

#[test]
fn test_two_personal_items_make_hybrid_quiz() {
    let personal = vec![kanji(1, "日", Level::N5, 0.4), kanji(2, "月", Level::N5, 0.6)];
    let mut reference = reference_catalog(100..105, Level::N4);
    reference.extend(reference_catalog(200..210, Level::N1));
    let engine = RecallEngine::with_defaults(memory_store(&personal, &reference));
    let mut rng = ChaCha8Rng::seed_from_u64(4);

    for _ in 0..10 {
        let quiz = engine
            .request_quiz(random(Level::N5), &mut rng)
            .unwrap()
            .into_quiz()
            .unwrap();
        assert!(quiz.is_hybrid);
        assert!(quiz.item_id == 1 || quiz.item_id == 2);
        // N4 is adjacent to N5 and has enough items, so N1 never shows up
        assert!(quiz.options.iter().all(|o| !o.contains("-20")));
    }
}

#[test]
fn test_empty_personal_collection_is_insufficient() {
    let engine = RecallEngine::with_defaults(memory_store(&[], &reference_catalog(1..50, Level::N5)));
    let mut rng = ChaCha8Rng::seed_from_u64(1);

    let outcome = engine.request_quiz(random(Level::N5), &mut rng).unwrap();
    assert_eq!(outcome, QuizOutcome::InsufficientData { level: Level::N5 });
    assert!(engine.personal_items(Level::All).unwrap().is_empty());
}

#[test]
fn test_pool_tiers_escalate() {
    let mut personal = numbered(1..=2, Level::N4, 0.5);
    personal.extend(numbered(3..=4, Level::N2, 0.5));
    personal.extend(numbered(5..=5, Level::N1, 0.5));
    let store = memory_store(&personal, &[]);
    let items = store.all(Collection::Personal).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(8);

    let tier = |level: Level, rng: &mut ChaCha8Rng| {
        build_pool(level, &items, Vec::new, rng)
            .into_pool()
            .map(|pool| pool.tier)
    };

    assert_eq!(tier(Level::N3, &mut rng), Some(PoolTier::Adjacent));
    assert_eq!(tier(Level::N5, &mut rng), Some(PoolTier::Collection));
    assert_eq!(tier(Level::All, &mut rng), Some(PoolTier::Exact));
}

#[test]
fn test_add_from_reference_then_quiz() {
    let reference = reference_catalog(1..=4, Level::N3);
    let engine = RecallEngine::with_defaults(memory_store(&[], &reference));
    let mut rng = ChaCha8Rng::seed_from_u64(2);

    for item in engine.reference_items(Level::N3).unwrap() {
        let added = engine.add_from_reference(item.id).unwrap();
        assert_eq!(added.weight, 1.0);
    }
    assert_eq!(engine.personal_items(Level::N3).unwrap().len(), 4);

    let quiz = engine
        .request_quiz(random(Level::N3), &mut rng)
        .unwrap()
        .into_quiz()
        .unwrap();
    assert!(!quiz.is_hybrid);
    assert_eq!(quiz.item_weight, 1.0);
}

#[test]
fn test_sqlite_store_persists_weights_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tango.db");
    let answered_at = Utc.with_ymd_and_hms(2024, 4, 1, 9, 30, 0).unwrap();

    {
        let store = SqliteStore::open(&path).unwrap();
        seed(&store, &weighted_n5(), &reference_catalog(100..110, Level::N5));

        let engine = RecallEngine::with_defaults(Arc::new(store));
        let mut rng = ChaCha8Rng::seed_from_u64(13);
        let quiz = engine
            .request_quiz(learning(Level::N5), &mut rng)
            .unwrap()
            .into_quiz()
            .unwrap();
        assert!((1..=5).contains(&quiz.item_id));

        engine.report_answer_at(1, false, 0.9, answered_at).unwrap();
    }

    let reopened = SqliteStore::open(&path).unwrap();
    let item = reopened.by_id(Collection::Personal, 1).unwrap().unwrap();
    assert!((item.weight - 0.904).abs() < TOLERANCE);
    assert_eq!(item.last_updated_at, answered_at);
    assert_eq!(reopened.count(Collection::Reference).unwrap(), 10);
}

#[test]
fn test_config_builds_engine_and_logging_is_reentrant() {
    let config = Config::from_lookup(|key| match key {
        "TANGO_PRIORITY_LIMIT" => Some("3".to_string()),
        "RUST_LOG" => Some("tango_recall=debug".to_string()),
        _ => None,
    });
    let _guard = init_tracing(&config.logging);
    assert!(init_tracing(&config.logging).is_none());

    let engine = RecallEngine::new(memory_store(&weighted_n5(), &[]), config.engine.clone());
    assert_eq!(engine.config().priority_limit, 3);

    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let quiz = engine
        .request_quiz(learning(Level::N5), &mut rng)
        .unwrap()
        .into_quiz()
        .unwrap();
    // priority group is the three heaviest items: 0.9, 0.7, 0.5
    assert!([1, 5, 3].contains(&quiz.item_id));
}

#[test]
fn test_copied_item_never_shows_its_catalog_original() {
    let engine = RecallEngine::with_defaults(memory_store(&[], &reference_catalog(1..=5, Level::N5)));
    let copied = engine.add_from_reference(2).unwrap();
    assert_eq!(copied.id, 1);
    let mut rng = ChaCha8Rng::seed_from_u64(17);

    for direction in [Direction::PrimaryToAttributes, Direction::AttributesToPrimary] {
        for _ in 0..20 {
            let quiz = engine
                .request_quiz(QuizRequest::new(Level::N5, direction, QuizMode::Random), &mut rng)
                .unwrap()
                .into_quiz()
                .unwrap();
            assert!(quiz.is_hybrid);
            let distinct: HashSet<_> = quiz.options.iter().collect();
            assert_eq!(distinct.len(), 4, "repeated option in {:?}", quiz.options);
            assert_eq!(quiz.options.iter().filter(|o| **o == quiz.answer).count(), 1);
        }
    }
}

#[test]
fn test_answer_for_removed_item_does_not_touch_its_successor() {
    let engine = RecallEngine::with_defaults(memory_store(&[], &reference_catalog(1..=3, Level::N5)));
    engine.add_from_reference(1).unwrap();
    let removed = engine.add_from_reference(2).unwrap();
    assert!(engine.remove_item(removed.id).unwrap());

    let successor = engine.add_from_reference(3).unwrap();
    assert_ne!(successor.id, removed.id);

    let err = engine.report_answer(removed.id, false, 0.5).unwrap_err();
    assert!(matches!(err, EngineError::ItemNotFound { .. }));
    let stored = engine.store().by_id(Collection::Personal, successor.id).unwrap().unwrap();
    assert_eq!(stored.weight, 1.0);
}
