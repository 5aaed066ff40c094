//! # tango-recall - adaptive recall scheduling for JLPT flashcards
//!
//! Decides which flashcard to quiz next and renders it as a four-option
//! multiple-choice question:
//!
//! - **Weight feedback** - every item carries a mastery-inverse weight in
//!   `[0, 1]`, pulled toward 0 on a correct answer and toward 1 on a miss
//! - **Pool resolution** - exact level, adjacent levels, whole collection,
//!   then a hybrid pool backfilled from the reference catalog
//! - **Learning mode** - the correct answer comes from the least-mastered
//!   items, distractors from a random sample
//! - **Quiz assembly** - distinct options, correct index tracked by identity
//!
//! ## Modules
//!
//! - [`level`] - JLPT levels and their adjacency
//! - [`weight`] - the weight feedback rule
//! - [`pool`] - tiered candidate pool building
//! - [`priority`] - learning-mode pool selection
//! - [`quiz`] - option drawing and shuffling
//! - [`engine`] - the facade used by a presentation layer
//! - [`storage`] - the [`ItemStore`] trait with in-memory and SQLite stores
//! - [`config`] / [`logging`] - environment configuration and tracing setup
//! - [`types`] - shared types and constants
//!
//! ## Example
//!
//! ```rust
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//! use tango_recall::{
//!     Direction, ItemDraft, ItemKind, Level, MemoryStore, QuizMode, QuizRequest, RecallEngine,
//! };
//!
//! let engine = RecallEngine::with_defaults(MemoryStore::with_seed(1));
//! for (form, meaning) in [("日", "sun"), ("月", "moon"), ("火", "fire"), ("水", "water")] {
//!     engine.add_item(&ItemDraft {
//!         kind: ItemKind::Kanji,
//!         primary_form: form.to_string(),
//!         attributes: vec![meaning.to_string()],
//!         level: Level::N5,
//!     })?;
//! }
//!
//! let mut rng = ChaCha8Rng::seed_from_u64(7);
//! let request = QuizRequest::new(Level::N5, Direction::PrimaryToAttributes, QuizMode::Learning);
//! let outcome = engine.request_quiz(request, &mut rng)?;
//! let quiz = outcome.quiz().expect("four items fill a quiz");
//! assert_eq!(quiz.options[quiz.correct_index], quiz.answer);
//!
//! let answer = engine.report_answer(quiz.item_id, true, quiz.item_weight)?;
//! assert!(answer.new_weight < quiz.item_weight);
//! # Ok::<(), tango_recall::EngineError>(())
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod config;
pub mod engine;
pub mod level;
pub mod logging;
pub mod pool;
pub mod priority;
pub mod quiz;
pub mod storage;
pub mod types;
pub mod weight;

// ============================================================================
// Re-exports
// ============================================================================

pub use types::*;

pub use config::{Config, EngineConfig, LogConfig};
pub use engine::{AnswerOutcome, EngineError, EngineResult, QuizOutcome, RecallEngine};
pub use level::{Level, ParseLevelError};
pub use logging::init_tracing;
pub use pool::{build_pool, AnswerScope, CandidatePool, PoolResult, PoolTier};
pub use priority::select_for_learning;
pub use quiz::{assemble, QuizError};
pub use storage::{ItemStore, MemoryStore, SqliteStore, StorageError, StorageResult};
pub use weight::{update_weight, WeightUpdatePolicy};
