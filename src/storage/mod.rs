//! Item storage
//!
//! The scheduler reads and writes items through the [`ItemStore`] trait:
//! - per-collection CRUD for personal and reference items
//! - the two learning-mode queries (priority group, distractor sample)
//! - single-item `(weight, last_updated_at)` writes
//!
//! Two implementations ship with the crate: [`MemoryStore`] and the
//! SQLite-backed [`SqliteStore`].

// ============================================================
// Submodules
// ============================================================

pub mod memory;
pub mod migrations;
pub mod sqlite;

pub use memory::MemoryStore;
pub use migrations::run_migrations;
pub use sqlite::SqliteStore;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::level::Level;
use crate::types::{Collection, ItemDraft, ItemId, LearningItem};

// ============================================================
// Errors
// ============================================================

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("migration error: {0}")]
    Migration(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("lock poisoned: {0}")]
    LockError(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

pub type StorageResult<T> = Result<T, StorageError>;

// ============================================================
// ItemStore
// ============================================================

/// Storage collaborator for both item collections.
///
/// Learning-mode queries and weight writes always target the personal
/// collection. Weight writes are plain last-write-wins.
pub trait ItemStore: Send + Sync {
    fn all(&self, collection: Collection) -> StorageResult<Vec<LearningItem>>;

    /// Items whose level matches `level` (`Level::All` returns everything)
    fn by_level(&self, collection: Collection, level: Level) -> StorageResult<Vec<LearningItem>>;

    fn by_id(&self, collection: Collection, id: ItemId) -> StorageResult<Option<LearningItem>>;

    /// Insert a new item; the store mints its id
    fn insert(&self, collection: Collection, draft: &ItemDraft) -> StorageResult<LearningItem>;

    /// Insert or replace an item under its own id
    fn save(&self, collection: Collection, item: &LearningItem) -> StorageResult<()>;

    /// Returns whether a row was removed
    fn delete(&self, collection: Collection, id: ItemId) -> StorageResult<bool>;

    fn count(&self, collection: Collection) -> StorageResult<usize>;

    /// Up to `limit` personal items at `level`, highest weight first.
    ///
    /// Ties go to the least recently updated item, then the lowest id.
    fn top_by_weight(&self, level: Level, limit: usize) -> StorageResult<Vec<LearningItem>>;

    /// Up to `limit` personal items at `level` sampled without regard to weight
    fn sample_distractors(&self, level: Level, limit: usize) -> StorageResult<Vec<LearningItem>>;

    /// Returns `false` when no personal item has this id
    fn update_weight(&self, id: ItemId, weight: f64, at: DateTime<Utc>) -> StorageResult<bool>;
}

impl<S: ItemStore + ?Sized> ItemStore for std::sync::Arc<S> {
    fn all(&self, collection: Collection) -> StorageResult<Vec<LearningItem>> {
        (**self).all(collection)
    }

    fn by_level(&self, collection: Collection, level: Level) -> StorageResult<Vec<LearningItem>> {
        (**self).by_level(collection, level)
    }

    fn by_id(&self, collection: Collection, id: ItemId) -> StorageResult<Option<LearningItem>> {
        (**self).by_id(collection, id)
    }

    fn insert(&self, collection: Collection, draft: &ItemDraft) -> StorageResult<LearningItem> {
        (**self).insert(collection, draft)
    }

    fn save(&self, collection: Collection, item: &LearningItem) -> StorageResult<()> {
        (**self).save(collection, item)
    }

    fn delete(&self, collection: Collection, id: ItemId) -> StorageResult<bool> {
        (**self).delete(collection, id)
    }

    fn count(&self, collection: Collection) -> StorageResult<usize> {
        (**self).count(collection)
    }

    fn top_by_weight(&self, level: Level, limit: usize) -> StorageResult<Vec<LearningItem>> {
        (**self).top_by_weight(level, limit)
    }

    fn sample_distractors(&self, level: Level, limit: usize) -> StorageResult<Vec<LearningItem>> {
        (**self).sample_distractors(level, limit)
    }

    fn update_weight(&self, id: ItemId, weight: f64, at: DateTime<Utc>) -> StorageResult<bool> {
        (**self).update_weight(id, weight, at)
    }
}
