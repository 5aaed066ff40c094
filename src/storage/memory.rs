//! In-memory item store
//!
//! Keeps both collections in ordered maps behind `RwLock`s. Distractor
//! sampling uses a seedable ChaCha RNG so tests can pin the sample.

use chrono::{DateTime, Utc};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::level::Level;
use crate::storage::{ItemStore, StorageError, StorageResult};
use crate::types::{Collection, ItemDraft, ItemId, LearningItem, DEFAULT_WEIGHT};
use crate::weight::sanitize_weight;

type ItemMap = BTreeMap<ItemId, LearningItem>;

pub struct MemoryStore {
    personal: RwLock<ItemMap>,
    reference: RwLock<ItemMap>,
    /// Next id to mint per collection; never moves backwards, so deleted ids are not reused
    next_personal_id: AtomicI64,
    next_reference_id: AtomicI64,
    rng: Mutex<ChaCha8Rng>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_rng(ChaCha8Rng::from_entropy())
    }

    /// Store with a fixed sampling seed (for testing)
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(ChaCha8Rng::seed_from_u64(seed))
    }

    fn with_rng(rng: ChaCha8Rng) -> Self {
        Self {
            personal: RwLock::new(BTreeMap::new()),
            reference: RwLock::new(BTreeMap::new()),
            next_personal_id: AtomicI64::new(1),
            next_reference_id: AtomicI64::new(1),
            rng: Mutex::new(rng),
        }
    }

    fn map(&self, collection: Collection) -> &RwLock<ItemMap> {
        match collection {
            Collection::Personal => &self.personal,
            Collection::Reference => &self.reference,
        }
    }

    fn next_id(&self, collection: Collection) -> &AtomicI64 {
        match collection {
            Collection::Personal => &self.next_personal_id,
            Collection::Reference => &self.next_reference_id,
        }
    }

    fn read(&self, collection: Collection) -> StorageResult<RwLockReadGuard<'_, ItemMap>> {
        self.map(collection)
            .read()
            .map_err(|e| StorageError::LockError(e.to_string()))
    }

    fn write(&self, collection: Collection) -> StorageResult<RwLockWriteGuard<'_, ItemMap>> {
        self.map(collection)
            .write()
            .map_err(|e| StorageError::LockError(e.to_string()))
    }

    fn personal_at(&self, level: Level) -> StorageResult<Vec<LearningItem>> {
        self.by_level(Collection::Personal, level)
    }
}

impl ItemStore for MemoryStore {
    fn all(&self, collection: Collection) -> StorageResult<Vec<LearningItem>> {
        Ok(self.read(collection)?.values().cloned().collect())
    }

    fn by_level(&self, collection: Collection, level: Level) -> StorageResult<Vec<LearningItem>> {
        Ok(self
            .read(collection)?
            .values()
            .filter(|item| level.matches(item.level))
            .cloned()
            .collect())
    }

    fn by_id(&self, collection: Collection, id: ItemId) -> StorageResult<Option<LearningItem>> {
        Ok(self.read(collection)?.get(&id).cloned())
    }

    fn insert(&self, collection: Collection, draft: &ItemDraft) -> StorageResult<LearningItem> {
        let mut map = self.write(collection)?;
        let id = self.next_id(collection).fetch_add(1, Ordering::SeqCst);
        let item = LearningItem {
            id,
            kind: draft.kind,
            primary_form: draft.primary_form.clone(),
            attributes: draft.attributes.clone(),
            level: draft.level,
            weight: DEFAULT_WEIGHT,
            last_updated_at: Utc::now(),
            origin: collection,
        };
        map.insert(id, item.clone());
        Ok(item)
    }

    fn save(&self, collection: Collection, item: &LearningItem) -> StorageResult<()> {
        let mut stored = item.clone();
        stored.origin = collection;
        stored.weight = sanitize_weight(stored.weight);
        let mut map = self.write(collection)?;
        self.next_id(collection)
            .fetch_max(stored.id.saturating_add(1), Ordering::SeqCst);
        map.insert(stored.id, stored);
        Ok(())
    }

    fn delete(&self, collection: Collection, id: ItemId) -> StorageResult<bool> {
        Ok(self.write(collection)?.remove(&id).is_some())
    }

    fn count(&self, collection: Collection) -> StorageResult<usize> {
        Ok(self.read(collection)?.len())
    }

    fn top_by_weight(&self, level: Level, limit: usize) -> StorageResult<Vec<LearningItem>> {
        let mut items = self.personal_at(level)?;
        items.sort_by(|a, b| {
            b.weight
                .total_cmp(&a.weight)
                .then(a.last_updated_at.cmp(&b.last_updated_at))
                .then(a.id.cmp(&b.id))
        });
        items.truncate(limit);
        Ok(items)
    }

    fn sample_distractors(&self, level: Level, limit: usize) -> StorageResult<Vec<LearningItem>> {
        let items = self.personal_at(level)?;
        let mut rng = self
            .rng
            .lock()
            .map_err(|e| StorageError::LockError(e.to_string()))?;
        Ok(items.choose_multiple(&mut *rng, limit).cloned().collect())
    }

    fn update_weight(&self, id: ItemId, weight: f64, at: DateTime<Utc>) -> StorageResult<bool> {
        let mut map = self.write(Collection::Personal)?;
        match map.get_mut(&id) {
            Some(item) => {
                item.weight = sanitize_weight(weight);
                item.last_updated_at = at;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
