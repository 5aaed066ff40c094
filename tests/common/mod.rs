//! Shared fixtures for integration tests

#![allow(dead_code)]

use tango_recall::{Collection, ItemId, ItemKind, ItemStore, LearningItem, Level, MemoryStore};

pub fn kanji(id: ItemId, form: &str, level: Level, weight: f64) -> LearningItem {
    LearningItem::new(
        id,
        ItemKind::Kanji,
        form,
        vec![format!("on-{}", id), format!("kun-{}", id), format!("meaning-{}", id)],
        level,
    )
    .with_weight(weight)
}

pub fn numbered(ids: impl IntoIterator<Item = ItemId>, level: Level, weight: f64) -> Vec<LearningItem> {
    ids.into_iter()
        .map(|id| kanji(id, &format!("字{}", id), level, weight))
        .collect()
}

pub fn reference_catalog(ids: impl IntoIterator<Item = ItemId>, level: Level) -> Vec<LearningItem> {
    numbered(ids, level, 1.0)
        .into_iter()
        .map(|item| item.with_origin(Collection::Reference))
        .collect()
}

pub fn memory_store(personal: &[LearningItem], reference: &[LearningItem]) -> MemoryStore {
    let store = MemoryStore::with_seed(11);
    seed(&store, personal, reference);
    store
}

pub fn seed<S: ItemStore>(store: &S, personal: &[LearningItem], reference: &[LearningItem]) {
    for item in personal {
        store.save(Collection::Personal, item).unwrap();
    }
    for item in reference {
        store.save(Collection::Reference, item).unwrap();
    }
}
