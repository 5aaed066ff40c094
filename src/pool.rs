//! Candidate pool resolution
//!
//! Widens the set of items a quiz may draw from, tier by tier, until at least
//! [`OPTION_COUNT`] distinct items are available:
//!
//! 1. personal items at the requested level
//! 2. personal items at adjacent levels
//! 3. the whole personal collection
//! 4. one personal item plus reference items (hybrid)
//! 5. nothing usable: [`PoolResult::Insufficient`]
//!
//! Running short of items is an expected outcome and is returned as a value.

use rand::prelude::*;
use serde::Serialize;
use std::collections::HashSet;

use crate::level::Level;
use crate::types::{ItemId, Recallable, DISTRACTOR_COUNT, OPTION_COUNT};

// ==================== Data Structures ====================

/// Fallback stage that produced a pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PoolTier {
    Exact,
    Adjacent,
    Collection,
    Hybrid,
    Priority,
}

/// Which pool members may become the correct answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerScope {
    Any,
    Only(Vec<ItemId>),
}

impl AnswerScope {
    pub fn admits(&self, id: ItemId) -> bool {
        match self {
            AnswerScope::Any => true,
            AnswerScope::Only(ids) => ids.contains(&id),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CandidatePool<T> {
    /// Distinct by id, at least [`OPTION_COUNT`] long
    pub items: Vec<T>,
    pub is_hybrid: bool,
    pub tier: PoolTier,
    pub answers: AnswerScope,
}

impl<T: Recallable> CandidatePool<T> {
    /// Pool members eligible as the correct answer
    pub fn answer_candidates(&self) -> impl Iterator<Item = &T> {
        self.items.iter().filter(|item| self.answers.admits(item.id()))
    }
}

#[derive(Debug, Clone)]
pub enum PoolResult<T> {
    Usable(CandidatePool<T>),
    /// Not enough items even after every fallback tier
    Insufficient { level: Level },
}

impl<T> PoolResult<T> {
    pub fn is_usable(&self) -> bool {
        matches!(self, PoolResult::Usable(_))
    }

    pub fn into_pool(self) -> Option<CandidatePool<T>> {
        match self {
            PoolResult::Usable(pool) => Some(pool),
            PoolResult::Insufficient { .. } => None,
        }
    }
}

// ==================== Helpers ====================

/// Drop later items whose id was already seen, keeping first occurrences in order
pub fn dedup_by_id<T: Recallable>(items: impl IntoIterator<Item = T>) -> Vec<T> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.id()))
        .collect()
}

fn personal_at<T: Recallable + Clone>(personal: &[T], levels: &[Level]) -> Vec<T> {
    dedup_by_id(
        personal
            .iter()
            .filter(|item| levels.iter().any(|level| level.matches(item.level())))
            .cloned(),
    )
}

fn usable<T>(items: Vec<T>, tier: PoolTier) -> PoolResult<T> {
    PoolResult::Usable(CandidatePool {
        items,
        is_hybrid: false,
        tier,
        answers: AnswerScope::Any,
    })
}

// ==================== Pool Builder ====================

/// Resolve a candidate pool for `level`.
///
/// `reference` is only invoked when the personal collection holds fewer than
/// [`OPTION_COUNT`] items, so a large catalog is never loaded needlessly.
pub fn build_pool<T, F, R>(level: Level, personal: &[T], reference: F, rng: &mut R) -> PoolResult<T>
where
    T: Recallable + Clone,
    F: FnOnce() -> Vec<T>,
    R: Rng + ?Sized,
{
    let exact = personal_at(personal, &[level]);
    if exact.len() >= OPTION_COUNT {
        tracing::debug!(%level, size = exact.len(), "pool resolved at exact level");
        return usable(exact, PoolTier::Exact);
    }

    let adjacent = if level.is_wildcard() {
        exact.clone()
    } else {
        personal_at(personal, level.adjacent())
    };
    if adjacent.len() >= OPTION_COUNT {
        tracing::debug!(%level, size = adjacent.len(), "pool resolved at adjacent levels");
        return usable(adjacent, PoolTier::Adjacent);
    }

    let whole = dedup_by_id(personal.iter().cloned());
    if whole.len() >= OPTION_COUNT {
        tracing::debug!(%level, size = whole.len(), "pool resolved over whole collection");
        return usable(whole, PoolTier::Collection);
    }

    if whole.is_empty() {
        tracing::debug!(%level, "personal collection empty");
        return PoolResult::Insufficient { level };
    }

    build_hybrid(level, &exact, &adjacent, &whole, reference(), rng)
}

fn build_hybrid<T, R>(
    level: Level,
    exact: &[T],
    adjacent: &[T],
    whole: &[T],
    reference: Vec<T>,
    rng: &mut R,
) -> PoolResult<T>
where
    T: Recallable + Clone,
    R: Rng + ?Sized,
{
    // Anchor from the narrowest non-empty tier
    let anchor_source = [exact, adjacent, whole]
        .into_iter()
        .find(|items| !items.is_empty())
        .unwrap_or(whole);
    let Some(anchor) = anchor_source.choose(rng).cloned() else {
        return PoolResult::Insufficient { level };
    };

    // A copied item keeps no link to its catalog original, so match on text too
    let mut primaries = HashSet::from([anchor.primary_text()]);
    let mut attributes = HashSet::from([anchor.attribute_text()]);
    let backfill: Vec<T> = dedup_by_id(reference)
        .into_iter()
        .filter(|item| {
            if item.id() == anchor.id() {
                return false;
            }
            let primary = item.primary_text();
            let attribute = item.attribute_text();
            if primaries.contains(&primary) || attributes.contains(&attribute) {
                return false;
            }
            primaries.insert(primary);
            attributes.insert(attribute);
            true
        })
        .collect();
    let near: Vec<&T> = backfill
        .iter()
        .filter(|item| level.adjacent().iter().any(|l| l.matches(item.level())))
        .collect();
    let source: Vec<&T> = if near.len() >= DISTRACTOR_COUNT {
        near
    } else {
        backfill.iter().collect()
    };

    if source.len() < DISTRACTOR_COUNT {
        tracing::debug!(
            %level,
            personal = whole.len(),
            reference = source.len(),
            "reference catalog too small for hybrid pool"
        );
        return PoolResult::Insufficient { level };
    }

    let mut items = Vec::with_capacity(OPTION_COUNT);
    let anchor_id = anchor.id();
    items.push(anchor);
    items.extend(
        source
            .choose_multiple(rng, DISTRACTOR_COUNT)
            .map(|item| (*item).clone()),
    );

    tracing::debug!(%level, anchor = anchor_id, "hybrid pool built from reference catalog");
    PoolResult::Usable(CandidatePool {
        items,
        is_hybrid: true,
        tier: PoolTier::Hybrid,
        answers: AnswerScope::Only(vec![anchor_id]),
    })
}
