//! Learning-mode selection
//!
//! Combines a priority group (least mastered first, as ordered by the store)
//! with a distractor group. Only priority items may become the correct answer,
//! which biases repetition toward weak items while strong items still show up
//! as plausible wrong options. Degrades to random-mode pool building when the
//! groups cannot fill a quiz.

use crate::level::Level;
use crate::pool::{dedup_by_id, AnswerScope, CandidatePool, PoolResult, PoolTier};
use crate::types::{Recallable, OPTION_COUNT};

/// Build a learning-mode pool from the two store groups, or defer to `fallback`.
///
/// The groups may overlap; the union is deduplicated by id before sizing,
/// with the priority copy of a shared item winning.
pub fn select_for_learning<T, F>(
    level: Level,
    priority: Vec<T>,
    distractors: Vec<T>,
    fallback: F,
) -> PoolResult<T>
where
    T: Recallable + Clone,
    F: FnOnce() -> PoolResult<T>,
{
    let priority = dedup_by_id(priority);
    if priority.is_empty() {
        tracing::debug!(%level, "priority group empty, falling back to random mode");
        return fallback();
    }

    let answer_ids: Vec<_> = priority.iter().map(|item| item.id()).collect();
    let items = dedup_by_id(priority.into_iter().chain(distractors));

    if items.len() < OPTION_COUNT {
        tracing::debug!(
            %level,
            size = items.len(),
            "learning pool too small, falling back to random mode"
        );
        return fallback();
    }

    tracing::debug!(
        %level,
        size = items.len(),
        priority = answer_ids.len(),
        "learning pool resolved"
    );
    PoolResult::Usable(CandidatePool {
        items,
        is_hybrid: false,
        tier: PoolTier::Priority,
        answers: AnswerScope::Only(answer_ids),
    })
}
