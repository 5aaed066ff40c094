//! Multiple-choice quiz assembly
//!
//! Picks the correct item, draws three distinct wrong items, shuffles and
//! renders every option with the same direction. The correct index is tracked
//! by item identity rather than by text, so homographs in the pool cannot make
//! it ambiguous.

use rand::prelude::*;
use std::collections::HashSet;

use crate::pool::CandidatePool;
use crate::types::{Quiz, QuizRequest, Recallable, DISTRACTOR_COUNT, OPTION_COUNT};

/// Assembly precondition broken by the caller.
///
/// Pool building only hands off pools that satisfy the preconditions, so this
/// indicates a programming error rather than a data condition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuizError {
    #[error("contract violation: pool has {0} items, need at least {min}", min = OPTION_COUNT)]
    PoolTooSmall(usize),
    #[error("contract violation: only {0} distinct wrong options, need {min}", min = DISTRACTOR_COUNT)]
    NotEnoughDistractors(usize),
    #[error("contract violation: no pool item is eligible as the correct answer")]
    NoEligibleAnswer,
}

/// Build a quiz from a resolved pool, choosing the correct item uniformly
/// among the pool members its answer scope admits.
pub fn assemble<T, R>(pool: &CandidatePool<T>, request: &QuizRequest, rng: &mut R) -> Result<Quiz, QuizError>
where
    T: Recallable + Clone,
    R: Rng + ?Sized,
{
    let candidates: Vec<&T> = pool.answer_candidates().collect();
    let correct = *candidates.choose(rng).ok_or(QuizError::NoEligibleAnswer)?;
    assemble_with_answer(&pool.items, correct, request, pool.is_hybrid, rng)
}

/// Build a quiz around a pre-selected correct item.
pub fn assemble_with_answer<T, R>(
    items: &[T],
    correct: &T,
    request: &QuizRequest,
    is_hybrid: bool,
    rng: &mut R,
) -> Result<Quiz, QuizError>
where
    T: Recallable,
    R: Rng + ?Sized,
{
    if items.len() < OPTION_COUNT {
        tracing::error!(size = items.len(), "quiz assembly called with undersized pool");
        return Err(QuizError::PoolTooSmall(items.len()));
    }

    let mut seen = HashSet::new();
    seen.insert(correct.id());
    let mut wrong: Vec<&T> = items.iter().filter(|item| seen.insert(item.id())).collect();
    if wrong.len() < DISTRACTOR_COUNT {
        tracing::error!(distractors = wrong.len(), "quiz assembly called without enough distractors");
        return Err(QuizError::NotEnoughDistractors(wrong.len()));
    }
    wrong.shuffle(rng);
    wrong.truncate(DISTRACTOR_COUNT);

    let direction = request.direction;
    let mut rendered: Vec<(bool, String)> = wrong
        .iter()
        .map(|item| (false, item.answer(direction)))
        .collect();
    rendered.push((true, correct.answer(direction)));
    rendered.shuffle(rng);

    let correct_index = rendered
        .iter()
        .position(|(is_correct, _)| *is_correct)
        .ok_or(QuizError::NoEligibleAnswer)?;
    let options: [String; OPTION_COUNT] = rendered
        .into_iter()
        .map(|(_, text)| text)
        .collect::<Vec<_>>()
        .try_into()
        .map_err(|v: Vec<String>| QuizError::PoolTooSmall(v.len()))?;

    Ok(Quiz {
        prompt: correct.prompt(direction),
        answer: correct.answer(direction),
        options,
        correct_index,
        item_id: correct.id(),
        item_weight: correct.weight(),
        level: request.level,
        direction,
        is_hybrid,
    })
}
