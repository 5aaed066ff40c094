//! Quiz engine
//!
//! Entry point for the presentation layer: `request_quiz` resolves a pool
//! from the store and renders a quiz, `report_answer` applies the weight
//! feedback rule and persists the result. The engine keeps no state between
//! calls; the store is the only shared resource.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;
use thiserror::Error;

use crate::config::EngineConfig;
use crate::level::Level;
use crate::pool::{build_pool, PoolResult};
use crate::priority::select_for_learning;
use crate::quiz::{assemble, QuizError};
use crate::storage::{ItemStore, StorageError, StorageResult};
use crate::types::{Collection, ItemDraft, ItemId, LearningItem, Quiz, QuizMode, QuizRequest};
use crate::weight::WeightUpdatePolicy;

// ==================== Types ====================

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error(transparent)]
    ContractViolation(#[from] QuizError),
    #[error("item {id} not found in {} collection", .collection.as_str())]
    ItemNotFound { collection: Collection, id: ItemId },
}

pub type EngineResult<T> = Result<T, EngineError>;

/// Result of a quiz request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum QuizOutcome {
    Ready(Quiz),
    /// Not enough items to build a quiz; the user should add more
    InsufficientData { level: Level },
}

impl QuizOutcome {
    pub fn quiz(&self) -> Option<&Quiz> {
        match self {
            QuizOutcome::Ready(quiz) => Some(quiz),
            QuizOutcome::InsufficientData { .. } => None,
        }
    }

    pub fn into_quiz(self) -> Option<Quiz> {
        match self {
            QuizOutcome::Ready(quiz) => Some(quiz),
            QuizOutcome::InsufficientData { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOutcome {
    pub item_id: ItemId,
    pub is_correct: bool,
    pub previous_weight: f64,
    pub new_weight: f64,
    pub updated_at: DateTime<Utc>,
}

// ==================== Engine ====================

pub struct RecallEngine<S> {
    store: S,
    config: EngineConfig,
    policy: WeightUpdatePolicy,
}

impl<S: ItemStore> RecallEngine<S> {
    pub fn new(store: S, config: EngineConfig) -> Self {
        let config = config.normalized();
        let policy = WeightUpdatePolicy::new(config.weight_step);
        Self {
            store,
            config,
            policy,
        }
    }

    pub fn with_defaults(store: S) -> Self {
        Self::new(store, EngineConfig::default())
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ==================== Quiz Flow ====================

    /// Resolve a pool for the request and render a quiz from it.
    ///
    /// Unreadable collections count as empty, so storage trouble surfaces as
    /// [`QuizOutcome::InsufficientData`]. An error means an assembler
    /// precondition was broken.
    pub fn request_quiz<R: Rng + ?Sized>(&self, request: QuizRequest, rng: &mut R) -> EngineResult<QuizOutcome> {
        let level = request.level;
        let resolved = match request.mode {
            QuizMode::Random => self.random_pool(level, rng),
            QuizMode::Learning => {
                let priority = self.read_or_empty(
                    "priority group",
                    self.store.top_by_weight(level, self.config.priority_limit),
                );
                let distractors = self.read_or_empty(
                    "distractor sample",
                    self.store.sample_distractors(level, self.config.distractor_limit),
                );
                select_for_learning(level, priority, distractors, || self.random_pool(level, rng))
            }
        };

        let pool = match resolved {
            PoolResult::Usable(pool) => pool,
            PoolResult::Insufficient { level } => {
                tracing::info!(%level, mode = ?request.mode, "not enough items for a quiz");
                return Ok(QuizOutcome::InsufficientData { level });
            }
        };

        let quiz = assemble(&pool, &request, rng).map_err(|e| {
            tracing::error!(error = %e, tier = ?pool.tier, "quiz assembly failed");
            e
        })?;

        tracing::debug!(
            %level,
            item_id = quiz.item_id,
            tier = ?pool.tier,
            hybrid = quiz.is_hybrid,
            "quiz ready"
        );
        Ok(QuizOutcome::Ready(quiz))
    }

    /// Apply the feedback rule to the weight the quiz was shown with and
    /// persist it. Concurrent answers for one item are last-write-wins.
    pub fn report_answer(&self, item_id: ItemId, is_correct: bool, weight_at_quiz: f64) -> EngineResult<AnswerOutcome> {
        self.report_answer_at(item_id, is_correct, weight_at_quiz, Utc::now())
    }

    pub fn report_answer_at(
        &self,
        item_id: ItemId,
        is_correct: bool,
        weight_at_quiz: f64,
        at: DateTime<Utc>,
    ) -> EngineResult<AnswerOutcome> {
        let new_weight = self.policy.update(weight_at_quiz, is_correct);

        if !self.store.update_weight(item_id, new_weight, at)? {
            tracing::warn!(item_id, "answer reported for unknown item");
            return Err(EngineError::ItemNotFound {
                collection: Collection::Personal,
                id: item_id,
            });
        }

        tracing::info!(
            item_id,
            is_correct,
            previous = weight_at_quiz,
            weight = new_weight,
            "weight updated"
        );
        Ok(AnswerOutcome {
            item_id,
            is_correct,
            previous_weight: weight_at_quiz,
            new_weight,
            updated_at: at,
        })
    }

    // ==================== Collection Management ====================

    /// Copy a catalog item into the personal collection as a fresh item.
    pub fn add_from_reference(&self, reference_id: ItemId) -> EngineResult<LearningItem> {
        let source = self
            .store
            .by_id(Collection::Reference, reference_id)?
            .ok_or(EngineError::ItemNotFound {
                collection: Collection::Reference,
                id: reference_id,
            })?;

        let item = self.store.insert(Collection::Personal, &source.to_draft())?;
        tracing::info!(reference_id, item_id = item.id, level = %item.level, "item copied from catalog");
        Ok(item)
    }

    pub fn add_item(&self, draft: &ItemDraft) -> EngineResult<LearningItem> {
        let item = self.store.insert(Collection::Personal, draft)?;
        tracing::info!(item_id = item.id, level = %item.level, "item added");
        Ok(item)
    }

    pub fn remove_item(&self, item_id: ItemId) -> EngineResult<bool> {
        let removed = self.store.delete(Collection::Personal, item_id)?;
        if removed {
            tracing::info!(item_id, "item removed");
        }
        Ok(removed)
    }

    pub fn personal_items(&self, level: Level) -> EngineResult<Vec<LearningItem>> {
        Ok(self.store.by_level(Collection::Personal, level)?)
    }

    pub fn reference_items(&self, level: Level) -> EngineResult<Vec<LearningItem>> {
        Ok(self.store.by_level(Collection::Reference, level)?)
    }

    // ==================== Helpers ====================

    fn random_pool<R: Rng + ?Sized>(&self, level: Level, rng: &mut R) -> PoolResult<LearningItem> {
        let personal = self.read_or_empty("personal collection", self.store.all(Collection::Personal));
        build_pool(
            level,
            &personal,
            || self.read_or_empty("reference collection", self.store.all(Collection::Reference)),
            rng,
        )
    }

    fn read_or_empty(&self, what: &str, result: StorageResult<Vec<LearningItem>>) -> Vec<LearningItem> {
        result.unwrap_or_else(|e| {
            tracing::warn!(error = %e, source = what, "storage read failed, treating as empty");
            Vec::new()
        })
    }
}
