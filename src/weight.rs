//! Mastery weight feedback rule
//!
//! Correct answers contract the weight toward 0 by `w² × step`, wrong answers
//! toward 1 by `(1 - w)² × step`. The closer an item already is to a bound,
//! the smaller the further move.

use serde::{Deserialize, Serialize};

use crate::types::DEFAULT_WEIGHT;

pub const DEFAULT_STEP: f64 = 0.4;

const MIN_WEIGHT: f64 = 0.0;
const MAX_WEIGHT: f64 = 1.0;

/// Clamp a stored weight into [0, 1]. NaN reads as an unreviewed item.
pub fn sanitize_weight(weight: f64) -> f64 {
    if weight.is_nan() {
        return DEFAULT_WEIGHT;
    }
    weight.clamp(MIN_WEIGHT, MAX_WEIGHT)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightUpdatePolicy {
    pub step: f64,
}

impl Default for WeightUpdatePolicy {
    fn default() -> Self {
        Self { step: DEFAULT_STEP }
    }
}

impl WeightUpdatePolicy {
    pub fn new(step: f64) -> Self {
        Self { step }
    }

    pub fn update(&self, weight: f64, is_correct: bool) -> f64 {
        let w = sanitize_weight(weight);
        let next = if is_correct {
            w - w * w * self.step
        } else {
            let gap = 1.0 - w;
            w + gap * gap * self.step
        };
        sanitize_weight(next)
    }
}

/// [`WeightUpdatePolicy::update`] with the default step
pub fn update_weight(weight: f64, is_correct: bool) -> f64 {
    WeightUpdatePolicy::default().update(weight, is_correct)
}
