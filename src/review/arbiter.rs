//! Auto-approval decision engine.
//!
//! Given a review item, the current policy and the learning state, the
//! arbiter picks one of three actions:
//!
//! - **Approve**: the score clears the effective threshold
//! - **Flag**: publish, but mark the item for human attention and learning
//! - **Retry**: the score is far below the bar; regenerate the content
//!
//! ## Usage
//!
//! ```
//! use editorial::learning::LearningState;
//! use editorial::review::arbiter::{ReviewAction, decide};
//! use editorial::review::ReviewPolicy;
//!
//! let decision = decide(90, "general tips", false, None, &ReviewPolicy::default(), &LearningState::new());
//! assert_eq!(decision.action, ReviewAction::Approve);
//! assert_eq!(decision.threshold_used, 85.0);
//! ```
//!
//! ## Bands
//!
//! With `t` the effective threshold and `very_low = max(40, t - 30)`:
//!
//! | Score              | Action  | Confidence |
//! |--------------------|---------|------------|
//! | `>= t`             | approve | 95 if the topic's accuracy is above 90, else 85 |
//! | `[very_low, t)`    | flag    | 70         |
//! | `< very_low`       | retry   | 90         |
//!
//! The engine is pure: callers act on `should_retry_generation` themselves.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{ReviewItem, ReviewPolicy};
use crate::learning::LearningState;
use crate::scoring::{EeatDimension, EeatScore};

/// Lowest possible "very low" cutoff.
pub const VERY_LOW_FLOOR: f64 = 40.0;
/// Distance below the effective threshold where flagging turns into retrying.
pub const VERY_LOW_MARGIN: f64 = 30.0;
/// Topic accuracy above which approvals are reported with high confidence.
pub const HIGH_ACCURACY: f64 = 90.0;

/// What to do with a scored item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewAction {
    /// Publish without human review.
    Approve,
    /// Publish, but surface the item to editors and the learning loop.
    Flag,
    /// Regenerate the content.
    Retry,
}

impl ReviewAction {
    pub fn allows_publication(&self) -> bool {
        matches!(self, Self::Approve | Self::Flag)
    }

    pub fn requires_regeneration(&self) -> bool {
        matches!(self, Self::Retry)
    }
}

impl fmt::Display for ReviewAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Approve => write!(f, "APPROVE"),
            Self::Flag => write!(f, "FLAG"),
            Self::Retry => write!(f, "RETRY"),
        }
    }
}

/// Decision produced by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoReviewDecision {
    pub action: ReviewAction,
    /// Confidence in percent (0-100).
    pub confidence: u32,
    pub reasons: Vec<String>,
    pub threshold_used: f64,
    /// Learned adjustments that shaped `threshold_used`.
    #[serde(default)]
    pub adjustments: Vec<String>,
    #[serde(default)]
    pub should_retry_generation: bool,
    /// Weakest E-E-A-T dimension, set for retries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weakest_dimension: Option<EeatDimension>,
}

impl AutoReviewDecision {
    fn new(action: ReviewAction, confidence: u32, threshold_used: f64) -> Self {
        Self {
            action,
            confidence: confidence.min(100),
            reasons: Vec::new(),
            threshold_used,
            adjustments: Vec::new(),
            should_retry_generation: false,
            weakest_dimension: None,
        }
    }

    pub fn approve(confidence: u32, threshold_used: f64) -> Self {
        Self::new(ReviewAction::Approve, confidence, threshold_used)
    }

    pub fn flag(confidence: u32, threshold_used: f64) -> Self {
        Self::new(ReviewAction::Flag, confidence, threshold_used)
    }

    pub fn retry(confidence: u32, threshold_used: f64) -> Self {
        Self {
            should_retry_generation: true,
            ..Self::new(ReviewAction::Retry, confidence, threshold_used)
        }
    }

    pub fn with_reason(mut self, reason: String) -> Self {
        self.reasons.push(reason);
        self
    }

    pub fn with_adjustments(mut self, adjustments: Vec<String>) -> Self {
        self.adjustments = adjustments;
        self
    }

    pub fn summary(&self) -> String {
        let reasons = if self.reasons.is_empty() {
            String::new()
        } else {
            format!(": {}", self.reasons.join("; "))
        };
        format!(
            "{} ({}% confidence, threshold {}){}",
            self.action, self.confidence, self.threshold_used, reasons
        )
    }
}

impl fmt::Display for AutoReviewDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.summary())
    }
}

/// Decide what to do with a review item.
pub fn make_auto_review_decision(
    item: &ReviewItem,
    policy: &ReviewPolicy,
    learning: &LearningState,
) -> AutoReviewDecision {
    decide(
        item.overall_quality_score,
        &item.topic,
        item.is_ymyl(),
        Some(&item.eeat_score),
        policy,
        learning,
    )
}

/// Decision core over raw inputs. `eeat` names the weakest dimension on
/// retries when available.
pub fn decide(
    score: u32,
    topic: &str,
    is_ymyl: bool,
    eeat: Option<&EeatScore>,
    policy: &ReviewPolicy,
    learning: &LearningState,
) -> AutoReviewDecision {
    let breakdown = learning.threshold_breakdown(topic, is_ymyl, policy);
    let threshold = breakdown.effective;
    let very_low = VERY_LOW_FLOOR.max(threshold - VERY_LOW_MARGIN);
    let score_f = score as f64;

    let decision = if score_f >= threshold {
        let accuracy = learning
            .topic_performance(topic)
            .map(|p| p.auto_approval_accuracy)
            .unwrap_or(0.0);
        let confidence = if accuracy > HIGH_ACCURACY { 95 } else { 85 };
        AutoReviewDecision::approve(confidence, threshold).with_reason(format!(
            "Score {} meets auto-approve threshold {}",
            score, threshold
        ))
    } else if score_f >= very_low {
        AutoReviewDecision::flag(70, threshold).with_reason(format!(
            "Score {} below threshold {} but above retry cutoff {}; publishing flagged for review",
            score, threshold, very_low
        ))
    } else {
        let mut retry = AutoReviewDecision::retry(90, threshold).with_reason(format!(
            "Score {} below retry cutoff {}",
            score, very_low
        ));
        if let Some(eeat) = eeat {
            let (dimension, dimension_score) = eeat.weakest_dimension();
            retry.weakest_dimension = Some(dimension);
            retry = retry.with_reason(format!(
                "Weakest dimension: {} ({}). {}",
                dimension,
                dimension_score,
                dimension.improvement_hint()
            ));
        }
        retry
    };

    let decision = if is_ymyl {
        decision.with_reason("YMYL topic: stricter threshold applies".to_string())
    } else {
        decision
    };
    let decision = decision.with_adjustments(breakdown.describe());

    tracing::debug!(
        topic,
        score,
        threshold,
        action = %decision.action,
        confidence = decision.confidence,
        "auto-review decision"
    );
    decision
}
