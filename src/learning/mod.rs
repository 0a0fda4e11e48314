//! Adaptive learning from editorial feedback.
//!
//! Human decisions that confirm or override auto-approval candidates feed a
//! [`LearningState`]: per-topic performance counters, additive threshold
//! adjustments and a ranked list of recurring content weaknesses.
//!
//! | Submodule       | What it owns                                               |
//! |-----------------|------------------------------------------------------------|
//! | `insights`      | read-only reports: stats, recommendations, prompt addenda  |
//! | `feedback_loop` | `LearningLoop`, write-through persistence of the state     |
//!
//! `LearningState` is a plain owned value. Callers decide where it lives and
//! when it is persisted; `LearningLoop` is the write-through wrapper the CLI
//! uses.
//!
//! Threshold adjustments only ever tighten the bar:
//!
//! - per topic: `+2 × factor`, capped at 15 points
//! - YMYL: `+factor`, capped at 10 points
//!
//! and the effective threshold is always clamped to 50–100.

pub mod feedback_loop;
pub mod insights;

pub use feedback_loop::LearningLoop;
pub use insights::{LearningStats, TopicRecommendations};

use anyhow::bail;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::review::{ReviewItem, ReviewPolicy};
use crate::scoring::EeatDimension;

/// Cap on the per-topic threshold adjustment, in points.
pub const MAX_TOPIC_ADJUSTMENT: f64 = 15.0;
/// Cap on the YMYL threshold adjustment, in points.
pub const MAX_YMYL_ADJUSTMENT: f64 = 10.0;
/// Bounds of the effective auto-approve threshold.
pub const MIN_EFFECTIVE_THRESHOLD: f64 = 50.0;
pub const MAX_EFFECTIVE_THRESHOLD: f64 = 100.0;

/// Factor applied when a human rejects an auto-approval candidate.
pub const REJECTION_FACTOR: f64 = 1.0;
/// Factor applied when a human requests changes on an auto-approval candidate.
pub const CHANGES_REQUESTED_FACTOR: f64 = 0.5;

/// Normalized key for per-topic maps.
pub fn topic_key(topic: &str) -> String {
    topic.trim().to_lowercase()
}

/// Outcome recorded for one reviewed item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackDecision {
    Approved,
    Rejected,
    ChangesRequested,
    AutoApproved,
}

impl From<crate::review::DecisionStatus> for FeedbackDecision {
    fn from(status: crate::review::DecisionStatus) -> Self {
        use crate::review::DecisionStatus;
        match status {
            DecisionStatus::Approved => Self::Approved,
            DecisionStatus::Rejected => Self::Rejected,
            DecisionStatus::ChangesRequested => Self::ChangesRequested,
        }
    }
}

impl fmt::Display for FeedbackDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::ChangesRequested => "changes_requested",
            Self::AutoApproved => "auto_approved",
        };
        write!(f, "{}", s)
    }
}

/// One review outcome, consumed once by [`LearningState::record_review_feedback`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewFeedback {
    pub item_id: String,
    pub topic: String,
    pub is_ymyl: bool,
    pub eeat_score: u32,
    pub decision: FeedbackDecision,
    /// Whether the item cleared the effective threshold, i.e. the engine
    /// would have approved it without a human.
    pub was_auto_approval_candidate: bool,
    pub recorded_at: DateTime<Utc>,
}

impl ReviewFeedback {
    pub fn new(item: &ReviewItem, decision: FeedbackDecision, was_auto_approval_candidate: bool) -> Self {
        Self {
            item_id: item.id.clone(),
            topic: item.topic.clone(),
            is_ymyl: item.is_ymyl(),
            eeat_score: item.eeat_score.overall,
            decision,
            was_auto_approval_candidate,
            recorded_at: Utc::now(),
        }
    }
}

/// Review history for a single topic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopicPerformance {
    pub total_reviewed: u32,
    pub auto_approved: u32,
    pub human_approved: u32,
    pub human_rejected: u32,
    pub changes_requested: u32,
    /// Running mean of the E-E-A-T overall score.
    pub avg_eeat_score: f64,
    /// `100 - human_override_rate`, floored at 0.
    pub auto_approval_accuracy: f64,
    /// `(human_rejected + changes_requested) / auto_approved × 100`.
    pub human_override_rate: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_reviewed_at: Option<DateTime<Utc>>,
}

impl TopicPerformance {
    fn refresh_rates(&mut self) {
        if self.auto_approved > 0 {
            self.human_override_rate = (self.human_rejected + self.changes_requested) as f64
                / self.auto_approved as f64
                * 100.0;
            self.auto_approval_accuracy = (100.0 - self.human_override_rate).max(0.0);
        }
    }
}

/// Additive point adjustments on top of the static auto-approve threshold.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThresholdAdjustments {
    #[serde(default)]
    pub global: f64,
    #[serde(default)]
    pub ymyl: f64,
    #[serde(default)]
    pub by_topic: BTreeMap<String, f64>,
}

impl ThresholdAdjustments {
    pub fn for_topic(&self, topic: &str) -> f64 {
        self.by_topic.get(&topic_key(topic)).copied().unwrap_or(0.0)
    }
}

/// How the effective threshold for one topic was assembled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdBreakdown {
    pub base: f64,
    pub global: f64,
    pub ymyl: f64,
    pub topic: f64,
    pub ymyl_floor_applied: bool,
    pub effective: f64,
}

impl ThresholdBreakdown {
    /// Human-readable list of the non-zero adjustments.
    pub fn describe(&self) -> Vec<String> {
        let mut adjustments = Vec::new();
        if self.global != 0.0 {
            adjustments.push(format!("global {:+}", self.global));
        }
        if self.ymyl != 0.0 {
            adjustments.push(format!("YMYL {:+}", self.ymyl));
        }
        if self.topic != 0.0 {
            adjustments.push(format!("topic {:+}", self.topic));
        }
        if self.ymyl_floor_applied {
            adjustments.push("raised to YMYL minimum".to_string());
        }
        adjustments
    }
}

/// Kind of recurring content weakness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImprovementCategory {
    Experience,
    Expertise,
    Authoritativeness,
    Trustworthiness,
    Citations,
    Structure,
    Accuracy,
    Other,
}

impl ImprovementCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Experience => "experience",
            Self::Expertise => "expertise",
            Self::Authoritativeness => "authoritativeness",
            Self::Trustworthiness => "trustworthiness",
            Self::Citations => "citations",
            Self::Structure => "structure",
            Self::Accuracy => "accuracy",
            Self::Other => "other",
        }
    }
}

impl From<EeatDimension> for ImprovementCategory {
    fn from(dimension: EeatDimension) -> Self {
        match dimension {
            EeatDimension::Experience => Self::Experience,
            EeatDimension::Expertise => Self::Expertise,
            EeatDimension::Authoritativeness => Self::Authoritativeness,
            EeatDimension::Trustworthiness => Self::Trustworthiness,
        }
    }
}

impl fmt::Display for ImprovementCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for ImprovementCategory {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "experience" => Ok(Self::Experience),
            "expertise" => Ok(Self::Expertise),
            "authoritativeness" | "authority" => Ok(Self::Authoritativeness),
            "trustworthiness" | "trust" => Ok(Self::Trustworthiness),
            "citations" | "citation" => Ok(Self::Citations),
            "structure" => Ok(Self::Structure),
            "accuracy" => Ok(Self::Accuracy),
            "other" => Ok(Self::Other),
            other => bail!("Unknown improvement category '{}'", other),
        }
    }
}

/// A recurring content weakness, deduplicated by `(category, signal)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentImprovement {
    pub category: ImprovementCategory,
    pub signal: String,
    pub frequency: u32,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_prompt_addition: Option<String>,
}

/// Process-wide adaptive state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LearningState {
    #[serde(default)]
    pub topic_performance: BTreeMap<String, TopicPerformance>,
    #[serde(default)]
    pub threshold_adjustments: ThresholdAdjustments,
    #[serde(default)]
    pub content_improvements: Vec<ContentImprovement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

impl LearningState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn topic_performance(&self, topic: &str) -> Option<&TopicPerformance> {
        self.topic_performance.get(&topic_key(topic))
    }

    /// Record one review outcome.
    ///
    /// Exactly one counter moves per call:
    ///
    /// | decision            | candidate | counter           |
    /// |---------------------|-----------|-------------------|
    /// | auto_approved       | any       | auto_approved     |
    /// | approved            | yes       | auto_approved     |
    /// | approved            | no        | human_approved    |
    /// | rejected            | any       | human_rejected    |
    /// | changes_requested   | any       | changes_requested |
    ///
    /// Returns whether the topic threshold was tightened.
    pub fn record_review_feedback(&mut self, feedback: &ReviewFeedback) -> bool {
        let key = topic_key(&feedback.topic);
        let perf = self.topic_performance.entry(key).or_default();

        perf.total_reviewed += 1;
        let n = perf.total_reviewed as f64;
        perf.avg_eeat_score = (perf.avg_eeat_score * (n - 1.0) + feedback.eeat_score as f64) / n;
        perf.last_reviewed_at = Some(feedback.recorded_at);

        let adjust_factor = match (feedback.decision, feedback.was_auto_approval_candidate) {
            (FeedbackDecision::AutoApproved, _) | (FeedbackDecision::Approved, true) => {
                perf.auto_approved += 1;
                None
            }
            (FeedbackDecision::Approved, false) => {
                perf.human_approved += 1;
                None
            }
            (FeedbackDecision::Rejected, candidate) => {
                perf.human_rejected += 1;
                candidate.then_some(REJECTION_FACTOR)
            }
            (FeedbackDecision::ChangesRequested, candidate) => {
                perf.changes_requested += 1;
                candidate.then_some(CHANGES_REQUESTED_FACTOR)
            }
        };
        perf.refresh_rates();

        tracing::debug!(
            topic = %feedback.topic,
            decision = %feedback.decision,
            candidate = feedback.was_auto_approval_candidate,
            "recorded review feedback"
        );

        if let Some(factor) = adjust_factor {
            self.adjust_threshold_up(&feedback.topic, feedback.is_ymyl, factor);
        }
        self.last_updated = Some(feedback.recorded_at);
        adjust_factor.is_some()
    }

    /// Tighten the threshold for `topic` (and YMYL content when `is_ymyl`).
    /// Non-positive factors are ignored so adjustments never decrease.
    pub fn adjust_threshold_up(&mut self, topic: &str, is_ymyl: bool, factor: f64) {
        if factor <= 0.0 || !factor.is_finite() {
            return;
        }
        let adjustments = &mut self.threshold_adjustments;
        let entry = adjustments.by_topic.entry(topic_key(topic)).or_insert(0.0);
        *entry = (*entry + 2.0 * factor).min(MAX_TOPIC_ADJUSTMENT);
        let topic_adjustment = *entry;
        if is_ymyl {
            adjustments.ymyl = (adjustments.ymyl + factor).min(MAX_YMYL_ADJUSTMENT);
        }
        tracing::info!(
            topic,
            topic_adjustment,
            ymyl_adjustment = adjustments.ymyl,
            "auto-approve threshold tightened"
        );
    }

    /// Assemble the effective auto-approve threshold for a topic.
    pub fn threshold_breakdown(
        &self,
        topic: &str,
        is_ymyl: bool,
        policy: &ReviewPolicy,
    ) -> ThresholdBreakdown {
        let adjustments = &self.threshold_adjustments;
        let base = policy.auto_approve_above_score as f64;
        let ymyl = if is_ymyl { adjustments.ymyl } else { 0.0 };
        let topic_adjustment = adjustments.for_topic(topic);

        let mut effective = base + adjustments.global + ymyl + topic_adjustment;
        let mut ymyl_floor_applied = false;
        if is_ymyl && effective < policy.ymyl_min_score as f64 {
            effective = policy.ymyl_min_score as f64;
            ymyl_floor_applied = true;
        }
        ThresholdBreakdown {
            base,
            global: adjustments.global,
            ymyl,
            topic: topic_adjustment,
            ymyl_floor_applied,
            effective: effective.clamp(MIN_EFFECTIVE_THRESHOLD, MAX_EFFECTIVE_THRESHOLD),
        }
    }

    pub fn effective_threshold(&self, topic: &str, is_ymyl: bool, policy: &ReviewPolicy) -> f64 {
        self.threshold_breakdown(topic, is_ymyl, policy).effective
    }

    /// Whether `item` clears its effective threshold.
    pub fn is_auto_approval_candidate(&self, item: &ReviewItem, policy: &ReviewPolicy) -> bool {
        item.overall_quality_score as f64
            >= self.effective_threshold(&item.topic, item.is_ymyl(), policy)
    }

    /// Record a recurring weakness. Repeats bump `frequency` and `last_seen`;
    /// a newly supplied suggestion replaces the stored one.
    pub fn record_content_improvement(
        &mut self,
        category: ImprovementCategory,
        signal: &str,
        suggested_prompt_addition: Option<&str>,
    ) {
        let now = Utc::now();
        let signal = signal.trim();
        match self
            .content_improvements
            .iter_mut()
            .find(|c| c.category == category && c.signal == signal)
        {
            Some(existing) => {
                existing.frequency += 1;
                existing.last_seen = now;
                if let Some(suggestion) = suggested_prompt_addition {
                    existing.suggested_prompt_addition = Some(suggestion.to_string());
                }
            }
            None => self.content_improvements.push(ContentImprovement {
                category,
                signal: signal.to_string(),
                frequency: 1,
                first_seen: now,
                last_seen: now,
                suggested_prompt_addition: suggested_prompt_addition.map(str::to_string),
            }),
        }
        self.last_updated = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feedback(topic: &str, is_ymyl: bool, decision: FeedbackDecision, candidate: bool) -> ReviewFeedback {
        ReviewFeedback {
            item_id: "item".to_string(),
            topic: topic.to_string(),
            is_ymyl,
            eeat_score: 80,
            decision,
            was_auto_approval_candidate: candidate,
            recorded_at: Utc::now(),
        }
    }

    // =========================================
    // Feedback counters
    // =========================================

    #[test]
    fn test_feedback_counts_exactly_one_bucket() {
        let mut state = LearningState::new();
        state.record_review_feedback(&feedback("tips", false, FeedbackDecision::AutoApproved, false));
        state.record_review_feedback(&feedback("tips", false, FeedbackDecision::Approved, true));
        state.record_review_feedback(&feedback("tips", false, FeedbackDecision::Approved, false));
        state.record_review_feedback(&feedback("tips", false, FeedbackDecision::Rejected, false));
        state.record_review_feedback(&feedback("tips", false, FeedbackDecision::ChangesRequested, false));

        let perf = state.topic_performance("tips").unwrap();
        assert_eq!(perf.total_reviewed, 5);
        assert_eq!(perf.auto_approved, 2);
        assert_eq!(perf.human_approved, 1);
        assert_eq!(perf.human_rejected, 1);
        assert_eq!(perf.changes_requested, 1);
        assert_eq!(perf.human_override_rate, 100.0);
        assert_eq!(perf.auto_approval_accuracy, 0.0);
    }

    #[test]
    fn test_running_mean() {
        let mut state = LearningState::new();
        for score in [60, 80, 100] {
            let mut fb = feedback("Tips", false, FeedbackDecision::Approved, false);
            fb.eeat_score = score;
            state.record_review_feedback(&fb);
        }
        let perf = state.topic_performance("tips").unwrap();
        assert!((perf.avg_eeat_score - 80.0).abs() < 1e-9);
        assert!(perf.last_reviewed_at.is_some());
    }

    #[test]
    fn test_override_rate_untouched_without_auto_approvals() {
        let mut state = LearningState::new();
        state.record_review_feedback(&feedback("tips", false, FeedbackDecision::Rejected, false));
        let perf = state.topic_performance("tips").unwrap();
        assert_eq!(perf.human_override_rate, 0.0);
        assert_eq!(perf.auto_approval_accuracy, 0.0);
    }

    #[test]
    fn test_accuracy_after_confirmed_auto_approvals() {
        let mut state = LearningState::new();
        for _ in 0..4 {
            state.record_review_feedback(&feedback("tips", false, FeedbackDecision::AutoApproved, true));
        }
        state.record_review_feedback(&feedback("tips", false, FeedbackDecision::ChangesRequested, true));
        let perf = state.topic_performance("tips").unwrap();
        assert_eq!(perf.human_override_rate, 25.0);
        assert_eq!(perf.auto_approval_accuracy, 75.0);
    }

    // =========================================
    // Threshold adjustments
    // =========================================

    #[test]
    fn test_rejected_ymyl_candidate_tightens_topic_and_ymyl() {
        let mut state = LearningState::new();
        let adjusted = state.record_review_feedback(&feedback(
            "finance tips",
            true,
            FeedbackDecision::Rejected,
            true,
        ));
        assert!(adjusted);
        assert_eq!(state.threshold_adjustments.for_topic("finance tips"), 2.0);
        assert_eq!(state.threshold_adjustments.ymyl, 1.0);
    }

    #[test]
    fn test_changes_requested_candidate_uses_half_factor() {
        let mut state = LearningState::new();
        state.record_review_feedback(&feedback("pets", true, FeedbackDecision::ChangesRequested, true));
        assert_eq!(state.threshold_adjustments.for_topic("pets"), 1.0);
        assert_eq!(state.threshold_adjustments.ymyl, 0.5);
    }

    #[test]
    fn test_non_candidates_do_not_adjust() {
        let mut state = LearningState::new();
        assert!(!state.record_review_feedback(&feedback("pets", true, FeedbackDecision::Rejected, false)));
        assert_eq!(state.threshold_adjustments, ThresholdAdjustments::default());
    }

    #[test]
    fn test_adjustments_are_capped() {
        let mut state = LearningState::new();
        for _ in 0..50 {
            state.adjust_threshold_up("health", true, 1.0);
        }
        assert_eq!(state.threshold_adjustments.for_topic("health"), MAX_TOPIC_ADJUSTMENT);
        assert_eq!(state.threshold_adjustments.ymyl, MAX_YMYL_ADJUSTMENT);
    }

    #[test]
    fn test_adjustments_never_decrease() {
        let mut state = LearningState::new();
        state.adjust_threshold_up("health", true, 1.0);
        let before = state.threshold_adjustments.clone();
        state.adjust_threshold_up("health", true, -3.0);
        state.adjust_threshold_up("health", true, 0.0);
        state.adjust_threshold_up("health", true, f64::NAN);
        assert_eq!(state.threshold_adjustments, before);
    }

    #[test]
    fn test_topic_keys_are_case_insensitive() {
        let mut state = LearningState::new();
        state.adjust_threshold_up("  Finance Tips ", false, 1.0);
        assert_eq!(state.threshold_adjustments.for_topic("finance tips"), 2.0);
        assert_eq!(state.threshold_adjustments.ymyl, 0.0);
    }

    // =========================================
    // Effective threshold
    // =========================================

    #[test]
    fn test_effective_threshold_defaults() {
        let state = LearningState::new();
        let policy = ReviewPolicy::default();
        assert_eq!(state.effective_threshold("general tips", false, &policy), 85.0);
        assert_eq!(state.effective_threshold("medical advice", true, &policy), 85.0);
    }

    #[test]
    fn test_effective_threshold_ymyl_floor() {
        let state = LearningState::new();
        let policy = ReviewPolicy {
            auto_approve_above_score: 70,
            ymyl_min_score: 80,
            ..Default::default()
        };
        let breakdown = state.threshold_breakdown("health", true, &policy);
        assert_eq!(breakdown.effective, 80.0);
        assert!(breakdown.ymyl_floor_applied);
        assert_eq!(state.effective_threshold("gadgets", false, &policy), 70.0);
    }

    #[test]
    fn test_effective_threshold_sums_adjustments() {
        let mut state = LearningState::new();
        state.threshold_adjustments.global = 1.0;
        state.adjust_threshold_up("health", true, 1.0);
        let policy = ReviewPolicy::default();
        let breakdown = state.threshold_breakdown("health", true, &policy);
        assert_eq!(breakdown.effective, 89.0);
        assert_eq!(breakdown.describe(), vec!["global +1", "YMYL +1", "topic +2"]);
        // YMYL adjustment does not apply to standard topics
        assert_eq!(state.effective_threshold("gadgets", false, &policy), 86.0);
    }

    #[test]
    fn test_effective_threshold_clamped() {
        let mut state = LearningState::new();
        state.threshold_adjustments.global = 500.0;
        let policy = ReviewPolicy::default();
        assert_eq!(state.effective_threshold("anything", true, &policy), 100.0);

        state.threshold_adjustments.global = -500.0;
        assert_eq!(state.effective_threshold("anything", false, &policy), 50.0);

        let zero = ReviewPolicy {
            auto_approve_above_score: 0,
            ymyl_min_score: 0,
            ..Default::default()
        };
        let fresh = LearningState::new();
        for is_ymyl in [true, false] {
            let t = fresh.effective_threshold("x", is_ymyl, &zero);
            assert!((MIN_EFFECTIVE_THRESHOLD..=MAX_EFFECTIVE_THRESHOLD).contains(&t));
        }
    }

    // =========================================
    // Content improvements
    // =========================================

    #[test]
    fn test_content_improvements_deduplicate() {
        let mut state = LearningState::new();
        state.record_content_improvement(ImprovementCategory::Citations, "too few sources", None);
        state.record_content_improvement(
            ImprovementCategory::Citations,
            "too few sources",
            Some("Cite at least three primary sources"),
        );
        state.record_content_improvement(ImprovementCategory::Experience, "too few sources", None);

        assert_eq!(state.content_improvements.len(), 2);
        let citations = &state.content_improvements[0];
        assert_eq!(citations.frequency, 2);
        assert!(citations.last_seen >= citations.first_seen);
        assert_eq!(
            citations.suggested_prompt_addition.as_deref(),
            Some("Cite at least three primary sources")
        );
    }

    #[test]
    fn test_improvement_category_parse() {
        assert_eq!(
            "Trust".parse::<ImprovementCategory>().unwrap(),
            ImprovementCategory::Trustworthiness
        );
        assert!("vibes".parse::<ImprovementCategory>().is_err());
        assert_eq!(
            ImprovementCategory::from(EeatDimension::Expertise),
            ImprovementCategory::Expertise
        );
    }

    // =========================================
    // Persistence format
    // =========================================

    #[test]
    fn test_state_round_trip() {
        let mut state = LearningState::new();
        state.record_review_feedback(&feedback("finance tips", true, FeedbackDecision::Rejected, true));
        state.record_content_improvement(ImprovementCategory::Structure, "wall of text", Some("Use H2s"));

        let json = serde_json::to_value(&state).unwrap();
        let back: LearningState = serde_json::from_value(json).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn test_state_deserializes_from_empty_object() {
        let state: LearningState = serde_json::from_str("{}").unwrap();
        assert_eq!(state, LearningState::default());
    }
}
