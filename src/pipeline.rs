//! End-to-end editorial flow.
//!
//! `EditorialPipeline` wires the quality gate, the decision engine and the
//! learning loop together:
//!
//! 1. `gate` runs the quality gate and counts gate auto-approvals.
//! 2. `submit` gates, then asks the decision engine what to do. Gate
//!    auto-approvals are final. Flagged items stay in the queue but are
//!    marked and may be published; retries are sent back for regeneration.
//!    Flag and retry outcomes record a content-improvement signal for the
//!    weakest E-E-A-T dimension.
//! 3. `decide` and `request_changes` apply human decisions and feed them back
//!    into the learning loop, which tightens thresholds for topics where the
//!    engine would have approved something a human did not. A second review
//!    round on the same item is not fed back again.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, warn};

use crate::errors::EditorialError;
use crate::gate::{QualityGateOptions, QualityGateResult, require_passed, run_quality_gate};
use crate::learning::{FeedbackDecision, ImprovementCategory, LearningLoop, ReviewFeedback};
use crate::review::arbiter::{AutoReviewDecision, ReviewAction, decide};
use crate::review::{
    ChangeRequest, DecisionStatus, ReviewDecision, ReviewItem, ReviewPolicy, ReviewRepository,
    ReviewStatus,
};
use crate::scoring::ScoreProvider;
use crate::storage::KeyValueStore;

/// Where a submission ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    /// Finalized without a human.
    AutoApproved,
    /// Waiting in the review queue.
    Queued,
    /// Queued and marked for attention, but cleared for publication.
    Flagged,
    /// Too weak to review; the caller should regenerate it.
    Regenerate,
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::AutoApproved => "auto_approved",
            Self::Queued => "queued",
            Self::Flagged => "flagged",
            Self::Regenerate => "regenerate",
        };
        write!(f, "{}", s)
    }
}

impl Disposition {
    /// Whether the content may go live without waiting for a human.
    pub fn allows_publication(&self) -> bool {
        matches!(self, Self::AutoApproved | Self::Flagged)
    }
}

/// Result of [`EditorialPipeline::submit`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub disposition: Disposition,
    pub gate: QualityGateResult,
    pub decision: AutoReviewDecision,
}

impl Submission {
    pub fn review_item(&self) -> Option<&ReviewItem> {
        self.gate.review_item.as_ref()
    }
}

pub struct EditorialPipeline<S: KeyValueStore> {
    reviews: ReviewRepository<S>,
    learning: LearningLoop<S>,
    scorer: Box<dyn ScoreProvider>,
}

impl<S: KeyValueStore> EditorialPipeline<S> {
    pub fn new(
        reviews: ReviewRepository<S>,
        learning: LearningLoop<S>,
        scorer: Box<dyn ScoreProvider>,
    ) -> Self {
        Self {
            reviews,
            learning,
            scorer,
        }
    }

    pub fn reviews(&self) -> &ReviewRepository<S> {
        &self.reviews
    }

    pub fn reviews_mut(&mut self) -> &mut ReviewRepository<S> {
        &mut self.reviews
    }

    pub fn learning(&self) -> &LearningLoop<S> {
        &self.learning
    }

    pub fn learning_mut(&mut self) -> &mut LearningLoop<S> {
        &mut self.learning
    }

    /// Run the quality gate and record a gate auto-approval as feedback.
    pub fn gate(&mut self, title: &str, html: &str, options: &QualityGateOptions) -> QualityGateResult {
        let gate = run_quality_gate(title, html, options, &mut self.reviews, self.scorer.as_ref());
        self.record_gate_auto_approval(&gate);
        gate
    }

    fn record_gate_auto_approval(&mut self, gate: &QualityGateResult) {
        if gate.auto_approved
            && let Some(item) = &gate.review_item
        {
            self.record_auto_approval(item);
        }
    }

    /// Like [`Self::gate`], but content with hard issues is an error.
    pub fn enforce_gate(
        &mut self,
        title: &str,
        html: &str,
        options: &QualityGateOptions,
    ) -> Result<QualityGateResult, EditorialError> {
        require_passed(self.gate(title, html, options))
    }

    /// Gate, decide and route one piece of content.
    pub fn submit(&mut self, title: &str, html: &str, options: &QualityGateOptions) -> Submission {
        let mut gate =
            run_quality_gate(title, html, options, &mut self.reviews, self.scorer.as_ref());
        let policy = self.reviews.policy().merged(&options.policy);
        let decision = decide(
            gate.overall_score,
            &options.topic,
            gate.is_ymyl,
            Some(&gate.eeat_score),
            &policy,
            self.learning.state(),
        );

        self.record_gate_auto_approval(&gate);

        let disposition = route(&gate, decision.action);
        if disposition == Disposition::Flagged
            && let Some(id) = gate.review_item.as_ref().map(|item| item.id.clone())
        {
            match self.reviews.flag_item(&id, &decision.reasons) {
                Ok(flagged) => gate.review_item = Some(flagged),
                Err(e) => warn!(id = %id, error = %e, "failed to flag item"),
            }
        }
        if matches!(disposition, Disposition::Flagged | Disposition::Regenerate) {
            self.record_weakness(&gate);
        }

        info!(
            topic = %options.topic,
            score = gate.overall_score,
            action = %decision.action,
            disposition = %disposition,
            "submission routed"
        );
        Submission {
            disposition,
            gate,
            decision,
        }
    }

    fn record_weakness(&mut self, gate: &QualityGateResult) {
        let (dimension, score) = gate.eeat_score.weakest_dimension();
        let signal = format!("Weak {} ({})", dimension, score);
        self.learning.record_content_improvement(
            ImprovementCategory::from(dimension),
            &signal,
            Some(dimension.improvement_hint()),
        );
    }

    /// Apply a human decision and record it as learning feedback.
    pub fn decide(&mut self, id: &str, decision: &ReviewDecision) -> Result<ReviewItem, EditorialError> {
        let prior = self.prior_review(id)?;
        let updated = self.reviews.submit_decision(id, decision)?;
        if decision.status != DecisionStatus::ChangesRequested || !prior.had_review_round {
            self.learning.record_review_feedback(&ReviewFeedback::new(
                &updated,
                FeedbackDecision::from(decision.status),
                prior.candidate,
            ));
        }
        Ok(updated)
    }

    /// Request changes and, on the first round for an item that actually
    /// moved to `changes_requested`, record it as learning feedback.
    pub fn request_changes(
        &mut self,
        id: &str,
        requested_by: &str,
        message: &str,
    ) -> Result<ChangeRequest, EditorialError> {
        let prior = self.prior_review(id)?;
        let request = self.reviews.request_changes(id, requested_by, message)?;
        if !prior.had_review_round
            && let Some(item) = self.reviews.get_review_item(id)
            && item.status == ReviewStatus::ChangesRequested
        {
            let feedback = ReviewFeedback::new(item, FeedbackDecision::ChangesRequested, prior.candidate);
            self.learning.record_review_feedback(&feedback);
        }
        Ok(request)
    }

    /// Finalize an eligible item without a human and count it as an
    /// auto-approval for its topic.
    pub fn process_auto_approval(&mut self, id: &str) -> bool {
        if !self.reviews.process_auto_approval(id) {
            return false;
        }
        if let Some(item) = self.reviews.get_review_item(id).cloned() {
            self.record_auto_approval(&item);
        }
        true
    }

    fn record_auto_approval(&mut self, item: &ReviewItem) {
        let policy = self.item_policy(item);
        let candidate = self.learning.state().is_auto_approval_candidate(item, &policy);
        self.learning.record_review_feedback(&ReviewFeedback::new(
            item,
            FeedbackDecision::AutoApproved,
            candidate,
        ));
    }

    /// Repository policy with the override the item was gated under.
    fn item_policy(&self, item: &ReviewItem) -> ReviewPolicy {
        self.reviews.policy().merged(&item.policy_override)
    }

    fn prior_review(&self, id: &str) -> Result<PriorReview, EditorialError> {
        let item = self
            .reviews
            .get_review_item(id)
            .ok_or_else(|| EditorialError::ItemNotFound { id: id.to_string() })?;
        let policy = self.item_policy(item);
        Ok(PriorReview {
            candidate: self.learning.state().is_auto_approval_candidate(item, &policy),
            had_review_round: item.review_rounds() > 0,
        })
    }
}

/// Item state captured before a human decision is applied.
struct PriorReview {
    /// The item cleared its effective threshold.
    candidate: bool,
    had_review_round: bool,
}

/// Map the gate outcome and engine action to a disposition. Only content
/// that passed the gate can be flagged for publication.
fn route(gate: &QualityGateResult, action: ReviewAction) -> Disposition {
    if gate.auto_approved {
        Disposition::AutoApproved
    } else if action.requires_regeneration() {
        Disposition::Regenerate
    } else if action != ReviewAction::Approve && action.allows_publication() && gate.passed {
        Disposition::Flagged
    } else {
        Disposition::Queued
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::tests::FixedScorer;
    use crate::learning::LearningState;
    use crate::review::{PolicyOverride, ReviewFilters};
    use crate::storage::MemoryStore;

    fn pipeline(scorer: FixedScorer) -> EditorialPipeline<MemoryStore> {
        EditorialPipeline::new(
            ReviewRepository::open(MemoryStore::new()),
            LearningLoop::open(MemoryStore::new()),
            Box::new(scorer),
        )
    }

    fn options(topic: &str) -> QualityGateOptions {
        QualityGateOptions::new("camp", "site", topic)
    }

    fn check_required(pipeline: &mut EditorialPipeline<MemoryStore>, id: &str) {
        let ids: Vec<String> = pipeline
            .reviews()
            .get_review_item(id)
            .unwrap()
            .checklist
            .iter()
            .filter(|c| c.required)
            .map(|c| c.id.clone())
            .collect();
        for cid in ids {
            pipeline.reviews_mut().toggle_checklist_item(id, &cid, "ed").unwrap();
        }
    }

    // =========================================
    // submit
    // =========================================

    #[test]
    fn test_strong_content_is_auto_approved_and_counted() {
        let mut p = pipeline(FixedScorer::uniform(92, 92, 5));
        let sub = p.submit("T", "<p>x</p>", &options("gardening"));

        assert_eq!(sub.disposition, Disposition::AutoApproved);
        assert_eq!(sub.decision.action, ReviewAction::Approve);
        assert_eq!(sub.review_item().unwrap().status, ReviewStatus::AutoApproved);
        let perf = p.learning().state().topic_performance("gardening").unwrap();
        assert_eq!(perf.total_reviewed, 1);
        assert_eq!(perf.auto_approved, 1);
    }

    #[test]
    fn test_ymyl_approve_decision_is_queued() {
        let mut p = pipeline(FixedScorer::uniform(92, 92, 5));
        let sub = p.submit("T", "<p>x</p>", &options("retirement planning"));

        assert_eq!(sub.decision.action, ReviewAction::Approve);
        assert_eq!(sub.disposition, Disposition::Queued);
        assert_eq!(sub.review_item().unwrap().status, ReviewStatus::PendingReview);
        assert!(p.learning().state().topic_performance("retirement planning").is_none());
    }

    #[test]
    fn test_flagged_content_records_weakest_dimension() {
        let mut scorer = FixedScorer::uniform(75, 75, 5);
        scorer.eeat.experience.score = 62;
        let mut p = pipeline(scorer);
        let sub = p.submit("T", "<p>x</p>", &options("gardening"));

        assert_eq!(sub.decision.action, ReviewAction::Flag);
        assert_eq!(sub.disposition, Disposition::Flagged);
        assert!(sub.disposition.allows_publication());
        let signals = &p.learning().state().content_improvements;
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].category, ImprovementCategory::Experience);
        assert_eq!(signals[0].signal, "Weak experience (62)");
    }

    #[test]
    fn test_flagged_content_publishes_and_stays_findable() {
        let mut scorer = FixedScorer::uniform(75, 75, 5);
        scorer.eeat.experience.score = 62;
        let mut p = pipeline(scorer);
        let sub = p.submit("T", "<p>x</p>", &options("gardening"));
        let item = sub.review_item().unwrap();
        assert_eq!(item.status, ReviewStatus::PendingReview);
        assert!(item.flagged);
        assert_eq!(item.flag_reasons, sub.decision.reasons);
        let id = item.id.clone();

        // A plain queued item alongside it.
        let queued = p.submit("T", "<p>x</p>", &options("retirement planning"));
        assert_eq!(queued.disposition, Disposition::Queued);
        assert!(!queued.review_item().unwrap().flagged);

        p.reviews_mut().mark_published(&id).unwrap();
        let stored = p.reviews().get_review_item(&id).unwrap();
        assert!(stored.published_at.is_some());

        p.reviews_mut().set_filters(ReviewFilters::default().flagged());
        let flagged: Vec<String> = p
            .reviews()
            .filtered_items()
            .iter()
            .map(|item| item.id.clone())
            .collect();
        assert_eq!(flagged, vec![id]);
    }

    #[test]
    fn test_flag_needs_a_passing_gate() {
        // Above the retry cutoff but below the minimum E-E-A-T score.
        let mut p = pipeline(FixedScorer::uniform(58, 58, 5));
        let sub = p.submit("T", "<p>x</p>", &options("gardening"));
        assert_eq!(sub.decision.action, ReviewAction::Flag);
        assert!(!sub.gate.passed);
        assert_eq!(sub.disposition, Disposition::Queued);
        assert!(!sub.disposition.allows_publication());
        assert!(!sub.review_item().unwrap().flagged);
    }

    #[test]
    fn test_very_weak_content_is_sent_back_for_regeneration() {
        let mut p = pipeline(FixedScorer::uniform(30, 30, 0));
        let sub = p.submit("T", "<p>x</p>", &options("gardening"));

        assert_eq!(sub.disposition, Disposition::Regenerate);
        assert!(sub.decision.should_retry_generation);
        assert!(!sub.gate.passed);
        // Repeats bump the frequency of the same signal.
        p.submit("T", "<p>x</p>", &options("gardening"));
        let signals = &p.learning().state().content_improvements;
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].frequency, 2);
    }

    // =========================================
    // gate
    // =========================================

    #[test]
    fn test_gate_counts_auto_approval() {
        let mut p = pipeline(FixedScorer::uniform(92, 92, 5));
        let result = p.gate("T", "<p>x</p>", &options("gardening"));
        assert!(result.auto_approved);
        let perf = p.learning().state().topic_performance("gardening").unwrap();
        assert_eq!(perf.auto_approved, 1);
        assert_eq!(p.learning().state().learning_stats().total_auto_approved, 1);
    }

    #[test]
    fn test_gate_records_nothing_for_queued_content() {
        let mut p = pipeline(FixedScorer::uniform(75, 75, 5));
        let result = p.gate("T", "<p>x</p>", &options("gardening"));
        assert!(!result.auto_approved);
        assert_eq!(p.learning().state(), &LearningState::default());
    }

    #[test]
    fn test_enforce_gate_rejects_content_with_issues() {
        let mut p = pipeline(FixedScorer::uniform(30, 30, 0));
        let err = p.enforce_gate("T", "<p>x</p>", &options("gardening")).unwrap_err();
        assert!(err.is_review_required());
        assert_eq!(p.reviews().items().len(), 1);

        let mut p = pipeline(FixedScorer::uniform(92, 92, 5));
        let result = p.enforce_gate("T", "<p>x</p>", &options("gardening")).unwrap();
        assert!(result.auto_approved);
    }

    // =========================================
    // Human decisions
    // =========================================

    #[test]
    fn test_rejecting_a_candidate_tightens_the_topic_threshold() {
        let mut p = pipeline(FixedScorer::uniform(90, 90, 5));
        let sub = p.submit("T", "<p>x</p>", &options("mortgage advice"));
        let id = sub.review_item().unwrap().id.clone();

        let item = p
            .decide(&id, &ReviewDecision::reject("ed", "inaccurate rates"))
            .unwrap();
        assert_eq!(item.status, ReviewStatus::Rejected);

        let state = p.learning().state();
        assert_eq!(state.threshold_adjustments.for_topic("mortgage advice"), 2.0);
        assert_eq!(state.threshold_adjustments.ymyl, 1.0);
        assert_eq!(
            state.topic_performance("mortgage advice").unwrap().human_rejected,
            1
        );
    }

    #[test]
    fn test_approving_a_non_candidate_counts_as_human_approval() {
        let mut p = pipeline(FixedScorer::uniform(75, 75, 5));
        let sub = p.submit("T", "<p>x</p>", &options("gardening"));
        let id = sub.review_item().unwrap().id.clone();
        check_required(&mut p, &id);

        p.decide(&id, &ReviewDecision::approve("ed")).unwrap();
        let perf = p.learning().state().topic_performance("gardening").unwrap();
        assert_eq!(perf.human_approved, 1);
        assert_eq!(perf.auto_approved, 0);
        assert_eq!(p.learning().state().threshold_adjustments, Default::default());
    }

    #[test]
    fn test_failed_decision_records_nothing() {
        let mut p = pipeline(FixedScorer::uniform(75, 75, 5));
        let sub = p.submit("T", "<p>x</p>", &options("gardening"));
        let id = sub.review_item().unwrap().id.clone();

        let err = p.decide(&id, &ReviewDecision::approve("ed")).unwrap_err();
        assert!(matches!(err, EditorialError::ChecklistIncomplete { .. }));
        assert!(p.learning().state().topic_performance("gardening").is_none());
    }

    #[test]
    fn test_request_changes_feeds_learning_once() {
        let mut p = pipeline(FixedScorer::uniform(90, 90, 5));
        let sub = p.submit("T", "<p>x</p>", &options("mortgage refinancing"));
        let id = sub.review_item().unwrap().id.clone();

        p.request_changes(&id, "ed", "cite IRS guidance").unwrap();
        let state = p.learning().state();
        assert_eq!(state.topic_performance("mortgage refinancing").unwrap().changes_requested, 1);
        assert_eq!(state.threshold_adjustments.for_topic("mortgage refinancing"), 1.0);
    }

    #[test]
    fn test_repeated_change_rounds_feed_learning_once() {
        let mut p = pipeline(FixedScorer::uniform(90, 90, 5));
        let sub = p.submit("T", "<p>x</p>", &options("mortgage refinancing"));
        let id = sub.review_item().unwrap().id.clone();

        p.request_changes(&id, "ed", "cite IRS guidance").unwrap();
        p.reviews_mut().resubmit(&id).unwrap();
        p.request_changes(&id, "ed", "still missing sources").unwrap();
        p.reviews_mut().resubmit(&id).unwrap();
        p.decide(&id, &ReviewDecision::request_changes("ed", "one more pass"))
            .unwrap();

        let state = p.learning().state();
        let perf = state.topic_performance("mortgage refinancing").unwrap();
        assert_eq!(perf.changes_requested, 1);
        assert_eq!(perf.total_reviewed, 1);
        assert_eq!(state.threshold_adjustments.for_topic("mortgage refinancing"), 1.0);
        assert_eq!(state.threshold_adjustments.ymyl, 0.5);

        // The final verdict is still recorded.
        p.reviews_mut().resubmit(&id).unwrap();
        p.decide(&id, &ReviewDecision::reject("ed", "never sourced"))
            .unwrap();
        let perf = p
            .learning()
            .state()
            .topic_performance("mortgage refinancing")
            .unwrap();
        assert_eq!(perf.human_rejected, 1);
        assert_eq!(perf.total_reviewed, 2);
    }

    #[test]
    fn test_feedback_uses_the_policy_the_item_was_gated_under() {
        let mut p = pipeline(FixedScorer::uniform(80, 80, 5));
        let overrides = PolicyOverride {
            auto_approve_above_score: Some(75),
            ..PolicyOverride::default()
        };
        let opts = options("gardening")
            .with_policy(overrides.clone())
            .force_manual_review();
        let sub = p.submit("T", "<p>x</p>", &opts);
        assert_eq!(sub.disposition, Disposition::Queued);
        let item = sub.review_item().unwrap();
        assert_eq!(item.policy_override, overrides);
        let id = item.id.clone();

        // 80 clears the per-call threshold of 75 but not the stored 85.
        p.decide(&id, &ReviewDecision::reject("ed", "off-brand"))
            .unwrap();
        let state = p.learning().state();
        assert_eq!(state.threshold_adjustments.for_topic("gardening"), 2.0);
        let perf = state.topic_performance("gardening").unwrap();
        assert_eq!(perf.human_rejected, 1);
    }

    #[test]
    fn test_queued_auto_approval_is_counted_once() {
        let mut p = pipeline(FixedScorer::uniform(92, 92, 5));
        let opts = options("gardening").skip_review_creation();
        assert!(p.submit("T", "<p>x</p>", &opts).review_item().is_none());

        // Created outside the gate, still eligible at creation.
        let scores = crate::scoring::ContentScores {
            eeat: crate::scoring::EeatScore::from_subscores(92, 92, 92, 92),
            ai_overview_score: Some(92),
            citations: crate::scoring::CitationAnalysis {
                total: 5,
                ..Default::default()
            },
            word_count: 0,
        };
        let item = p.reviews_mut().create_scored_review_item(
            crate::review::CreateReviewInput {
                topic: "gardening".to_string(),
                ..Default::default()
            },
            &scores,
        );
        assert!(p.process_auto_approval(&item.id));
        assert!(!p.process_auto_approval(&item.id));
        let perf = p.learning().state().topic_performance("gardening").unwrap();
        assert_eq!(perf.auto_approved, 1);
    }

    #[test]
    fn test_decide_unknown_item() {
        let mut p = pipeline(FixedScorer::uniform(90, 90, 5));
        let err = p.decide("missing", &ReviewDecision::approve("ed")).unwrap_err();
        assert!(matches!(err, EditorialError::ItemNotFound { .. }));
        assert_eq!(p.learning().state(), &LearningState::default());
    }
}
