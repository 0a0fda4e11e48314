//! Quality gate: score content, apply policy thresholds and route it.
//!
//! The gate is the single entry point for newly generated content. It scores
//! the HTML once, checks the hard thresholds for the content's risk level,
//! decides between auto-approval and human review, and (unless told not to)
//! records the outcome as a review item.

pub mod prompt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::EditorialError;
use crate::review::{
    CreateReviewInput, PolicyOverride, ReviewItem, ReviewPolicy, ReviewRepository, RiskLevel,
    detect_risk_level, evaluate_auto_approval,
};
use crate::scoring::{CitationAnalysis, ContentScores, EeatScore, ScoreProvider};
use crate::storage::KeyValueStore;

/// Trust scores below this produce a warning, never a hard issue.
pub const LOW_TRUST_WARNING: u32 = 60;

/// Blocked reason stored on items whose auto-approval was suppressed by the caller.
pub const FORCED_MANUAL_REASON: &str = "Manual review forced";

/// Per-call gate options.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QualityGateOptions {
    pub campaign_id: String,
    pub site_id: String,
    #[serde(default)]
    pub run_item_id: Option<String>,
    pub topic: String,
    /// Merged over the repository's current policy for this call only.
    #[serde(default)]
    pub policy: PolicyOverride,
    #[serde(default)]
    pub force_manual_review: bool,
    #[serde(default)]
    pub skip_review_creation: bool,
}

impl QualityGateOptions {
    pub fn new(campaign_id: &str, site_id: &str, topic: &str) -> Self {
        Self {
            campaign_id: campaign_id.to_string(),
            site_id: site_id.to_string(),
            topic: topic.to_string(),
            ..Self::default()
        }
    }

    pub fn with_run_item(mut self, run_item_id: &str) -> Self {
        self.run_item_id = Some(run_item_id.to_string());
        self
    }

    pub fn with_policy(mut self, policy: PolicyOverride) -> Self {
        self.policy = policy;
        self
    }

    pub fn force_manual_review(mut self) -> Self {
        self.force_manual_review = true;
        self
    }

    pub fn skip_review_creation(mut self) -> Self {
        self.skip_review_creation = true;
        self
    }
}

/// Everything the gate learned about one piece of content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityGateResult {
    /// No hard issues were found.
    pub passed: bool,
    pub requires_review: bool,
    pub auto_approved: bool,
    pub overall_score: u32,
    pub eeat_score: EeatScore,
    pub ai_overview_score: Option<u32>,
    pub citation_analysis: CitationAnalysis,
    pub risk_level: RiskLevel,
    pub is_ymyl: bool,
    pub issues: Vec<String>,
    pub warnings: Vec<String>,
    /// Why the content was not auto-approved, when it passed but still needs review.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_approval_blocked: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_item: Option<ReviewItem>,
}

/// Result of [`quick_quality_check`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickCheck {
    pub score: u32,
    pub passed: bool,
    pub is_ymyl: bool,
}

/// Hard threshold violations for already-computed scores.
fn hard_issues(scores: &ContentScores, risk_level: RiskLevel, policy: &ReviewPolicy) -> Vec<String> {
    let mut issues = Vec::new();
    let eeat = &scores.eeat;

    let min_score = policy.min_score_for(risk_level);
    if eeat.overall < min_score {
        issues.push(format!(
            "E-E-A-T score {} below minimum {} for {} content",
            eeat.overall, min_score, risk_level
        ));
    }
    if eeat.experience.score < policy.min_experience_score {
        issues.push(format!(
            "Experience score {} below minimum {}",
            eeat.experience.score, policy.min_experience_score
        ));
    }
    if eeat.expertise.score < policy.min_expertise_score {
        issues.push(format!(
            "Expertise score {} below minimum {}",
            eeat.expertise.score, policy.min_expertise_score
        ));
    }
    if (scores.citations.total as u32) < policy.min_citation_count {
        issues.push(format!(
            "Only {} citation(s), minimum is {}",
            scores.citations.total, policy.min_citation_count
        ));
    }
    issues
}

fn soft_warnings(scores: &ContentScores, risk_level: RiskLevel) -> Vec<String> {
    let mut warnings = Vec::new();
    let citations = &scores.citations;

    if citations.by_tier.problematic > 0 {
        warnings.push(format!(
            "{} citation(s) from problematic sources",
            citations.by_tier.problematic
        ));
    }
    if citations.failed > 0 {
        warnings.push(format!("{} citation(s) failed validation", citations.failed));
    }
    if scores.eeat.trustworthiness.score < LOW_TRUST_WARNING {
        warnings.push(format!(
            "Low trustworthiness score ({})",
            scores.eeat.trustworthiness.score
        ));
    }
    if risk_level.is_ymyl() {
        warnings.push("YMYL topic: requires extra editorial scrutiny".to_string());
    }
    warnings
}

/// Score `html`, apply the merged policy and route the content.
///
/// Unless `skip_review_creation` is set, a review item is created for every
/// outcome that needs review or was auto-approved; auto-approved items are
/// finalized immediately.
pub fn run_quality_gate<S: KeyValueStore>(
    title: &str,
    html: &str,
    options: &QualityGateOptions,
    repository: &mut ReviewRepository<S>,
    scorer: &dyn ScoreProvider,
) -> QualityGateResult {
    let policy = repository.policy().merged(&options.policy);
    let scores = ContentScores::compute(scorer, html);
    let overall_score = scores.overall_quality_score();
    let risk_level = detect_risk_level(&options.topic, &policy);

    let issues = hard_issues(&scores, risk_level, &policy);
    let warnings = soft_warnings(&scores, risk_level);

    let mut auto_approval_blocked = None;
    let mut auto_approved = false;
    if issues.is_empty() {
        let eligibility =
            evaluate_auto_approval(overall_score, risk_level, scores.citations.total, &policy);
        if eligibility.eligible {
            auto_approved = true;
        } else {
            auto_approval_blocked = eligibility.blocked_reason;
        }
    }
    if auto_approved && options.force_manual_review {
        auto_approved = false;
        auto_approval_blocked = Some(FORCED_MANUAL_REASON.to_string());
    }
    let passed = issues.is_empty();
    let requires_review = !auto_approved;

    let mut review_item = None;
    if !options.skip_review_creation {
        let input = CreateReviewInput {
            campaign_id: options.campaign_id.clone(),
            site_id: options.site_id.clone(),
            run_item_id: options.run_item_id.clone(),
            title: title.to_string(),
            content: html.to_string(),
            topic: options.topic.clone(),
            policy_override: options.policy.clone(),
        };
        let forced_block = options.force_manual_review.then_some(FORCED_MANUAL_REASON);
        let mut item = repository.insert_scored_item(input, &scores, &policy, forced_block);
        if auto_approved && repository.process_auto_approval(&item.id)
            && let Some(updated) = repository.get_review_item(&item.id)
        {
            item = updated.clone();
        }
        review_item = Some(item);
    }

    info!(
        topic = %options.topic,
        risk = %risk_level,
        score = overall_score,
        passed,
        auto_approved,
        issues = issues.len(),
        warnings = warnings.len(),
        "quality gate evaluated"
    );
    if let Some(reason) = &auto_approval_blocked {
        debug!(reason = %reason, "auto-approval blocked");
    }

    QualityGateResult {
        passed,
        requires_review,
        auto_approved,
        overall_score,
        eeat_score: scores.eeat,
        ai_overview_score: scores.ai_overview_score,
        citation_analysis: scores.citations,
        risk_level,
        is_ymyl: risk_level.is_ymyl(),
        issues,
        warnings,
        auto_approval_blocked,
        review_item,
    }
}

/// Like [`run_quality_gate`], but content with hard issues is an error
/// carrying the created review item.
pub fn enforce_quality_gate<S: KeyValueStore>(
    title: &str,
    html: &str,
    options: &QualityGateOptions,
    repository: &mut ReviewRepository<S>,
    scorer: &dyn ScoreProvider,
) -> Result<QualityGateResult, EditorialError> {
    require_passed(run_quality_gate(title, html, options, repository, scorer))
}

/// Turn a gate result with hard issues into [`EditorialError::ReviewRequired`].
pub(crate) fn require_passed(result: QualityGateResult) -> Result<QualityGateResult, EditorialError> {
    if result.passed {
        return Ok(result);
    }
    Err(EditorialError::ReviewRequired {
        issues: result.issues.join("; "),
        item: result.review_item.map(Box::new),
    })
}

/// Score `html` against the hard thresholds without touching any store.
pub fn quick_quality_check(
    html: &str,
    topic: &str,
    policy: &ReviewPolicy,
    scorer: &dyn ScoreProvider,
) -> QuickCheck {
    let scores = ContentScores::compute(scorer, html);
    let risk_level = detect_risk_level(topic, policy);
    QuickCheck {
        score: scores.overall_quality_score(),
        passed: hard_issues(&scores, risk_level, policy).is_empty(),
        is_ymyl: risk_level.is_ymyl(),
    }
}
