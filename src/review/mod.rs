//! Editorial review domain: review items, their workflow and the queue that
//! holds them.
//!
//! ## Components
//!
//! - [`policy`]: `ReviewPolicy`, risk classification and the shared
//!   auto-approval eligibility rule
//! - [`filter`]: queue filters, sort keys and aggregate statistics
//! - [`repository`]: `ReviewRepository`, the persisted review queue
//! - [`arbiter`]: the approve / flag / retry decision engine
//!
//! ## Example
//!
//! ```
//! use editorial::review::{ReviewStatus, Priority};
//!
//! assert!(ReviewStatus::PendingReview.can_transition_to(ReviewStatus::InReview));
//! assert!(!ReviewStatus::Approved.can_transition_to(ReviewStatus::InReview));
//! assert!(Priority::Urgent.sort_rank() < Priority::Low.sort_rank());
//! ```

pub mod arbiter;
pub mod filter;
pub mod policy;
pub mod repository;

pub use arbiter::{AutoReviewDecision, ReviewAction, make_auto_review_decision};
pub use filter::{QueueStats, ReviewFilters, SortKey};
pub use policy::{
    AutoApprovalEligibility, PolicyOverride, ReviewPolicy, derive_priority, detect_risk_level,
    evaluate_auto_approval,
};
pub use repository::{AutoApprovalCheck, ReviewRepository};

use anyhow::bail;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::scoring::{CitationAnalysis, EeatScore};

/// Workflow status of a review item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    #[default]
    PendingReview,
    InReview,
    ChangesRequested,
    Approved,
    Rejected,
    AutoApproved,
}

impl ReviewStatus {
    pub const ALL: [ReviewStatus; 6] = [
        ReviewStatus::PendingReview,
        ReviewStatus::InReview,
        ReviewStatus::ChangesRequested,
        ReviewStatus::Approved,
        ReviewStatus::Rejected,
        ReviewStatus::AutoApproved,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PendingReview => "pending_review",
            Self::InReview => "in_review",
            Self::ChangesRequested => "changes_requested",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::AutoApproved => "auto_approved",
        }
    }

    /// Approved, auto-approved and rejected items accept no further status
    /// transition.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected | Self::AutoApproved)
    }

    /// Whether content in this status may be published.
    pub fn is_publishable(&self) -> bool {
        matches!(self, Self::Approved | Self::AutoApproved)
    }

    /// Whether the workflow allows moving from `self` to `next`.
    pub fn can_transition_to(&self, next: ReviewStatus) -> bool {
        use ReviewStatus::*;
        match self {
            PendingReview => matches!(
                next,
                InReview | Approved | Rejected | ChangesRequested | AutoApproved
            ),
            InReview => matches!(next, Approved | Rejected | ChangesRequested),
            ChangesRequested => matches!(
                next,
                InReview | PendingReview | Approved | Rejected | ChangesRequested
            ),
            Approved | Rejected | AutoApproved => false,
        }
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for ReviewStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "pending_review" | "pending" => Ok(Self::PendingReview),
            "in_review" => Ok(Self::InReview),
            "changes_requested" => Ok(Self::ChangesRequested),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "auto_approved" => Ok(Self::AutoApproved),
            other => bail!("Unknown review status '{}'", other),
        }
    }
}

/// Queue priority, derived once at creation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
    Urgent,
}

impl Priority {
    pub const ALL: [Priority; 4] = [
        Priority::Urgent,
        Priority::High,
        Priority::Normal,
        Priority::Low,
    ];

    /// Sort rank: urgent first, low last.
    pub fn sort_rank(&self) -> u8 {
        match self {
            Self::Urgent => 0,
            Self::High => 1,
            Self::Normal => 2,
            Self::Low => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "normal" => Ok(Self::Normal),
            "high" => Ok(Self::High),
            "urgent" => Ok(Self::Urgent),
            other => bail!("Unknown priority '{}'", other),
        }
    }
}

/// Topic risk classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    #[default]
    Standard,
    /// Reserved; the keyword classifier never produces it.
    Sensitive,
    /// Your-Money-Your-Life: health, finance, legal.
    Ymyl,
}

impl RiskLevel {
    pub fn is_ymyl(&self) -> bool {
        matches!(self, Self::Ymyl)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Sensitive => "sensitive",
            Self::Ymyl => "ymyl",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "sensitive" => Ok(Self::Sensitive),
            "ymyl" => Ok(Self::Ymyl),
            other => bail!("Unknown risk level '{}'", other),
        }
    }
}

/// One entry of the editorial checklist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub id: String,
    pub label: String,
    pub required: bool,
    #[serde(default)]
    pub checked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked_by: Option<String>,
}

impl ChecklistItem {
    pub fn required(id: &str, label: &str) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            required: true,
            checked: false,
            checked_at: None,
            checked_by: None,
        }
    }

    pub fn optional(id: &str, label: &str) -> Self {
        Self {
            required: false,
            ..Self::required(id, label)
        }
    }
}

/// Checklist every new review item starts with. YMYL items get an extra
/// required claims check.
pub fn default_checklist(risk_level: RiskLevel) -> Vec<ChecklistItem> {
    let mut checklist = vec![
        ChecklistItem::required("facts-verified", "Facts and figures verified"),
        ChecklistItem::required("citations-support-claims", "Citations support the claims made"),
        ChecklistItem::required("title-accurate", "Title and headings match the content"),
    ];
    if risk_level.is_ymyl() {
        checklist.push(ChecklistItem::required(
            "ymyl-claims",
            "No unsupported medical, financial or legal claims",
        ));
    }
    checklist.push(ChecklistItem::optional("internal-links", "Internal links added"));
    checklist.push(ChecklistItem::optional("image-alt-text", "Images have alt text"));
    checklist
}

/// A reviewer's request for changes. Resolution is tracked for audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeRequest {
    pub id: String,
    pub requested_by: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub resolved: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
    /// Appended after the item was finalized. Audit entries do not count as
    /// review rounds.
    #[serde(default)]
    pub audit: bool,
}

impl ChangeRequest {
    pub fn new(requested_by: &str, message: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            requested_by: requested_by.to_string(),
            message: message.to_string(),
            created_at: Utc::now(),
            resolved: false,
            resolved_at: None,
            audit: false,
        }
    }

    pub fn for_audit(requested_by: &str, message: &str) -> Self {
        Self {
            audit: true,
            ..Self::new(requested_by, message)
        }
    }
}

/// Overall outcome of citation validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CitationStatus {
    #[default]
    Valid,
    Warnings,
    Issues,
}

impl fmt::Display for CitationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Valid => write!(f, "valid"),
            Self::Warnings => write!(f, "warnings"),
            Self::Issues => write!(f, "issues"),
        }
    }
}

/// Citation validation summary stored on a review item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CitationValidation {
    pub total_citations: usize,
    pub validated_count: usize,
    pub failed_count: usize,
    #[serde(default)]
    pub issues: Vec<String>,
    pub overall_status: CitationStatus,
}

impl CitationValidation {
    /// Summarize a citation analysis. Failed links are issues; problematic
    /// sources and a short citation list are warnings.
    pub fn from_analysis(analysis: &CitationAnalysis, min_citation_count: u32) -> Self {
        let mut issues = Vec::new();
        if analysis.failed > 0 {
            issues.push(format!("{} citation(s) failed validation", analysis.failed));
        }
        if analysis.by_tier.problematic > 0 {
            issues.push(format!(
                "{} citation(s) from problematic sources",
                analysis.by_tier.problematic
            ));
        }
        if (analysis.total as u32) < min_citation_count {
            issues.push(format!(
                "Only {} citation(s), minimum is {}",
                analysis.total, min_citation_count
            ));
        }
        let overall_status = if analysis.failed > 0 {
            CitationStatus::Issues
        } else if !issues.is_empty() {
            CitationStatus::Warnings
        } else {
            CitationStatus::Valid
        };
        Self {
            total_citations: analysis.total,
            validated_count: analysis.verified,
            failed_count: analysis.failed,
            issues,
            overall_status,
        }
    }
}

/// Outcome a human reviewer can choose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionStatus {
    Approved,
    Rejected,
    ChangesRequested,
}

impl DecisionStatus {
    /// Review status an item moves to for this decision.
    pub fn target_status(&self) -> ReviewStatus {
        match self {
            Self::Approved => ReviewStatus::Approved,
            Self::Rejected => ReviewStatus::Rejected,
            Self::ChangesRequested => ReviewStatus::ChangesRequested,
        }
    }
}

impl fmt::Display for DecisionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.target_status())
    }
}

impl FromStr for DecisionStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "approve" | "approved" => Ok(Self::Approved),
            "reject" | "rejected" => Ok(Self::Rejected),
            "changes" | "changes_requested" | "request_changes" => Ok(Self::ChangesRequested),
            other => bail!("Unknown decision '{}' (expected approved, rejected or changes_requested)", other),
        }
    }
}

/// A human review decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewDecision {
    pub status: DecisionStatus,
    pub reviewer_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    /// Change request message when `status` is `ChangesRequested`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_message: Option<String>,
}

impl ReviewDecision {
    pub fn new(status: DecisionStatus, reviewer_id: &str) -> Self {
        Self {
            status,
            reviewer_id: reviewer_id.to_string(),
            reviewer_name: None,
            notes: None,
            rejection_reason: None,
            change_message: None,
        }
    }

    pub fn approve(reviewer_id: &str) -> Self {
        Self::new(DecisionStatus::Approved, reviewer_id)
    }

    pub fn reject(reviewer_id: &str, reason: &str) -> Self {
        Self {
            rejection_reason: Some(reason.to_string()),
            ..Self::new(DecisionStatus::Rejected, reviewer_id)
        }
    }

    pub fn request_changes(reviewer_id: &str, message: &str) -> Self {
        Self {
            change_message: Some(message.to_string()),
            ..Self::new(DecisionStatus::ChangesRequested, reviewer_id)
        }
    }

    pub fn with_notes(mut self, notes: &str) -> Self {
        self.notes = Some(notes.to_string());
        self
    }

    pub fn with_reviewer_name(mut self, name: &str) -> Self {
        self.reviewer_name = Some(name.to_string());
        self
    }
}

/// Input for creating a review item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateReviewInput {
    pub campaign_id: String,
    pub site_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_item_id: Option<String>,
    pub title: String,
    pub content: String,
    pub topic: String,
    /// Per-call policy override the content was gated under.
    #[serde(default, skip_serializing_if = "PolicyOverride::is_empty")]
    pub policy_override: PolicyOverride,
}

/// Editable fields of a review item. Scores, risk and priority are fixed at
/// creation and cannot be patched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReviewItemPatch {
    pub title: Option<String>,
    pub review_notes: Option<String>,
    pub run_item_id: Option<String>,
}

/// One content artifact submitted for editorial approval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewItem {
    pub id: String,
    pub campaign_id: String,
    pub site_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_item_id: Option<String>,

    pub title: String,
    pub content: String,
    pub word_count: usize,

    pub topic: String,
    pub risk_level: RiskLevel,

    pub eeat_score: EeatScore,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_overview_score: Option<u32>,
    pub overall_quality_score: u32,
    pub citation_validation: CitationValidation,

    pub status: ReviewStatus,
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub checklist: Vec<ChecklistItem>,
    #[serde(default)]
    pub checklist_complete: bool,
    #[serde(default)]
    pub change_requests: Vec<ChangeRequest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,

    pub auto_approval_eligible: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_approval_blocked: Option<String>,
    /// Marked for attention by the decision engine. A flagged item may be
    /// published before a human has looked at it.
    #[serde(default)]
    pub flagged: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flag_reasons: Vec<String>,
    #[serde(default, skip_serializing_if = "PolicyOverride::is_empty")]
    pub policy_override: PolicyOverride,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
}

impl ReviewItem {
    pub fn is_ymyl(&self) -> bool {
        self.risk_level.is_ymyl()
    }

    /// Recompute `checklist_complete` from the checklist entries.
    pub fn refresh_checklist_complete(&mut self) {
        self.checklist_complete = self
            .checklist
            .iter()
            .filter(|c| c.required)
            .all(|c| c.checked);
    }

    /// Number of unchecked entries that block approval.
    pub fn unchecked_count(&self, require_all: bool) -> usize {
        self.checklist
            .iter()
            .filter(|c| (require_all || c.required) && !c.checked)
            .count()
    }

    pub fn unresolved_change_requests(&self) -> impl Iterator<Item = &ChangeRequest> {
        self.change_requests.iter().filter(|c| !c.resolved)
    }

    /// Change requests made while the item was still under review.
    pub fn review_rounds(&self) -> usize {
        self.change_requests.iter().filter(|c| !c.audit).count()
    }

    /// Approved, auto-approved, or flagged and not yet sent back or rejected
    /// by a human.
    pub fn is_publishable(&self) -> bool {
        self.status.is_publishable()
            || (self.flagged
                && matches!(self.status, ReviewStatus::PendingReview | ReviewStatus::InReview))
    }

    /// Short one-line description for logs and listings.
    pub fn summary(&self) -> String {
        format!(
            "{} [{}] {} (score {}, {})",
            crate::util::short_id(&self.id),
            self.status,
            self.title,
            self.overall_quality_score,
            self.priority
        )
    }
}
