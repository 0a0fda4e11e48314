//! Review policy, risk classification and the auto-approval eligibility rule.
//!
//! Both the quality gate and the repository decide auto-approval eligibility
//! through [`evaluate_auto_approval`], so the two can never drift apart.

use serde::{Deserialize, Serialize};

use super::{Priority, RiskLevel};

/// Static review thresholds and switches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewPolicy {
    #[serde(default = "default_min_eeat_score")]
    pub min_eeat_score: u32,
    #[serde(default = "default_min_dimension_score")]
    pub min_experience_score: u32,
    #[serde(default = "default_min_dimension_score")]
    pub min_expertise_score: u32,
    #[serde(default = "default_min_citation_count")]
    pub min_citation_count: u32,
    #[serde(default = "default_auto_approve_above_score")]
    pub auto_approve_above_score: u32,
    #[serde(default = "default_ymyl_min_score")]
    pub ymyl_min_score: u32,
    #[serde(default = "default_max_change_request_rounds")]
    pub max_change_request_rounds: u32,
    #[serde(default = "default_true")]
    pub enable_auto_approval: bool,
    #[serde(default = "default_true")]
    pub auto_approve_requires_citations: bool,
    #[serde(default = "default_true")]
    pub ymyl_requires_manual_review: bool,
    #[serde(default = "default_true")]
    pub require_checklist: bool,
    #[serde(default)]
    pub require_all_checklist_items: bool,
    #[serde(default = "default_ymyl_topics")]
    pub ymyl_topics: Vec<String>,
}

fn default_min_eeat_score() -> u32 {
    60
}

fn default_min_dimension_score() -> u32 {
    50
}

fn default_min_citation_count() -> u32 {
    3
}

fn default_auto_approve_above_score() -> u32 {
    85
}

fn default_ymyl_min_score() -> u32 {
    80
}

fn default_max_change_request_rounds() -> u32 {
    3
}

fn default_true() -> bool {
    true
}

fn default_ymyl_topics() -> Vec<String> {
    [
        "health",
        "medical",
        "medicine",
        "disease",
        "symptom",
        "nutrition",
        "supplement",
        "pharmacy",
        "finance",
        "financial",
        "investing",
        "investment",
        "insurance",
        "mortgage",
        "loan",
        "credit",
        "retirement",
        "taxes",
        "legal",
        "attorney",
        "lawyer",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for ReviewPolicy {
    fn default() -> Self {
        Self {
            min_eeat_score: default_min_eeat_score(),
            min_experience_score: default_min_dimension_score(),
            min_expertise_score: default_min_dimension_score(),
            min_citation_count: default_min_citation_count(),
            auto_approve_above_score: default_auto_approve_above_score(),
            ymyl_min_score: default_ymyl_min_score(),
            max_change_request_rounds: default_max_change_request_rounds(),
            enable_auto_approval: true,
            auto_approve_requires_citations: true,
            ymyl_requires_manual_review: true,
            require_checklist: true,
            require_all_checklist_items: false,
            ymyl_topics: default_ymyl_topics(),
        }
    }
}

impl ReviewPolicy {
    /// Minimum E-E-A-T overall score for the given risk level.
    pub fn min_score_for(&self, risk_level: RiskLevel) -> u32 {
        if risk_level.is_ymyl() {
            self.ymyl_min_score
        } else {
            self.min_eeat_score
        }
    }

    /// Return a copy with `overrides` applied.
    pub fn merged(&self, overrides: &PolicyOverride) -> Self {
        let mut policy = self.clone();
        overrides.apply_to(&mut policy);
        policy
    }

    /// Human-readable warnings for suspicious settings.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        for (name, value) in [
            ("min_eeat_score", self.min_eeat_score),
            ("min_experience_score", self.min_experience_score),
            ("min_expertise_score", self.min_expertise_score),
            ("auto_approve_above_score", self.auto_approve_above_score),
            ("ymyl_min_score", self.ymyl_min_score),
        ] {
            if value > 100 {
                warnings.push(format!("{} = {} is above the 0-100 score range", name, value));
            }
        }
        if self.ymyl_min_score > self.auto_approve_above_score {
            warnings.push(format!(
                "ymyl_min_score ({}) is above auto_approve_above_score ({}); YMYL content will use the YMYL floor",
                self.ymyl_min_score, self.auto_approve_above_score
            ));
        }
        if self.auto_approve_above_score < self.min_eeat_score {
            warnings.push(format!(
                "auto_approve_above_score ({}) is below min_eeat_score ({})",
                self.auto_approve_above_score, self.min_eeat_score
            ));
        }
        if self.ymyl_topics.is_empty() {
            warnings.push("ymyl_topics is empty; no topic will be classified as YMYL".to_string());
        }
        if self.max_change_request_rounds == 0 {
            warnings.push("max_change_request_rounds is 0; change requests will always be refused".to_string());
        }
        warnings
    }
}

/// Partial policy merged over a full one. Absent fields keep the base value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyOverride {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_eeat_score: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_experience_score: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_expertise_score: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_citation_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_approve_above_score: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ymyl_min_score: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_change_request_rounds: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_auto_approval: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_approve_requires_citations: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ymyl_requires_manual_review: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub require_checklist: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub require_all_checklist_items: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ymyl_topics: Option<Vec<String>>,
}

impl PolicyOverride {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Write every present field into `policy`.
    pub fn apply_to(&self, policy: &mut ReviewPolicy) {
        macro_rules! apply {
            ($($field:ident),* $(,)?) => {
                $(
                    if let Some(value) = &self.$field {
                        policy.$field = value.clone();
                    }
                )*
            };
        }
        apply!(
            min_eeat_score,
            min_experience_score,
            min_expertise_score,
            min_citation_count,
            auto_approve_above_score,
            ymyl_min_score,
            max_change_request_rounds,
            enable_auto_approval,
            auto_approve_requires_citations,
            ymyl_requires_manual_review,
            require_checklist,
            require_all_checklist_items,
            ymyl_topics,
        );
    }

    /// Combine two overrides; fields set in `other` win.
    pub fn layered(&self, other: &PolicyOverride) -> PolicyOverride {
        let mut combined = self.clone();
        macro_rules! take {
            ($($field:ident),* $(,)?) => {
                $(
                    if other.$field.is_some() {
                        combined.$field = other.$field.clone();
                    }
                )*
            };
        }
        take!(
            min_eeat_score,
            min_experience_score,
            min_expertise_score,
            min_citation_count,
            auto_approve_above_score,
            ymyl_min_score,
            max_change_request_rounds,
            enable_auto_approval,
            auto_approve_requires_citations,
            ymyl_requires_manual_review,
            require_checklist,
            require_all_checklist_items,
            ymyl_topics,
        );
        combined
    }
}

/// Classify a topic by case-insensitive substring match against the policy's
/// YMYL keywords.
pub fn detect_risk_level(topic: &str, policy: &ReviewPolicy) -> RiskLevel {
    let topic = topic.to_lowercase();
    let matched = policy
        .ymyl_topics
        .iter()
        .map(|keyword| keyword.trim().to_lowercase())
        .find(|keyword| !keyword.is_empty() && topic.contains(keyword.as_str()));
    match matched {
        Some(keyword) => {
            tracing::debug!(topic = %topic, keyword = %keyword, "topic classified as YMYL");
            RiskLevel::Ymyl
        }
        None => RiskLevel::Standard,
    }
}

/// Result of the shared auto-approval eligibility rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoApprovalEligibility {
    pub eligible: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocked_reason: Option<String>,
}

impl AutoApprovalEligibility {
    fn eligible() -> Self {
        Self {
            eligible: true,
            blocked_reason: None,
        }
    }

    fn blocked(reason: String) -> Self {
        Self {
            eligible: false,
            blocked_reason: Some(reason),
        }
    }
}

/// Decide whether content may skip human review. Checks run in order and the
/// first failing one names the block:
///
/// 1. auto-approval enabled and `overall_score >= auto_approve_above_score`
/// 2. YMYL content is not reserved for manual review
/// 3. enough citations when the policy requires them
pub fn evaluate_auto_approval(
    overall_score: u32,
    risk_level: RiskLevel,
    citation_total: usize,
    policy: &ReviewPolicy,
) -> AutoApprovalEligibility {
    if !policy.enable_auto_approval {
        return AutoApprovalEligibility::blocked("Auto-approval is disabled".to_string());
    }
    if overall_score < policy.auto_approve_above_score {
        return AutoApprovalEligibility::blocked(format!(
            "Score {} below auto-approve threshold {}",
            overall_score, policy.auto_approve_above_score
        ));
    }
    if risk_level.is_ymyl() && policy.ymyl_requires_manual_review {
        return AutoApprovalEligibility::blocked(
            "YMYL content requires manual review".to_string(),
        );
    }
    if policy.auto_approve_requires_citations && (citation_total as u32) < policy.min_citation_count
    {
        return AutoApprovalEligibility::blocked(format!(
            "Only {} citation(s), {} required for auto-approval",
            citation_total, policy.min_citation_count
        ));
    }
    AutoApprovalEligibility::eligible()
}

/// Queue priority from risk and overall quality score.
///
/// | Condition                                   | Priority |
/// |---------------------------------------------|----------|
/// | YMYL and score below `ymyl_min_score`       | urgent   |
/// | YMYL                                        | high     |
/// | score below `min_eeat_score`                | high     |
/// | score at or above `auto_approve_above_score`| low      |
/// | otherwise                                   | normal   |
pub fn derive_priority(risk_level: RiskLevel, score: u32, policy: &ReviewPolicy) -> Priority {
    if risk_level.is_ymyl() {
        if score < policy.ymyl_min_score {
            Priority::Urgent
        } else {
            Priority::High
        }
    } else if score < policy.min_eeat_score {
        Priority::High
    } else if score >= policy.auto_approve_above_score {
        Priority::Low
    } else {
        Priority::Normal
    }
}
