//! Queue filtering, sorting and aggregate statistics.
//!
//! Everything here is a pure projection over a slice of review items.

use anyhow::bail;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::{Priority, ReviewItem, ReviewStatus, RiskLevel};

/// Active queue filters. Empty fields match everything; set fields are ANDed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewFilters {
    pub status: Vec<ReviewStatus>,
    pub priority: Vec<Priority>,
    pub risk_level: Vec<RiskLevel>,
    pub campaign_id: Option<String>,
    pub site_id: Option<String>,
    pub assigned_to: Option<String>,
    pub unassigned_only: bool,
    pub flagged_only: bool,
}

impl ReviewFilters {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn with_status(mut self, status: ReviewStatus) -> Self {
        self.status.push(status);
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority.push(priority);
        self
    }

    pub fn with_risk_level(mut self, risk_level: RiskLevel) -> Self {
        self.risk_level.push(risk_level);
        self
    }

    pub fn with_campaign(mut self, campaign_id: &str) -> Self {
        self.campaign_id = Some(campaign_id.to_string());
        self
    }

    pub fn with_site(mut self, site_id: &str) -> Self {
        self.site_id = Some(site_id.to_string());
        self
    }

    pub fn with_assignee(mut self, reviewer_id: &str) -> Self {
        self.assigned_to = Some(reviewer_id.to_string());
        self
    }

    pub fn unassigned(mut self) -> Self {
        self.unassigned_only = true;
        self
    }

    pub fn flagged(mut self) -> Self {
        self.flagged_only = true;
        self
    }

    pub fn matches(&self, item: &ReviewItem) -> bool {
        if !self.status.is_empty() && !self.status.contains(&item.status) {
            return false;
        }
        if !self.priority.is_empty() && !self.priority.contains(&item.priority) {
            return false;
        }
        if !self.risk_level.is_empty() && !self.risk_level.contains(&item.risk_level) {
            return false;
        }
        if let Some(campaign) = &self.campaign_id
            && &item.campaign_id != campaign
        {
            return false;
        }
        if let Some(site) = &self.site_id
            && &item.site_id != site
        {
            return false;
        }
        if let Some(reviewer) = &self.assigned_to
            && item.assigned_to.as_ref() != Some(reviewer)
        {
            return false;
        }
        if self.unassigned_only && item.assigned_to.is_some() {
            return false;
        }
        if self.flagged_only && !item.flagged {
            return false;
        }
        true
    }
}

/// Queue sort order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Urgent first, low last; equal priorities keep insertion order.
    #[default]
    Priority,
    CreatedAsc,
    CreatedDesc,
    ScoreAsc,
    ScoreDesc,
}

impl SortKey {
    /// Sort items in place. The sort is stable.
    pub fn sort(&self, items: &mut [&ReviewItem]) {
        match self {
            Self::Priority => items.sort_by_key(|item| item.priority.sort_rank()),
            Self::CreatedAsc => items.sort_by_key(|item| item.created_at),
            Self::CreatedDesc => items.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            Self::ScoreAsc => items.sort_by_key(|item| item.overall_quality_score),
            Self::ScoreDesc => {
                items.sort_by(|a, b| b.overall_quality_score.cmp(&a.overall_quality_score))
            }
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Priority => "priority",
            Self::CreatedAsc => "created_asc",
            Self::CreatedDesc => "created_desc",
            Self::ScoreAsc => "score_asc",
            Self::ScoreDesc => "score_desc",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for SortKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "priority" => Ok(Self::Priority),
            "created_asc" | "oldest" => Ok(Self::CreatedAsc),
            "created_desc" | "newest" => Ok(Self::CreatedDesc),
            "score_asc" => Ok(Self::ScoreAsc),
            "score_desc" => Ok(Self::ScoreDesc),
            other => bail!(
                "Unknown sort key '{}' (expected priority, created_asc, created_desc, score_asc or score_desc)",
                other
            ),
        }
    }
}

/// Aggregate view of the whole review queue.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueueStats {
    pub total: usize,
    pub by_status: BTreeMap<String, usize>,
    pub by_priority: BTreeMap<String, usize>,
    pub by_risk: BTreeMap<String, usize>,
    #[serde(default)]
    pub flagged: usize,
    /// Mean E-E-A-T overall score across all items.
    pub avg_eeat_score: f64,
    /// Mean `now - created_at` across all items, in milliseconds.
    pub avg_time_in_queue_ms: i64,
}

impl QueueStats {
    pub fn compute(items: &[ReviewItem], now: DateTime<Utc>) -> Self {
        let mut stats = Self {
            total: items.len(),
            ..Default::default()
        };
        if items.is_empty() {
            return stats;
        }

        let mut eeat_sum: u64 = 0;
        let mut queue_ms_sum: i64 = 0;
        for item in items {
            *stats.by_status.entry(item.status.to_string()).or_default() += 1;
            *stats.by_priority.entry(item.priority.to_string()).or_default() += 1;
            *stats.by_risk.entry(item.risk_level.to_string()).or_default() += 1;
            if item.flagged {
                stats.flagged += 1;
            }
            eeat_sum += item.eeat_score.overall as u64;
            queue_ms_sum += (now - item.created_at).num_milliseconds();
        }

        let n = items.len();
        stats.avg_eeat_score = eeat_sum as f64 / n as f64;
        stats.avg_time_in_queue_ms = queue_ms_sum / n as i64;
        stats
    }

    pub fn count_status(&self, status: ReviewStatus) -> usize {
        self.by_status.get(status.as_str()).copied().unwrap_or(0)
    }

    /// Items still waiting on a human.
    pub fn open_count(&self) -> usize {
        self.count_status(ReviewStatus::PendingReview)
            + self.count_status(ReviewStatus::InReview)
            + self.count_status(ReviewStatus::ChangesRequested)
    }
}
