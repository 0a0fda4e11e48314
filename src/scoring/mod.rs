//! Content scoring boundary.
//!
//! The gate and the repository never score content themselves; they consume the
//! numbers produced by a [`ScoreProvider`]. This module defines that contract
//! and the value types flowing across it.
//!
//! | Submodule   | What it owns                                              |
//! |-------------|-----------------------------------------------------------|
//! | `citations` | `<a href>` extraction, domain tiers, citation analysis   |
//! | `heuristic` | `HeuristicScorer`, the deterministic default provider    |

pub mod citations;
pub mod heuristic;

pub use citations::{Citation, CitationTier, classify_domain, extract_links};
pub use heuristic::HeuristicScorer;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::util::word_count;

/// One of the four E-E-A-T dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EeatDimension {
    Experience,
    Expertise,
    Authoritativeness,
    Trustworthiness,
}

impl EeatDimension {
    /// All dimensions in canonical order. Ties between equal scores resolve to
    /// the earlier entry.
    pub const ALL: [EeatDimension; 4] = [
        EeatDimension::Experience,
        EeatDimension::Expertise,
        EeatDimension::Authoritativeness,
        EeatDimension::Trustworthiness,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Experience => "experience",
            Self::Expertise => "expertise",
            Self::Authoritativeness => "authoritativeness",
            Self::Trustworthiness => "trustworthiness",
        }
    }

    /// Generation-prompt hint for strengthening this dimension.
    pub fn improvement_hint(&self) -> &'static str {
        match self {
            Self::Experience => {
                "Describe first-hand use: what was tested, for how long, and what happened"
            }
            Self::Expertise => {
                "Go deeper: explain mechanisms, add specifications and structured sections"
            }
            Self::Authoritativeness => {
                "Cite primary, authoritative sources (.gov, .edu, peer-reviewed journals)"
            }
            Self::Trustworthiness => {
                "Add disclosures, publication dates and remove broken or low-quality links"
            }
        }
    }
}

impl fmt::Display for EeatDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Score for a single E-E-A-T dimension with the signals that produced it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DimensionScore {
    pub score: u32,
    #[serde(default)]
    pub signals: Vec<String>,
}

impl DimensionScore {
    pub fn new(score: u32) -> Self {
        Self {
            score: score.min(100),
            signals: Vec::new(),
        }
    }
}

/// Counts of citations per source tier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitationTierCounts {
    pub authoritative: usize,
    pub reputable: usize,
    pub general: usize,
    pub problematic: usize,
}

/// Aggregate analysis of the citations found in a piece of content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CitationAnalysis {
    pub total: usize,
    pub verified: usize,
    pub failed: usize,
    #[serde(default)]
    pub by_tier: CitationTierCounts,
    /// Citations per 1000 words.
    #[serde(default)]
    pub density_per_1000_words: f64,
}

/// Full E-E-A-T scoring output for a piece of content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EeatScore {
    pub experience: DimensionScore,
    pub expertise: DimensionScore,
    pub authoritativeness: DimensionScore,
    pub trustworthiness: DimensionScore,
    pub overall: u32,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub citation_analysis: CitationAnalysis,
}

impl EeatScore {
    /// Build a score from four sub-scores; `overall` is their rounded mean.
    pub fn from_subscores(
        experience: u32,
        expertise: u32,
        authoritativeness: u32,
        trustworthiness: u32,
    ) -> Self {
        let overall =
            ((experience + expertise + authoritativeness + trustworthiness) as f64 / 4.0).round();
        Self {
            experience: DimensionScore::new(experience),
            expertise: DimensionScore::new(expertise),
            authoritativeness: DimensionScore::new(authoritativeness),
            trustworthiness: DimensionScore::new(trustworthiness),
            overall: overall as u32,
            recommendations: Vec::new(),
            citation_analysis: CitationAnalysis::default(),
        }
    }

    pub fn dimension(&self, dimension: EeatDimension) -> u32 {
        match dimension {
            EeatDimension::Experience => self.experience.score,
            EeatDimension::Expertise => self.expertise.score,
            EeatDimension::Authoritativeness => self.authoritativeness.score,
            EeatDimension::Trustworthiness => self.trustworthiness.score,
        }
    }

    /// Dimensions sorted ascending by score. The sort is stable, so equal
    /// scores keep canonical order.
    pub fn dimensions_ascending(&self) -> Vec<(EeatDimension, u32)> {
        let mut dims: Vec<(EeatDimension, u32)> = EeatDimension::ALL
            .iter()
            .map(|d| (*d, self.dimension(*d)))
            .collect();
        dims.sort_by_key(|(_, score)| *score);
        dims
    }

    /// The lowest-scoring dimension.
    pub fn weakest_dimension(&self) -> (EeatDimension, u32) {
        self.dimensions_ascending()[0]
    }
}

/// AI-overview readiness score.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AiOverviewScore {
    pub score: u32,
    #[serde(default)]
    pub signals: Vec<String>,
}

/// Supplies raw content scores. Implementations must be pure: the same HTML
/// always yields the same numbers.
pub trait ScoreProvider {
    /// E-E-A-T sub-scores, overall score, recommendations and citation analysis.
    fn eeat_score(&self, html: &str) -> EeatScore;

    /// Readiness of the content for AI-overview style answers.
    fn ai_overview_score(&self, html: &str) -> AiOverviewScore;

    /// Extract outbound citations from the content.
    fn extract_citations(&self, html: &str) -> Vec<Citation>;

    /// Analyze extracted citations relative to content length.
    fn analyze_citations(&self, citations: &[Citation], word_count: usize) -> CitationAnalysis;
}

/// Combine E-E-A-T and AI-overview scores: `round(0.7·eeat + 0.3·ai)`.
///
/// Without an AI-overview score the E-E-A-T overall stands alone.
pub fn combined_quality_score(eeat_overall: u32, ai_overview: Option<u32>) -> u32 {
    match ai_overview {
        Some(ai) => (0.7 * eeat_overall as f64 + 0.3 * ai as f64).round() as u32,
        None => eeat_overall,
    }
}

/// Every score the gate and the repository need for one piece of content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentScores {
    pub eeat: EeatScore,
    pub ai_overview_score: Option<u32>,
    pub citations: CitationAnalysis,
    pub word_count: usize,
}

impl ContentScores {
    /// Run every scorer over `html` once.
    pub fn compute(scorer: &dyn ScoreProvider, html: &str) -> Self {
        let words = word_count(html);
        let eeat = scorer.eeat_score(html);
        let ai_overview = scorer.ai_overview_score(html);
        let extracted = scorer.extract_citations(html);
        let citations = scorer.analyze_citations(&extracted, words);
        Self {
            eeat,
            ai_overview_score: Some(ai_overview.score),
            citations,
            word_count: words,
        }
    }

    pub fn overall_quality_score(&self) -> u32 {
        combined_quality_score(self.eeat.overall, self.ai_overview_score)
    }
}
