//! Deterministic keyword/structure scorer.
//!
//! `HeuristicScorer` is the provider the CLI uses when no external scoring
//! service is wired in. Every sub-score starts from a base value and moves by
//! fixed increments per detected signal, then clamps to 0–100.

use regex::Regex;
use std::sync::OnceLock;

use super::citations::{self, Citation};
use super::{AiOverviewScore, CitationAnalysis, DimensionScore, EeatDimension, EeatScore, ScoreProvider};
use crate::util::{strip_html_tags, word_count};

const EXPERIENCE_MARKERS: &[&str] = &[
    "i tested",
    "we tested",
    "i tried",
    "we tried",
    "in my experience",
    "hands-on",
    "i used",
    "we used",
    "after using",
    "my own",
    "i found",
    "we found",
    "personally",
];

const EXPERTISE_MARKERS: &[&str] = &[
    "according to",
    "research",
    "study",
    "data",
    "specifications",
    "measured",
];

const CREDENTIAL_MARKERS: &[&str] = &[
    "certified",
    "years of experience",
    "board-certified",
    "phd",
    "licensed",
    "reviewed by",
];

const DISCLOSURE_MARKERS: &[&str] = &[
    "disclaimer",
    "not medical advice",
    "not financial advice",
    "consult a",
    "affiliate",
    "disclosure",
];

const SUMMARY_MARKERS: &[&str] = &[
    "summary",
    "key takeaways",
    "tl;dr",
    "in short",
    "faq",
    "frequently asked",
];

/// Minimum citation count the scorer rewards and recommends.
const RECOMMENDED_CITATIONS: usize = 3;

fn count_tags(html_lower: &str, tags: &[&str]) -> usize {
    tags.iter()
        .map(|t| html_lower.matches(&format!("<{}", t)).count())
        .sum()
}

fn year_regex() -> &'static Regex {
    static YEAR: OnceLock<Regex> = OnceLock::new();
    YEAR.get_or_init(|| Regex::new(r"\b20\d{2}\b").expect("year pattern is a valid static regex"))
}

fn question_heading_regex() -> &'static Regex {
    static QUESTION: OnceLock<Regex> = OnceLock::new();
    QUESTION.get_or_init(|| {
        Regex::new(r"(?is)<h[2-4][^>]*>[^<]*\?[^<]*</h[2-4]>")
            .expect("question heading pattern is a valid static regex")
    })
}

fn paragraph_regex() -> &'static Regex {
    static PARAGRAPH: OnceLock<Regex> = OnceLock::new();
    PARAGRAPH.get_or_init(|| {
        Regex::new(r"(?is)<p[^>]*>(.*?)</p>").expect("paragraph pattern is a valid static regex")
    })
}

fn clamp_score(value: i64) -> u32 {
    value.clamp(0, 100) as u32
}

fn matched_markers(text: &str, markers: &[&str]) -> Vec<String> {
    markers
        .iter()
        .filter(|m| text.contains(*m))
        .map(|m| m.to_string())
        .collect()
}

/// Keyword and structure based scorer.
#[derive(Debug, Clone, Default)]
pub struct HeuristicScorer;

impl HeuristicScorer {
    pub fn new() -> Self {
        Self
    }

    fn experience(&self, text: &str, html_lower: &str, words: usize) -> DimensionScore {
        let markers = matched_markers(text, EXPERIENCE_MARKERS);
        let mut score: i64 = 30 + (markers.len() as i64 * 10).min(50);
        let mut signals = markers;
        if html_lower.contains("<img") {
            score += 10;
            signals.push("original imagery".to_string());
        }
        if words < 300 {
            score -= 10;
        }
        DimensionScore {
            score: clamp_score(score),
            signals,
        }
    }

    fn expertise(&self, text: &str, html_lower: &str, words: usize) -> DimensionScore {
        let mut score: i64 = 30;
        let mut signals = Vec::new();
        if words >= 1500 {
            score += 25;
            signals.push("long-form depth".to_string());
        } else if words >= 800 {
            score += 15;
            signals.push("substantial length".to_string());
        } else if words >= 300 {
            score += 5;
        }
        let headings = count_tags(html_lower, &["h2", "h3"]);
        if headings >= 3 {
            score += 15;
            signals.push(format!("{} section headings", headings));
        } else if headings >= 1 {
            score += 5;
        }
        let markers = matched_markers(text, EXPERTISE_MARKERS);
        score += (markers.len() as i64 * 5).min(20);
        signals.extend(markers);
        let credentials = matched_markers(text, CREDENTIAL_MARKERS);
        if !credentials.is_empty() {
            score += 10;
            signals.extend(credentials);
        }
        DimensionScore {
            score: clamp_score(score),
            signals,
        }
    }

    fn authoritativeness(&self, text: &str, analysis: &CitationAnalysis) -> DimensionScore {
        let tiers = &analysis.by_tier;
        let mut score: i64 = 20;
        score += (tiers.authoritative as i64 * 15).min(45);
        score += (tiers.reputable as i64 * 8).min(24);
        score += (tiers.general as i64 * 3).min(9);
        score -= tiers.problematic as i64 * 5;
        let mut signals = Vec::new();
        if tiers.authoritative > 0 {
            signals.push(format!("{} authoritative citation(s)", tiers.authoritative));
        }
        if text.contains("written by") || text.contains("about the author") {
            score += 10;
            signals.push("author attribution".to_string());
        }
        DimensionScore {
            score: clamp_score(score),
            signals,
        }
    }

    fn trustworthiness(&self, text: &str, analysis: &CitationAnalysis) -> DimensionScore {
        let mut score: i64 = 50;
        let mut signals = Vec::new();
        score -= (analysis.failed as i64 * 10).min(30);
        score -= analysis.by_tier.problematic as i64 * 5;
        let disclosures = matched_markers(text, DISCLOSURE_MARKERS);
        if !disclosures.is_empty() {
            score += 10;
            signals.extend(disclosures);
        }
        if text.contains("updated") || text.contains("published") || year_regex().is_match(text) {
            score += 10;
            signals.push("dated content".to_string());
        }
        if analysis.total >= RECOMMENDED_CITATIONS {
            score += 10;
            signals.push("well sourced".to_string());
        }
        DimensionScore {
            score: clamp_score(score),
            signals,
        }
    }
}

impl ScoreProvider for HeuristicScorer {
    fn eeat_score(&self, html: &str) -> EeatScore {
        let text = strip_html_tags(html).to_lowercase();
        let html_lower = html.to_lowercase();
        let words = word_count(html);
        let analysis = self.analyze_citations(&self.extract_citations(html), words);

        let experience = self.experience(&text, &html_lower, words);
        let expertise = self.expertise(&text, &html_lower, words);
        let authoritativeness = self.authoritativeness(&text, &analysis);
        let trustworthiness = self.trustworthiness(&text, &analysis);

        let overall = (experience.score as f64 * 0.2
            + expertise.score as f64 * 0.3
            + authoritativeness.score as f64 * 0.25
            + trustworthiness.score as f64 * 0.25)
            .round() as u32;

        let mut score = EeatScore {
            experience,
            expertise,
            authoritativeness,
            trustworthiness,
            overall,
            recommendations: Vec::new(),
            citation_analysis: analysis,
        };

        for dimension in EeatDimension::ALL {
            if score.dimension(dimension) < 60 {
                score
                    .recommendations
                    .push(format!("Improve {}: {}", dimension, dimension.improvement_hint()));
            }
        }
        if score.citation_analysis.total < RECOMMENDED_CITATIONS {
            score.recommendations.push(format!(
                "Add at least {} citations to authoritative sources",
                RECOMMENDED_CITATIONS
            ));
        }
        score
    }

    fn ai_overview_score(&self, html: &str) -> AiOverviewScore {
        let html_lower = html.to_lowercase();
        let text = strip_html_tags(html).to_lowercase();
        let mut score: i64 = 20;
        let mut signals = Vec::new();

        if count_tags(&html_lower, &["ul", "ol"]) > 0 {
            score += 20;
            signals.push("lists".to_string());
        }
        if question_heading_regex().is_match(html) {
            score += 20;
            signals.push("question headings".to_string());
        }
        let paragraph_lengths: Vec<usize> = paragraph_regex()
            .captures_iter(html)
            .filter_map(|c| c.get(1))
            .map(|m| word_count(m.as_str()))
            .collect();
        if !paragraph_lengths.is_empty() {
            let avg = paragraph_lengths.iter().sum::<usize>() as f64 / paragraph_lengths.len() as f64;
            if avg <= 80.0 {
                score += 15;
                signals.push("concise paragraphs".to_string());
            }
        }
        let summaries = matched_markers(&text, SUMMARY_MARKERS);
        if !summaries.is_empty() {
            score += 15;
            signals.extend(summaries);
        }
        if html_lower.contains("<table") {
            score += 10;
            signals.push("comparison table".to_string());
        }

        AiOverviewScore {
            score: clamp_score(score),
            signals,
        }
    }

    fn extract_citations(&self, html: &str) -> Vec<Citation> {
        citations::extract_links(html)
    }

    fn analyze_citations(&self, citations: &[Citation], word_count: usize) -> CitationAnalysis {
        citations::analyze(citations, word_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rich_article() -> String {
        let body = "We tested each kettle for three weeks. In my experience the data shows \
                    clear differences according to independent research. "
            .repeat(60);
        format!(
            r#"<h1>Best Kettles 2024</h1>
            <p>Written by a certified appliance reviewer. Updated March 2024.</p>
            <h2>How we tested</h2><p>{body}</p>
            <h2>What is the fastest kettle?</h2>
            <ul><li>Fast</li><li>Quiet</li></ul>
            <h2>Key takeaways</h2><p>Short summary.</p>
            <img src="kettle.jpg" alt="kettle">
            <p>Sources: <a href="https://www.energy.gov/kettles">DOE</a>,
            <a href="https://www.nist.gov/heat">NIST</a>,
            <a href="https://www.consumerreports.org/kettles">CR</a>.</p>
            <p>Disclosure: affiliate links.</p>"#
        )
    }

    #[test]
    fn test_scores_are_deterministic() {
        let scorer = HeuristicScorer::new();
        let html = rich_article();
        assert_eq!(scorer.eeat_score(&html), scorer.eeat_score(&html));
        assert_eq!(scorer.ai_overview_score(&html), scorer.ai_overview_score(&html));
    }

    #[test]
    fn test_rich_article_outscores_thin_article() {
        let scorer = HeuristicScorer::new();
        let rich = scorer.eeat_score(&rich_article());
        let thin = scorer.eeat_score("<p>Kettles boil water.</p>");
        assert!(rich.overall > thin.overall);
        assert!(rich.experience.score > thin.experience.score);
        assert!(rich.authoritativeness.score > thin.authoritativeness.score);
    }

    #[test]
    fn test_rich_article_citations_counted() {
        let scorer = HeuristicScorer::new();
        let score = scorer.eeat_score(&rich_article());
        assert_eq!(score.citation_analysis.total, 3);
        assert_eq!(score.citation_analysis.by_tier.authoritative, 2);
        assert_eq!(score.citation_analysis.by_tier.reputable, 1);
    }

    #[test]
    fn test_thin_article_gets_recommendations() {
        let scorer = HeuristicScorer::new();
        let score = scorer.eeat_score("<p>Kettles boil water.</p>");
        assert!(score.recommendations.iter().any(|r| r.contains("citations")));
        assert!(score.recommendations.iter().any(|r| r.contains("experience")));
    }

    #[test]
    fn test_failed_links_reduce_trust() {
        let scorer = HeuristicScorer::new();
        let clean = scorer.eeat_score("<p>Plain text</p>");
        let broken = scorer.eeat_score(
            r#"<p>Plain text <a href="htp:/a">a</a> <a href="htp:/b">b</a></p>"#,
        );
        assert!(broken.trustworthiness.score < clean.trustworthiness.score);
    }

    #[test]
    fn test_ai_overview_rewards_structure() {
        let scorer = HeuristicScorer::new();
        let structured = scorer.ai_overview_score(&rich_article());
        let flat = scorer.ai_overview_score("<div>one long block without structure</div>");
        assert!(structured.score > flat.score);
        assert!(structured.signals.iter().any(|s| s == "question headings"));
        assert_eq!(flat.score, 20);
    }

    #[test]
    fn test_scores_bounded() {
        let scorer = HeuristicScorer::new();
        let score = scorer.eeat_score(&rich_article().repeat(5));
        for dimension in EeatDimension::ALL {
            assert!(score.dimension(dimension) <= 100);
        }
        assert!(score.overall <= 100);
    }
}
