//! Citation extraction and source-tier classification.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

use super::{CitationAnalysis, CitationTierCounts};
use crate::util::strip_html_tags;

/// Source quality tier of a cited domain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CitationTier {
    /// Government, academic and primary research sources.
    Authoritative,
    /// Established publishers and reference works.
    Reputable,
    /// Anything not otherwise classified.
    #[default]
    General,
    /// User-generated, social or content-farm sources.
    Problematic,
}

impl fmt::Display for CitationTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Authoritative => "authoritative",
            Self::Reputable => "reputable",
            Self::General => "general",
            Self::Problematic => "problematic",
        };
        write!(f, "{}", s)
    }
}

/// A single outbound link treated as a citation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    pub url: String,
    pub anchor_text: String,
    /// Lowercased host without a leading `www.`; `None` when the URL is malformed.
    pub domain: Option<String>,
    pub tier: CitationTier,
    /// Whether the URL is a well-formed http(s) link.
    pub valid: bool,
}

const AUTHORITATIVE_SUFFIXES: &[&str] = &[".gov", ".edu", ".mil", ".int", ".gov.uk", ".ac.uk"];

const AUTHORITATIVE_DOMAINS: &[&str] = &[
    "who.int",
    "europa.eu",
    "nature.com",
    "thelancet.com",
    "nejm.org",
    "bmj.com",
    "jamanetwork.com",
    "sciencedirect.com",
    "mayoclinic.org",
    "clevelandclinic.org",
    "cochranelibrary.com",
];

const REPUTABLE_DOMAINS: &[&str] = &[
    "wikipedia.org",
    "reuters.com",
    "apnews.com",
    "bbc.com",
    "bbc.co.uk",
    "nytimes.com",
    "theguardian.com",
    "wsj.com",
    "bloomberg.com",
    "consumerreports.org",
    "investopedia.com",
    "healthline.com",
    "webmd.com",
    "rtings.com",
];

/// Entries ending in `.` match any host containing them (e.g. `pinterest.co.uk`).
const PROBLEMATIC_DOMAINS: &[&str] = &[
    "pinterest.",
    "blogspot.",
    "quora.com",
    "reddit.com",
    "facebook.com",
    "twitter.com",
    "x.com",
    "tiktok.com",
    "instagram.com",
    "medium.com",
    "wordpress.com",
    "answers.com",
    "ehow.com",
];

fn link_regex() -> &'static Regex {
    static LINK: OnceLock<Regex> = OnceLock::new();
    LINK.get_or_init(|| {
        Regex::new(r#"(?is)<a\s[^>]*?href\s*=\s*["']([^"']*)["'][^>]*>(.*?)</a>"#)
            .expect("link pattern is a valid static regex")
    })
}

fn host_regex() -> &'static Regex {
    static HOST: OnceLock<Regex> = OnceLock::new();
    HOST.get_or_init(|| {
        Regex::new(r"(?i)^https?://([a-z0-9](?:[a-z0-9.-]*[a-z0-9])?\.[a-z]{2,})(?::\d+)?(?:[/?#]|$)")
            .expect("host pattern is a valid static regex")
    })
}

fn domain_matches(host: &str, entry: &str) -> bool {
    if entry.ends_with('.') {
        host.starts_with(entry) || host.contains(&format!(".{}", entry))
    } else {
        host == entry || host.ends_with(&format!(".{}", entry))
    }
}

/// Classify a lowercased host into a source tier.
pub fn classify_domain(host: &str) -> CitationTier {
    let host = host.trim_start_matches("www.");
    if PROBLEMATIC_DOMAINS.iter().any(|d| domain_matches(host, d)) {
        return CitationTier::Problematic;
    }
    if AUTHORITATIVE_SUFFIXES.iter().any(|s| host.ends_with(s))
        || AUTHORITATIVE_DOMAINS.iter().any(|d| domain_matches(host, d))
    {
        return CitationTier::Authoritative;
    }
    if REPUTABLE_DOMAINS.iter().any(|d| domain_matches(host, d)) {
        return CitationTier::Reputable;
    }
    CitationTier::General
}

/// Whether an href points inside the document or site rather than at a source.
fn is_internal_href(href: &str) -> bool {
    href.is_empty()
        || href.starts_with('#')
        || href.starts_with('/')
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
}

/// Extract outbound links from HTML as citations.
///
/// Fragment, relative, `mailto:` and `tel:` links are skipped. Anything else is
/// a citation; it is `valid` only when it is a well-formed http(s) URL.
pub fn extract_links(html: &str) -> Vec<Citation> {
    link_regex()
        .captures_iter(html)
        .filter_map(|caps| {
            let href = caps.get(1)?.as_str().trim();
            if is_internal_href(href) {
                return None;
            }
            let anchor_text = strip_html_tags(caps.get(2).map_or("", |m| m.as_str()))
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ");
            let domain = host_regex()
                .captures(href)
                .and_then(|h| h.get(1))
                .map(|m| m.as_str().to_lowercase().trim_start_matches("www.").to_string());
            let tier = domain
                .as_deref()
                .map(classify_domain)
                .unwrap_or_default();
            Some(Citation {
                url: href.to_string(),
                anchor_text,
                valid: domain.is_some(),
                domain,
                tier,
            })
        })
        .collect()
}

/// Aggregate citations into counts per tier and a density figure.
///
/// Tier counts only include valid citations; malformed links are `failed`.
pub fn analyze(citations: &[Citation], word_count: usize) -> CitationAnalysis {
    let mut by_tier = CitationTierCounts::default();
    let mut verified = 0;
    for citation in citations.iter().filter(|c| c.valid) {
        verified += 1;
        match citation.tier {
            CitationTier::Authoritative => by_tier.authoritative += 1,
            CitationTier::Reputable => by_tier.reputable += 1,
            CitationTier::General => by_tier.general += 1,
            CitationTier::Problematic => by_tier.problematic += 1,
        }
    }
    let total = citations.len();
    let density_per_1000_words = if word_count == 0 {
        0.0
    } else {
        total as f64 * 1000.0 / word_count as f64
    };
    CitationAnalysis {
        total,
        verified,
        failed: total - verified,
        by_tier,
        density_per_1000_words,
    }
}
