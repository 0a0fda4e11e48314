//! Shared text helpers for the editorial crate.

use regex::Regex;
use std::sync::OnceLock;

fn tag_regex() -> &'static Regex {
    static TAG: OnceLock<Regex> = OnceLock::new();
    TAG.get_or_init(|| Regex::new(r"(?s)<[^>]*>").expect("tag pattern is a valid static regex"))
}

fn script_regex() -> &'static Regex {
    static SCRIPT: OnceLock<Regex> = OnceLock::new();
    SCRIPT.get_or_init(|| {
        Regex::new(r"(?is)<(script|style)[^>]*>.*?</(script|style)>")
            .expect("script pattern is a valid static regex")
    })
}

/// Strip markup from HTML, leaving the visible text.
///
/// Script and style bodies are dropped entirely; every other tag is replaced
/// by a space so adjacent block elements do not glue words together.
pub fn strip_html_tags(html: &str) -> String {
    let without_scripts = script_regex().replace_all(html, " ");
    let text = tag_regex().replace_all(&without_scripts, " ");
    text.replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
}

/// Count whitespace-separated words in the visible text of an HTML fragment.
pub fn word_count(html: &str) -> usize {
    strip_html_tags(html).split_whitespace().count()
}

/// Truncate a string to `max_len` characters, appending an ellipsis when cut.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
}

/// First eight characters of an id, as shown in listings. Always a valid
/// prefix for id lookup.
pub fn short_id(id: &str) -> String {
    id.chars().take(8).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_id_is_a_prefix() {
        let id = "3f2a9c1e-0b7d-4e8a-9f00-1234567890ab";
        assert_eq!(short_id(id), "3f2a9c1e");
        assert!(id.starts_with(&short_id(id)));
        assert_eq!(short_id("abc"), "abc");
    }

    #[test]
    fn test_strip_html_tags_simple() {
        assert_eq!(strip_html_tags("<p>Hello</p>").trim(), "Hello");
    }

    #[test]
    fn test_strip_html_tags_drops_script_bodies() {
        let html = "<p>Visible</p><script>var hidden = 1;</script>";
        let text = strip_html_tags(html);
        assert!(text.contains("Visible"));
        assert!(!text.contains("hidden"));
    }

    #[test]
    fn test_strip_html_tags_decodes_common_entities() {
        assert_eq!(strip_html_tags("Salt &amp; pepper").trim(), "Salt & pepper");
    }

    #[test]
    fn test_word_count_ignores_markup() {
        let html = "<h1>Best Hiking Boots</h1><p>We tested <a href=\"x\">ten pairs</a> today.</p>";
        assert_eq!(word_count(html), 8);
    }

    #[test]
    fn test_word_count_adjacent_blocks_do_not_merge() {
        assert_eq!(word_count("<p>one</p><p>two</p>"), 2);
    }

    #[test]
    fn test_word_count_empty() {
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count("<div></div>"), 0);
    }

    #[test]
    fn test_truncate_str_short_unchanged() {
        assert_eq!(truncate_str("short", 10), "short");
    }

    #[test]
    fn test_truncate_str_appends_ellipsis() {
        assert_eq!(truncate_str("a long review title", 10), "a long ...");
    }

    #[test]
    fn test_truncate_str_unicode_does_not_panic() {
        let s = "héllo wörld ünïcode";
        let out = truncate_str(s, 8);
        assert!(out.ends_with("..."));
    }
}
