//! Compiled regex patterns and tag tables used by the extraction passes.
//!
//! All patterns are compiled once on first use and never mutated.

use std::sync::LazyLock;

use regex::Regex;

/// Class/id fragments of elements that are rarely article content.
pub static UNLIKELY_CANDIDATES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)-ad-|ai2html|banner|breadcrumbs|combx|comment|community|cover-wrap|disqus|extra|footer|gdpr|header|legends|menu|related|remark|replies|rss|shoutbox|sidebar|skyscraper|social|sponsor|supplemental|ad-break|agegate|pagination|pager|popup|yom-remote",
    )
    .expect("UNLIKELY_CANDIDATES regex")
});

/// Overrides [`UNLIKELY_CANDIDATES`] for containers that may still hold content.
pub static OK_MAYBE_ITS_A_CANDIDATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)and|article|body|column|content|main|shadow").expect("OK_MAYBE regex"));

pub static POSITIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)article|body|content|entry|hentry|h-entry|main|page|pagination|post|text|blog|story")
        .expect("POSITIVE regex")
});

pub static NEGATIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)-ad-|hidden|^hid$| hid$| hid |^hid |banner|combx|comment|com-|contact|foot|footer|footnote|gdpr|masthead|media|meta|outbrain|promo|related|scroll|share|shoutbox|sidebar|skyscraper|sponsor|shopping|tags|tool|widget",
    )
    .expect("NEGATIVE regex")
});

pub static BYLINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)byline|author|dateline|writtenby|p-author").expect("BYLINE regex"));

/// Runs of two or more whitespace characters.
pub static NORMALIZE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s{2,}").expect("NORMALIZE regex"));

/// Word separators for similarity tokenizing.
pub static TOKENIZE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\W+").expect("TOKENIZE regex"));

/// In-page fragment links (`#` followed by at least one character).
pub static HASH_URL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^#.+").expect("HASH_URL regex"));

/// An inline `display: none` declaration.
pub static DISPLAY_NONE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|;)\s*display\s*:\s*none\s*(?:!\s*important\s*)?(?:;|$)").expect("DISPLAY_NONE regex")
});

/// ARIA roles whose subtrees are never the article.
pub const UNLIKELY_ROLES: &[&str] =
    &["menu", "menubar", "complementary", "navigation", "alert", "alertdialog", "dialog"];

/// Tags scored directly without walking their content.
pub const TAGS_TO_SCORE: &[&str] = &["h2", "h3", "h4", "h5", "h6", "p", "td", "pre"];

/// Structural tags dropped when they carry no content.
pub const EMPTY_CANDIDATE_TAGS: &[&str] = &["div", "section", "header", "h1", "h2", "h3", "h4", "h5", "h6"];

/// Block-level tags that stop a DIV from being treated as a paragraph.
pub const DIV_TO_P_ELEMS: &[&str] = &["blockquote", "dl", "div", "img", "ol", "p", "pre", "table", "ul"];

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("sidebar-left", true)]
    #[case("site-footer", true)]
    #[case("main-content", false)]
    #[case("story", false)]
    fn test_unlikely_candidates(#[case] input: &str, #[case] expected: bool) {
        assert_eq!(UNLIKELY_CANDIDATES.is_match(input), expected);
    }

    #[rstest]
    #[case("sidebar main", true)]
    #[case("comment-list", false)]
    fn test_ok_maybe(#[case] input: &str, #[case] expected: bool) {
        assert_eq!(OK_MAYBE_ITS_A_CANDIDATE.is_match(input), expected);
    }

    #[rstest]
    #[case("hid", true)]
    #[case("x hid", true)]
    #[case("hidden-panel", true)]
    #[case("hide", false)]
    #[case("article-body", false)]
    fn test_negative(#[case] input: &str, #[case] expected: bool) {
        assert_eq!(NEGATIVE.is_match(input), expected);
    }

    #[rstest]
    #[case("display:none", true)]
    #[case("color: red; DISPLAY : None !important", true)]
    #[case("display: none;", true)]
    #[case("display: block", false)]
    #[case("display: nonesuch", false)]
    fn test_display_none(#[case] input: &str, #[case] expected: bool) {
        assert_eq!(DISPLAY_NONE.is_match(input), expected);
    }

    #[test]
    fn test_hash_url() {
        assert!(HASH_URL.is_match("#section-2"));
        assert!(!HASH_URL.is_match("#"));
        assert!(!HASH_URL.is_match("/page#frag"));
    }
}
