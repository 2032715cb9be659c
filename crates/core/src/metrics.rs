//! Text and link metrics shared by the filter, scorer and ranker.

use crate::dom_tree::{DomTree, NodeIndex};
use crate::patterns::{HASH_URL, NORMALIZE, TOKENIZE};

/// Weight of an in-page fragment link relative to a regular link.
pub const DEFAULT_FRAGMENT_LINK_WEIGHT: f64 = 0.3;

/// Trim `text` and collapse every run of two or more whitespace characters
/// into a single space.
pub fn normalize_whitespace(text: &str) -> String {
    NORMALIZE.replace_all(text.trim(), " ").into_owned()
}

/// Normalized text content of a node.
pub fn inner_text(tree: &DomTree<'_>, id: NodeIndex) -> String {
    normalize_whitespace(&tree.text(id))
}

/// Length in characters of [`inner_text`].
pub fn text_length(tree: &DomTree<'_>, id: NodeIndex) -> usize {
    inner_text(tree, id).chars().count()
}

/// Get the density of links as a fraction of the content.
///
/// This is the amount of text inside anchors divided by the total text of
/// the node. Anchors pointing at an in-page fragment count with
/// `fragment_weight` instead of 1. Returns 0.0 for a node without text.
pub fn link_density(tree: &DomTree<'_>, id: NodeIndex, fragment_weight: f64) -> f64 {
    let total = text_length(tree, id);
    if total == 0 {
        return 0.0;
    }

    let link_length: f64 = tree
        .descendants_by_tag(id, "a")
        .map(|anchor| {
            let coefficient = match tree.attr(anchor, "href") {
                Some(href) if HASH_URL.is_match(href) => fragment_weight,
                _ => 1.0,
            };
            text_length(tree, anchor) as f64 * coefficient
        })
        .sum();

    link_length / total as f64
}

fn tokenize(text: &str) -> Vec<String> {
    TOKENIZE
        .split(&text.to_lowercase())
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Compare `b` against `a`: 1.0 when every word of `b` also occurs in `a`,
/// 0.0 when none do (or when either side has no words).
///
/// The share of `b` that is new is measured by character length of the
/// unique tokens, not by token count, so the function is asymmetric.
pub fn text_similarity(a: &str, b: &str) -> f64 {
    let tokens_a = tokenize(a);
    let tokens_b = tokenize(b);
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }

    let unique_b: Vec<&str> = tokens_b
        .iter()
        .filter(|token| !tokens_a.contains(*token))
        .map(String::as_str)
        .collect();

    let unique_length = unique_b.join(" ").chars().count() as f64;
    let total_length = tokens_b.join(" ").chars().count() as f64;

    1.0 - unique_length / total_length
}
