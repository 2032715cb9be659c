//! Visibility and relevance filter.
//!
//! One pre-order walk per pass decides, node by node, whether the node is
//! hidden, boilerplate, a byline, a duplicate of the page title, or a
//! paragraph-like element that should seed content scoring. The output is
//! the ordered list of scorable elements.

use crate::dom_tree::{DomTree, NodeIndex};
use crate::extract::{ExtractConfig, PassFlags};
use crate::metrics::{link_density, text_similarity};
use crate::patterns::{
    BYLINE, DISPLAY_NONE, DIV_TO_P_ELEMS, EMPTY_CANDIDATE_TAGS, OK_MAYBE_ITS_A_CANDIDATE, TAGS_TO_SCORE,
    UNLIKELY_CANDIDATES, UNLIKELY_ROLES,
};
use crate::walker::{Step, TreeWalker};

use tracing::trace;

/// Why a node was left out of scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Invisible,
    InertDialog,
    Byline,
    TitleHeading,
    UnlikelyCandidate,
    UnlikelyRole,
    WithoutContent,
}

/// What the walk does with the node under the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Ignore the node and everything below it.
    SkipSubtree(SkipReason),
    /// Ignore the node itself but keep walking its children.
    SkipNode(SkipReason),
    /// Queue the given node for scoring and skip the current subtree.
    Score(NodeIndex),
    /// Nothing to decide here; walk the children.
    Descend,
}

impl Decision {
    fn step(self) -> Step {
        match self {
            Decision::SkipSubtree(_) | Decision::Score(_) => Step::SkipChildren,
            Decision::SkipNode(_) | Decision::Descend => Step::Descend,
        }
    }
}

/// Per-pass filter state.
pub struct NodeFilter<'t, 'a> {
    tree: &'t DomTree<'a>,
    title: Option<&'t str>,
    config: &'t ExtractConfig,
    flags: PassFlags,
    title_heading_pending: bool,
}

impl<'t, 'a> NodeFilter<'t, 'a> {
    pub fn new(tree: &'t DomTree<'a>, title: Option<&'t str>, config: &'t ExtractConfig, flags: PassFlags) -> Self {
        Self { tree, title, config, flags, title_heading_pending: true }
    }

    /// Classify one node. Stateful: the title-heading check fires at most
    /// once per filter.
    pub fn decide(&mut self, node: NodeIndex) -> Decision {
        let tree = self.tree;
        let match_string = format!("{} {}", tree.class_name(node), tree.id_attr(node));

        if !is_probably_visible(tree, node) {
            return Decision::SkipSubtree(SkipReason::Invisible);
        }

        if tree.attr(node, "aria-modal") == Some("true") && tree.attr(node, "role") == Some("dialog") {
            return Decision::SkipSubtree(SkipReason::InertDialog);
        }

        if self.is_byline(node, &match_string) {
            return Decision::SkipNode(SkipReason::Byline);
        }

        if self.title_heading_pending && self.heading_duplicates_title(node) {
            self.title_heading_pending = false;
            return Decision::SkipNode(SkipReason::TitleHeading);
        }

        if self.flags.contains(PassFlags::STRIP_UNLIKELYS) {
            if self.is_unlikely_candidate(node, &match_string) {
                return Decision::SkipSubtree(SkipReason::UnlikelyCandidate);
            }

            if tree.attr(node, "role").is_some_and(|role| UNLIKELY_ROLES.contains(&role)) {
                return Decision::SkipSubtree(SkipReason::UnlikelyRole);
            }
        }

        let tag = tree.tag_name(node);

        if EMPTY_CANDIDATE_TAGS.contains(&tag) && is_element_without_content(tree, node) {
            return Decision::SkipNode(SkipReason::WithoutContent);
        }

        if TAGS_TO_SCORE.contains(&tag) {
            return Decision::Score(node);
        }

        if tag == "div" {
            // A DIV wrapping a single paragraph scores as that paragraph.
            if let Some(paragraph) = single_child_tag(tree, node, "p")
                && link_density(tree, node, self.config.fragment_link_weight) < self.config.div_link_density
            {
                return Decision::Score(paragraph);
            }

            if !has_child_block_element(tree, node) {
                return Decision::Score(node);
            }
        }

        Decision::Descend
    }

    fn is_byline(&self, node: NodeIndex, match_string: &str) -> bool {
        let tree = self.tree;
        let marked = tree.attr(node, "rel") == Some("author")
            || tree.attr(node, "itemprop").is_some_and(|itemprop| itemprop.contains("author"))
            || BYLINE.is_match(match_string);

        marked && is_valid_byline(&tree.text(node), self.config.max_byline_length)
    }

    fn heading_duplicates_title(&self, node: NodeIndex) -> bool {
        let tree = self.tree;
        if !tree.is_tag(node, "h1") && !tree.is_tag(node, "h2") {
            return false;
        }
        let Some(title) = self.title else {
            return false;
        };

        let heading = tree.text(node);
        text_similarity(title, heading.trim()) > self.config.title_similarity
    }

    fn is_unlikely_candidate(&self, node: NodeIndex, match_string: &str) -> bool {
        let tree = self.tree;
        let depth = self.config.ancestor_tag_depth;

        UNLIKELY_CANDIDATES.is_match(match_string)
            && !OK_MAYBE_ITS_A_CANDIDATE.is_match(match_string)
            && !tree.has_ancestor_tag(node, "table", depth)
            && !tree.has_ancestor_tag(node, "code", depth)
            && !tree.is_tag(node, "body")
            && !tree.is_tag(node, "a")
    }
}

/// Inline `display: none`, the `hidden` attribute, and `aria-hidden="true"`
/// (except on fallback images) all hide a node.
pub fn is_probably_visible(tree: &DomTree<'_>, node: NodeIndex) -> bool {
    let displayed = tree.attr(node, "style").is_none_or(|style| !DISPLAY_NONE.is_match(style));
    let aria_visible = tree.attr(node, "aria-hidden") != Some("true") || tree.class_name(node).contains("fallback-image");

    displayed && !tree.has_attr(node, "hidden") && aria_visible
}

/// A byline is non-empty and shorter than `max_length` characters once trimmed.
pub fn is_valid_byline(text: &str, max_length: usize) -> bool {
    let length = text.trim().chars().count();
    length > 0 && length < max_length
}

fn is_element_without_content(tree: &DomTree<'_>, node: NodeIndex) -> bool {
    if !tree.text(node).trim().is_empty() {
        return false;
    }
    let children = tree.children(node).len();
    children == 0
        || children == tree.descendants_by_tag(node, "br").count() + tree.descendants_by_tag(node, "hr").count()
}

/// The only element child of `node` when it has tag `tag` and `node` has no
/// text of its own.
fn single_child_tag(tree: &DomTree<'_>, node: NodeIndex, tag: &str) -> Option<NodeIndex> {
    match tree.children(node) {
        [only] if tree.is_tag(*only, tag) && !tree.has_own_text(node) => Some(*only),
        _ => None,
    }
}

fn has_child_block_element(tree: &DomTree<'_>, node: NodeIndex) -> bool {
    tree.descendants(node)
        .any(|d| DIV_TO_P_ELEMS.contains(&tree.tag_name(d)))
}

/// Walk the whole tree once and return the scorable elements in traversal order.
pub fn collect_scorable(
    tree: &DomTree<'_>, title: Option<&str>, config: &ExtractConfig, flags: PassFlags,
) -> Vec<NodeIndex> {
    let mut filter = NodeFilter::new(tree, title, config, flags);
    let mut walker = TreeWalker::new(tree, tree.root());
    let mut scorable = Vec::new();

    while let Some(node) = walker.current() {
        let decision = filter.decide(node);
        match decision {
            Decision::Score(target) => scorable.push(target),
            Decision::SkipSubtree(reason) | Decision::SkipNode(reason) => {
                trace!(tag = tree.tag_name(node), ?reason, "filtered node");
            }
            Decision::Descend => {}
        }
        walker.advance(decision.step());
    }

    scorable
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::Document;

    fn node(doc: &Document, tree: &DomTree<'_>, selector: &str) -> NodeIndex {
        tree.find(&doc.select(selector).unwrap()[0]).unwrap()
    }

    fn decide(html: &str, selector: &str, flags: PassFlags) -> Decision {
        let doc = Document::parse(html).unwrap();
        let tree = DomTree::build(&doc);
        let config = ExtractConfig::default();
        let title = doc.title();
        let target = node(&doc, &tree, selector);
        NodeFilter::new(&tree, title.as_deref(), &config, flags).decide(target)
    }

    fn scorable_ids(html: &str, flags: PassFlags) -> Vec<String> {
        let doc = Document::parse(html).unwrap();
        let tree = DomTree::build(&doc);
        let config = ExtractConfig::default();
        let title = doc.title();
        collect_scorable(&tree, title.as_deref(), &config, flags)
            .into_iter()
            .map(|n| tree.id_attr(n).to_string())
            .collect()
    }

    #[test]
    fn test_invisible_nodes_skip_subtree() {
        let html = r#"<body>
            <div id="a" style="display: none"><p>x</p></div>
            <div id="b" hidden><p>x</p></div>
            <div id="c" aria-hidden="true"><p>x</p></div>
            <div id="d" aria-hidden="true" class="mwe-math-fallback-image-inline"><p>x</p></div>
        </body>"#;
        for id in ["#a", "#b", "#c"] {
            assert_eq!(
                decide(html, id, PassFlags::ALL),
                Decision::SkipSubtree(SkipReason::Invisible)
            );
        }
        assert!(matches!(decide(html, "#d", PassFlags::ALL), Decision::Score(_)));
    }

    #[test]
    fn test_inert_dialog() {
        let html = r#"<body><div id="m" aria-modal="true" role="dialog"><p>x</p></div></body>"#;
        assert_eq!(
            decide(html, "#m", PassFlags::NONE),
            Decision::SkipSubtree(SkipReason::InertDialog)
        );
    }

    #[test]
    fn test_byline_detection() {
        let html = r#"<body>
            <span id="a" class="byline">By Jane Doe</span>
            <a id="b" rel="author" href="/jane">Jane Doe</a>
            <span id="c" itemprop="author name">Jane Doe</span>
            <div id="d" class="author-bio"></div>
        </body>"#;
        for id in ["#a", "#b", "#c"] {
            assert_eq!(decide(html, id, PassFlags::ALL), Decision::SkipNode(SkipReason::Byline));
        }
        assert_ne!(decide(html, "#d", PassFlags::ALL), Decision::SkipNode(SkipReason::Byline));
    }

    #[test]
    fn test_long_byline_is_kept() {
        let text = "word ".repeat(30);
        let html = format!(r#"<body><div id="a" class="byline">{}</div></body>"#, text);
        assert_ne!(decide(&html, "#a", PassFlags::ALL), Decision::SkipNode(SkipReason::Byline));
    }

    #[test]
    fn test_title_heading_skipped_once() {
        let html = r#"<html><head><title>Breaking: X Happens – Today</title></head><body>
            <h2 id="first">Breaking: X Happens</h2>
            <h2 id="second">Breaking: X Happens</h2>
        </body></html>"#;
        let ids = scorable_ids(html, PassFlags::ALL);
        assert_eq!(ids, vec!["second"]);
    }

    #[test]
    fn test_unrelated_heading_does_not_consume_title_check() {
        let html = r#"<html><head><title>Breaking: X Happens</title></head><body>
            <h2 id="intro">Something else entirely</h2>
            <h2 id="dup">Breaking: X Happens</h2>
        </body></html>"#;
        assert_eq!(scorable_ids(html, PassFlags::ALL), vec!["intro"]);
    }

    #[test]
    fn test_unlikely_candidates_depend_on_flag() {
        let html = r#"<body>
            <div id="s" class="sidebar"><p id="sp">Sidebar text</p></div>
            <div id="m" class="sidebar main"><p id="mp">Main text</p></div>
        </body>"#;
        assert_eq!(
            decide(html, "#s", PassFlags::ALL),
            Decision::SkipSubtree(SkipReason::UnlikelyCandidate)
        );
        assert!(matches!(decide(html, "#m", PassFlags::ALL), Decision::Score(_)));
        assert!(matches!(decide(html, "#s", PassFlags::NONE), Decision::Score(_)));
        assert_eq!(scorable_ids(html, PassFlags::ALL), vec!["mp"]);
        assert_eq!(scorable_ids(html, PassFlags::NONE), vec!["sp", "mp"]);
    }

    #[test]
    fn test_unlikely_inside_table_is_kept() {
        let html = r#"<body><table><tr><td><div id="x" class="comment"><p>a</p><p>b</p></div></td></tr></table></body>"#;
        assert_eq!(decide(html, "#x", PassFlags::ALL), Decision::Descend);
    }

    #[test]
    fn test_unlikely_inside_code_is_kept() {
        let html = r#"<body><pre><code><div id="x" class="comment"><p>a</p><p>b</p></div></code></pre></body>"#;
        assert_eq!(decide(html, "#x", PassFlags::ALL), Decision::Descend);
    }

    #[test]
    fn test_table_lookup_is_bounded_to_four_ancestors() {
        // td, tr, tbody, table
        let edge = r#"<body><table><tr><td><div id="x" class="comment"><p>a</p><p>b</p></div></td></tr></table></body>"#;
        assert_eq!(decide(edge, "#x", PassFlags::ALL), Decision::Descend);

        // div, td, tr, tbody, then table out of reach
        let deep = r#"<body><table><tr><td><div><div id="x" class="comment"><p>a</p><p>b</p></div></div></td></tr></table></body>"#;
        assert_eq!(
            decide(deep, "#x", PassFlags::ALL),
            Decision::SkipSubtree(SkipReason::UnlikelyCandidate)
        );
    }

    #[test]
    fn test_unlikely_role() {
        let html = r#"<body><div id="n" role="navigation"><p>x</p></div></body>"#;
        assert_eq!(
            decide(html, "#n", PassFlags::ALL),
            Decision::SkipSubtree(SkipReason::UnlikelyRole)
        );
        assert_ne!(
            decide(html, "#n", PassFlags::WEIGHT_CLASSES),
            Decision::SkipSubtree(SkipReason::UnlikelyRole)
        );
    }

    #[test]
    fn test_empty_structural_nodes() {
        let html = r#"<body>
            <div id="a"></div>
            <section id="b"><br><hr></section>
            <h3 id="c">  </h3>
            <div id="d"><img src="x.png"></div>
        </body>"#;
        for id in ["#a", "#b", "#c"] {
            assert_eq!(
                decide(html, id, PassFlags::ALL),
                Decision::SkipNode(SkipReason::WithoutContent)
            );
        }
        assert_eq!(decide(html, "#d", PassFlags::ALL), Decision::Descend);
    }

    #[test]
    fn test_scorable_tags() {
        let html = r#"<body><p id="p">x</p><pre id="pre">y</pre><h4 id="h">z</h4><h1 id="h1">t</h1></body>"#;
        assert_eq!(scorable_ids(html, PassFlags::ALL), vec!["p", "pre", "h"]);
    }

    #[test]
    fn test_div_with_single_paragraph_scores_paragraph() {
        let html = r#"<body><div id="wrap"><p id="inner">Paragraph text</p></div></body>"#;
        assert_eq!(scorable_ids(html, PassFlags::ALL), vec!["inner"]);
    }

    #[test]
    fn test_div_with_text_and_paragraph_is_walked() {
        let html = r#"<body><div id="wrap">Loose text<p id="inner">Paragraph text</p></div></body>"#;
        assert_eq!(scorable_ids(html, PassFlags::ALL), vec!["inner"]);
        assert_eq!(decide(html, "#wrap", PassFlags::ALL), Decision::Descend);
    }

    #[test]
    fn test_link_heavy_single_paragraph_div() {
        let html = r#"<body><div id="wrap"><p id="inner"><a href="/a">All link text</a></p></div></body>"#;
        assert_eq!(decide(html, "#wrap", PassFlags::ALL), Decision::Descend);
    }

    #[test]
    fn test_div_without_blocks_is_scorable() {
        let html = r#"<body><div id="d">Inline <b>text</b> and <span>spans</span></div></body>"#;
        assert_eq!(scorable_ids(html, PassFlags::ALL), vec!["d"]);
    }
}
