use crate::parse::{Document, Element};

use scraper::ElementRef;
use serde::Serialize;

/// Dense per-pass identity of an element in a [`DomTree`].
///
/// Indices are assigned in document (pre-order) order, so every subtree
/// occupies a contiguous index range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct NodeIndex(usize);

impl NodeIndex {
    /// The raw position of this node in the arena.
    pub fn index(self) -> usize {
        self.0
    }
}

/// One indexed element with its links into the arena.
#[derive(Debug, Clone)]
struct DomNode<'a> {
    tag_name: String,
    element: ElementRef<'a>,
    parent_id: Option<NodeIndex>,
    child_ids: Vec<NodeIndex>,
    next_sibling: Option<NodeIndex>,
    /// Whether a direct text child carries non-whitespace content
    has_own_text: bool,
    /// One past the last index of this node's subtree
    subtree_end: usize,
}

/// Read-only arena over the element tree of a [`Document`].
///
/// Built by one indexing walk; scores and other per-pass state live in
/// side tables keyed by [`NodeIndex`] instead of on the nodes.
#[derive(Debug, Clone)]
pub struct DomTree<'a> {
    /// All nodes in the tree
    nodes: Vec<DomNode<'a>>,
    body: Option<NodeIndex>,
}

impl<'a> DomTree<'a> {
    /// Index every element of `doc`, starting at the root element.
    ///
    /// The walk uses an explicit stack so that deeply nested documents do not
    /// grow the call stack.
    pub fn build(doc: &'a Document) -> Self {
        let mut nodes: Vec<DomNode<'a>> = Vec::new();
        let mut body = None;
        let mut stack: Vec<(ElementRef<'a>, Option<NodeIndex>)> = vec![(doc.root_element().element_ref(), None)];

        while let Some((element, parent_id)) = stack.pop() {
            let id = NodeIndex(nodes.len());
            let tag_name = element.value().name().to_lowercase();
            if body.is_none() && tag_name == "body" {
                body = Some(id);
            }

            let has_own_text = element
                .children()
                .any(|child| child.value().as_text().is_some_and(|text| !text.trim().is_empty()));

            if let Some(parent) = parent_id {
                let siblings = &nodes[parent.0].child_ids;
                if let Some(&previous) = siblings.last() {
                    nodes[previous.0].next_sibling = Some(id);
                }
                nodes[parent.0].child_ids.push(id);
            }

            nodes.push(DomNode {
                tag_name,
                element,
                parent_id,
                child_ids: Vec::new(),
                next_sibling: None,
                has_own_text,
                subtree_end: id.0 + 1,
            });

            let children: Vec<ElementRef<'a>> = element.children().filter_map(ElementRef::wrap).collect();
            for child in children.into_iter().rev() {
                stack.push((child, Some(id)));
            }
        }

        for i in (0..nodes.len()).rev() {
            if let Some(&last) = nodes[i].child_ids.last() {
                nodes[i].subtree_end = nodes[last.0].subtree_end;
            }
        }

        Self { nodes, body }
    }

    /// The document root element, absent only for an empty arena.
    pub fn root(&self) -> Option<NodeIndex> {
        if self.nodes.is_empty() { None } else { Some(NodeIndex(0)) }
    }

    /// The first `<body>` element in document order.
    pub fn body(&self) -> Option<NodeIndex> {
        self.body
    }

    fn node(&self, id: NodeIndex) -> &DomNode<'a> {
        &self.nodes[id.0]
    }

    /// Public handle for the element at `id`.
    pub fn element(&self, id: NodeIndex) -> Element<'a> {
        Element::new(self.node(id).element)
    }

    pub fn tag_name(&self, id: NodeIndex) -> &str {
        &self.node(id).tag_name
    }

    pub fn is_tag(&self, id: NodeIndex, tag: &str) -> bool {
        self.node(id).tag_name == tag
    }

    /// Attribute lookup (`get(name)`).
    pub fn attr(&self, id: NodeIndex, name: &str) -> Option<&'a str> {
        self.node(id).element.value().attr(name)
    }

    /// Attribute presence (`has(name)`).
    pub fn has_attr(&self, id: NodeIndex, name: &str) -> bool {
        self.attr(id, name).is_some()
    }

    /// The class attribute, or an empty string.
    pub fn class_name(&self, id: NodeIndex) -> &'a str {
        self.attr(id, "class").unwrap_or("")
    }

    /// The id attribute, or an empty string.
    pub fn id_attr(&self, id: NodeIndex) -> &'a str {
        self.attr(id, "id").unwrap_or("")
    }

    /// Raw text content, own and descendant text nodes concatenated.
    pub fn text(&self, id: NodeIndex) -> String {
        self.node(id).element.text().collect()
    }

    pub fn has_own_text(&self, id: NodeIndex) -> bool {
        self.node(id).has_own_text
    }

    /// Get the parent of a node
    pub fn parent(&self, id: NodeIndex) -> Option<NodeIndex> {
        self.node(id).parent_id
    }

    pub fn children(&self, id: NodeIndex) -> &[NodeIndex] {
        &self.node(id).child_ids
    }

    pub fn first_child(&self, id: NodeIndex) -> Option<NodeIndex> {
        self.node(id).child_ids.first().copied()
    }

    pub fn next_sibling(&self, id: NodeIndex) -> Option<NodeIndex> {
        self.node(id).next_sibling
    }

    /// Ancestors of `id`, closest first, at most `max_depth` of them
    /// (`None` for the full chain up to the root).
    pub fn ancestors(&self, id: NodeIndex, max_depth: Option<usize>) -> Vec<NodeIndex> {
        let limit = max_depth.unwrap_or(usize::MAX);
        let mut ancestors = Vec::new();
        let mut current = self.parent(id);
        while let Some(parent) = current {
            if ancestors.len() == limit {
                break;
            }
            ancestors.push(parent);
            current = self.parent(parent);
        }
        ancestors
    }

    /// Whether an ancestor within `max_depth + 1` levels has the given tag.
    pub fn has_ancestor_tag(&self, id: NodeIndex, tag: &str, max_depth: usize) -> bool {
        self.ancestors(id, Some(max_depth + 1))
            .into_iter()
            .any(|ancestor| self.is_tag(ancestor, tag))
    }

    /// All descendants of `id` in document order.
    pub fn descendants(&self, id: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        (id.0 + 1..self.node(id).subtree_end).map(NodeIndex)
    }

    /// Descendants matching `tag` (anchor, `<br>`, `<hr>` lookups).
    pub fn descendants_by_tag<'t>(&'t self, id: NodeIndex, tag: &'t str) -> impl Iterator<Item = NodeIndex> + 't {
        self.descendants(id).filter(move |&d| self.is_tag(d, tag))
    }

    /// Get the total number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Find the arena index of an element handed out by [`Document`].
    pub fn find(&self, element: &Element<'_>) -> Option<NodeIndex> {
        let target = element.element_ref().id();
        self.nodes.iter().position(|n| n.element.id() == target).map(NodeIndex)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NESTED: &str = r#"
        <html><body>
            <div class="container">
                <article class="post">
                    <p>First <a href="/a">link</a></p>
                    <p>Second</p>
                </article>
                <br>
            </div>
            <footer>Footer</footer>
        </body></html>
    "#;

    #[test]
    fn test_build_dom_tree() {
        let doc = Document::parse(NESTED).unwrap();
        let tree = DomTree::build(&doc);

        assert!(!tree.is_empty());
        assert_eq!(tree.root(), Some(NodeIndex(0)));
        assert_eq!(tree.tag_name(NodeIndex(0)), "html");
        assert_eq!(tree.tag_name(tree.body().unwrap()), "body");
    }

    #[test]
    fn test_parent_child_relationships() {
        let doc = Document::parse(NESTED).unwrap();
        let tree = DomTree::build(&doc);

        let article = tree.find(&doc.select("article").unwrap()[0]).unwrap();
        let paragraphs: Vec<_> = tree.children(article).to_vec();
        assert_eq!(paragraphs.len(), 2);
        assert!(paragraphs.iter().all(|&p| tree.parent(p) == Some(article)));
        assert_eq!(tree.first_child(article), Some(paragraphs[0]));
        assert_eq!(tree.next_sibling(paragraphs[0]), Some(paragraphs[1]));
        assert_eq!(tree.next_sibling(paragraphs[1]), None);
    }

    #[test]
    fn test_indices_follow_document_order() {
        let doc = Document::parse(NESTED).unwrap();
        let tree = DomTree::build(&doc);

        let order: Vec<&str> = (0..tree.len()).map(|i| tree.tag_name(NodeIndex(i))).collect();
        let div = order.iter().position(|t| *t == "div").unwrap();
        let article = order.iter().position(|t| *t == "article").unwrap();
        let footer = order.iter().position(|t| *t == "footer").unwrap();
        assert!(div < article && article < footer);
    }

    #[test]
    fn test_descendants_by_tag() {
        let doc = Document::parse(NESTED).unwrap();
        let tree = DomTree::build(&doc);

        let div = tree.find(&doc.select("div.container").unwrap()[0]).unwrap();
        assert_eq!(tree.descendants_by_tag(div, "a").count(), 1);
        assert_eq!(tree.descendants_by_tag(div, "br").count(), 1);
        assert_eq!(tree.descendants_by_tag(div, "footer").count(), 0);
    }

    #[test]
    fn test_ancestors_depth_limit() {
        let doc = Document::parse(NESTED).unwrap();
        let tree = DomTree::build(&doc);

        let link = tree.find(&doc.select("a").unwrap()[0]).unwrap();
        let all = tree.ancestors(link, None);
        let tags: Vec<&str> = all.iter().map(|&a| tree.tag_name(a)).collect();
        assert_eq!(tags, vec!["p", "article", "div", "body", "html"]);
        assert_eq!(tree.ancestors(link, Some(2)).len(), 2);
        assert!(tree.has_ancestor_tag(link, "div", 3));
        assert!(!tree.has_ancestor_tag(link, "div", 1));
    }

    #[test]
    fn test_own_text_detection() {
        let doc = Document::parse("<html><body><div id='a'>  <p>x</p>  </div><div id='b'>text<p>y</p></div></body></html>")
            .unwrap();
        let tree = DomTree::build(&doc);

        let a = tree.find(&doc.select("#a").unwrap()[0]).unwrap();
        let b = tree.find(&doc.select("#b").unwrap()[0]).unwrap();
        assert!(!tree.has_own_text(a));
        assert!(tree.has_own_text(b));
        assert_eq!(tree.id_attr(a), "a");
        assert_eq!(tree.class_name(a), "");
    }
}
