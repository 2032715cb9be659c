//! Pre-order cursor over a [`DomTree`] with skip-subtree support.
//!
//! The filter pass decides per node whether to descend into it; the cursor
//! turns that decision into the next node to visit without recursion.

use crate::dom_tree::{DomTree, NodeIndex};

/// How the cursor leaves the current node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Visit the first child next, if there is one.
    Descend,
    /// Do not visit any descendant of the current node.
    SkipChildren,
}

/// The node visited after `node` in pre-order.
///
/// Goes to the first child unless `step` skips the children, otherwise to
/// the next sibling, otherwise to the next sibling of the closest ancestor
/// that has one.
pub fn next_node(tree: &DomTree<'_>, node: NodeIndex, step: Step) -> Option<NodeIndex> {
    if step == Step::Descend
        && let Some(child) = tree.first_child(node)
    {
        return Some(child);
    }

    let mut current = node;
    loop {
        if let Some(sibling) = tree.next_sibling(current) {
            return Some(sibling);
        }
        current = tree.parent(current)?;
    }
}

/// Explicit traversal state: the node under the cursor.
#[derive(Debug, Clone)]
pub struct TreeWalker<'t, 'a> {
    tree: &'t DomTree<'a>,
    current: Option<NodeIndex>,
}

impl<'t, 'a> TreeWalker<'t, 'a> {
    /// Start at `start`; `None` yields an already finished walker.
    pub fn new(tree: &'t DomTree<'a>, start: Option<NodeIndex>) -> Self {
        Self { tree, current: start }
    }

    pub fn current(&self) -> Option<NodeIndex> {
        self.current
    }

    /// Move to the next node and return it.
    pub fn advance(&mut self, step: Step) -> Option<NodeIndex> {
        self.current = self.current.and_then(|node| next_node(self.tree, node, step));
        self.current
    }
}

impl Iterator for TreeWalker<'_, '_> {
    type Item = NodeIndex;

    /// Plain pre-order iteration, never skipping.
    fn next(&mut self) -> Option<NodeIndex> {
        let node = self.current?;
        self.advance(Step::Descend);
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::Document;

    const HTML: &str = r#"<html><body>
        <div id="a"><p id="a1">x</p><p id="a2">y</p></div>
        <div id="b"><span id="b1">z</span></div>
        <p id="c">w</p>
    </body></html>"#;

    fn ids(tree: &DomTree<'_>, nodes: impl IntoIterator<Item = NodeIndex>) -> Vec<String> {
        nodes
            .into_iter()
            .map(|n| tree.id_attr(n).to_string())
            .filter(|id| !id.is_empty())
            .collect()
    }

    #[test]
    fn test_full_preorder() {
        let doc = Document::parse(HTML).unwrap();
        let tree = DomTree::build(&doc);
        let walker = TreeWalker::new(&tree, tree.root());

        assert_eq!(ids(&tree, walker), vec!["a", "a1", "a2", "b", "b1", "c"]);
    }

    #[test]
    fn test_skip_children() {
        let doc = Document::parse(HTML).unwrap();
        let tree = DomTree::build(&doc);
        let a = tree.find(&doc.select("#a").unwrap()[0]).unwrap();
        let b = tree.find(&doc.select("#b").unwrap()[0]).unwrap();

        assert_eq!(next_node(&tree, a, Step::SkipChildren), Some(b));
        assert_ne!(next_node(&tree, a, Step::Descend), Some(b));
    }

    #[test]
    fn test_ascends_to_ancestor_sibling() {
        let doc = Document::parse(HTML).unwrap();
        let tree = DomTree::build(&doc);
        let a2 = tree.find(&doc.select("#a2").unwrap()[0]).unwrap();
        let b = tree.find(&doc.select("#b").unwrap()[0]).unwrap();
        let c = tree.find(&doc.select("#c").unwrap()[0]).unwrap();

        assert_eq!(next_node(&tree, a2, Step::Descend), Some(b));
        assert_eq!(next_node(&tree, c, Step::Descend), None);
    }

    #[test]
    fn test_walker_advance() {
        let doc = Document::parse(HTML).unwrap();
        let tree = DomTree::build(&doc);
        let a = tree.find(&doc.select("#a").unwrap()[0]).unwrap();

        let mut walker = TreeWalker::new(&tree, Some(a));
        assert_eq!(walker.current(), Some(a));
        walker.advance(Step::SkipChildren);
        assert_eq!(tree.id_attr(walker.current().unwrap()), "b");

        let mut done = TreeWalker::new(&tree, None);
        assert_eq!(done.advance(Step::Descend), None);
    }
}
