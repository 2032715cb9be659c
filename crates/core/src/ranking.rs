//! Candidate ranking and top-candidate refinement.
//!
//! Scored ancestors are penalized by their link density and the best few
//! kept in order. The winner is then refined: promoted to a common ancestor
//! when several close runners-up share one, moved up the tree when an
//! ancestor scores higher, and lifted out of single-child wrappers.

use crate::dom_tree::{DomTree, NodeIndex};
use crate::extract::{ExtractConfig, PassFlags};
use crate::metrics::link_density;
use crate::scoring::{ScoreTable, ScoredCandidates, initial_score};

use tracing::trace;

/// Bounded list of the best candidates, highest adjusted score first.
#[derive(Debug, Clone)]
pub struct TopCandidates {
    capacity: usize,
    entries: Vec<(NodeIndex, f64)>,
}

impl TopCandidates {
    pub fn new(capacity: usize) -> Self {
        Self { capacity, entries: Vec::with_capacity(capacity + 1) }
    }

    /// Insert `node` before the first entry with a strictly lower score.
    ///
    /// Ties keep the entry seen first. Returns whether the node made the list.
    pub fn offer(&mut self, node: NodeIndex, score: f64) -> bool {
        for position in 0..self.capacity {
            let displaces = match self.entries.get(position) {
                None => true,
                Some(&(_, existing)) => score > existing,
            };
            if displaces {
                self.entries.insert(position, (node, score));
                self.entries.truncate(self.capacity);
                return true;
            }
        }
        false
    }

    pub fn first(&self) -> Option<(NodeIndex, f64)> {
        self.entries.first().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeIndex, f64)> + '_ {
        self.entries.iter().copied()
    }

    pub fn nodes(&self) -> Vec<NodeIndex> {
        self.entries.iter().map(|&(node, _)| node).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Scale every candidate's score by `1 - link_density` (written back into
/// the table) and keep the `top_candidates` best.
pub fn rank_candidates(tree: &DomTree<'_>, scored: &mut ScoredCandidates, config: &ExtractConfig) -> TopCandidates {
    let mut top = TopCandidates::new(config.top_candidates);

    for &candidate in &scored.candidates {
        let raw = scored.scores.get(candidate).unwrap_or(0.0);
        let adjusted = raw * (1.0 - link_density(tree, candidate, config.fragment_link_weight));
        scored.scores.set(candidate, adjusted);
        top.offer(candidate, adjusted);
    }

    top
}

/// Refines the ranked list into a single top candidate.
pub struct CandidateSelector<'t, 'a> {
    tree: &'t DomTree<'a>,
    config: &'t ExtractConfig,
    flags: PassFlags,
    body: NodeIndex,
}

impl<'t, 'a> CandidateSelector<'t, 'a> {
    pub fn new(tree: &'t DomTree<'a>, config: &'t ExtractConfig, flags: PassFlags, body: NodeIndex) -> Self {
        Self { tree, config, flags, body }
    }

    /// Pick the article root from `top`, initializing scores in `scores` for
    /// any node promoted along the way.
    ///
    /// Falls back to the body, scored on its own, when there is no
    /// candidate or the best candidate is the body itself.
    pub fn select(&self, top: &TopCandidates, scores: &mut ScoreTable) -> NodeIndex {
        let Some((mut candidate, _)) = top.first().filter(|&(node, _)| node != self.body) else {
            scores.set(self.body, initial_score(self.tree, self.body, self.flags));
            return self.body;
        };

        if let Some(ancestor) = self.sibling_cluster_ancestor(top, scores) {
            trace!(tag = self.tree.tag_name(ancestor), "promoted to shared ancestor");
            candidate = ancestor;
        }
        self.ensure_scored(candidate, scores);

        candidate = self.rescan_ancestors(candidate, scores);
        candidate = self.collapse_single_child(candidate);
        self.ensure_scored(candidate, scores);

        candidate
    }

    fn ensure_scored(&self, node: NodeIndex, scores: &mut ScoreTable) {
        if !scores.contains(node) {
            scores.set(node, initial_score(self.tree, node, self.flags));
        }
    }

    /// The first ancestor of the top candidate, below the body, that at
    /// least `min_cluster_size` close runners-up also descend from.
    fn sibling_cluster_ancestor(&self, top: &TopCandidates, scores: &ScoreTable) -> Option<NodeIndex> {
        let (leader, _) = top.first()?;
        let leader_score = scores.get(leader).unwrap_or(0.0);
        let denominator = if leader_score == 0.0 { 1.0 } else { leader_score };
        let required = self.config.min_cluster_size;

        let ancestor_lists: Vec<Vec<NodeIndex>> = top
            .iter()
            .skip(1)
            .filter(|&(node, _)| scores.get(node).unwrap_or(0.0) / denominator >= self.config.cluster_score_ratio)
            .map(|(node, _)| self.tree.ancestors(node, None))
            .collect();

        if ancestor_lists.len() < required {
            return None;
        }

        let mut ancestor = self.tree.parent(leader);
        while let Some(current) = ancestor
            && current != self.body
        {
            let containing = ancestor_lists.iter().filter(|list| list.contains(&current)).count();
            if containing >= required {
                return Some(current);
            }
            ancestor = self.tree.parent(current);
        }

        None
    }

    /// Climb toward the body and move to the first scored ancestor that
    /// beats the score seen one level below it. Stops at an ancestor scoring
    /// under `score_floor_ratio` of the starting score.
    fn rescan_ancestors(&self, candidate: NodeIndex, scores: &ScoreTable) -> NodeIndex {
        let mut last_score = scores.get(candidate).unwrap_or(0.0);
        let floor = last_score * self.config.score_floor_ratio;
        let mut ancestor = self.tree.parent(candidate);

        while let Some(current) = ancestor
            && current != self.body
        {
            ancestor = self.tree.parent(current);
            let Some(score) = scores.get(current) else {
                continue;
            };
            if score < floor {
                break;
            }
            if score > last_score {
                return current;
            }
            last_score = score;
        }

        candidate
    }

    /// Move up while the parent is not the body and has no other child.
    fn collapse_single_child(&self, mut candidate: NodeIndex) -> NodeIndex {
        while let Some(parent) = self.tree.parent(candidate)
            && parent != self.body
            && self.tree.children(parent).len() == 1
        {
            candidate = parent;
        }
        candidate
    }
}
