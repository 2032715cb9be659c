use crate::dom_tree::{DomTree, NodeIndex};
use crate::extract::{ExtractConfig, PassFlags};
use crate::metrics::inner_text;
use crate::patterns::{NEGATIVE, POSITIVE};

/// Weight for a positive or negative class/ID match
const CLASS_WEIGHT: f64 = 25.0;

/// Maximum bonus from text length
const MAX_LENGTH_BONUS: usize = 3;

/// Characters per length bonus point
const CHARS_PER_POINT: usize = 100;

/// Content scores for one pass, stored beside the tree rather than on it.
///
/// Indexed by [`NodeIndex`]; `None` means the node has not been initialized
/// in this pass.
#[derive(Debug, Clone, Default)]
pub struct ScoreTable {
    scores: Vec<Option<f64>>,
}

impl ScoreTable {
    /// An empty table sized for a tree of `len` nodes.
    pub fn new(len: usize) -> Self {
        Self { scores: vec![None; len] }
    }

    pub fn get(&self, id: NodeIndex) -> Option<f64> {
        self.scores.get(id.index()).copied().flatten()
    }

    pub fn contains(&self, id: NodeIndex) -> bool {
        self.get(id).is_some()
    }

    pub fn set(&mut self, id: NodeIndex, score: f64) {
        if id.index() >= self.scores.len() {
            self.scores.resize(id.index() + 1, None);
        }
        self.scores[id.index()] = Some(score);
    }

    /// Add `delta` to the score of `id`, treating a missing score as 0.
    pub fn add(&mut self, id: NodeIndex, delta: f64) {
        let current = self.get(id).unwrap_or(0.0);
        self.set(id, current + delta);
    }

    /// Number of initialized entries.
    pub fn len(&self) -> usize {
        self.scores.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Calculate the base score for an element based on its tag name
///
/// - DIV: +5
/// - PRE, TD, BLOCKQUOTE: +3
/// - ADDRESS, OL, UL, DL, DD, DT, LI, FORM: -3
/// - H1-H6, TH: -5
pub fn base_tag_score(tag: &str) -> f64 {
    match tag {
        "div" => 5.0,
        "pre" | "td" | "blockquote" => 3.0,
        "address" | "ol" | "ul" | "dl" | "dd" | "dt" | "li" | "form" => -3.0,
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "th" => -5.0,
        _ => 0.0,
    }
}

fn pattern_weight(value: &str) -> f64 {
    if value.is_empty() {
        return 0.0;
    }

    let mut weight = 0.0;
    if NEGATIVE.is_match(value) {
        weight -= CLASS_WEIGHT;
    }
    if POSITIVE.is_match(value) {
        weight += CLASS_WEIGHT;
    }
    weight
}

/// Calculate the class/ID weight adjustment for an element
///
/// The class and the id are weighed independently, each contributing -25,
/// 0 or +25, so the total lies in [-50, 50]. Always 0 unless
/// [`PassFlags::WEIGHT_CLASSES`] is set.
pub fn class_id_weight(tree: &DomTree<'_>, id: NodeIndex, flags: PassFlags) -> f64 {
    if !flags.contains(PassFlags::WEIGHT_CLASSES) {
        return 0.0;
    }

    pattern_weight(tree.class_name(id)) + pattern_weight(tree.id_attr(id))
}

/// Score a node receives when it first enters the [`ScoreTable`].
pub fn initial_score(tree: &DomTree<'_>, id: NodeIndex, flags: PassFlags) -> f64 {
    base_tag_score(tree.tag_name(id)) + class_id_weight(tree, id, flags)
}

/// Contribution of one paragraph-like element with normalized text `text`.
///
/// One point as a base, one per comma-separated segment, and one per full
/// hundred characters up to three.
pub fn content_contribution(text: &str) -> f64 {
    let segments = text.split(',').count();
    let length_bonus = (text.chars().count() / CHARS_PER_POINT).min(MAX_LENGTH_BONUS);

    (1 + segments + length_bonus) as f64
}

/// Decay applied to a contribution propagated to the ancestor at `level`
/// (0 is the parent).
pub fn divisor(level: usize) -> f64 {
    match level {
        0 => 1.0,
        1 => 2.0,
        _ => (level * 3) as f64,
    }
}

/// Result of the scoring stage of a pass.
#[derive(Debug, Clone, Default)]
pub struct ScoredCandidates {
    pub scores: ScoreTable,
    /// Every ancestor that received a score, in order of first initialization
    pub candidates: Vec<NodeIndex>,
}

/// Propagate the contribution of each scorable element to its ancestors.
///
/// Elements shorter than `min_text_length` characters, and elements with no
/// ancestor, contribute nothing. Ancestors without a parent of their own
/// (the document root) are never scored.
pub fn score_elements(
    tree: &DomTree<'_>, scorable: &[NodeIndex], config: &ExtractConfig, flags: PassFlags,
) -> ScoredCandidates {
    let mut scores = ScoreTable::new(tree.len());
    let mut candidates = Vec::new();

    for &element in scorable {
        if tree.parent(element).is_none() {
            continue;
        }

        let text = inner_text(tree, element);
        if text.chars().count() < config.min_text_length {
            continue;
        }

        let ancestors = tree.ancestors(element, Some(config.ancestor_depth));
        if ancestors.is_empty() {
            continue;
        }

        let contribution = content_contribution(&text);

        for (level, &ancestor) in ancestors.iter().enumerate() {
            if tree.parent(ancestor).is_none() {
                continue;
            }

            if !scores.contains(ancestor) {
                scores.set(ancestor, initial_score(tree, ancestor, flags));
                candidates.push(ancestor);
            }

            scores.add(ancestor, contribution / divisor(level));
        }
    }

    ScoredCandidates { scores, candidates }
}
