//! Article body extraction with progressively relaxed passes.
//!
//! Each pass runs the filter, the scorer and the ranker under a fixed
//! [`PassFlags`] set and measures the text of the chosen node. A pass that
//! reaches [`ExtractConfig::char_threshold`] wins. Otherwise one flag is
//! cleared and the pass repeats; when no flag is left, the longest attempt
//! seen is returned.
//!
//! # Example
//!
//! ```rust
//! use marrow_core::{Document, extract_article_body};
//!
//! let prose = "The river rose, the town watched, and the bridge held. ".repeat(12);
//! let html = format!("<html><body><nav class=\"sidebar\">Home</nav><article><p>{prose}</p></article></body></html>");
//! let doc = Document::parse(&html).unwrap();
//!
//! let article = extract_article_body(&doc).into_article().unwrap();
//! assert_eq!(article.element.tag_name(), "article");
//! ```

use crate::dom_tree::{DomTree, NodeIndex};
use crate::filter::collect_scorable;
use crate::metrics::{DEFAULT_FRAGMENT_LINK_WEIGHT, normalize_whitespace, text_length};
use crate::parse::{Document, Element};
use crate::ranking::{CandidateSelector, rank_candidates};
use crate::scoring::score_elements;
use crate::{MarrowError, Result};

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Tunables for article body extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Minimum normalized text length for an element to contribute (default: 25).
    pub min_text_length: usize,
    /// Number of ancestors receiving a contribution (default: 5).
    pub ancestor_depth: usize,
    /// Size of the top candidate pool (default: 5).
    pub top_candidates: usize,
    /// Normalized text length that ends the retry loop (default: 500).
    pub char_threshold: usize,
    /// Runners-up that must share an ancestor to promote it (default: 3).
    pub min_cluster_size: usize,
    /// Score ratio to the top candidate for a runner-up to count (default: 0.75).
    pub cluster_score_ratio: f64,
    /// Fraction of the top score below which the upward re-scan stops (default: 1/3).
    pub score_floor_ratio: f64,
    /// Similarity above which a heading duplicates the title (default: 0.75).
    pub title_similarity: f64,
    /// Exclusive upper bound on byline length (default: 100).
    pub max_byline_length: usize,
    /// Link density under which a single-paragraph DIV scores as its paragraph (default: 0.25).
    pub div_link_density: f64,
    /// Weight of in-page fragment links in link density (default: 0.3).
    pub fragment_link_weight: f64,
    /// Depth limit of the table/code ancestor check (default: 3).
    pub ancestor_tag_depth: usize,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            min_text_length: 25,
            ancestor_depth: 5,
            top_candidates: 5,
            char_threshold: 500,
            min_cluster_size: 3,
            cluster_score_ratio: 0.75,
            score_floor_ratio: 1.0 / 3.0,
            title_similarity: 0.75,
            max_byline_length: 100,
            div_link_density: 0.25,
            fragment_link_weight: DEFAULT_FRAGMENT_LINK_WEIGHT,
            ancestor_tag_depth: 3,
        }
    }
}

impl ExtractConfig {
    /// Creates a new builder for ExtractConfig.
    ///
    /// # Example
    ///
    /// ```rust
    /// use marrow_core::ExtractConfig;
    ///
    /// let config = ExtractConfig::builder().char_threshold(250).build().unwrap();
    /// assert_eq!(config.char_threshold, 250);
    /// ```
    pub fn builder() -> ExtractConfigBuilder {
        ExtractConfigBuilder::new()
    }

    /// Check that every tunable is in range.
    pub fn validate(&self) -> Result<()> {
        let counts = [
            ("top_candidates", self.top_candidates),
            ("ancestor_depth", self.ancestor_depth),
            ("min_cluster_size", self.min_cluster_size),
        ];
        for (name, value) in counts {
            if value == 0 {
                return Err(MarrowError::InvalidConfig(format!("{name} must be at least 1")));
            }
        }

        let ratios = [
            ("cluster_score_ratio", self.cluster_score_ratio),
            ("score_floor_ratio", self.score_floor_ratio),
            ("title_similarity", self.title_similarity),
            ("div_link_density", self.div_link_density),
            ("fragment_link_weight", self.fragment_link_weight),
        ];
        for (name, value) in ratios {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(MarrowError::InvalidConfig(format!("{name} must be between 0 and 1, got {value}")));
            }
        }

        Ok(())
    }
}

/// Builder for ExtractConfig.
#[derive(Debug, Clone, Default)]
pub struct ExtractConfigBuilder {
    config: ExtractConfig,
}

impl ExtractConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self { config: ExtractConfig::default() }
    }

    pub fn min_text_length(mut self, value: usize) -> Self {
        self.config.min_text_length = value;
        self
    }

    pub fn ancestor_depth(mut self, value: usize) -> Self {
        self.config.ancestor_depth = value;
        self
    }

    /// Sets the number of top candidates.
    pub fn top_candidates(mut self, value: usize) -> Self {
        self.config.top_candidates = value;
        self
    }

    /// Sets the character threshold.
    pub fn char_threshold(mut self, value: usize) -> Self {
        self.config.char_threshold = value;
        self
    }

    pub fn min_cluster_size(mut self, value: usize) -> Self {
        self.config.min_cluster_size = value;
        self
    }

    pub fn cluster_score_ratio(mut self, value: f64) -> Self {
        self.config.cluster_score_ratio = value;
        self
    }

    pub fn score_floor_ratio(mut self, value: f64) -> Self {
        self.config.score_floor_ratio = value;
        self
    }

    pub fn title_similarity(mut self, value: f64) -> Self {
        self.config.title_similarity = value;
        self
    }

    pub fn max_byline_length(mut self, value: usize) -> Self {
        self.config.max_byline_length = value;
        self
    }

    pub fn div_link_density(mut self, value: f64) -> Self {
        self.config.div_link_density = value;
        self
    }

    pub fn fragment_link_weight(mut self, value: f64) -> Self {
        self.config.fragment_link_weight = value;
        self
    }

    pub fn ancestor_tag_depth(mut self, value: usize) -> Self {
        self.config.ancestor_tag_depth = value;
        self
    }

    /// Validates and builds the config.
    pub fn build(self) -> Result<ExtractConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Switches that control how strict a pass is.
///
/// Passes start with [`PassFlags::ALL`] and only ever clear bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PassFlags(u8);

impl PassFlags {
    pub const NONE: Self = Self(0);
    /// Prune subtrees whose class/id or role marks them as boilerplate.
    pub const STRIP_UNLIKELYS: Self = Self(0x1);
    /// Weigh class and id names when initializing scores.
    pub const WEIGHT_CLASSES: Self = Self(0x2);
    /// Gate for conditional cleaning of the extracted subtree.
    pub const CLEAN_CONDITIONALLY: Self = Self(0x4);
    pub const ALL: Self = Self(0x7);

    /// Relaxation order: the first set flag in this list is cleared next.
    const RELAX_ORDER: [Self; 3] = [Self::STRIP_UNLIKELYS, Self::WEIGHT_CLASSES, Self::CLEAN_CONDITIONALLY];

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn without(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    /// The flags of the next, less strict pass, or `None` once every flag is
    /// cleared.
    pub fn relax(self) -> Option<Self> {
        Self::RELAX_ORDER
            .into_iter()
            .find(|&flag| self.contains(flag))
            .map(|flag| self.without(flag))
    }
}

impl Default for PassFlags {
    fn default() -> Self {
        Self::ALL
    }
}

impl fmt::Display for PassFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = [
            (Self::STRIP_UNLIKELYS, "strip-unlikelys"),
            (Self::WEIGHT_CLASSES, "weight-classes"),
            (Self::CLEAN_CONDITIONALLY, "clean-conditionally"),
        ]
        .into_iter()
        .filter(|&(flag, _)| self.contains(flag))
        .map(|(_, name)| name)
        .collect();

        if names.is_empty() { write!(f, "none") } else { write!(f, "{}", names.join("|")) }
    }
}

/// Result of a pass that fell short of the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Attempt {
    pub node: NodeIndex,
    pub text_length: usize,
    pub flags: PassFlags,
}

/// How the returned node was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// A pass reached the character threshold.
    Threshold,
    /// Every pass fell short; this is the longest attempt.
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotFoundReason {
    /// The document has no body element; no pass ran.
    NoBody,
    /// Every attempt selected a node without text.
    NoContent,
}

impl fmt::Display for NotFoundReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotFoundReason::NoBody => write!(f, "document has no body element"),
            NotFoundReason::NoContent => write!(f, "no candidate contains any text"),
        }
    }
}

/// The extracted article root.
#[derive(Debug, Clone)]
pub struct ArticleBody<'a> {
    pub element: Element<'a>,
    pub node: NodeIndex,
    /// Normalized text length of `element`
    pub text_length: usize,
    pub outcome: Outcome,
    /// Failed passes, in the order they ran
    pub attempts: Vec<Attempt>,
}

impl ArticleBody<'_> {
    pub fn outer_html(&self) -> String {
        self.element.outer_html()
    }

    /// Whitespace-normalized text content.
    pub fn text(&self) -> String {
        normalize_whitespace(&self.element.text())
    }
}

#[derive(Debug, Clone)]
pub enum Extraction<'a> {
    Found(ArticleBody<'a>),
    NotFound { reason: NotFoundReason, attempts: Vec<Attempt> },
}

impl<'a> Extraction<'a> {
    pub fn is_found(&self) -> bool {
        matches!(self, Extraction::Found(_))
    }

    pub fn article(&self) -> Option<&ArticleBody<'a>> {
        match self {
            Extraction::Found(article) => Some(article),
            Extraction::NotFound { .. } => None,
        }
    }

    pub fn into_article(self) -> Option<ArticleBody<'a>> {
        match self {
            Extraction::Found(article) => Some(article),
            Extraction::NotFound { .. } => None,
        }
    }

    pub fn attempts(&self) -> &[Attempt] {
        match self {
            Extraction::Found(article) => &article.attempts,
            Extraction::NotFound { attempts, .. } => attempts,
        }
    }
}

/// What a single pass produced.
#[derive(Debug, Clone, PartialEq)]
pub struct PassOutcome {
    pub flags: PassFlags,
    pub node: NodeIndex,
    pub text_length: usize,
    /// Number of elements the filter marked scorable
    pub scorable: usize,
    /// Ranked pool, best first
    pub top_candidates: Vec<NodeIndex>,
}

/// Runs extraction passes over one indexed document.
pub struct Extractor<'t, 'a> {
    tree: &'t DomTree<'a>,
    title: Option<&'t str>,
    config: &'t ExtractConfig,
}

impl<'t, 'a> Extractor<'t, 'a> {
    /// `title` enables the heading-duplicates-title check; pass `None` to
    /// keep every heading.
    pub fn new(tree: &'t DomTree<'a>, title: Option<&'t str>, config: &'t ExtractConfig) -> Self {
        Self { tree, title, config }
    }

    /// One filter, score and rank cycle under `flags`.
    ///
    /// Returns `None` when the document has no body.
    pub fn run_pass(&self, flags: PassFlags) -> Option<PassOutcome> {
        let body = self.tree.body()?;

        let scorable = collect_scorable(self.tree, self.title, self.config, flags);
        let mut scored = score_elements(self.tree, &scorable, self.config, flags);
        let top = rank_candidates(self.tree, &mut scored, self.config);

        let selector = CandidateSelector::new(self.tree, self.config, flags, body);
        let node = selector.select(&top, &mut scored.scores);
        let text_length = text_length(self.tree, node);

        debug!(
            %flags,
            scorable = scorable.len(),
            candidates = scored.candidates.len(),
            tag = self.tree.tag_name(node),
            text_length,
            "extraction pass finished"
        );

        Some(PassOutcome { flags, node, text_length, scorable: scorable.len(), top_candidates: top.nodes() })
    }

    /// Run passes with relaxing flags until one reaches the threshold, then
    /// fall back to the longest attempt.
    pub fn run(&self) -> Extraction<'a> {
        if self.tree.body().is_none() {
            debug!("document has no body");
            return Extraction::NotFound { reason: NotFoundReason::NoBody, attempts: Vec::new() };
        }

        let mut flags = PassFlags::ALL;
        let mut attempts = Vec::new();

        loop {
            let Some(pass) = self.run_pass(flags) else {
                return Extraction::NotFound { reason: NotFoundReason::NoBody, attempts };
            };

            if pass.text_length >= self.config.char_threshold {
                return self.found(pass.node, pass.text_length, Outcome::Threshold, attempts);
            }

            attempts.push(Attempt { node: pass.node, text_length: pass.text_length, flags });

            match flags.relax() {
                Some(next) => flags = next,
                None => break,
            }
        }

        let best = attempts
            .iter()
            .copied()
            .reduce(|best, attempt| if attempt.text_length > best.text_length { attempt } else { best });

        match best {
            Some(best) if best.text_length > 0 => {
                debug!(attempts = attempts.len(), text_length = best.text_length, "falling back to longest attempt");
                self.found(best.node, best.text_length, Outcome::Fallback, attempts)
            }
            _ => {
                debug!(attempts = attempts.len(), "no content found");
                Extraction::NotFound { reason: NotFoundReason::NoContent, attempts }
            }
        }
    }

    fn found(&self, node: NodeIndex, text_length: usize, outcome: Outcome, attempts: Vec<Attempt>) -> Extraction<'a> {
        Extraction::Found(ArticleBody { element: self.tree.element(node), node, text_length, outcome, attempts })
    }
}

/// Extract the article body of `doc` with the default configuration.
pub fn extract_article_body(doc: &Document) -> Extraction<'_> {
    extract_article_body_with_config(doc, &ExtractConfig::default())
}

/// Extract the article body of `doc`, using its `<title>` for the
/// heading-duplicate check.
pub fn extract_article_body_with_config<'a>(doc: &'a Document, config: &ExtractConfig) -> Extraction<'a> {
    let tree = DomTree::build(doc);
    let title = doc.title();
    Extractor::new(&tree, title.as_deref(), config).run()
}
