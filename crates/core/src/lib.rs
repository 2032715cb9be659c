pub mod dom_tree;
pub mod error;
pub mod extract;
pub mod filter;
pub mod metrics;
pub mod parse;
pub mod patterns;
pub mod ranking;
pub mod scoring;
pub mod walker;

pub use dom_tree::{DomTree, NodeIndex};
pub use error::{MarrowError, Result};
pub use extract::{
    ArticleBody, Attempt, ExtractConfig, ExtractConfigBuilder, Extraction, Extractor, NotFoundReason, Outcome,
    PassFlags, PassOutcome, extract_article_body, extract_article_body_with_config,
};
#[doc(hidden)]
pub use filter::{Decision, NodeFilter, SkipReason, collect_scorable};
pub use metrics::{link_density, normalize_whitespace, text_similarity};
pub use parse::{Document, Element};
#[doc(hidden)]
pub use ranking::{CandidateSelector, TopCandidates, rank_candidates};
#[doc(hidden)]
pub use scoring::{ScoreTable, ScoredCandidates, base_tag_score, class_id_weight, score_elements};
pub use walker::{Step, TreeWalker};
