//! Credence Core - Heuristic credibility analysis for news articles
//!
//! This crate provides the deterministic, local scoring engine:
//! - Sentence normalization
//! - Independent credibility signal detectors
//! - Score aggregation and label mapping
//! - Claim highlighting and extractive summaries
//! - The verdict contract shared with remote enrichment providers

pub mod text;
pub mod signals;
pub mod scorer;
pub mod highlights;
pub mod summary;
pub mod verdict;
pub mod analyzer;

pub use text::*;
pub use signals::*;
pub use scorer::*;
pub use highlights::*;
pub use summary::*;
pub use verdict::*;
pub use analyzer::*;

/// Neutral prior every analysis starts from
pub const NEUTRAL_PRIOR: f64 = 0.5;

/// Scores at or above this are labelled credible
pub const CREDIBLE_THRESHOLD: f64 = 0.7;

/// Scores at or above this (and below credible) are labelled mixed
pub const MIXED_THRESHOLD: f64 = 0.4;

/// Articles shorter than this many characters are penalized
pub const MIN_ARTICLE_CHARS: usize = 300;

/// Maximum number of highlights per verdict
pub const MAX_HIGHLIGHTS: usize = 5;

/// Number of lead sentences used for the summary
pub const SUMMARY_SENTENCES: usize = 3;
