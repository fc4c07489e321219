//! # faultline-classification
//!
//! Resolves the severity and category of raw errors, tags them, and detects
//! duplicates within a sliding window.
//!
//! ## Severity resolution
//!
//! | Candidate | Source |
//! |-----------|--------|
//! | Original | Caller-supplied severity |
//! | Semantic | Regex families, critical → debug, first match wins |
//! | Contextual | Stack-trace markers and metadata flags |
//! | Keyword | Fixed phrase table |
//!
//! The highest-weighted candidate wins; ties keep the original.

pub mod cache;
pub mod dedup;
pub mod engine;
pub mod rules;
pub mod similarity;

pub use cache::{CachedClassification, ClassificationCache};
pub use dedup::DuplicateWindow;
pub use engine::{Classification, ClassificationService, ClassificationStats};
