//! Keyword-based category extraction.
//!
//! - [`table`]: loading and validating the category and exclusion phrase tables.
//! - [`matcher`]: phrase → regex compilation and the per-run [`MatcherTable`].
//! - [`extractor`]: the parallel per-category scan producing
//!   [`MatchResult`](crate::models::MatchResult)s.

pub mod extractor;
pub mod matcher;
pub mod table;

pub use matcher::MatcherTable;
