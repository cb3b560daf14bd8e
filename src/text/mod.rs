//! Per-row text transforms.
//!
//! - [`normalizer`]: strips emails, URLs, hashtags and special characters and
//!   spells out digit runs (via [`numbers`]).
//! - [`stopwords`]: English stopword removal that keeps negations.
//! - [`lemma`]: lemmatizer abstraction and the Snowball-backed default.

pub mod lemma;
pub mod normalizer;
pub mod numbers;
pub mod stopwords;
