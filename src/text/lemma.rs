use std::collections::BTreeMap;

use rust_stemmers::{Algorithm, Stemmer};

/// Reduces words to a base form so review text and keyword phrases can be
/// compared in the same space.
pub trait Lemmatizer: Sync {
    fn lemma(&self, word: &str) -> String;

    /// Lemmatize every whitespace token; hyphenated tokens are lemmatized per part.
    fn lemmatize(&self, text: &str) -> String {
        let joined = text.replace(" - ", "-");
        joined
            .split_whitespace()
            .map(|token| {
                token
                    .split('-')
                    .map(|part| self.lemma(&part.to_lowercase()))
                    .collect::<Vec<_>>()
                    .join("-")
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// English Snowball stemmer standing in for a dictionary lemmatizer.
pub struct SnowballLemmatizer {
    stemmer: Stemmer,
}

impl SnowballLemmatizer {
    pub fn english() -> Self {
        Self {
            stemmer: Stemmer::create(Algorithm::English),
        }
    }
}

impl Default for SnowballLemmatizer {
    fn default() -> Self {
        Self::english()
    }
}

impl Lemmatizer for SnowballLemmatizer {
    fn lemma(&self, word: &str) -> String {
        self.stemmer.stem(word).into_owned()
    }
}

/// Lemmatize every phrase of a category→phrases table, keeping category and phrase order.
pub fn lemmatize_table<L: Lemmatizer + ?Sized>(
    lemmatizer: &L,
    table: &BTreeMap<String, Vec<String>>,
) -> BTreeMap<String, Vec<String>> {
    table
        .iter()
        .map(|(category, phrases)| {
            let lemmatized = phrases.iter().map(|p| lemmatizer.lemmatize(p.trim())).collect();
            (category.clone(), lemmatized)
        })
        .collect()
}
