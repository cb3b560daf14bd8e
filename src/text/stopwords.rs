use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

/// English stopword list (the NLTK corpus).
const ENGLISH_STOPWORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "you're", "you've",
    "you'll", "you'd", "your", "yours", "yourself", "yourselves", "he", "him", "his", "himself",
    "she", "she's", "her", "hers", "herself", "it", "it's", "its", "itself", "they", "them",
    "their", "theirs", "themselves", "what", "which", "who", "whom", "this", "that", "that'll",
    "these", "those", "am", "is", "are", "was", "were", "be", "been", "being", "have", "has",
    "had", "having", "do", "does", "did", "doing", "a", "an", "the", "and", "but", "if", "or",
    "because", "as", "until", "while", "of", "at", "by", "for", "with", "about", "against",
    "between", "into", "through", "during", "before", "after", "above", "below", "to", "from",
    "up", "down", "in", "out", "on", "off", "over", "under", "again", "further", "then", "once",
    "here", "there", "when", "where", "why", "how", "all", "any", "both", "each", "few", "more",
    "most", "other", "some", "such", "no", "nor", "not", "only", "own", "same", "so", "than",
    "too", "very", "s", "t", "can", "will", "just", "don", "don't", "should", "should've", "now",
    "d", "ll", "m", "o", "re", "ve", "y", "ain", "aren", "aren't", "couldn", "couldn't", "didn",
    "didn't", "doesn", "doesn't", "hadn", "hadn't", "hasn", "hasn't", "haven", "haven't", "isn",
    "isn't", "ma", "mightn", "mightn't", "mustn", "mustn't", "needn", "needn't", "shan", "shan't",
    "shouldn", "shouldn't", "wasn", "wasn't", "weren", "weren't", "won", "won't", "wouldn",
    "wouldn't",
];

/// Negations survive stopword removal: "not quiet" must stay distinguishable from "quiet".
const NEGATIONS: &[&str] = &[
    "not", "no", "never", "none", "cannot", "can't", "don't", "doesn't", "isn't", "wasn't",
    "weren't", "wouldn't", "shouldn't", "couldn't",
];

static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\w+(?:[-']\w+)*|\S").unwrap());
static ALPHA_TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z-]+$").unwrap());

#[derive(Debug, Clone)]
pub struct StopwordFilter {
    stopwords: HashSet<&'static str>,
}

impl Default for StopwordFilter {
    fn default() -> Self {
        Self::english()
    }
}

impl StopwordFilter {
    pub fn english() -> Self {
        let negations: HashSet<&str> = NEGATIONS.iter().copied().collect();
        let stopwords = ENGLISH_STOPWORDS
            .iter()
            .copied()
            .filter(|w| !negations.contains(w))
            .collect();
        Self { stopwords }
    }

    /// Lowercase, tokenize, and keep alphabetic (optionally hyphenated) tokens
    /// that are not stopwords.
    pub fn filter(&self, text: &str) -> String {
        let lower = text.to_lowercase();
        TOKEN
            .find_iter(&lower)
            .map(|m| m.as_str())
            .filter(|tok| ALPHA_TOKEN.is_match(tok) && !self.stopwords.contains(tok))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
