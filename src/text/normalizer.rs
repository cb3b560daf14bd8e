use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;

use super::numbers::numbers_to_words;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").unwrap()
});
static URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://\S+|www\.\S+").unwrap());
static HASHTAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"#\S+").unwrap());
static APOSTROPHE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"['’]").unwrap());
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Stateless review text cleaner.
///
/// The character allow-list is compiled once; `apply` can then be called from
/// any number of threads.
#[derive(Debug, Clone)]
pub struct Normalizer {
    unwanted: Regex,
}

impl Normalizer {
    /// Build a normalizer that keeps word characters, whitespace and `keep`.
    pub fn new(keep: &str) -> Result<Self> {
        let kept: String = keep.chars().map(|c| regex::escape(&c.to_string())).collect();
        let unwanted = Regex::new(&format!(r"[^\w\s{}]", kept))?;
        Ok(Self { unwanted })
    }

    /// Full per-row transform: digit runs to words, then special character removal.
    pub fn apply(&self, text: &str) -> String {
        self.remove_special_characters(&numbers_to_words(text))
    }

    /// Remove emails, URLs, hashtags and disallowed characters; apostrophes
    /// become spaces so contractions do not fuse into one token.
    pub fn remove_special_characters(&self, text: &str) -> String {
        let text = EMAIL.replace_all(text, "");
        let text = URL.replace_all(&text, "");
        let text = HASHTAG.replace_all(&text, "");
        let text = APOSTROPHE.replace_all(&text, " ");
        let text = self.unwanted.replace_all(&text, "");
        let text = WHITESPACE.replace_all(&text, " ");
        text.trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain() -> Normalizer {
        Normalizer::new("").unwrap()
    }

    #[test]
    fn test_strips_email_url_hashtag() {
        let n = plain();
        assert_eq!(
            n.remove_special_characters("Write to john.doe@mail.com or see https://x.io/a?b=1 #awesome stay"),
            "Write to or see stay"
        );
        assert_eq!(n.remove_special_characters("visit www.hotel.com now"), "visit now");
    }

    #[test]
    fn test_apostrophe_becomes_space() {
        let n = plain();
        assert_eq!(n.remove_special_characters("don't"), "don t");
        assert_eq!(n.remove_special_characters("it’s fine"), "it s fine");
    }

    #[test]
    fn test_keep_list() {
        let n = Normalizer::new("-.").unwrap();
        assert_eq!(n.remove_special_characters("pet-friendly. Great!"), "pet-friendly. Great");
        assert_eq!(plain().remove_special_characters("pet-friendly. Great!"), "petfriendly Great");
    }

    #[test]
    fn test_keep_list_with_regex_metacharacters() {
        let n = Normalizer::new("]^\\").unwrap();
        assert_eq!(n.remove_special_characters("a]b^c\\d!"), "a]b^c\\d");
    }

    #[test]
    fn test_collapses_whitespace() {
        assert_eq!(plain().remove_special_characters("  a \t\n b  "), "a b");
    }

    #[test]
    fn test_apply_expands_numbers_first() {
        let n = Normalizer::new("-").unwrap();
        assert_eq!(n.apply("Stayed 21 nights!!"), "Stayed twenty-one nights");
    }

    #[test]
    fn test_idempotent() {
        let n = Normalizer::new("-").unwrap();
        let inputs = [
            "Room 12b was GREAT :) contact me@x.org",
            "C'est magnifique, 3 étoiles! www.example.fr #voyage",
            "pet - friendly & quiet 100%",
            "",
        ];
        for input in inputs {
            let once = n.apply(input);
            assert_eq!(n.apply(&once), once, "input: {:?}", input);
        }
    }
}
