use anyhow::{Context, Result};
use regex::{Regex, RegexBuilder};

use super::table::PhraseTable;

/// Collapse `" - "` into `"-"` and trim, so "pet - friendly" and "pet-friendly"
/// describe the same phrase.
pub fn normalize_phrase(phrase: &str) -> String {
    phrase.trim().replace(" - ", "-")
}

/// Regex source for a literal phrase.
///
/// Multi-word or hyphenated phrases treat separators loosely: a hyphen matches
/// one hyphen or whitespace character, a space matches any run of whitespace
/// or hyphens. Single tokens are anchored on word boundaries.
pub fn phrase_pattern(phrase: &str) -> String {
    let phrase = normalize_phrase(phrase);

    if !phrase.contains(|c: char| c == '-' || c.is_whitespace()) {
        return format!(r"\b{}\b", regex::escape(&phrase));
    }

    let mut pattern = String::with_capacity(phrase.len() * 2);
    let mut in_space = false;
    for c in phrase.chars() {
        if c.is_whitespace() {
            if !in_space {
                pattern.push_str(r"[-\s]+");
            }
            in_space = true;
            continue;
        }
        in_space = false;
        if c == '-' {
            pattern.push_str(r"[-\s]");
        } else {
            pattern.push_str(&regex::escape(&c.to_string()));
        }
    }
    pattern
}

/// A compiled, case-insensitive phrase.
#[derive(Debug, Clone)]
pub struct PhraseMatcher {
    pub phrase: String,
    regex: Regex,
}

impl PhraseMatcher {
    pub fn new(phrase: &str) -> Result<Self> {
        let regex = RegexBuilder::new(&phrase_pattern(phrase))
            .case_insensitive(true)
            .build()
            .with_context(|| format!("failed to compile phrase {:?}", phrase))?;
        Ok(Self {
            phrase: phrase.to_string(),
            regex,
        })
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// Replace every occurrence with a single space.
    pub fn blank_out(&self, text: &str) -> String {
        self.regex.replace_all(text, " ").into_owned()
    }
}

/// All compiled phrases of one category.
#[derive(Debug, Clone)]
pub struct CategoryMatcher {
    pub name: String,
    pub keywords: Vec<PhraseMatcher>,
    pub exclusions: Vec<PhraseMatcher>,
}

impl CategoryMatcher {
    /// Keywords of this category still present in `text` once the category's
    /// exclusion phrases have been blanked out, in keyword-list order.
    pub fn matched_keywords(&self, text: &str) -> Vec<&str> {
        if self.keywords.is_empty() {
            return Vec::new();
        }

        let mut working = text.to_string();
        for exclusion in &self.exclusions {
            working = exclusion.blank_out(&working);
        }

        self.keywords
            .iter()
            .filter(|k| k.is_match(&working))
            .map(|k| k.phrase.as_str())
            .collect()
    }
}

/// Matchers for every category, compiled once per run.
#[derive(Debug, Clone, Default)]
pub struct MatcherTable {
    pub categories: Vec<CategoryMatcher>,
}

impl MatcherTable {
    /// Compile `categories` with their `exclusions`. Exclusion categories absent
    /// from `categories` are ignored.
    pub fn build(categories: &PhraseTable, exclusions: &PhraseTable) -> Result<Self> {
        let categories = categories
            .iter()
            .map(|(name, keywords)| {
                let keywords = keywords
                    .iter()
                    .map(|k| PhraseMatcher::new(k))
                    .collect::<Result<Vec<_>>>()?;
                let exclusions = exclusions
                    .get(name)
                    .map(|phrases| {
                        phrases
                            .iter()
                            .map(|p| PhraseMatcher::new(p))
                            .collect::<Result<Vec<_>>>()
                    })
                    .transpose()?
                    .unwrap_or_default();
                Ok(CategoryMatcher {
                    name: name.clone(),
                    keywords,
                    exclusions,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { categories })
    }
}
