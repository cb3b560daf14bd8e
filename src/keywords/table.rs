use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};

use crate::error::MinerError;

/// Category name → ordered, de-duplicated phrases.
pub type PhraseTable = BTreeMap<String, Vec<String>>;

/// Parse a phrase table from JSON text (`{"category": ["phrase", ...]}`).
///
/// Any non-string phrase or non-object root is rejected; duplicate phrases
/// within a category are dropped keeping the first occurrence.
pub fn parse_phrase_table(json: &str, source: &str) -> Result<PhraseTable> {
    let raw: BTreeMap<String, Vec<String>> =
        serde_json::from_str(json).map_err(|e| MinerError::InvalidPhraseTable {
            file: source.to_string(),
            reason: e.to_string(),
        })?;

    Ok(raw
        .into_iter()
        .map(|(category, phrases)| {
            let mut unique: Vec<String> = Vec::with_capacity(phrases.len());
            for phrase in phrases {
                if !phrase.trim().is_empty() && !unique.contains(&phrase) {
                    unique.push(phrase);
                }
            }
            (category, unique)
        })
        .collect())
}

/// Load the category table; an empty table aborts the run.
pub fn load_categories(path: &Path) -> Result<PhraseTable> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read category table {}", path.display()))?;
    let table = parse_phrase_table(&content, &path.display().to_string())?;
    if table.is_empty() {
        return Err(MinerError::EmptyCategoryTable(path.display().to_string()).into());
    }
    Ok(table)
}

/// Load the exclusion table. A missing file means no exclusions at all.
pub fn load_exclusions(path: &Path) -> Result<PhraseTable> {
    if !path.exists() {
        tracing::info!("no exclusion table at {}, continuing without exclusions", path.display());
        return Ok(PhraseTable::new());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read exclusion table {}", path.display()))?;
    parse_phrase_table(&content, &path.display().to_string())
}

/// Exclusion categories that have no counterpart in the category table.
pub fn inert_exclusions<'a>(categories: &PhraseTable, exclusions: &'a PhraseTable) -> Vec<&'a str> {
    exclusions
        .keys()
        .filter(|k| !categories.contains_key(*k))
        .map(String::as_str)
        .collect()
}
