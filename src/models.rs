/// A review row as seen by the extraction stage.
///
/// `text` is `None` when the CSV cell was empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub id: String,
    pub text: Option<String>,
}

impl Row {
    /// An empty `text` is stored as missing.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        let text: String = text.into();
        Self {
            id: id.into(),
            text: Some(text).filter(|t| !t.is_empty()),
        }
    }

    /// The row text when it is present and not blank.
    pub fn usable_text(&self) -> Option<&str> {
        self.text.as_deref().filter(|t| !t.trim().is_empty())
    }
}

/// One (row, category) hit produced by the keyword extractor.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub id: String,
    pub review: String,
    pub keywords_found: String,
    pub category: String,
}

/// Outcome of the language router for a single row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Routing {
    /// Text is missing or blank; nothing to detect.
    Empty,
    /// No language could be identified.
    Undetected,
    /// Detected language equals the target.
    Target,
    /// Detected language differs from the target; the row is translated.
    Foreign,
}

/// Counters reported after each pipeline stage.
#[derive(Debug, Clone, Default)]
pub struct StageCounts {
    pub rows_loaded: usize,
    pub missing_dropped: usize,
    pub duplicates_dropped: usize,
    pub non_target_language: usize,
    pub translated: usize,
    pub translation_failures: usize,
    pub categories: usize,
    pub matches: usize,
    pub rows_written: usize,
}
