use thiserror::Error;

/// Conditions that abort a run before any row is processed.
///
/// Per-row problems (missing text, duplicates, translation failures) are never
/// represented here: they are counted or turned into marker values instead.
#[derive(Error, Debug)]
pub enum MinerError {
    #[error("column '{column}' not found in {file} (available: {available})")]
    MissingColumn {
        column: String,
        file: String,
        available: String,
    },

    #[error("category table {0} defines no categories")]
    EmptyCategoryTable(String),

    #[error("invalid phrase table {file}: {reason}")]
    InvalidPhraseTable { file: String, reason: String },

    #[error("row at line {line} of {file} has {cells} cells but the header has {columns}")]
    RaggedRow {
        file: String,
        line: u64,
        cells: usize,
        columns: usize,
    },

    #[error("worker count must be at least 1 (got {0})")]
    InvalidWorkers(usize),

    #[error("checkpoint error: {0}")]
    Checkpoint(String),

    #[error("{0} already holds labels; pass another --output or remove it")]
    LabelsExist(String),

    #[error("cannot {action} a labeling session that is {state}")]
    InvalidTransition { action: &'static str, state: String },
}
