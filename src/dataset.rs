use std::collections::HashSet;
use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use csv::{ReaderBuilder, Writer};

use crate::error::MinerError;
use crate::models::{MatchResult, Row};

/// Header of the review column in match output.
pub const REVIEW_HEADER: &str = "review";
pub const KEYWORDS_HEADER: &str = "keywords_found";
pub const CATEGORY_HEADER: &str = "category";

/// An in-memory CSV table. Empty cells count as missing values.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub source: String,
    pub headers: Vec<String>,
    pub records: Vec<Vec<String>>,
}

impl Dataset {
    /// Read a CSV file with a header row. Short records are padded with empty
    /// cells so every record has one cell per header; a record with more cells
    /// than the header is a [`MinerError::RaggedRow`].
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
        let mut reader = ReaderBuilder::new().flexible(true).from_reader(file);

        let headers: Vec<String> = reader
            .headers()
            .with_context(|| format!("failed to read header of {}", path.display()))?
            .iter()
            .map(str::to_string)
            .collect();

        let mut records = Vec::new();
        for result in reader.records() {
            let record = result.with_context(|| format!("malformed row in {}", path.display()))?;
            if record.len() > headers.len() {
                return Err(MinerError::RaggedRow {
                    file: path.display().to_string(),
                    line: record.position().map_or(0, |p| p.line()),
                    cells: record.len(),
                    columns: headers.len(),
                }
                .into());
            }
            let mut cells: Vec<String> = record.iter().map(str::to_string).collect();
            cells.resize(headers.len(), String::new());
            records.push(cells);
        }

        Ok(Self {
            source: path.display().to_string(),
            headers,
            records,
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Index of `name`, or a fatal [`MinerError::MissingColumn`].
    pub fn column(&self, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| {
                MinerError::MissingColumn {
                    column: name.to_string(),
                    file: self.source.clone(),
                    available: self.headers.join(", "),
                }
                .into()
            })
    }

    /// Values of column `col`; empty cells become `None`.
    pub fn texts(&self, col: usize) -> Vec<Option<String>> {
        self.records
            .iter()
            .map(|r| Some(r[col].clone()).filter(|v| !v.is_empty()))
            .collect()
    }

    /// Overwrite column `col` with `values` (one per record).
    pub fn set_column(&mut self, col: usize, values: Vec<Option<String>>) {
        for (record, value) in self.records.iter_mut().zip(values) {
            record[col] = value.unwrap_or_default();
        }
    }

    /// Append a column, or overwrite it when a column with that name exists.
    pub fn upsert_column(&mut self, name: &str, values: Vec<Option<String>>) {
        match self.headers.iter().position(|h| h == name) {
            Some(col) => self.set_column(col, values),
            None => {
                self.headers.push(name.to_string());
                for (record, value) in self.records.iter_mut().zip(values) {
                    record.push(value.unwrap_or_default());
                }
            }
        }
    }

    /// Drop records whose `col` cell is empty; returns how many were dropped.
    pub fn drop_missing(&mut self, col: usize) -> usize {
        let before = self.records.len();
        self.records.retain(|r| !r[col].is_empty());
        before - self.records.len()
    }

    /// Keep the first record of every distinct combination of `cols`; returns
    /// how many records were dropped.
    pub fn dedup_by(&mut self, cols: &[usize]) -> usize {
        let before = self.records.len();
        let mut seen: HashSet<Vec<String>> = HashSet::new();
        self.records
            .retain(|r| seen.insert(cols.iter().map(|&c| r[c].clone()).collect()));
        before - self.records.len()
    }

    /// Extraction rows built from an id column and a text column.
    pub fn rows(&self, id_col: usize, text_col: usize) -> Vec<Row> {
        self.records
            .iter()
            .map(|r| Row::new(r[id_col].clone(), r[text_col].clone()))
            .collect()
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let mut writer = create_writer(path)?;
        writer.write_record(&self.headers)?;
        for record in &self.records {
            writer.write_record(record)?;
        }
        writer.flush()?;
        Ok(())
    }
}

fn create_writer(path: &Path) -> Result<Writer<File>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    Ok(Writer::from_writer(file))
}

/// Write match results as `[<id_header>, review, keywords_found, category]`.
/// With no matches only the header row is written.
pub fn write_matches(path: &Path, id_header: &str, matches: &[MatchResult]) -> Result<()> {
    let mut writer = create_writer(path)?;
    writer.write_record([id_header, REVIEW_HEADER, KEYWORDS_HEADER, CATEGORY_HEADER])?;
    for m in matches {
        writer.write_record([&m.id, &m.review, &m.keywords_found, &m.category])?;
    }
    writer.flush()?;
    Ok(())
}

/// Read a file produced by [`write_matches`]. The id column is the first column
/// whatever its header.
#[cfg(test)]
pub fn read_matches(path: &Path) -> Result<Vec<MatchResult>> {
    let data = Dataset::load(path)?;
    let id = 0;
    let review = data.column(REVIEW_HEADER)?;
    let keywords = data.column(KEYWORDS_HEADER)?;
    let category = data.column(CATEGORY_HEADER)?;

    Ok(data
        .records
        .iter()
        .map(|r| MatchResult {
            id: r[id].clone(),
            review: r[review].clone(),
            keywords_found: r[keywords].clone(),
            category: r[category].clone(),
        })
        .collect())
}
