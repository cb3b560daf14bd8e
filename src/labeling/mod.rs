//! Terminal labeling and validation sessions.
//!
//! # Flow
//!
//! 1. **Items**: every row with a non-empty text becomes an [`Item`]; validation
//!    reviews a random sample of them.
//! 2. **Session**: a [`LabelingSession`] tracks the cursor and one judgment per
//!    item; labeling sessions are checkpointed to JSON after every commit.
//! 3. **Shell**: [`shell::run`] reads one command per line and drives the session.
//! 4. **Output**: labels are rewritten after every commit; rejected rows are
//!    written when the validation shell ends.

pub mod session;
pub mod shell;

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use csv::Writer;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::dataset::Dataset;
use crate::error::MinerError;
use session::{discard, Item, LabelingSession};
use shell::{CategoryLabels, CategoryPrompt, Mode, Outcome, Verdict, VerdictPrompt};

pub struct LabelOptions {
    pub input: PathBuf,
    pub column: String,
    pub output: PathBuf,
    pub categories: Vec<String>,
    pub checkpoint: PathBuf,
}

pub struct ValidateOptions {
    pub input: PathBuf,
    pub column: String,
    pub output: PathBuf,
    pub ratio: f64,
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub outcome: Outcome,
    pub reviewed: usize,
    pub total: usize,
    /// Labeled rows written (labeling) or rows rejected (validation).
    pub written: usize,
    pub output: PathBuf,
}

/// Default label output: `<stem>_labeled.csv` next to the input.
pub fn default_label_output(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "reviews".to_string());
    input.with_file_name(format!("{}_labeled.csv", stem))
}

/// One item per row whose `column` cell is non-empty.
pub fn load_items(input: &Path, column: &str) -> Result<Vec<Item>> {
    let data = Dataset::load(input)?;
    let col = data.column(column)?;
    Ok(data
        .texts(col)
        .into_iter()
        .enumerate()
        .filter_map(|(index, text)| text.map(|t| Item::new(index, t)))
        .collect())
}

/// Draw `max(1, floor(len * ratio))` items at random (none from an empty list).
pub fn sample_items(items: &[Item], ratio: f64, seed: Option<u64>) -> Vec<Item> {
    if items.is_empty() {
        return Vec::new();
    }
    let amount = ((items.len() as f64 * ratio) as usize).clamp(1, items.len());
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    rand::seq::index::sample(&mut rng, items.len(), amount)
        .into_iter()
        .map(|i| items[i].clone())
        .collect()
}

/// Write `review,<category...>` with a `0`/`1` flag per category for every
/// labeled item.
pub fn write_labels(
    path: &Path,
    categories: &[String],
    session: &LabelingSession<CategoryLabels>,
) -> Result<usize> {
    let mut writer = create_writer(path)?;
    let mut header = vec!["review".to_string()];
    header.extend(categories.iter().cloned());
    writer.write_record(&header)?;

    let mut written = 0;
    for (item, labels) in session.judged() {
        let mut record = vec![item.text.clone()];
        record.extend(
            categories
                .iter()
                .map(|c| if labels.contains(c) { "1" } else { "0" }.to_string()),
        );
        writer.write_record(&record)?;
        written += 1;
    }
    writer.flush()?;
    Ok(written)
}

/// Write `original_index,review` for every item judged invalid.
pub fn write_rejections(path: &Path, session: &LabelingSession<Verdict>) -> Result<usize> {
    let mut writer = create_writer(path)?;
    writer.write_record(["original_index", "review"])?;

    let mut written = 0;
    for (item, verdict) in session.judged() {
        if *verdict == Verdict::Invalid {
            writer.write_record([item.index.to_string(), item.text.clone()])?;
            written += 1;
        }
    }
    writer.flush()?;
    Ok(written)
}

/// A fresh session rewrites its label file, so refuse one that has data rows.
fn ensure_no_labels(path: &Path) -> Result<()> {
    if path.exists() && !Dataset::load(path)?.is_empty() {
        return Err(MinerError::LabelsExist(path.display().to_string()).into());
    }
    Ok(())
}

fn create_writer(path: &Path) -> Result<Writer<std::fs::File>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    Writer::from_path(path).with_context(|| format!("failed to create {}", path.display()))
}

/// Labeling mode bound to its output files.
struct LabelMode {
    prompt: CategoryPrompt,
    checkpoint: PathBuf,
}

impl Mode for LabelMode {
    type Judgment = CategoryLabels;

    fn prompt(&self) -> String {
        self.prompt.prompt()
    }

    fn parse(&self, line: &str) -> Option<shell::Command<CategoryLabels>> {
        self.prompt.parse(line)
    }

    fn describe(&self, judgment: &CategoryLabels) -> String {
        self.prompt.describe(judgment)
    }

    fn after_commit(&self, session: &LabelingSession<CategoryLabels>) -> Result<()> {
        write_labels(&session.output, &self.prompt.categories, session)?;
        session.save(&self.checkpoint)
    }
}

/// Run (or resume) a labeling session.
///
/// A checkpoint left by another input is never overwritten: the run stops and
/// names the pending input instead.
pub fn run_labeling<R: BufRead, W: Write>(
    opts: &LabelOptions,
    input: R,
    out: W,
) -> Result<SessionSummary> {
    let resumed = LabelingSession::<CategoryLabels>::load_file(&opts.checkpoint)?;

    let mut session = match resumed {
        Some(session) if session.input != opts.input => {
            return Err(MinerError::Checkpoint(format!(
                "{} holds an unfinished session for {}; finish labeling that file or pass --session <file> to label {}",
                opts.checkpoint.display(),
                session.input.display(),
                opts.input.display()
            ))
            .into());
        }
        Some(session) => {
            if session.output != opts.output {
                tracing::warn!(
                    "resumed session keeps writing to {}, not {}",
                    session.output.display(),
                    opts.output.display()
                );
            }
            let (position, total) = session.progress();
            tracing::info!(
                "resuming labeling of {} at review {}/{}",
                opts.input.display(),
                position + 1,
                total
            );
            session
        }
        None => {
            ensure_no_labels(&opts.output)?;
            let mut session = LabelingSession::new(&opts.input, &opts.output);
            session.load(load_items(&opts.input, &opts.column)?)?;
            tracing::info!("{} reviews to label", session.progress().1);
            session
        }
    };

    let mode = LabelMode {
        prompt: CategoryPrompt {
            categories: opts.categories.clone(),
        },
        checkpoint: opts.checkpoint.clone(),
    };
    let outcome = shell::run(&mut session, &mode, input, out)?;
    tracing::debug!("labeling session is {} after the shell", session.state());

    let written = write_labels(&session.output, &opts.categories, &session)?;
    match outcome {
        Outcome::Finished => discard(&opts.checkpoint)?,
        Outcome::Quit => session.save(&opts.checkpoint)?,
    }

    let (reviewed, total) = session.progress();
    Ok(SessionSummary {
        outcome,
        reviewed,
        total,
        written,
        output: session.output.clone(),
    })
}

/// Review a random sample; rows judged invalid go to `opts.output`.
pub fn run_validation<R: BufRead, W: Write>(
    opts: &ValidateOptions,
    input: R,
    out: W,
) -> Result<SessionSummary> {
    let items = load_items(&opts.input, &opts.column)?;
    let sample = sample_items(&items, opts.ratio, opts.seed);
    tracing::info!(
        "{} of {} reviews sampled for validation",
        sample.len(),
        items.len()
    );

    let mut session = LabelingSession::new(&opts.input, &opts.output);
    session.load(sample)?;
    let outcome = shell::run(&mut session, &VerdictPrompt, input, out)?;

    let written = write_rejections(&opts.output, &session)?;
    let (reviewed, total) = session.progress();
    Ok(SessionSummary {
        outcome,
        reviewed,
        total,
        written,
        output: session.output.clone(),
    })
}
