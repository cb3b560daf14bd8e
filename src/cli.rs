use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "review-miner",
    about = "Clean review datasets, extract category keywords, and label the results",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Config file [default: ./.review-miner/config.toml, fallback ~/.config/review-miner/config.toml]
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Debug logging and per-category details
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Warnings only; no progress bars, one summary line
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Drop missing/duplicate reviews, normalize text, detect and translate languages
    Clean(CleanArgs),
    /// Match reviews against category keywords and exclusion phrases
    Extract(ExtractArgs),
    /// Label reviews with categories in an interactive, resumable session
    Label(LabelArgs),
    /// Review a random sample and export the rows judged invalid
    Validate(ValidateArgs),
}

#[derive(Args, Debug)]
pub struct CleanArgs {
    /// Raw review CSV
    #[arg(long)]
    pub input: PathBuf,

    /// Text column to clean [default: from config, "review"]
    #[arg(long)]
    pub col: Option<String>,

    /// Cleaned CSV to write
    #[arg(long)]
    pub output: PathBuf,

    /// Parallel workers [default: NUM_THREADS, then config, then 4]
    #[arg(long)]
    pub workers: Option<usize>,

    /// Detect languages but do not translate
    #[arg(long)]
    pub no_translate: bool,
}

#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Cleaned review CSV
    #[arg(long)]
    pub input: PathBuf,

    /// Text column to match [default: from config, "review"]
    #[arg(long)]
    pub col: Option<String>,

    /// Match CSV to write
    #[arg(long)]
    pub output: PathBuf,

    /// Id column [default: from config, "id"]
    #[arg(long)]
    pub id_col: Option<String>,

    /// Category → keywords JSON [default: from config, data/categories.json]
    #[arg(long, value_name = "FILE")]
    pub categories: Option<PathBuf>,

    /// Category → exclusion phrases JSON [default: from config, data/exclusions.json]
    #[arg(long, value_name = "FILE")]
    pub exclusions: Option<PathBuf>,

    /// Parallel workers [default: NUM_THREADS, then config, then 4]
    #[arg(long)]
    pub workers: Option<usize>,

    /// Sort matches by id, then category
    #[arg(long)]
    pub sorted: bool,
}

#[derive(Args, Debug)]
pub struct LabelArgs {
    /// Review CSV to label
    #[arg(long)]
    pub input: PathBuf,

    /// Text column [default: from config, "review"]
    #[arg(long)]
    pub col: Option<String>,

    /// Label CSV [default: <input stem>_labeled.csv next to the input]
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Category to offer (repeatable) [default: from config, handicap/pet/child]
    #[arg(long = "category", value_name = "NAME")]
    pub categories: Vec<String>,

    /// Session checkpoint file [default: <session_dir>/label_session.json]
    #[arg(long, value_name = "FILE")]
    pub session: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Review CSV to sample from
    #[arg(long)]
    pub input: PathBuf,

    /// Text column [default: from config, "review"]
    #[arg(long)]
    pub col: Option<String>,

    /// CSV receiving the rows judged invalid
    #[arg(long)]
    pub output: PathBuf,

    /// Seed for a reproducible sample
    #[arg(long)]
    pub seed: Option<u64>,
}
