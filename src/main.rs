//! `review-miner`: clean review datasets, extract category keywords, and label the results.
//!
//! # Flow
//! 1. Load `.env`, parse CLI arguments ([`cli`]), and initialize logging.
//! 2. Load config ([`config::load_config`]) and resolve the worker count
//!    ([`config::resolve_workers`]: flag, `NUM_THREADS`, config, 4).
//! 3. Run the subcommand:
//!    - `clean` → [`pipeline::run_clean`]: missing/duplicate removal, [`text::normalizer`],
//!      [`language`] detection and translation.
//!    - `extract` → [`pipeline::run_extract`]: [`text::stopwords`], [`text::lemma`],
//!      [`keywords`] extraction.
//!    - `label` / `validate` → [`labeling`] shells on stdin/stdout.
//! 4. Render the summary ([`report::terminal`]).

mod cli;
mod config;
mod dataset;
mod error;
mod keywords;
mod labeling;
mod language;
mod models;
mod pipeline;
mod report;
mod text;
mod workers;

use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{CleanArgs, Cli, Command, ExtractArgs, LabelArgs, ValidateArgs};
use config::{load_config, resolve_workers, Config, WORKERS_ENV};
use labeling::{default_label_output, run_labeling, run_validation, LabelOptions, ValidateOptions};
use language::translate::GoogleTranslator;
use pipeline::{run_clean, run_extract, CleanOptions, ExtractOptions};
use text::lemma::SnowballLemmatizer;

const SESSION_FILE: &str = "label_session.json";

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let work_dir = std::env::current_dir()?;
    let config = load_config(&work_dir, cli.config.as_deref())?;

    match cli.command {
        Command::Clean(args) => clean(args, &config, cli.quiet).await,
        Command::Extract(args) => extract(args, &config, cli.verbose, cli.quiet),
        Command::Label(args) => label(args, &config),
        Command::Validate(args) => validate(args, &config),
    }
}

/// `RUST_LOG` wins over `-v` / `-q`. Logs go to stderr so reports and prompts
/// own stdout.
fn init_logging(verbose: bool, quiet: bool) {
    let level = if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,review_miner={}", level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn workers(flag: Option<usize>, config: &Config) -> Result<usize> {
    let env_value = std::env::var(WORKERS_ENV).ok();
    let workers = resolve_workers(flag, env_value.as_deref(), config)?;
    tracing::debug!("using {} workers", workers);
    Ok(workers)
}

async fn clean(args: CleanArgs, config: &Config, quiet: bool) -> Result<()> {
    let opts = CleanOptions {
        workers: workers(args.workers, config)?,
        input: args.input,
        output: args.output,
        column: args.col.unwrap_or_else(|| config.columns.text.clone()),
        target_lang: config.target_lang.clone(),
        keep_chars: config.keep_chars.clone(),
        quiet,
    };

    let translator = if config.translation.enabled && !args.no_translate {
        Some(GoogleTranslator::new(
            &config.translation.endpoint,
            &config.target_lang,
            Duration::from_secs(config.translation.timeout_secs),
        )?)
    } else {
        None
    };

    let counts = run_clean(&opts, translator.as_ref()).await?;
    report::terminal::render_clean(&counts, &opts.input, &opts.output, quiet);
    Ok(())
}

fn extract(args: ExtractArgs, config: &Config, verbose: bool, quiet: bool) -> Result<()> {
    let opts = ExtractOptions {
        workers: workers(args.workers, config)?,
        input: args.input,
        output: args.output,
        column: args.col.unwrap_or_else(|| config.columns.text.clone()),
        id_column: args.id_col.unwrap_or_else(|| config.columns.id.clone()),
        categories: args
            .categories
            .unwrap_or_else(|| config.keywords.categories.clone()),
        exclusions: args
            .exclusions
            .unwrap_or_else(|| config.keywords.exclusions.clone()),
        sorted: args.sorted,
        quiet,
    };

    let summary = run_extract(&opts, &SnowballLemmatizer::english())?;
    report::terminal::render_extract(&summary, &opts.input, &opts.output, verbose, quiet);
    Ok(())
}

fn label(args: LabelArgs, config: &Config) -> Result<()> {
    let categories = if args.categories.is_empty() {
        config.labeling.categories.clone()
    } else {
        args.categories
    };
    let opts = LabelOptions {
        output: args
            .output
            .unwrap_or_else(|| default_label_output(&args.input)),
        checkpoint: args
            .session
            .unwrap_or_else(|| config.labeling.session_dir.join(SESSION_FILE)),
        column: args.col.unwrap_or_else(|| config.columns.text.clone()),
        input: args.input,
        categories,
    };

    let stdin = std::io::stdin();
    let summary = run_labeling(&opts, stdin.lock(), std::io::stdout())?;
    report::terminal::render_session("label", &summary);
    Ok(())
}

fn validate(args: ValidateArgs, config: &Config) -> Result<()> {
    let opts = ValidateOptions {
        input: args.input,
        column: args.col.unwrap_or_else(|| config.columns.text.clone()),
        output: args.output,
        ratio: config.labeling.validation_ratio,
        seed: args.seed,
    };

    let stdin = std::io::stdin();
    let summary = run_validation(&opts, stdin.lock(), std::io::stdout())?;
    report::terminal::render_session("validate", &summary);
    Ok(())
}
