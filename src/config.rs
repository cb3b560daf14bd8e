use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::error::MinerError;

/// Environment variable holding the default worker count.
pub const WORKERS_ENV: &str = "NUM_THREADS";

const DEFAULT_WORKERS: usize = 4;

/// Root configuration structure, deserialized from `.review-miner/config.toml`.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Config {
    /// Worker count used when neither `--workers` nor `NUM_THREADS` is set.
    pub workers: usize,
    /// Language every row should end up in (ISO 639-1, e.g. `"en"`).
    pub target_lang: String,
    /// Extra characters the normalizer keeps besides word characters and whitespace.
    pub keep_chars: String,
    pub columns: ColumnsConfig,
    pub keywords: KeywordsConfig,
    pub translation: TranslationConfig,
    pub labeling: LabelingConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ColumnsConfig {
    pub text: String,
    pub id: String,
}

/// Locations of the category and exclusion phrase tables.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct KeywordsConfig {
    pub categories: PathBuf,
    pub exclusions: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TranslationConfig {
    pub enabled: bool,
    pub endpoint: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LabelingConfig {
    /// Categories offered by `label` when none are given on the command line.
    pub categories: Vec<String>,
    /// Fraction of rows sampled by `validate`.
    pub validation_ratio: f64,
    pub session_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            workers: DEFAULT_WORKERS,
            target_lang: "en".to_string(),
            keep_chars: "-".to_string(),
            columns: ColumnsConfig::default(),
            keywords: KeywordsConfig::default(),
            translation: TranslationConfig::default(),
            labeling: LabelingConfig::default(),
        }
    }
}

impl Default for ColumnsConfig {
    fn default() -> Self {
        ColumnsConfig {
            text: "review".to_string(),
            id: "id".to_string(),
        }
    }
}

impl Default for KeywordsConfig {
    fn default() -> Self {
        KeywordsConfig {
            categories: PathBuf::from("data/categories.json"),
            exclusions: PathBuf::from("data/exclusions.json"),
        }
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        TranslationConfig {
            enabled: true,
            endpoint: "https://translate.googleapis.com/translate_a/single".to_string(),
            timeout_secs: 10,
        }
    }
}

impl Default for LabelingConfig {
    fn default() -> Self {
        LabelingConfig {
            categories: vec!["handicap".to_string(), "pet".to_string(), "child".to_string()],
            validation_ratio: 0.1,
            session_dir: PathBuf::from(".review-miner"),
        }
    }
}

/// Load the configuration, searching in order:
///
/// 1. `config_override`, the path passed via `--config`
/// 2. `./.review-miner/config.toml`
/// 3. `~/.config/review-miner/config.toml`
/// 4. Built-in [`Config::default`]
pub fn load_config(work_dir: &Path, config_override: Option<&Path>) -> Result<Config> {
    if let Some(path) = config_override {
        return read_config(path);
    }

    let local_config = work_dir.join(".review-miner").join("config.toml");
    if local_config.exists() {
        return read_config(&local_config);
    }

    if let Some(home) = dirs::home_dir() {
        let home_config = home
            .join(".config")
            .join("review-miner")
            .join("config.toml");
        if home_config.exists() {
            return read_config(&home_config);
        }
    }

    Ok(Config::default())
}

fn read_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("invalid config {}", path.display()))
}

/// Resolve the worker count: CLI flag, then `NUM_THREADS`, then the config file.
///
/// An unparsable `NUM_THREADS` value is ignored with a warning.
pub fn resolve_workers(
    flag: Option<usize>,
    env_value: Option<&str>,
    config: &Config,
) -> Result<usize> {
    let from_env = env_value.and_then(|raw| match raw.trim().parse::<usize>() {
        Ok(n) => Some(n),
        Err(_) => {
            tracing::warn!("ignoring {}={:?}: not a number", WORKERS_ENV, raw);
            None
        }
    });

    let workers = flag.or(from_env).unwrap_or(config.workers);
    if workers == 0 {
        return Err(MinerError::InvalidWorkers(workers).into());
    }
    Ok(workers)
}
