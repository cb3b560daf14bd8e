//! Batch pipelines behind the `clean` and `extract` subcommands.
//!
//! Both load the whole CSV, run every stage, and write their output only once
//! all stages succeeded. Per-stage counts are logged and returned for the
//! end-of-run summary.

use std::path::PathBuf;

use anyhow::Result;
use rayon::prelude::*;

use crate::dataset::{self, Dataset};
use crate::keywords::extractor::{self, sort_matches};
use crate::keywords::table::{inert_exclusions, load_categories, load_exclusions};
use crate::keywords::MatcherTable;
use crate::language::detect::detect_languages;
use crate::language::translate::Translator;
use crate::language::{route_all, translate_rows};
use crate::models::{Row, StageCounts};
use crate::text::lemma::{lemmatize_table, Lemmatizer};
use crate::text::normalizer::Normalizer;
use crate::text::stopwords::StopwordFilter;
use crate::workers::{progress_bar, worker_pool};

/// Column added to the cleaned dataset.
pub const DETECTED_LANG_COLUMN: &str = "detected_lang";

pub struct CleanOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    pub column: String,
    pub target_lang: String,
    pub keep_chars: String,
    pub workers: usize,
    pub quiet: bool,
}

/// Drop missing and duplicate reviews, normalize, detect languages, translate
/// non-target rows (when a translator is given), then write the cleaned CSV.
pub async fn run_clean<T: Translator>(
    opts: &CleanOptions,
    translator: Option<&T>,
) -> Result<StageCounts> {
    let normalizer = Normalizer::new(&opts.keep_chars)?;
    let pool = worker_pool(opts.workers)?;

    let mut data = Dataset::load(&opts.input)?;
    let col = data.column(&opts.column)?;
    let mut counts = StageCounts {
        rows_loaded: data.len(),
        ..Default::default()
    };
    tracing::info!(
        "{} loaded: {} rows x {} columns",
        opts.input.display(),
        data.len(),
        data.headers.len()
    );

    counts.missing_dropped = data.drop_missing(col);
    tracing::info!("{} missing reviews dropped", counts.missing_dropped);
    counts.duplicates_dropped = data.dedup_by(&[col]);
    tracing::info!("{} duplicated reviews dropped", counts.duplicates_dropped);
    if data.is_empty() {
        tracing::warn!("no reviews left in {} after cleaning", opts.input.display());
    }

    let pb = progress_bar(data.len(), "normalizing", opts.quiet)?;
    let mut texts: Vec<Option<String>> = pool.install(|| {
        data.texts(col)
            .par_iter()
            .map(|text| {
                let normalized = text.as_deref().map(|t| normalizer.apply(t));
                pb.inc(1);
                normalized
            })
            .collect()
    });
    pb.finish_and_clear();
    tracing::info!("numbers spelled out and special characters removed");

    let pb = progress_bar(texts.len(), "detecting languages", opts.quiet)?;
    let detected = detect_languages(&texts, &pool, &pb);
    pb.finish_and_clear();

    let (routes, foreign) = route_all(&texts, &detected, &opts.target_lang);
    counts.non_target_language = foreign;
    tracing::info!("{} reviews are not in '{}'", foreign, opts.target_lang);

    match translator {
        Some(translator) if foreign > 0 => {
            let pb = progress_bar(foreign, "translating", opts.quiet)?;
            let report = translate_rows(&mut texts, &routes, translator, opts.workers, &pb).await;
            pb.finish_and_clear();

            counts.translated = report.attempted - report.failed;
            counts.translation_failures = report.failed;
            tracing::info!("{} reviews translated to '{}'", counts.translated, opts.target_lang);
            if report.failed > 0 {
                tracing::warn!("{} translations failed and were replaced by an error marker", report.failed);
            }
        }
        Some(_) => {}
        None if foreign > 0 => {
            tracing::info!("translation disabled, {} reviews left as-is", foreign);
        }
        None => {}
    }

    data.set_column(col, texts);
    data.upsert_column(DETECTED_LANG_COLUMN, detected);
    data.write(&opts.output)?;
    counts.rows_written = data.len();
    tracing::info!("cleaned dataset saved to {}", opts.output.display());

    Ok(counts)
}

pub struct ExtractOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    pub column: String,
    pub id_column: String,
    pub categories: PathBuf,
    pub exclusions: PathBuf,
    pub workers: usize,
    pub sorted: bool,
    pub quiet: bool,
}

/// Result of an extraction run.
#[derive(Debug, Clone, Default)]
pub struct ExtractSummary {
    pub counts: StageCounts,
    /// Match count per category, in table order (zero counts included).
    pub per_category: Vec<(String, usize)>,
}

/// Remove stopwords, lemmatize reviews and phrase tables, run the keyword
/// extractor, then write the match CSV.
pub fn run_extract<L: Lemmatizer>(opts: &ExtractOptions, lemmatizer: &L) -> Result<ExtractSummary> {
    let pool = worker_pool(opts.workers)?;

    let data = Dataset::load(&opts.input)?;
    let text_col = data.column(&opts.column)?;
    let id_col = data.column(&opts.id_column)?;
    let mut counts = StageCounts {
        rows_loaded: data.len(),
        ..Default::default()
    };
    tracing::info!(
        "{} loaded: {} rows x {} columns",
        opts.input.display(),
        data.len(),
        data.headers.len()
    );

    let categories = load_categories(&opts.categories)?;
    let exclusions = load_exclusions(&opts.exclusions)?;
    for name in inert_exclusions(&categories, &exclusions) {
        tracing::warn!("exclusions for unknown category '{}' are ignored", name);
    }
    if data.is_empty() {
        tracing::warn!("{} has no reviews to extract from", opts.input.display());
    }
    counts.categories = categories.len();
    tracing::info!("{} categories and their exclusions loaded", categories.len());

    let stopwords = StopwordFilter::english();
    let pb = progress_bar(data.len(), "lemmatizing", opts.quiet)?;
    let rows: Vec<Row> = pool.install(|| {
        data.rows(id_col, text_col)
            .into_par_iter()
            .map(|mut row| {
                row.text = row
                    .text
                    .map(|t| lemmatizer.lemmatize(&stopwords.filter(&t)));
                pb.inc(1);
                row
            })
            .collect()
    });
    pb.finish_and_clear();
    tracing::info!("stopwords removed and reviews lemmatized");

    let table = MatcherTable::build(
        &lemmatize_table(lemmatizer, &categories),
        &lemmatize_table(lemmatizer, &exclusions),
    )?;
    tracing::debug!("{} category matchers compiled", table.categories.len());

    let pb = progress_bar(table.categories.len(), "extracting", opts.quiet)?;
    let mut matches = extractor::extract(&rows, &table, &pool, &pb);
    pb.finish_and_clear();
    if opts.sorted {
        sort_matches(&mut matches);
    }
    counts.matches = matches.len();
    tracing::info!(
        "{} matching reviews across {} categories",
        matches.len(),
        table.categories.len()
    );

    let per_category = table
        .categories
        .iter()
        .map(|c| {
            let n = matches.iter().filter(|m| m.category == c.name).count();
            (c.name.clone(), n)
        })
        .collect();

    dataset::write_matches(&opts.output, &opts.id_column, &matches)?;
    counts.rows_written = matches.len();
    tracing::info!("matches saved to {}", opts.output.display());

    Ok(ExtractSummary {
        counts,
        per_category,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::read_matches;
    use crate::error::MinerError;
    use crate::text::lemma::SnowballLemmatizer;
    use std::path::Path;
    use tempfile::tempdir;

    struct CannedTranslator;

    impl Translator for CannedTranslator {
        async fn translate(&self, _text: &str) -> anyhow::Result<String> {
            Ok("The room was clean and the staff was very kind".to_string())
        }
    }

    const FRENCH: &str = "La chambre était propre et le personnel était très aimable et serviable";

    fn clean_opts(dir: &Path) -> CleanOptions {
        let input = dir.join("raw.csv");
        std::fs::write(
            &input,
            format!(
                "id,review,stars\n\
                 1,\"The room was clean and the staff were very friendly, we stayed 2 nights! See www.hotel.com\",5\n\
                 2,,3\n\
                 3,\"The room was clean and the staff were very friendly, we stayed 2 nights! See www.hotel.com\",5\n\
                 4,{},4\n",
                FRENCH
            ),
        )
        .unwrap();
        CleanOptions {
            input,
            output: dir.join("out").join("clean.csv"),
            column: "review".into(),
            target_lang: "en".into(),
            keep_chars: "-".into(),
            workers: 2,
            quiet: true,
        }
    }

    #[tokio::test]
    async fn test_clean_pipeline() {
        let dir = tempdir().unwrap();
        let opts = clean_opts(dir.path());
        let counts = run_clean(&opts, Some(&CannedTranslator)).await.unwrap();

        assert_eq!(counts.rows_loaded, 4);
        assert_eq!(counts.missing_dropped, 1);
        assert_eq!(counts.duplicates_dropped, 1);
        assert_eq!(counts.non_target_language, 1);
        assert_eq!(counts.translated, 1);
        assert_eq!(counts.rows_written, 2);

        let out = Dataset::load(&opts.output).unwrap();
        assert_eq!(out.headers, vec!["id", "review", "stars", DETECTED_LANG_COLUMN]);
        assert_eq!(
            out.records[0],
            vec![
                "1",
                "The room was clean and the staff were very friendly we stayed two nights See",
                "5",
                "en"
            ]
        );
        assert_eq!(out.records[1][1], "The room was clean and the staff was very kind");
        assert_eq!(out.records[1][3], "fr");
    }

    #[tokio::test]
    async fn test_clean_without_translation_keeps_text() {
        let dir = tempdir().unwrap();
        let opts = clean_opts(dir.path());
        let counts = run_clean::<CannedTranslator>(&opts, None).await.unwrap();

        assert_eq!(counts.non_target_language, 1);
        assert_eq!(counts.translated, 0);
        let out = Dataset::load(&opts.output).unwrap();
        assert_eq!(out.records[1][1], FRENCH);
    }

    #[tokio::test]
    async fn test_clean_missing_column_writes_nothing() {
        let dir = tempdir().unwrap();
        let opts = CleanOptions {
            column: "comment".into(),
            ..clean_opts(dir.path())
        };
        let err = run_clean(&opts, Some(&CannedTranslator)).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<MinerError>(),
            Some(MinerError::MissingColumn { .. })
        ));
        assert!(!opts.output.exists());
    }

    fn extract_opts(dir: &Path, sorted: bool) -> ExtractOptions {
        let input = dir.join("clean.csv");
        std::fs::write(
            &input,
            "id,review\n\
             1,The hotel is pet-friendly and our dog loved it\n\
             2,The room was not quiet at all\n\
             3,Kids loved the playground\n\
             4,\n\
             5,A very quiet room\n",
        )
        .unwrap();
        let categories = dir.join("categories.json");
        std::fs::write(
            &categories,
            r#"{"pet": ["dog", "pet-friendly"], "child": ["kid", "playground"], "quiet": ["quiet"], "spa": []}"#,
        )
        .unwrap();
        let exclusions = dir.join("exclusions.json");
        std::fs::write(&exclusions, r#"{"quiet": ["not quiet"], "ghost": ["boo"]}"#).unwrap();

        ExtractOptions {
            input,
            output: dir.join("matches.csv"),
            column: "review".into(),
            id_column: "id".into(),
            categories,
            exclusions,
            workers: 2,
            sorted,
            quiet: true,
        }
    }

    #[test]
    fn test_extract_pipeline_grouped_by_category() {
        let dir = tempdir().unwrap();
        let opts = extract_opts(dir.path(), false);
        let summary = run_extract(&opts, &SnowballLemmatizer::english()).unwrap();

        assert_eq!(summary.counts.rows_loaded, 5);
        assert_eq!(summary.counts.categories, 4);
        assert_eq!(summary.counts.matches, 3);
        assert_eq!(
            summary.per_category,
            vec![
                ("child".to_string(), 1),
                ("pet".to_string(), 1),
                ("quiet".to_string(), 1),
                ("spa".to_string(), 0),
            ]
        );

        let matches = read_matches(&opts.output).unwrap();
        let pairs: Vec<(&str, &str)> = matches
            .iter()
            .map(|m| (m.id.as_str(), m.category.as_str()))
            .collect();
        assert_eq!(pairs, vec![("3", "child"), ("1", "pet"), ("5", "quiet")]);
        assert!(matches[0].keywords_found.contains("playground"));
        assert!(matches[1].keywords_found.starts_with("dog"));
    }

    #[test]
    fn test_extract_pipeline_sorted() {
        let dir = tempdir().unwrap();
        let opts = extract_opts(dir.path(), true);
        run_extract(&opts, &SnowballLemmatizer::english()).unwrap();

        let ids: Vec<String> = read_matches(&opts.output)
            .unwrap()
            .into_iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(ids, vec!["1", "3", "5"]);
    }

    #[test]
    fn test_extract_rejects_missing_id_column() {
        let dir = tempdir().unwrap();
        let opts = ExtractOptions {
            id_column: "review_id".into(),
            ..extract_opts(dir.path(), false)
        };
        assert!(run_extract(&opts, &SnowballLemmatizer::english()).is_err());
        assert!(!opts.output.exists());
    }
}
