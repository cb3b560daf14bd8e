//! Language routing: detect each row's language and translate the rows that are
//! not in the target language.
//!
//! - [`detect`]: `whatlang`-backed identification, fanned out on a rayon pool.
//! - [`translate`]: the [`Translator`](translate::Translator) seam and the
//!   HTTP backend.
//!
//! Translation failures never abort the batch: the row text is replaced by an
//! `[ERROR: ...]` marker and the run continues.

pub mod detect;
pub mod translate;

use futures::stream::{self, StreamExt};
use indicatif::ProgressBar;

use crate::models::Routing;
use translate::Translator;

/// Decide what the translation stage does with one row.
pub fn route(text: Option<&str>, detected: Option<&str>, target: &str) -> Routing {
    match (text, detected) {
        (None, _) => Routing::Empty,
        (Some(t), _) if t.trim().is_empty() => Routing::Empty,
        (Some(_), None) => Routing::Undetected,
        (Some(_), Some(lang)) if lang.eq_ignore_ascii_case(target) => Routing::Target,
        (Some(_), Some(_)) => Routing::Foreign,
    }
}

/// Route every row; also returns how many rows are in a non-target language.
pub fn route_all(
    texts: &[Option<String>],
    detected: &[Option<String>],
    target: &str,
) -> (Vec<Routing>, usize) {
    let routes: Vec<Routing> = texts
        .iter()
        .zip(detected)
        .map(|(text, lang)| route(text.as_deref(), lang.as_deref(), target))
        .collect();
    let foreign = routes
        .iter()
        .filter(|r| matches!(r, Routing::Foreign))
        .count();
    (routes, foreign)
}

/// What the translation stage did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranslationReport {
    pub attempted: usize,
    pub failed: usize,
}

/// Marker written in place of a row whose translation failed.
pub fn error_marker(err: &anyhow::Error) -> String {
    format!("[ERROR: {}]", err)
}

/// Translate every [`Routing::Foreign`] row, at most `workers` calls in flight.
///
/// Results are written back by row index, so the output order always matches
/// `texts` whatever order the calls complete in.
pub async fn translate_rows<T: Translator>(
    texts: &mut [Option<String>],
    routes: &[Routing],
    translator: &T,
    workers: usize,
    progress: &ProgressBar,
) -> TranslationReport {
    let jobs: Vec<(usize, String)> = texts
        .iter()
        .zip(routes)
        .enumerate()
        .filter_map(|(idx, (text, routing))| match routing {
            Routing::Foreign => text.clone().map(|t| (idx, t)),
            _ => None,
        })
        .collect();

    let mut report = TranslationReport {
        attempted: jobs.len(),
        failed: 0,
    };

    let outcomes: Vec<(usize, anyhow::Result<String>)> = stream::iter(jobs)
        .map(|(idx, text)| async move { (idx, translator.translate(&text).await) })
        .buffer_unordered(workers.max(1))
        .inspect(|_| progress.inc(1))
        .collect()
        .await;

    for (idx, outcome) in outcomes {
        let replacement = match outcome {
            Ok(translated) => translated,
            Err(err) => {
                tracing::debug!("translation of row {} failed: {:#}", idx, err);
                report.failed += 1;
                error_marker(&err)
            }
        };
        texts[idx] = Some(replacement);
    }

    report
}
