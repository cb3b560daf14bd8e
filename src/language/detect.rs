use indicatif::ProgressBar;
use rayon::prelude::*;
use rayon::ThreadPool;
use whatlang::Lang;

/// Identify the language of `text`.
///
/// Returns `None` for blank text or when no language can be identified.
/// Codes are ISO 639-1 where one exists, otherwise ISO 639-3.
pub fn detect_language(text: &str) -> Option<String> {
    if text.trim().is_empty() {
        return None;
    }
    whatlang::detect(text).map(|info| iso_code(info.lang()).to_string())
}

/// Detect every row on `pool`; output order matches input order.
pub fn detect_languages(
    texts: &[Option<String>],
    pool: &ThreadPool,
    progress: &ProgressBar,
) -> Vec<Option<String>> {
    pool.install(|| {
        texts
            .par_iter()
            .map(|text| {
                let lang = text.as_deref().and_then(detect_language);
                progress.inc(1);
                lang
            })
            .collect()
    })
}

fn iso_code(lang: Lang) -> &'static str {
    match lang {
        Lang::Eng => "en",
        Lang::Fra => "fr",
        Lang::Deu => "de",
        Lang::Spa => "es",
        Lang::Ita => "it",
        Lang::Por => "pt",
        Lang::Nld => "nl",
        Lang::Rus => "ru",
        Lang::Ukr => "uk",
        Lang::Pol => "pl",
        Lang::Ces => "cs",
        Lang::Slk => "sk",
        Lang::Slv => "sl",
        Lang::Hrv => "hr",
        Lang::Srp => "sr",
        Lang::Bul => "bg",
        Lang::Ron => "ro",
        Lang::Hun => "hu",
        Lang::Ell => "el",
        Lang::Tur => "tr",
        Lang::Dan => "da",
        Lang::Swe => "sv",
        Lang::Nob => "nb",
        Lang::Fin => "fi",
        Lang::Est => "et",
        Lang::Lav => "lv",
        Lang::Lit => "lt",
        Lang::Afr => "af",
        Lang::Lat => "la",
        Lang::Epo => "eo",
        Lang::Ara => "ar",
        Lang::Heb => "he",
        Lang::Pes => "fa",
        Lang::Hin => "hi",
        Lang::Urd => "ur",
        Lang::Ben => "bn",
        Lang::Tam => "ta",
        Lang::Tel => "te",
        Lang::Mar => "mr",
        Lang::Jpn => "ja",
        Lang::Kor => "ko",
        Lang::Cmn => "zh",
        Lang::Tha => "th",
        Lang::Vie => "vi",
        Lang::Ind => "id",
        Lang::Tgl => "tl",
        other => other.code(),
    }
}
