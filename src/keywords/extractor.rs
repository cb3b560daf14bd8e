use std::cmp::Ordering;

use indicatif::ProgressBar;
use rayon::prelude::*;
use rayon::ThreadPool;

use super::matcher::{CategoryMatcher, MatcherTable};
use crate::models::{MatchResult, Row};

/// Scan every row against every category.
///
/// Categories are processed in parallel on `pool`; each category scans all rows
/// in input order. Results are grouped by category (table order) and keep row
/// order within a category. Rows without usable text never match.
pub fn extract(
    rows: &[Row],
    table: &MatcherTable,
    pool: &ThreadPool,
    progress: &ProgressBar,
) -> Vec<MatchResult> {
    let per_category: Vec<Vec<MatchResult>> = pool.install(|| {
        table
            .categories
            .par_iter()
            .map(|category| {
                let hits = scan_category(category, rows);
                progress.inc(1);
                hits
            })
            .collect()
    });

    per_category.into_iter().flatten().collect()
}

fn scan_category(category: &CategoryMatcher, rows: &[Row]) -> Vec<MatchResult> {
    rows.iter()
        .filter_map(|row| {
            let text = row.usable_text()?;
            let found = category.matched_keywords(text);
            if found.is_empty() {
                return None;
            }
            Some(MatchResult {
                id: row.id.clone(),
                review: text.to_string(),
                keywords_found: found.join(", "),
                category: category.name.clone(),
            })
        })
        .collect()
}

/// Stable sort by (id, category). Integer ids sort numerically and before
/// any non-integer id.
pub fn sort_matches(matches: &mut [MatchResult]) {
    matches.sort_by(|a, b| compare_ids(&a.id, &b.id).then_with(|| a.category.cmp(&b.category)));
}

fn compare_ids(a: &str, b: &str) -> Ordering {
    match (a.parse::<i64>(), b.parse::<i64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keywords::table::parse_phrase_table;
    use crate::workers::worker_pool;

    fn run(rows: &[Row], categories: &str, exclusions: &str, workers: usize) -> Vec<MatchResult> {
        let cats = parse_phrase_table(categories, "categories").unwrap();
        let excl = parse_phrase_table(exclusions, "exclusions").unwrap();
        let table = MatcherTable::build(&cats, &excl).unwrap();
        let pool = worker_pool(workers).unwrap();
        extract(rows, &table, &pool, &ProgressBar::hidden())
    }

    #[test]
    fn test_exclusion_precedence() {
        let rows = vec![
            Row::new("1", "the room was not quiet"),
            Row::new("2", "the room was very quiet"),
        ];
        let out = run(&rows, r#"{"quiet": ["quiet"]}"#, r#"{"quiet": ["not quiet"]}"#, 2);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "2");
        assert_eq!(out[0].keywords_found, "quiet");
        assert_eq!(out[0].category, "quiet");
    }

    #[test]
    fn test_original_text_is_reported() {
        let rows = vec![Row::new("7", "not quiet street but quiet room")];
        let out = run(&rows, r#"{"quiet": ["quiet"]}"#, r#"{"quiet": ["not quiet"]}"#, 1);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].review, "not quiet street but quiet room");
    }

    #[test]
    fn test_row_order_within_category() {
        let rows = vec![
            Row::new("1", "a dog"),
            Row::new("2", "a cat"),
            Row::new("3", "a dog"),
        ];
        let out = run(&rows, r#"{"pet": ["dog"]}"#, "{}", 4);
        let ids: Vec<&str> = out
            .iter()
            .filter(|m| m.category == "pet")
            .map(|m| m.id.as_str())
            .collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[test]
    fn test_missing_and_blank_text_never_match() {
        let rows = vec![
            Row { id: "1".to_string(), text: None },
            Row::new("2", ""),
            Row::new("3", "   \t"),
        ];
        let out = run(&rows, r#"{"pet": ["dog", " "], "any": ["a"]}"#, "{}", 2);
        assert!(out.is_empty());
    }

    #[test]
    fn test_empty_keyword_list_matches_nothing() {
        let rows = vec![Row::new("1", "dog cat child wheelchair")];
        let out = run(&rows, r#"{"pet": [], "child": ["child"]}"#, "{}", 2);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].category, "child");
    }

    #[test]
    fn test_multiple_categories_per_row() {
        let rows = vec![Row::new("1", "we brought our dog and the kid loved the pet-friendly pool")];
        let mut out = run(
            &rows,
            r#"{"pet": ["dog", "pet friendly", "cat"], "child": ["kid"]}"#,
            "{}",
            2,
        );
        sort_matches(&mut out);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].category, "child");
        assert_eq!(out[1].category, "pet");
        assert_eq!(out[1].keywords_found, "dog, pet friendly");
    }

    #[test]
    fn test_sort_is_numeric_for_integer_ids() {
        let mk = |id: &str, cat: &str| MatchResult {
            id: id.to_string(),
            review: String::new(),
            keywords_found: String::new(),
            category: cat.to_string(),
        };
        let mut matches = vec![mk("10", "b"), mk("9", "b"), mk("10", "a"), mk("x", "a")];
        sort_matches(&mut matches);
        let order: Vec<(&str, &str)> = matches
            .iter()
            .map(|m| (m.id.as_str(), m.category.as_str()))
            .collect();
        assert_eq!(order, vec![("9", "b"), ("10", "a"), ("10", "b"), ("x", "a")]);
    }

    #[test]
    fn test_single_worker_equals_many() {
        let rows: Vec<Row> = (0..50)
            .map(|i| Row::new(i.to_string(), if i % 3 == 0 { "dog" } else { "kid" }))
            .collect();
        let cats = r#"{"pet": ["dog"], "child": ["kid"], "none": ["zebra"]}"#;
        assert_eq!(run(&rows, cats, "{}", 1), run(&rows, cats, "{}", 8));
    }
}
