use std::path::Path;

use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use crate::labeling::shell::Outcome;
use crate::labeling::SessionSummary;
use crate::models::StageCounts;
use crate::pipeline::ExtractSummary;

fn banner(title: &str, input: &Path) {
    println!(
        "\n {} v{}  {}",
        "review-miner".bold(),
        env!("CARGO_PKG_VERSION"),
        title
    );
    println!(" Input: {}\n", input.display());
}

fn summary_box(lines: &[String]) {
    println!(" ┌────────────────────────────────────────────────────┐");
    println!(" │  {:<48} │", "SUMMARY".bold());
    for line in lines {
        println!(" │  {:<48} │", line);
    }
    println!(" └────────────────────────────────────────────────────┘\n");
}

/// Summary of a `clean` run.
pub fn render_clean(counts: &StageCounts, input: &Path, output: &Path, quiet: bool) {
    if quiet {
        println!(
            "Loaded: {}  Written: {}  Translated: {}  Failed: {}",
            counts.rows_loaded,
            counts.rows_written.to_string().green(),
            counts.translated,
            counts.translation_failures.to_string().red(),
        );
        return;
    }

    banner("clean", input);
    summary_box(&[
        format!("Rows loaded          : {:>6}", counts.rows_loaded),
        format!("Missing dropped      : {:>6}", counts.missing_dropped),
        format!("Duplicates dropped   : {:>6}", counts.duplicates_dropped),
        format!("Not target language  : {:>6}", counts.non_target_language),
        format!("Translated           : {:>6}", counts.translated),
        format!("Translation failures : {:>6}", counts.translation_failures),
        format!("Rows written         : {:>6}", counts.rows_written),
    ]);

    if counts.translation_failures > 0 {
        println!(
            " {} {} rows carry an [ERROR: ...] marker instead of a translation\n",
            "[WARN]".yellow().bold(),
            counts.translation_failures
        );
    }
    println!(" {} {}\n", "→".cyan(), output.display());
}

/// Summary of an `extract` run, with a per-category table.
pub fn render_extract(summary: &ExtractSummary, input: &Path, output: &Path, verbose: bool, quiet: bool) {
    let counts = &summary.counts;
    if quiet {
        println!(
            "Rows: {}  Categories: {}  Matches: {}",
            counts.rows_loaded,
            counts.categories,
            counts.matches.to_string().green(),
        );
        return;
    }

    banner("extract", input);
    summary_box(&[
        format!("Rows loaded          : {:>6}", counts.rows_loaded),
        format!("Categories           : {:>6}", counts.categories),
        format!("Matches              : {:>6}", counts.matches),
    ]);

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Category").add_attribute(Attribute::Bold),
            Cell::new("Matches").add_attribute(Attribute::Bold),
        ]);

    for (category, n) in &summary.per_category {
        if *n == 0 && !verbose {
            continue;
        }
        let color = if *n == 0 { Color::DarkGrey } else { Color::Green };
        table.add_row(vec![
            Cell::new(category),
            Cell::new(n).fg(color).set_alignment(CellAlignment::Right),
        ]);
    }

    println!("{}", table);
    println!(" {} {}\n", "→".cyan(), output.display());
}

/// One-line status after a labeling or validation shell.
pub fn render_session(kind: &str, summary: &SessionSummary) {
    let status = match summary.outcome {
        Outcome::Finished => "finished".green(),
        Outcome::Quit => "paused".yellow(),
    };
    println!(
        "\n {} {} {}/{} reviewed, {} rows written to {}",
        kind.bold(),
        status,
        summary.reviewed,
        summary.total,
        summary.written,
        summary.output.display()
    );
}
