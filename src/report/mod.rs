//! End-of-run reports.
//!
//! - [`terminal`]: colored summary box and per-category table; respects `--verbose` / `--quiet`.

pub mod terminal;
