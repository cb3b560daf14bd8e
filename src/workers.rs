//! Bounded fan-out helpers shared by the CPU-bound stages.

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::ThreadPool;

use crate::error::MinerError;

/// Build a dedicated rayon pool with exactly `workers` threads.
pub fn worker_pool(workers: usize) -> Result<ThreadPool> {
    if workers == 0 {
        return Err(MinerError::InvalidWorkers(workers).into());
    }
    rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("review-miner-{}", i))
        .build()
        .context("failed to start worker pool")
}

/// Progress bar for a fan-out of `len` items; hidden when `quiet`.
pub fn progress_bar(len: usize, message: &str, quiet: bool) -> Result<ProgressBar> {
    if quiet {
        return Ok(ProgressBar::hidden());
    }

    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
            )?
            .progress_chars("#>-"),
    );
    pb.set_message(message.to_string());
    Ok(pb)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_has_requested_threads() {
        let pool = worker_pool(3).unwrap();
        assert_eq!(pool.current_num_threads(), 3);
    }

    #[test]
    fn test_zero_workers_rejected() {
        assert!(worker_pool(0).is_err());
    }

    #[test]
    fn test_quiet_bar_is_hidden() {
        let pb = progress_bar(10, "x", true).unwrap();
        assert!(pb.is_hidden());
    }
}
