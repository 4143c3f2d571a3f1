//! Per-batch console output

use std::path::Path;

use crate::error::SinkError;
use crate::stats::RunningStatistics;

/// Receives the outcome of every batch the loader attempts.
pub trait Reporter {
    /// Batch persisted; `stats` already includes it.
    fn batch_loaded(&mut self, batch: usize, rows: usize, stats: &RunningStatistics);

    /// Batch rejected by the sink; nothing from it was counted.
    fn batch_failed(&mut self, batch: usize, error: &SinkError);

    fn file_started(&mut self, _path: &Path) {}

    fn file_finished(&mut self, _path: &Path) {}
}

impl<R: Reporter + ?Sized> Reporter for &mut R {
    fn batch_loaded(&mut self, batch: usize, rows: usize, stats: &RunningStatistics) {
        (**self).batch_loaded(batch, rows, stats);
    }

    fn batch_failed(&mut self, batch: usize, error: &SinkError) {
        (**self).batch_failed(batch, error);
    }

    fn file_started(&mut self, path: &Path) {
        (**self).file_started(path);
    }

    fn file_finished(&mut self, path: &Path) {
        (**self).file_finished(path);
    }
}

/// Prints one line per batch plus the statistics snapshot to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn batch_loaded(&mut self, batch: usize, rows: usize, stats: &RunningStatistics) {
        println!("Loaded batch {batch} ({rows} rows)");
        println!("{stats}");
    }

    fn batch_failed(&mut self, batch: usize, error: &SinkError) {
        println!("Failed to store batch {batch}: {error}");
    }

    fn file_started(&mut self, path: &Path) {
        let name = path.file_name().unwrap_or(path.as_os_str());
        println!("Loading {}", name.to_string_lossy());
    }

    fn file_finished(&mut self, _path: &Path) {
        println!();
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentReporter;

impl Reporter for SilentReporter {
    fn batch_loaded(&mut self, _batch: usize, _rows: usize, _stats: &RunningStatistics) {}

    fn batch_failed(&mut self, _batch: usize, _error: &SinkError) {}
}
