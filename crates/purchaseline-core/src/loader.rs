//! Batch loader: persist a dataset in fixed-size batches and fold each
//! persisted batch into the caller's running statistics.

use std::num::NonZeroUsize;
use std::ops::Range;

use crate::dataset::Dataset;
use crate::error::SinkError;
use crate::report::Reporter;
use crate::sink::PurchaseSink;
use crate::stats::RunningStatistics;

/// Default number of rows per batch.
pub const DEFAULT_BATCH_SIZE: NonZeroUsize = match NonZeroUsize::new(5) {
    Some(n) => n,
    None => unreachable!(),
};

/// A batch the sink rejected. Its rows were skipped for good.
#[derive(Debug)]
pub struct BatchFailure {
    /// 1-based batch number within the dataset
    pub batch: usize,
    pub rows: Range<usize>,
    pub error: SinkError,
}

/// Outcome of loading one dataset.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub batches_attempted: usize,
    pub batches_loaded: usize,
    pub rows_loaded: usize,
    /// Mean non-null price of each loaded batch, in load order
    pub batch_means: Vec<Option<f64>>,
    pub failures: Vec<BatchFailure>,
}

impl LoadReport {
    pub fn batches_failed(&self) -> usize {
        self.failures.len()
    }

    pub fn rows_skipped(&self) -> usize {
        self.failures.iter().map(|f| f.rows.len()).sum()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Load `dataset` into `sink` in batches of `batch_size` rows.
///
/// Batches run strictly in order. A batch the sink rejects is reported and
/// skipped without touching `stats`; the remaining batches still run.
pub fn load<S, R>(
    sink: &mut S,
    dataset: &Dataset,
    batch_size: NonZeroUsize,
    stats: &mut RunningStatistics,
    reporter: &mut R,
) -> LoadReport
where
    S: PurchaseSink + ?Sized,
    R: Reporter + ?Sized,
{
    let mut report = LoadReport::default();

    for batch in dataset.batches(batch_size) {
        report.batches_attempted += 1;
        let number = batch.number();

        match sink.append_rows(&batch) {
            Ok(()) => {
                let summary = batch.summary();
                *stats = stats.fold(&summary);
                report.batches_loaded += 1;
                report.rows_loaded += summary.rows;
                report.batch_means.push(summary.mean());
                log::debug!(
                    "batch {number}: {} rows, {} priced",
                    summary.rows,
                    summary.price_count
                );
                reporter.batch_loaded(number, summary.rows, stats);
            }
            Err(error) => {
                log::warn!(
                    "batch {number} (rows {}..{}) rejected: {error}",
                    batch.range().start,
                    batch.range().end
                );
                reporter.batch_failed(number, &error);
                report.failures.push(BatchFailure {
                    batch: number,
                    rows: batch.range(),
                    error,
                });
            }
        }
    }

    report
}
