//! Purchaseline Core - batch loading of purchase records with running statistics
//!
//! This crate holds the storage-agnostic pieces: the columnar [`Dataset`],
//! the pure statistics fold, the [`PurchaseSink`] seam and the batch
//! [`load`] routine that ties them together.

pub mod dataset;
pub mod dates;
pub mod error;
pub mod loader;
pub mod logging;
pub mod report;
pub mod sink;
pub mod source;
pub mod stats;

// Re-exports for convenience
pub use dataset::{BatchView, Batches, Dataset, Record, RowRef};
pub use dates::{DEFAULT_DATE_FORMATS, default_date_formats, normalize_date};
pub use error::{ParseError, SchemaError, SinkError};
pub use loader::{BatchFailure, DEFAULT_BATCH_SIZE, LoadReport, load};
pub use logging::init_logging;
pub use report::{ConsoleReporter, Reporter, SilentReporter};
pub use sink::{MemorySink, PurchaseSink};
pub use source::{read_dataset, read_dataset_from_reader};
pub use stats::{BatchSummary, RunningStatistics, fmt_opt};
