//! purchaseline-ingest: CSV purchase files into DuckDB
//!
//! Discovers source files, ensures the `purchases` table, then loads each
//! file in fixed-size batches while one set of running statistics is carried
//! across the whole run.
//!
//! # Example
//!
//! ```ignore
//! use purchaseline_ingest::{Config, run};
//!
//! let config = Config {
//!     input_dir: "Archivos".into(),
//!     ..Default::default()
//! };
//!
//! let summary = run(&config)?;
//! println!("{}", summary.stats);
//! ```

pub mod config;
pub mod discovery;
pub mod runner;
pub mod schema;
pub mod sink;

// Re-exports
pub use config::Config;
pub use discovery::{Discovered, discover};
pub use runner::{FileOutcome, FileSummary, Summary, run, run_with_sink};
pub use schema::ensure_schema;
pub use sink::DuckDbSink;
