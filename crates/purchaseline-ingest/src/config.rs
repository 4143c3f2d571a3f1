//! Ingest pipeline configuration

use std::num::NonZeroUsize;
use std::path::PathBuf;

use purchaseline_core::{DEFAULT_BATCH_SIZE, default_date_formats};

pub use purchaseline_core::DEFAULT_DATE_FORMATS;

/// Runtime configuration for a load run
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the source CSV files
    pub input_dir: PathBuf,
    /// Glob pattern (relative to `input_dir`) selecting source files
    pub pattern: String,
    /// Set aside the last file of the listing as the validation file
    pub hold_out_validation: bool,
    /// DuckDB database file
    pub database: PathBuf,
    /// Rows per batch
    pub batch_size: NonZeroUsize,
    /// chrono format strings accepted for the `date` column
    pub date_formats: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("data"),
            pattern: "*.csv".to_string(),
            hold_out_validation: true,
            database: PathBuf::from("purchases.duckdb"),
            batch_size: DEFAULT_BATCH_SIZE,
            date_formats: default_date_formats(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.input_dir, PathBuf::from("data"));
        assert_eq!(config.pattern, "*.csv");
        assert!(config.hold_out_validation);
        assert_eq!(config.batch_size.get(), 5);
        assert_eq!(config.date_formats, ["%Y-%m-%d", "%m/%d/%Y"]);
    }
}
