//! Load subcommand - batch-load CSV purchase files into DuckDB

use std::num::NonZeroUsize;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use purchaseline_core::{ConsoleReporter, MemorySink};

use crate::config::Config;

#[derive(Args, Debug, Default)]
pub struct LoadArgs {
    /// Directory containing the source CSV files
    #[arg(short, long)]
    pub input_dir: Option<PathBuf>,

    /// DuckDB database file
    #[arg(long)]
    pub database: Option<PathBuf>,

    /// Rows per batch
    #[arg(short, long)]
    pub batch_size: Option<NonZeroUsize>,

    /// Glob pattern selecting source files inside the input directory
    #[arg(long)]
    pub pattern: Option<String>,

    /// Load every matching file (do not hold out the last one for validation)
    #[arg(long)]
    pub no_holdout: bool,

    /// Keep rows in memory instead of writing to the database
    #[arg(long)]
    pub dry_run: bool,
}

/// Config file values, overridden by whatever was given on the command line.
fn ingest_config(args: &LoadArgs, config: &Config) -> purchaseline_ingest::Config {
    purchaseline_ingest::Config {
        input_dir: args
            .input_dir
            .clone()
            .unwrap_or_else(|| config.input.dir.clone()),
        pattern: args
            .pattern
            .clone()
            .unwrap_or_else(|| config.input.pattern.clone()),
        hold_out_validation: config.input.hold_out_validation && !args.no_holdout,
        database: args
            .database
            .clone()
            .unwrap_or_else(|| config.database.path.clone()),
        batch_size: args.batch_size.unwrap_or(config.load.batch_size),
        date_formats: config.load.date_formats.clone(),
    }
}

pub fn run(args: LoadArgs, config: &Config) -> Result<()> {
    let ingest = ingest_config(&args, config);

    let summary = if args.dry_run {
        log::info!(
            "Dry run: {} will not be modified",
            ingest.database.display()
        );
        let mut sink = MemorySink::with_date_formats(ingest.date_formats.clone());
        purchaseline_ingest::run_with_sink(&ingest, &mut sink, &mut ConsoleReporter)?
    } else {
        purchaseline_ingest::run(&ingest)?
    };

    println!("=== Load Summary ===");
    println!("{}", summary.format_table());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_values_used_without_flags() {
        let config = Config::default();
        let ingest = ingest_config(&LoadArgs::default(), &config);
        assert_eq!(ingest.input_dir, config.input.dir);
        assert_eq!(ingest.database, config.database.path);
        assert_eq!(ingest.batch_size.get(), 5);
        assert!(ingest.hold_out_validation);
    }

    #[test]
    fn flags_override_config() {
        let args = LoadArgs {
            input_dir: Some(PathBuf::from("Archivos")),
            database: Some(PathBuf::from("Pragma.duckdb")),
            batch_size: NonZeroUsize::new(100),
            pattern: Some("2012-*.csv".to_string()),
            no_holdout: true,
            dry_run: false,
        };
        let ingest = ingest_config(&args, &Config::default());
        assert_eq!(ingest.input_dir, PathBuf::from("Archivos"));
        assert_eq!(ingest.database, PathBuf::from("Pragma.duckdb"));
        assert_eq!(ingest.batch_size.get(), 100);
        assert_eq!(ingest.pattern, "2012-*.csv");
        assert!(!ingest.hold_out_validation);
    }
}
