//! Main runner for the ingest pipeline

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};
use purchaseline_core::{
    ConsoleReporter, LoadReport, PurchaseSink, Reporter, RunningStatistics, fmt_opt, load,
    read_dataset,
};

use crate::config::Config;
use crate::discovery::discover;
use crate::sink::DuckDbSink;

/// What happened to one source file
#[derive(Debug)]
pub enum FileOutcome {
    Loaded(LoadReport),
    /// File could not be parsed; none of its rows were loaded
    Unreadable(String),
}

#[derive(Debug)]
pub struct FileSummary {
    pub path: PathBuf,
    pub rows_read: usize,
    pub outcome: FileOutcome,
}

impl FileSummary {
    pub fn report(&self) -> Option<&LoadReport> {
        match &self.outcome {
            FileOutcome::Loaded(report) => Some(report),
            FileOutcome::Unreadable(_) => None,
        }
    }

    fn name(&self) -> String {
        self.path
            .file_name()
            .unwrap_or(self.path.as_os_str())
            .to_string_lossy()
            .into_owned()
    }
}

/// Pipeline execution summary
#[derive(Debug)]
pub struct Summary {
    pub files: Vec<FileSummary>,
    pub validation_file: Option<PathBuf>,
    /// Statistics over everything persisted during the run
    pub stats: RunningStatistics,
    /// Rows in the table after the run, when the sink can report it
    pub table_rows: Option<u64>,
    pub elapsed: Duration,
}

impl Summary {
    pub fn unreadable_files(&self) -> usize {
        self.files.iter().filter(|f| f.report().is_none()).count()
    }

    pub fn rows_loaded(&self) -> usize {
        self.reports().map(|r| r.rows_loaded).sum()
    }

    pub fn rows_skipped(&self) -> usize {
        self.reports().map(LoadReport::rows_skipped).sum()
    }

    pub fn batches_failed(&self) -> usize {
        self.reports().map(LoadReport::batches_failed).sum()
    }

    fn reports(&self) -> impl Iterator<Item = &LoadReport> {
        self.files.iter().filter_map(FileSummary::report)
    }

    /// Format per-file and overall results as a table.
    pub fn format_table(&self) -> String {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_header(vec![
                Cell::new("File")
                    .fg(Color::Cyan)
                    .add_attribute(comfy_table::Attribute::Bold),
                Cell::new("Rows").fg(Color::Cyan),
                Cell::new("Batches").fg(Color::Cyan),
                Cell::new("Loaded").fg(Color::Cyan),
                Cell::new("Batch means").fg(Color::Cyan),
            ]);

        for file in &self.files {
            match &file.outcome {
                FileOutcome::Loaded(report) => {
                    let batches = Cell::new(format!(
                        "{}/{}",
                        report.batches_loaded, report.batches_attempted
                    ));
                    let batches = if report.is_clean() {
                        batches
                    } else {
                        batches.fg(Color::Yellow)
                    };
                    let means = report
                        .batch_means
                        .iter()
                        .map(|m| fmt_opt(m.map(|v| format!("{v:.1}"))))
                        .collect::<Vec<_>>()
                        .join(", ");
                    table.add_row(vec![
                        Cell::new(file.name()),
                        Cell::new(file.rows_read),
                        batches,
                        Cell::new(report.rows_loaded),
                        Cell::new(means),
                    ]);
                }
                FileOutcome::Unreadable(reason) => {
                    table.add_row(vec![
                        Cell::new(file.name()).fg(Color::Red),
                        Cell::new("-"),
                        Cell::new("-"),
                        Cell::new(0),
                        Cell::new(reason).fg(Color::Red),
                    ]);
                }
            }
        }

        let mut totals = Table::new();
        totals
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_header(vec![
                Cell::new("Statistics").fg(Color::Cyan),
                Cell::new("Value").fg(Color::Cyan),
            ]);
        totals.add_row(vec![
            Cell::new("Records").fg(Color::Green),
            Cell::new(self.stats.record_count).fg(Color::Green),
        ]);
        totals.add_row(vec![
            Cell::new("Mean price"),
            Cell::new(fmt_opt(self.stats.mean_price().map(|m| format!("{m:.2}")))),
        ]);
        totals.add_row(vec![
            Cell::new("Min price"),
            Cell::new(fmt_opt(self.stats.min_price)),
        ]);
        totals.add_row(vec![
            Cell::new("Max price"),
            Cell::new(fmt_opt(self.stats.max_price)),
        ]);
        totals.add_row(vec![
            Cell::new("Rows skipped"),
            Cell::new(format!(
                "{} ({} batches)",
                self.rows_skipped(),
                self.batches_failed()
            )),
        ]);
        totals.add_row(vec![
            Cell::new("Table rows"),
            Cell::new(fmt_opt(self.table_rows)),
        ]);
        totals.add_row(vec![
            Cell::new("Validation file"),
            Cell::new(fmt_opt(
                self.validation_file.as_ref().map(|p| p.display().to_string()),
            )),
        ]);

        format!("\n{table}\n{totals}")
    }

    /// Log minimal summary (non-TTY mode).
    pub fn log(&self) {
        log::info!(
            "Run complete: {} rows loaded from {} files ({} unreadable), {} rows skipped [{:.1}s]",
            self.rows_loaded(),
            self.files.len(),
            self.unreadable_files(),
            self.rows_skipped(),
            self.elapsed.as_secs_f64()
        );
        log::info!("{}", self.stats);
    }
}

/// Run the pipeline against the configured DuckDB database.
pub fn run(config: &Config) -> Result<Summary> {
    let mut sink = DuckDbSink::open(&config.database, config.date_formats.clone())?;
    let mut summary = run_with_sink(config, &mut sink, &mut ConsoleReporter)?;
    summary.table_rows = Some(
        sink.row_count()
            .context("Failed to count rows in purchases")?,
    );
    Ok(summary)
}

/// Run the pipeline against any sink.
///
/// Schema or discovery failures abort the run. A file that cannot be parsed
/// is skipped; the statistics keep accumulating across the remaining files.
pub fn run_with_sink<S, R>(config: &Config, sink: &mut S, reporter: &mut R) -> Result<Summary>
where
    S: PurchaseSink + ?Sized,
    R: Reporter + ?Sized,
{
    let start = Instant::now();

    sink.create_schema()
        .context("Failed to create purchases table")?;

    let discovered = discover(&config.input_dir, &config.pattern, config.hold_out_validation)?;
    log::info!(
        "Loading {} files in batches of {}",
        discovered.files.len(),
        config.batch_size
    );

    let mut stats = RunningStatistics::new();
    let mut files = Vec::with_capacity(discovered.files.len());

    for path in discovered.files {
        reporter.file_started(&path);
        let file = match read_dataset(&path) {
            Ok(dataset) => {
                let report = load(sink, &dataset, config.batch_size, &mut stats, reporter);
                log::debug!(
                    "{}: {}/{} rows loaded",
                    path.display(),
                    report.rows_loaded,
                    dataset.len()
                );
                FileSummary {
                    rows_read: dataset.len(),
                    outcome: FileOutcome::Loaded(report),
                    path,
                }
            }
            Err(e) => {
                log::error!("{}: {e}", path.display());
                FileSummary {
                    rows_read: 0,
                    outcome: FileOutcome::Unreadable(e.to_string()),
                    path,
                }
            }
        };
        reporter.file_finished(&file.path);
        files.push(file);
    }

    let summary = Summary {
        files,
        validation_file: discovered.validation,
        stats,
        table_rows: None,
        elapsed: start.elapsed(),
    };
    summary.log();
    Ok(summary)
}
