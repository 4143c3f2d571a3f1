//! Init subcommand - create the purchases table without loading anything

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use purchaseline_core::PurchaseSink;
use purchaseline_ingest::DuckDbSink;

use crate::config::Config;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// DuckDB database file
    #[arg(long)]
    pub database: Option<PathBuf>,
}

pub fn run(args: InitArgs, config: &Config) -> Result<()> {
    let path = args.database.unwrap_or_else(|| config.database.path.clone());
    let mut sink = DuckDbSink::open(&path, config.load.date_formats.clone())?;
    sink.create_schema()
        .context("Failed to create purchases table")?;
    log::info!("Table purchases ready in {}", path.display());
    Ok(())
}
