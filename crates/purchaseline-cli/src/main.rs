//! purchaseline - batch loader for CSV purchase records
//!
//! Loads purchase CSV files into a DuckDB table in fixed-size batches,
//! printing running price statistics as each batch lands.

use anyhow::Result;
use clap::{Parser, Subcommand};

mod cmd;
mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "purchaseline")]
#[command(about = "Batch loader for CSV purchase records")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Config file path (default: ./purchaseline.toml or ~/.config/purchaseline/config.toml)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Load CSV files from the input directory
    Load(cmd::load::LoadArgs),
    /// Create the purchases table if it does not exist
    Init(cmd::init::InitArgs),
    /// Show current configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    purchaseline_core::init_logging(cli.quiet, cli.debug);

    let config = if let Some(path) = cli.config {
        Config::from_file(&path)?
    } else {
        Config::load()?
    };

    match cli.command {
        Command::Load(args) => cmd::load::run(args, &config),
        Command::Init(args) => cmd::init::run(args, &config),
        Command::Config => {
            use comfy_table::{
                Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL,
            };

            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .apply_modifier(UTF8_ROUND_CORNERS)
                .set_header(vec![
                    Cell::new("Setting").fg(Color::Cyan),
                    Cell::new("Value").fg(Color::Cyan),
                ]);

            table.add_row(vec![
                "Input directory",
                &config.input.dir.display().to_string(),
            ]);
            table.add_row(vec!["File pattern", &config.input.pattern]);
            table.add_row(vec![
                "Hold out validation file",
                if config.input.hold_out_validation {
                    "yes"
                } else {
                    "no"
                },
            ]);
            table.add_row(vec![
                "Database",
                &config.database.path.display().to_string(),
            ]);
            table.add_row(vec!["Batch size", &config.load.batch_size.to_string()]);
            table.add_row(vec!["Date formats", &config.load.date_formats.join(", ")]);

            eprintln!("\n{table}");
            Ok(())
        }
    }
}
