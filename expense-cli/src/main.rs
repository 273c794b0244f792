use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use expense_ingest::DateWindow;
use std::path::PathBuf;

mod config;
mod import_cmd;
mod logging;
mod report_cmd;

use import_cmd::Source;

const CLI_DATE_FORMAT: &str = "%d-%m-%Y";

#[derive(Parser, Debug)]
#[command(
    name = "expenses",
    version,
    long_version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("EXPENSES_REVISION"), ")"),
    about = "Turn saved order pages into monthly expense ledgers"
)]
struct Cli {
    /// Config file (default: ~/.expenses/config.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// trace, debug, info, warn/WARNING, error/CRITICAL, or an EnvFilter directive
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build a ledger from a saved AliExpress orders page
    Aliexpress {
        #[arg(long, default_value = "aliexpress.txt")]
        input: PathBuf,

        #[arg(long, default_value = "gastos_aliexpress.csv")]
        output: PathBuf,
    },

    /// Build a ledger from a saved CNFans orders page
    Cnfans {
        #[arg(long, default_value = "cnfans_orders.html")]
        input: PathBuf,

        #[arg(long, default_value = "cnfans_pedidos_gastos.csv")]
        output: PathBuf,

        /// Keep orders on or after this day (dd-mm-YYYY)
        #[arg(long, value_parser = parse_cli_date)]
        since: Option<NaiveDate>,

        /// Keep orders on or before this day (dd-mm-YYYY, default today)
        #[arg(long, value_parser = parse_cli_date)]
        until: Option<NaiveDate>,
    },

    /// Merge ledgers into one list, newest first
    Combine {
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        #[arg(long, default_value = "gastos_combinados.csv")]
        output: PathBuf,
    },

    /// Merge ledgers and add one total row per month
    Group {
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        #[arg(long, default_value = "gastos_por_mes.csv")]
        output: PathBuf,
    },

    /// Split a ledger into parts of similar total amount
    Split {
        path: PathBuf,

        #[arg(long, default_value_t = 2)]
        parts: usize,

        #[arg(long, default_value = ".")]
        output_dir: PathBuf,
    },

    /// Write the default config file
    InitConfig,
}

fn parse_cli_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), CLI_DATE_FORMAT)
        .map_err(|e| format!("expected dd-mm-YYYY, got {:?}: {}", s, e))
}

/// Window for the `cnfans` command: open start, ending today unless `--until` is given.
fn cnfans_window(since: Option<NaiveDate>, until: Option<NaiveDate>, today: NaiveDate) -> DateWindow {
    DateWindow {
        since,
        until: Some(until.unwrap_or(today)),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::setup_logging(&cli.log_level);

    let config_path = cli.config.as_deref();
    let load = || config::load_config(config_path).context("loading config");

    match cli.command {
        Command::Aliexpress { input, output } => {
            let cfg = load()?;
            import_cmd::run_import(Source::Aliexpress, &input, &output, &cfg, DateWindow::default())?;
        }

        Command::Cnfans {
            input,
            output,
            since,
            until,
        } => {
            let cfg = load()?;
            let window = cnfans_window(since, until, Local::now().date_naive());
            import_cmd::run_import(Source::Cnfans, &input, &output, &cfg, window)?;
        }

        Command::Combine { paths, output } => {
            report_cmd::run_combine(&paths, &output, &load()?)?;
        }

        Command::Group { paths, output } => {
            report_cmd::run_group(&paths, &output, &load()?)?;
        }

        Command::Split {
            path,
            parts,
            output_dir,
        } => {
            report_cmd::run_split(&path, parts, &output_dir, &load()?)?;
        }

        Command::InitConfig => {
            config::init_config(config_path)?;
        }
    }

    Ok(())
}
