//! Command-line interface for the Haulage delivery engine.
//!
//! Every subcommand reads its options from flags, `HAULAGE_CMDS_<COMMAND>_*`
//! environment variables or configuration files, works on a SQLite database
//! and prints its result as JSON on stdout. Logs go to stderr.
#![forbid(unsafe_code)]

use std::io::Write;

use clap::{Parser, Subcommand};
use log::debug;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

mod billing;
mod deliver;
mod error;
mod fleet;
mod fs;
mod import;
mod session;

pub use error::CliError;

use billing::{PackagesArgs, PayArgs, ReportArgs, run_packages, run_pay, run_report};
use deliver::{DeliverArgs, run_deliver};
use fleet::{MoveArgs, StatusArgs, run_move, run_status};
use import::{ImportArgs, run_import};

pub(crate) const CMD_DELIVER: &str = "deliver";
pub(crate) const CMD_MOVE: &str = "move";
pub(crate) const CMD_STATUS: &str = "status";
pub(crate) const CMD_PACKAGES: &str = "packages";
pub(crate) const CMD_REPORT: &str = "report";
pub(crate) const CMD_PAY: &str = "pay";
pub(crate) const CMD_IMPORT: &str = "import";

pub(crate) const ARG_START: &str = "start";
pub(crate) const ARG_END: &str = "end";
pub(crate) const ARG_CLASS: &str = "class";
pub(crate) const ARG_SUPPLIER: &str = "supplier";
pub(crate) const ARG_PACKAGE: &str = "package";
pub(crate) const ARG_VEHICLE: &str = "vehicle";
pub(crate) const ARG_FACILITY: &str = "facility";
pub(crate) const ARG_NETWORK: &str = "network";
pub(crate) const ARG_DATABASE: &str = "database";
pub(crate) const ARG_NOW: &str = "now";
pub(crate) const ARG_POLICY: &str = "policy";

/// Filter applied when neither `--log-level` nor `RUST_LOG` is set.
const DEFAULT_LOG_FILTER: &str = "warn";

/// Run the Haulage CLI with the current process arguments and environment.
///
/// # Errors
///
/// Any [`CliError`]: invalid arguments or configuration, unreadable input
/// files, database failures and rejected operations.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    init_logging(cli.log_level.as_deref())?;
    let mut stdout = std::io::stdout().lock();
    dispatch(cli.command, &mut stdout)
}

fn init_logging(level: Option<&str>) -> Result<(), CliError> {
    let filter = match level {
        Some(directives) => EnvFilter::try_new(directives)?,
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
    };
    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .is_err()
    {
        debug!("logging already initialised");
    }
    Ok(())
}

fn dispatch(command: Command, writer: &mut dyn Write) -> Result<(), CliError> {
    match command {
        Command::Deliver(args) => run_deliver(args, writer),
        Command::Move(args) => run_move(args, writer),
        Command::Status(args) => run_status(args, writer),
        Command::Packages(args) => run_packages(args, writer),
        Command::Report(args) => run_report(args, writer),
        Command::Pay(args) => run_pay(args, writer),
        Command::Import(args) => run_import(args, writer),
    }
}

/// Pretty-print `value` as one JSON document followed by a newline.
pub(crate) fn write_json<T: Serialize>(writer: &mut dyn Write, value: &T) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(value).map_err(CliError::SerialiseOutput)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}

#[derive(Debug, Parser)]
#[command(
    name = "haulage",
    about = "Route, book, track and bill deliveries across a facility network",
    version
)]
struct Cli {
    /// Log filter directives, e.g. `info` or `haulage_core=debug`.
    #[arg(long, global = true, value_name = "filter")]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Quote and book a delivery.
    Deliver(DeliverArgs),
    /// Report a vehicle position.
    Move(MoveArgs),
    /// Show where a package is.
    Status(StatusArgs),
    /// List a supplier's packages.
    Packages(PackagesArgs),
    /// Split a supplier's packages into paid and unpaid.
    Report(ReportArgs),
    /// Mark a package as paid.
    Pay(PayArgs),
    /// Import facilities, connections and suppliers.
    Import(ImportArgs),
}

#[cfg(test)]
mod tests;
