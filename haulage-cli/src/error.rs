//! Error types emitted by the Haulage CLI.
//!
//! Keep this error type reasonably small, as every command returns
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use haulage_core::{DeliveryError, StoreError};
use thiserror::Error;

/// Errors emitted by the Haulage CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        /// Long flag name of the option.
        field: &'static str,
        /// Environment variable that can supply it.
        env: String,
    },
    /// The log filter could not be parsed.
    #[error("invalid log filter: {0}")]
    LogFilter(#[from] tracing_subscriber::filter::ParseError),
    /// Creating the directory holding the database failed.
    #[error("failed to prepare database directory for {path:?}: {source}")]
    PrepareDatabase {
        /// Database path.
        path: Utf8PathBuf,
        /// Underlying IO failure.
        #[source]
        source: std::io::Error,
    },
    /// Opening the delivery database failed.
    #[error("failed to open database at {path:?}: {source}")]
    OpenDatabase {
        /// Database path.
        path: Utf8PathBuf,
        /// Underlying store failure.
        #[source]
        source: StoreError,
    },
    /// Opening an input file failed.
    #[error("failed to open {field} file {path:?}: {source}")]
    OpenInput {
        /// Option naming the file.
        field: &'static str,
        /// Path that could not be opened.
        path: Utf8PathBuf,
        /// Underlying IO failure.
        #[source]
        source: std::io::Error,
    },
    /// An input file was not valid JSON of the expected shape.
    #[error("failed to parse {field} file {path:?}: {source}")]
    ParseInput {
        /// Option naming the file.
        field: &'static str,
        /// Path of the malformed file.
        path: Utf8PathBuf,
        /// Decoder failure.
        #[source]
        source: serde_json::Error,
    },
    /// Importing a network file into the store failed.
    #[error("failed to import network from {path:?}: {source}")]
    Import {
        /// Network file path.
        path: Utf8PathBuf,
        /// Underlying store failure.
        #[source]
        source: StoreError,
    },
    /// A delivery, fleet or billing operation was rejected.
    #[error(transparent)]
    Delivery(#[from] DeliveryError),
    /// Serialising command output failed.
    #[error("failed to serialise output: {0}")]
    SerialiseOutput(#[source] serde_json::Error),
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}

impl CliError {
    /// Missing `--field` of `command`, pointing at its environment variable.
    pub(crate) fn missing(command: &'static str, field: &'static str) -> Self {
        Self::MissingArgument {
            field,
            env: env_var(command, field),
        }
    }
}

/// Environment variable ortho-config reads for `--field` of `command`.
pub(crate) fn env_var(command: &str, field: &str) -> String {
    format!(
        "HAULAGE_CMDS_{}_{}",
        command.to_ascii_uppercase(),
        field.replace('-', "_").to_ascii_uppercase()
    )
}
