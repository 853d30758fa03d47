//! `import` command: load facilities, connections and suppliers from JSON.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use haulage_core::{ImportSummary, NetworkSeed};
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::session::{SessionOptions, read_json};
use crate::{ARG_DATABASE, ARG_NETWORK, CMD_IMPORT, CliError, write_json};

/// CLI arguments for the `import` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Import a JSON document with `facilities`, `connections` \
                 and `suppliers` arrays. Facilities and suppliers are created \
                 or replaced; connections are added. The import is atomic.",
    about = "Import a network description"
)]
#[ortho_config(prefix = "HAULAGE")]
pub(crate) struct ImportArgs {
    /// Path to the network JSON file.
    #[arg(long = ARG_NETWORK, value_name = "path")]
    #[serde(default)]
    pub(crate) network: Option<Utf8PathBuf>,
    /// SQLite database path.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
}

impl ImportArgs {
    pub(crate) fn into_config(self) -> Result<ImportConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        ImportConfig::try_from(merged)
    }
}

/// Resolved `import` configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ImportConfig {
    pub(crate) network: Utf8PathBuf,
    pub(crate) session: SessionOptions,
}

impl TryFrom<ImportArgs> for ImportConfig {
    type Error = CliError;

    fn try_from(args: ImportArgs) -> Result<Self, Self::Error> {
        Ok(Self {
            network: args
                .network
                .ok_or_else(|| CliError::missing(CMD_IMPORT, ARG_NETWORK))?,
            session: SessionOptions {
                database: args.database,
                ..SessionOptions::default()
            },
        })
    }
}

pub(crate) fn run_import(args: ImportArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let summary = execute_import(&args.into_config()?)?;
    write_json(writer, &summary)
}

pub(crate) fn execute_import(config: &ImportConfig) -> Result<ImportSummary, CliError> {
    let seed: NetworkSeed = read_json(&config.network, ARG_NETWORK)?;
    let store = config.session.open_store()?;
    let summary = store.import(&seed).map_err(|source| CliError::Import {
        path: config.network.clone(),
        source,
    })?;
    info!(
        "imported {} facilities, {} connections and {} suppliers from {}",
        summary.facilities, summary.connections, summary.suppliers, config.network
    );
    Ok(summary)
}
