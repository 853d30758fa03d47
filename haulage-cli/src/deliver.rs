//! `deliver` command: quote and book a delivery.

use std::io::Write;

use camino::Utf8PathBuf;
use chrono::NaiveDateTime;
use clap::Parser;
use haulage_core::{DeliveryClass, DeliveryReceipt, SupplierId};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::session::SessionOptions;
use crate::{
    ARG_CLASS, ARG_DATABASE, ARG_END, ARG_NOW, ARG_POLICY, ARG_START, ARG_SUPPLIER, CMD_DELIVER,
    CliError, write_json,
};

/// CLI arguments for the `deliver` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Quote the cheapest route that meets the deadline of the \
                 delivery class, then create the package, bill it to the \
                 supplier and place it on a vehicle in one transaction.",
    about = "Quote and book a delivery"
)]
#[ortho_config(prefix = "HAULAGE")]
pub(crate) struct DeliverArgs {
    /// Origin facility.
    #[arg(long = ARG_START, value_name = "facility")]
    #[serde(default)]
    pub(crate) start: Option<String>,
    /// Destination facility.
    #[arg(long = ARG_END, value_name = "facility")]
    #[serde(default)]
    pub(crate) end: Option<String>,
    /// Delivery class: express, overnight or economy.
    #[arg(long = ARG_CLASS, value_name = "class")]
    #[serde(default)]
    pub(crate) class: Option<DeliveryClass>,
    /// Supplier billed for the package.
    #[arg(long = ARG_SUPPLIER, value_name = "id")]
    #[serde(default)]
    pub(crate) supplier: Option<u64>,
    /// SQLite database path.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Pretend the current time is this ISO timestamp.
    #[arg(long = ARG_NOW, value_name = "timestamp")]
    #[serde(default)]
    pub(crate) now: Option<NaiveDateTime>,
    /// JSON file with a deadline policy.
    #[arg(long = ARG_POLICY, value_name = "path")]
    #[serde(default)]
    pub(crate) policy: Option<Utf8PathBuf>,
}

impl DeliverArgs {
    pub(crate) fn into_config(self) -> Result<DeliverConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        DeliverConfig::try_from(merged)
    }
}

/// Resolved `deliver` configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DeliverConfig {
    pub(crate) start: String,
    pub(crate) end: String,
    pub(crate) class: DeliveryClass,
    pub(crate) supplier: SupplierId,
    pub(crate) session: SessionOptions,
}

impl TryFrom<DeliverArgs> for DeliverConfig {
    type Error = CliError;

    fn try_from(args: DeliverArgs) -> Result<Self, Self::Error> {
        let missing = |field| CliError::missing(CMD_DELIVER, field);
        Ok(Self {
            start: args.start.ok_or_else(|| missing(ARG_START))?,
            end: args.end.ok_or_else(|| missing(ARG_END))?,
            class: args.class.ok_or_else(|| missing(ARG_CLASS))?,
            supplier: args
                .supplier
                .map(SupplierId)
                .ok_or_else(|| missing(ARG_SUPPLIER))?,
            session: SessionOptions {
                database: args.database,
                now: args.now,
                policy: args.policy,
            },
        })
    }
}

pub(crate) fn run_deliver(args: DeliverArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let receipt = execute_deliver(&args.into_config()?)?;
    write_json(writer, &receipt)
}

pub(crate) fn execute_deliver(config: &DeliverConfig) -> Result<DeliveryReceipt, CliError> {
    let coordinator = config.session.coordinator()?;
    Ok(coordinator.create_delivery_detailed(
        &config.start,
        &config.end,
        config.class,
        config.supplier,
    )?)
}
