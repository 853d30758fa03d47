//! `packages`, `report` and `pay` commands.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use haulage_core::{DeliveriesReport, DeliveryClass, Package, PackageId, SupplierId};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::session::SessionOptions;
use crate::{
    ARG_CLASS, ARG_DATABASE, ARG_PACKAGE, ARG_SUPPLIER, CMD_PACKAGES, CMD_PAY, CMD_REPORT,
    CliError, write_json,
};

fn session(database: Option<Utf8PathBuf>) -> SessionOptions {
    SessionOptions {
        database,
        ..SessionOptions::default()
    }
}

/// CLI arguments for the `packages` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "List the packages billed to a supplier, optionally \
                 restricted to some delivery classes. Repeat --class to \
                 select several.",
    about = "List a supplier's packages"
)]
#[ortho_config(prefix = "HAULAGE")]
pub(crate) struct PackagesArgs {
    /// Supplier whose packages are listed.
    #[arg(long = ARG_SUPPLIER, value_name = "id")]
    #[serde(default)]
    pub(crate) supplier: Option<u64>,
    /// Delivery classes to include; all when omitted.
    #[arg(long = ARG_CLASS, value_name = "class")]
    #[serde(default)]
    pub(crate) class: Vec<DeliveryClass>,
    /// SQLite database path.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
}

impl PackagesArgs {
    pub(crate) fn into_config(self) -> Result<PackagesConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        PackagesConfig::try_from(merged)
    }
}

/// Resolved `packages` configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PackagesConfig {
    pub(crate) supplier: SupplierId,
    pub(crate) classes: Vec<DeliveryClass>,
    pub(crate) session: SessionOptions,
}

impl TryFrom<PackagesArgs> for PackagesConfig {
    type Error = CliError;

    fn try_from(args: PackagesArgs) -> Result<Self, Self::Error> {
        let classes = if args.class.is_empty() {
            DeliveryClass::ALL.to_vec()
        } else {
            args.class
        };
        Ok(Self {
            supplier: args
                .supplier
                .map(SupplierId)
                .ok_or_else(|| CliError::missing(CMD_PACKAGES, ARG_SUPPLIER))?,
            classes,
            session: session(args.database),
        })
    }
}

pub(crate) fn run_packages(args: PackagesArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let packages = execute_packages(&args.into_config()?)?;
    write_json(writer, &packages)
}

pub(crate) fn execute_packages(config: &PackagesConfig) -> Result<Vec<Package>, CliError> {
    let coordinator = config.session.coordinator()?;
    Ok(coordinator
        .billing()
        .supplier_packages(config.supplier, &config.classes)?)
}

/// CLI arguments for the `report` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(about = "Split a supplier's packages into paid and unpaid")]
#[ortho_config(prefix = "HAULAGE")]
pub(crate) struct ReportArgs {
    /// Supplier to report on.
    #[arg(long = ARG_SUPPLIER, value_name = "id")]
    #[serde(default)]
    pub(crate) supplier: Option<u64>,
    /// SQLite database path.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
}

impl ReportArgs {
    pub(crate) fn into_config(self) -> Result<ReportConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        ReportConfig::try_from(merged)
    }
}

/// Resolved `report` configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ReportConfig {
    pub(crate) supplier: SupplierId,
    pub(crate) session: SessionOptions,
}

impl TryFrom<ReportArgs> for ReportConfig {
    type Error = CliError;

    fn try_from(args: ReportArgs) -> Result<Self, Self::Error> {
        Ok(Self {
            supplier: args
                .supplier
                .map(SupplierId)
                .ok_or_else(|| CliError::missing(CMD_REPORT, ARG_SUPPLIER))?,
            session: session(args.database),
        })
    }
}

pub(crate) fn run_report(args: ReportArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let report = execute_report(&args.into_config()?)?;
    write_json(writer, &report)
}

pub(crate) fn execute_report(config: &ReportConfig) -> Result<DeliveriesReport, CliError> {
    let coordinator = config.session.coordinator()?;
    Ok(coordinator.billing().deliveries_report(config.supplier)?)
}

/// CLI arguments for the `pay` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(about = "Mark a package as paid by its supplier")]
#[ortho_config(prefix = "HAULAGE")]
pub(crate) struct PayArgs {
    /// Supplier paying.
    #[arg(long = ARG_SUPPLIER, value_name = "id")]
    #[serde(default)]
    pub(crate) supplier: Option<u64>,
    /// Package being paid for.
    #[arg(long = ARG_PACKAGE, value_name = "id")]
    #[serde(default)]
    pub(crate) package: Option<u64>,
    /// SQLite database path.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
}

impl PayArgs {
    pub(crate) fn into_config(self) -> Result<PayConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        PayConfig::try_from(merged)
    }
}

/// Resolved `pay` configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PayConfig {
    pub(crate) supplier: SupplierId,
    pub(crate) package: PackageId,
    pub(crate) session: SessionOptions,
}

impl TryFrom<PayArgs> for PayConfig {
    type Error = CliError;

    fn try_from(args: PayArgs) -> Result<Self, Self::Error> {
        let missing = |field| CliError::missing(CMD_PAY, field);
        Ok(Self {
            supplier: args
                .supplier
                .map(SupplierId)
                .ok_or_else(|| missing(ARG_SUPPLIER))?,
            package: args
                .package
                .map(PackageId)
                .ok_or_else(|| missing(ARG_PACKAGE))?,
            session: session(args.database),
        })
    }
}

/// Acknowledgement printed by `pay`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct Payment {
    pub(crate) supplier: SupplierId,
    pub(crate) package: PackageId,
    pub(crate) paid: bool,
}

pub(crate) fn run_pay(args: PayArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let payment = execute_pay(&args.into_config()?)?;
    write_json(writer, &payment)
}

pub(crate) fn execute_pay(config: &PayConfig) -> Result<Payment, CliError> {
    let coordinator = config.session.coordinator()?;
    coordinator
        .billing()
        .mark_paid(config.supplier, config.package)?;
    Ok(Payment {
        supplier: config.supplier,
        package: config.package,
        paid: true,
    })
}
