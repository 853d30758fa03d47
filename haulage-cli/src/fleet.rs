//! `move` and `status` commands.

use std::io::Write;

use camino::Utf8PathBuf;
use chrono::NaiveDateTime;
use clap::Parser;
use haulage_core::{PackageId, PackageStatus, TrackedVehicle, VehicleId};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::session::SessionOptions;
use crate::{
    ARG_DATABASE, ARG_FACILITY, ARG_NOW, ARG_PACKAGE, ARG_VEHICLE, CMD_MOVE, CMD_STATUS, CliError,
    write_json,
};

/// CLI arguments for the `move` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Record that a vehicle has reached a facility. The previous \
                 position is replaced and the vehicle no longer accepts \
                 new packages.",
    about = "Report a vehicle position"
)]
#[ortho_config(prefix = "HAULAGE")]
pub(crate) struct MoveArgs {
    /// Vehicle reporting in.
    #[arg(long = ARG_VEHICLE, value_name = "id")]
    #[serde(default)]
    pub(crate) vehicle: Option<u64>,
    /// Facility the vehicle is at.
    #[arg(long = ARG_FACILITY, value_name = "facility")]
    #[serde(default)]
    pub(crate) facility: Option<String>,
    /// SQLite database path.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Pretend the current time is this ISO timestamp.
    #[arg(long = ARG_NOW, value_name = "timestamp")]
    #[serde(default)]
    pub(crate) now: Option<NaiveDateTime>,
}

impl MoveArgs {
    pub(crate) fn into_config(self) -> Result<MoveConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        MoveConfig::try_from(merged)
    }
}

/// Resolved `move` configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MoveConfig {
    pub(crate) vehicle: VehicleId,
    pub(crate) facility: String,
    pub(crate) session: SessionOptions,
}

impl TryFrom<MoveArgs> for MoveConfig {
    type Error = CliError;

    fn try_from(args: MoveArgs) -> Result<Self, Self::Error> {
        let missing = |field| CliError::missing(CMD_MOVE, field);
        Ok(Self {
            vehicle: args
                .vehicle
                .map(VehicleId)
                .ok_or_else(|| missing(ARG_VEHICLE))?,
            facility: args.facility.ok_or_else(|| missing(ARG_FACILITY))?,
            session: SessionOptions {
                database: args.database,
                now: args.now,
                policy: None,
            },
        })
    }
}

pub(crate) fn run_move(args: MoveArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let vehicle = execute_move(&args.into_config()?)?;
    write_json(writer, &vehicle)
}

pub(crate) fn execute_move(config: &MoveConfig) -> Result<TrackedVehicle, CliError> {
    let coordinator = config.session.coordinator()?;
    let fleet = coordinator.fleet();
    fleet.update_position(config.vehicle, &config.facility)?;
    Ok(fleet.vehicle(config.vehicle)?)
}

/// CLI arguments for the `status` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Show which vehicle carries a package, where it last \
                 reported from and how many minutes of the package's time \
                 budget remain.",
    about = "Show where a package is"
)]
#[ortho_config(prefix = "HAULAGE")]
pub(crate) struct StatusArgs {
    /// Package to look up.
    #[arg(long = ARG_PACKAGE, value_name = "id")]
    #[serde(default)]
    pub(crate) package: Option<u64>,
    /// SQLite database path.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
}

impl StatusArgs {
    pub(crate) fn into_config(self) -> Result<StatusConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        StatusConfig::try_from(merged)
    }
}

/// Resolved `status` configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StatusConfig {
    pub(crate) package: PackageId,
    pub(crate) session: SessionOptions,
}

impl TryFrom<StatusArgs> for StatusConfig {
    type Error = CliError;

    fn try_from(args: StatusArgs) -> Result<Self, Self::Error> {
        Ok(Self {
            package: args
                .package
                .map(PackageId)
                .ok_or_else(|| CliError::missing(CMD_STATUS, ARG_PACKAGE))?,
            session: SessionOptions {
                database: args.database,
                ..SessionOptions::default()
            },
        })
    }
}

pub(crate) fn run_status(args: StatusArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let status = execute_status(&args.into_config()?)?;
    write_json(writer, &status)
}

pub(crate) fn execute_status(config: &StatusConfig) -> Result<PackageStatus, CliError> {
    let coordinator = config.session.coordinator()?;
    Ok(coordinator.fleet().package_status(config.package)?)
}
