//! Store, clock and deadline policy shared by every command.

use std::io::BufReader;

use camino::{Utf8Path, Utf8PathBuf};
use chrono::NaiveDateTime;
use haulage_core::{
    Clock, DeadlinePolicy, DeliveryCoordinator, FixedClock, RouteFinder, SqliteStore, SystemClock,
};
use log::debug;
use serde::de::DeserializeOwned;

use crate::CliError;
use crate::fs::{ensure_parent_dir, open_utf8_file};

/// Database used when `--database` is not configured.
pub(crate) const DEFAULT_DATABASE: &str = "haulage.db";

/// Either the system clock or a pinned `--now`.
#[derive(Debug)]
pub(crate) enum SessionClock {
    System(SystemClock),
    Fixed(FixedClock),
}

impl SessionClock {
    pub(crate) fn new(now: Option<NaiveDateTime>) -> Self {
        now.map_or(Self::System(SystemClock), |now| Self::Fixed(FixedClock::new(now)))
    }
}

impl Clock for SessionClock {
    fn now(&self) -> NaiveDateTime {
        match self {
            Self::System(clock) => clock.now(),
            Self::Fixed(clock) => clock.now(),
        }
    }
}

/// Coordinator type every command works through.
pub(crate) type Coordinator = DeliveryCoordinator<SqliteStore, SessionClock>;

/// Options shared by commands that touch the database.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct SessionOptions {
    pub(crate) database: Option<Utf8PathBuf>,
    pub(crate) now: Option<NaiveDateTime>,
    pub(crate) policy: Option<Utf8PathBuf>,
}

impl SessionOptions {
    pub(crate) fn database_path(&self) -> Utf8PathBuf {
        self.database
            .clone()
            .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_DATABASE))
    }

    /// Open the database, creating it and its directory when missing.
    pub(crate) fn open_store(&self) -> Result<SqliteStore, CliError> {
        let path = self.database_path();
        ensure_parent_dir(&path).map_err(|source| CliError::PrepareDatabase {
            path: path.clone(),
            source,
        })?;
        SqliteStore::open(path.as_std_path())
            .map_err(|source| CliError::OpenDatabase { path, source })
    }

    /// Deadline policy from `--policy`, or the built-in one.
    pub(crate) fn load_policy(&self) -> Result<DeadlinePolicy, CliError> {
        self.policy.as_deref().map_or_else(
            || Ok(DeadlinePolicy::default()),
            |path| read_json(path, "policy"),
        )
    }

    pub(crate) fn coordinator(&self) -> Result<Coordinator, CliError> {
        let store = self.open_store()?;
        let policy = self.load_policy()?;
        debug!("session opened on {}", self.database_path());
        Ok(DeliveryCoordinator::new(
            store,
            SessionClock::new(self.now),
            RouteFinder::new(policy),
        ))
    }
}

/// Decode a JSON file named by the `field` option.
pub(crate) fn read_json<T: DeserializeOwned>(
    path: &Utf8Path,
    field: &'static str,
) -> Result<T, CliError> {
    let file = open_utf8_file(path).map_err(|source| CliError::OpenInput {
        field,
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| CliError::ParseInput {
        field,
        path: path.to_path_buf(),
        source,
    })
}
