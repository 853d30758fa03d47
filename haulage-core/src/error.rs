//! Error types shared by the routing engine and the delivery state machine.

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::{DeliveryClass, FacilityRole, PackageId, SupplierId, VehicleId};

/// Failure raised by the persistence layer.
///
/// Store errors surface to callers as [`DeliveryError::StoreUnavailable`].
/// Only [transient](StoreError::is_transient) ones are worth retrying.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A lock guarding in-memory state was poisoned by a panicking writer.
    #[error("store lock poisoned")]
    LockPoisoned,
    /// A persisted value could not be decoded into a domain type.
    #[error("corrupt {entity} record: {detail}")]
    Corrupt {
        /// Kind of record that failed to decode.
        entity: &'static str,
        /// Human-readable description of the problem.
        detail: String,
    },
    /// An identifier counter reached its maximum value.
    #[error("{kind} id counter exhausted")]
    IdsExhausted {
        /// Entity category whose counter overflowed.
        kind: &'static str,
    },
    /// A write violated a uniqueness or referential constraint.
    #[error("constraint violated while {operation}: {detail}")]
    Constraint {
        /// Description of the attempted write.
        operation: &'static str,
        /// Description of the violated constraint.
        detail: String,
    },
    /// The SQLite database reported an error.
    #[cfg(feature = "store-sqlite")]
    #[error("SQLite failure while {operation}")]
    Sqlite {
        /// Description of the failed operation.
        operation: &'static str,
        /// Source error from `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// The database schema has a version this build does not understand.
    #[cfg(feature = "store-sqlite")]
    #[error("expected schema version {expected} but found {found}")]
    SchemaVersion {
        /// Version written by this build.
        expected: i64,
        /// Version present in the database.
        found: i64,
    },
}

/// Failure of a delivery, routing, fleet or billing operation.
///
/// Every variant except [`DeliveryError::StoreUnavailable`] is deterministic:
/// repeating the call with the same inputs yields the same error. See
/// [`DeliveryError::is_retryable`].
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The delivery class is unknown or has no deadline rule configured.
    #[error("invalid delivery class '{class}'")]
    InvalidDeliveryClass {
        /// The rejected class value.
        class: String,
    },
    /// The deadline of the delivery class has already passed.
    #[error("{class} deadline {deadline} has already passed")]
    DeadlineAlreadyPassed {
        /// Class whose deadline passed.
        class: DeliveryClass,
        /// The missed deadline.
        deadline: NaiveDateTime,
    },
    /// No route between the facilities fits inside the time budget.
    #[error("no feasible route from {start} to {end}")]
    NoFeasiblePath {
        /// Requested start facility.
        start: String,
        /// Requested end facility.
        end: String,
    },
    /// The route search gave up before proving optimality.
    #[error("route search from {start} to {end} exceeded {limit} expansions")]
    SearchLimitExceeded {
        /// Requested start facility.
        start: String,
        /// Requested end facility.
        end: String,
        /// Configured expansion limit.
        limit: usize,
    },
    /// The named facility does not exist.
    #[error("facility '{name}' not found")]
    FacilityNotFound {
        /// Requested facility name.
        name: String,
    },
    /// A facility exists but cannot play the requested part in a route.
    #[error("facility '{name}' is a {found} facility, expected {expected}")]
    UnexpectedFacilityRole {
        /// Facility name.
        name: String,
        /// Role required by the operation.
        expected: FacilityRole,
        /// Role the facility actually has.
        found: FacilityRole,
    },
    /// The package does not exist, or has no relation the operation needs.
    #[error("package {id} not found")]
    PackageNotFound {
        /// Requested package.
        id: PackageId,
    },
    /// The supplier does not exist.
    #[error("supplier {id} not found")]
    SupplierNotFound {
        /// Requested supplier.
        id: SupplierId,
    },
    /// The vehicle does not exist.
    #[error("vehicle {id} not found")]
    VehicleNotFound {
        /// Requested vehicle.
        id: VehicleId,
    },
    /// The package is already carried by a vehicle.
    #[error("package {package} is already transported by vehicle {vehicle}")]
    PackageAlreadyTransported {
        /// Package being chartered.
        package: PackageId,
        /// Vehicle already carrying it.
        vehicle: VehicleId,
    },
    /// The package already has a supplier.
    #[error("package {package} is already supplied by supplier {supplier}")]
    PackageAlreadySupplied {
        /// Package being linked.
        package: PackageId,
        /// Supplier already linked to it.
        supplier: SupplierId,
    },
    /// The underlying store failed; retryable when the failure is transient.
    #[error("store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),
}

impl StoreError {
    /// Whether the failure may clear up on its own.
    ///
    /// True for a poisoned lock and for SQLite reporting a busy or locked
    /// database. Corrupt rows, exhausted counters, constraint violations and
    /// schema mismatches fail the same way every time.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::LockPoisoned => true,
            #[cfg(feature = "store-sqlite")]
            Self::Sqlite { source, .. } => matches!(
                source.sqlite_error_code(),
                Some(rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked)
            ),
            _ => false,
        }
    }
}

impl DeliveryError {
    /// Whether the caller may retry the operation unchanged.
    ///
    /// Only store failures that are [transient](StoreError::is_transient)
    /// qualify.
    ///
    /// # Examples
    /// ```
    /// use haulage_core::{DeliveryError, StoreError};
    ///
    /// assert!(DeliveryError::from(StoreError::LockPoisoned).is_retryable());
    /// assert!(!DeliveryError::FacilityNotFound { name: "X".into() }.is_retryable());
    /// assert!(!DeliveryError::from(StoreError::IdsExhausted { kind: "package" }).is_retryable());
    /// ```
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreUnavailable(err) if err.is_transient())
    }
}

impl From<crate::ParseDeliveryClassError> for DeliveryError {
    fn from(err: crate::ParseDeliveryClassError) -> Self {
        Self::InvalidDeliveryClass { class: err.0 }
    }
}
