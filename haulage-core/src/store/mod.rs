//! Persistence traits for deliveries, vehicles and suppliers.
//!
//! [`EntityStore`] extends [`NetworkGraph`] with reads of the mutable entities
//! and opens [`StoreTransaction`]s for writes. Components never talk to a
//! database directly; they borrow a store and, for multi-step writes, a
//! transaction.
//!
//! Two implementations ship with the crate: [`MemoryStore`], a reference
//! implementation used throughout the tests, and `SqliteStore` behind the
//! `store-sqlite` feature.

mod memory;
mod seed;
#[cfg(feature = "store-sqlite")]
mod schema;
#[cfg(feature = "store-sqlite")]
mod sqlite;

pub use memory::{MemoryStore, MemoryTransaction};
pub use seed::{ImportSummary, NetworkSeed};
#[cfg(feature = "store-sqlite")]
pub use sqlite::{SqliteStore, SqliteTransaction};

use crate::{
    DeliveryClass, Facility, IdKind, NetworkGraph, Package, PackageId, StoreError,
    SuppliedPackage, Supplier, SupplierId, TrackedVehicle, Vehicle, VehicleId, VehiclePosition,
};

/// Read access to persisted entities plus a transaction boundary for writes.
///
/// Reads outside a transaction see the last committed state. Implementations
/// must be safe to share between threads.
pub trait EntityStore: NetworkGraph + Send + Sync {
    /// Transaction handle borrowed from the store.
    type Tx<'a>: StoreTransaction
    where
        Self: 'a;

    /// Open a write transaction.
    ///
    /// Transactions are serialised: a second `begin` waits until the first
    /// transaction commits or is dropped.
    fn begin(&self) -> Result<Self::Tx<'_>, StoreError>;

    /// Load a package.
    fn package(&self, id: PackageId) -> Result<Option<Package>, StoreError>;

    /// Load a vehicle with its current position.
    fn tracked_vehicle(&self, id: VehicleId) -> Result<Option<TrackedVehicle>, StoreError>;

    /// Vehicle transporting `package`, if any.
    fn carrier(&self, package: PackageId) -> Result<Option<VehicleId>, StoreError>;

    /// Load a supplier.
    fn supplier(&self, id: SupplierId) -> Result<Option<Supplier>, StoreError>;

    /// Packages supplied by `supplier` with their paid flags, in package id
    /// order.
    fn supplied_packages(&self, supplier: SupplierId)
    -> Result<Vec<SuppliedPackage>, StoreError>;
}

/// A unit of work against an [`EntityStore`].
///
/// Nothing written through a transaction is visible to other readers until
/// [`StoreTransaction::commit`] succeeds. Dropping a transaction without
/// committing discards every write. Identifiers handed out by
/// [`StoreTransaction::next_id`] are never reused, even after a rollback.
pub trait StoreTransaction {
    /// Atomically allocate the next identifier of `kind`.
    fn next_id(&mut self, kind: IdKind) -> Result<u64, StoreError>;

    /// Look a facility up by name.
    fn facility(&self, name: &str) -> Result<Option<Facility>, StoreError>;

    /// Load a package.
    fn package(&self, id: PackageId) -> Result<Option<Package>, StoreError>;

    /// Load a supplier.
    fn supplier(&self, id: SupplierId) -> Result<Option<Supplier>, StoreError>;

    /// Supplier linked to `package`, if any.
    fn supplier_of(&self, package: PackageId) -> Result<Option<SupplierId>, StoreError>;

    /// Vehicle transporting `package`, if any.
    fn carrier(&self, package: PackageId) -> Result<Option<VehicleId>, StoreError>;

    /// Load a vehicle with its current position.
    fn tracked_vehicle(&self, id: VehicleId) -> Result<Option<TrackedVehicle>, StoreError>;

    /// Lowest-numbered vehicle still waiting at `facility` that is bound for
    /// `destination` with `class`.
    fn reusable_vehicle(
        &self,
        facility: &str,
        destination: &str,
        class: DeliveryClass,
    ) -> Result<Option<VehicleId>, StoreError>;

    /// Persist a new package.
    fn insert_package(&mut self, package: &Package) -> Result<(), StoreError>;

    /// Persist a new vehicle at its initial position.
    fn insert_vehicle(
        &mut self,
        vehicle: &Vehicle,
        position: &VehiclePosition,
    ) -> Result<(), StoreError>;

    /// Record that `vehicle` transports `package`.
    fn attach_package(&mut self, vehicle: VehicleId, package: PackageId)
    -> Result<(), StoreError>;

    /// Record that `supplier` supplies `package`, unpaid.
    fn link_supplier(&mut self, supplier: SupplierId, package: PackageId)
    -> Result<(), StoreError>;

    /// Replace the position of `vehicle`.
    fn replace_position(
        &mut self,
        vehicle: VehicleId,
        position: &VehiclePosition,
    ) -> Result<(), StoreError>;

    /// Set the paid flag of the supply relation.
    ///
    /// Returns `false` when `supplier` does not supply `package`.
    fn set_paid(
        &mut self,
        supplier: SupplierId,
        package: PackageId,
        paid: bool,
    ) -> Result<bool, StoreError>;

    /// Make every write of the transaction visible.
    fn commit(self) -> Result<(), StoreError>;
}
