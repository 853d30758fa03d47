//! Fixtures shared by unit tests and downstream crates.
//!
//! Compiled for this crate's tests and, for other crates, behind the
//! `test-support` feature.

use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{NaiveDate, NaiveDateTime};

use crate::{
    Connection, EntityStore, Facility, FacilityRole, MemoryStore, NetworkGraph, NetworkSeed,
    NetworkSnapshot, Package, PackageId, StoreError, SuppliedPackage, Supplier, SupplierId,
    TrackedVehicle, VehicleId,
};

/// `hour:minute` on 1 March 2024.
///
/// # Panics
///
/// Panics on an hour or minute outside the clock face.
#[must_use]
#[expect(clippy::expect_used, reason = "fixture inputs are literals")]
pub fn timestamp(hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 1)
        .and_then(|day| day.and_hms_opt(hour, minute, 0))
        .expect("valid wall-clock time")
}

/// Three facilities in a line: origin `A`, transfer `B`, destination `C`.
///
/// `A-B` costs 10 and takes 30 + 5 minutes, `B-C` costs 15 and takes 40 + 5
/// minutes, both bidirectional. Suppliers 1 (`Acme`) and 2 (`Globex`) exist.
#[must_use]
pub fn sample_seed() -> NetworkSeed {
    NetworkSeed {
        facilities: vec![
            Facility::new("A", FacilityRole::Origin),
            Facility::new("B", FacilityRole::Transfer),
            Facility::new("C", FacilityRole::Destination),
        ],
        connections: vec![
            Connection::new("A", "B", 10, 30, 5),
            Connection::new("B", "C", 15, 40, 5),
        ],
        suppliers: vec![Supplier::new(1, "Acme"), Supplier::new(2, "Globex")],
    }
}

/// [`MemoryStore`] loaded with [`sample_seed`].
///
/// # Panics
///
/// Never in practice; the sample seed is consistent.
#[must_use]
#[expect(clippy::expect_used, reason = "sample seed is consistent")]
pub fn sample_store() -> MemoryStore {
    let store = MemoryStore::new();
    store.import(&sample_seed()).expect("sample seed imports");
    store
}

/// Store wrapper counting how often the network is snapshotted.
#[derive(Debug)]
pub struct CountingStore<S> {
    inner: S,
    snapshots: AtomicUsize,
}

impl<S> CountingStore<S> {
    /// Wrap `inner`.
    #[must_use]
    pub const fn new(inner: S) -> Self {
        Self {
            inner,
            snapshots: AtomicUsize::new(0),
        }
    }

    /// Snapshots taken so far.
    #[must_use]
    pub fn snapshots(&self) -> usize {
        self.snapshots.load(Ordering::SeqCst)
    }
}

impl<S: NetworkGraph> NetworkGraph for CountingStore<S> {
    fn facility(&self, name: &str) -> Result<Option<Facility>, StoreError> {
        self.inner.facility(name)
    }

    fn snapshot(&self) -> Result<NetworkSnapshot, StoreError> {
        self.snapshots.fetch_add(1, Ordering::SeqCst);
        self.inner.snapshot()
    }
}

impl<S: EntityStore> EntityStore for CountingStore<S> {
    type Tx<'a>
        = S::Tx<'a>
    where
        Self: 'a;

    fn begin(&self) -> Result<Self::Tx<'_>, StoreError> {
        self.inner.begin()
    }

    fn package(&self, id: PackageId) -> Result<Option<Package>, StoreError> {
        self.inner.package(id)
    }

    fn tracked_vehicle(&self, id: VehicleId) -> Result<Option<TrackedVehicle>, StoreError> {
        self.inner.tracked_vehicle(id)
    }

    fn carrier(&self, package: PackageId) -> Result<Option<VehicleId>, StoreError> {
        self.inner.carrier(package)
    }

    fn supplier(&self, id: SupplierId) -> Result<Option<Supplier>, StoreError> {
        self.inner.supplier(id)
    }

    fn supplied_packages(
        &self,
        supplier: SupplierId,
    ) -> Result<Vec<SuppliedPackage>, StoreError> {
        self.inner.supplied_packages(supplier)
    }
}
