//! In-memory [`EntityStore`].
//!
//! State lives behind a mutex. A transaction holds the lock for its whole
//! lifetime and writes straight into the live state, journalling the inverse
//! of every write. Dropping an uncommitted transaction replays the journal
//! backwards, so an abandoned transaction leaves nothing behind and each
//! write costs only the change it makes. Identifier counters sit outside
//! the mutex and keep advancing across rollbacks.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use log::debug;

use super::{EntityStore, ImportSummary, NetworkSeed, StoreTransaction};
use crate::{
    Connection, DeliveryClass, Facility, IdKind, NetworkGraph, NetworkSnapshot, Package,
    PackageId, StoreError, SuppliedPackage, Supplier, SupplierId, TrackedVehicle, Vehicle,
    VehicleId, VehiclePosition,
};

/// Inverse of one transactional write.
#[derive(Debug)]
enum Undo {
    RemovePackage(PackageId),
    RemoveVehicle(VehicleId),
    RemoveTransport(PackageId),
    RemoveSupply(PackageId),
    RestorePosition(VehicleId, VehiclePosition),
    RestorePaid(PackageId, bool),
}

#[derive(Debug, Clone)]
struct Supply {
    supplier: SupplierId,
    paid: bool,
}

#[derive(Debug, Default)]
struct State {
    facilities: BTreeMap<String, Facility>,
    connections: Vec<Connection>,
    suppliers: BTreeMap<SupplierId, Supplier>,
    packages: BTreeMap<PackageId, Package>,
    vehicles: BTreeMap<VehicleId, Vehicle>,
    positions: BTreeMap<VehicleId, VehiclePosition>,
    transports: BTreeMap<PackageId, VehicleId>,
    supplies: BTreeMap<PackageId, Supply>,
}

impl State {
    fn tracked_vehicle(&self, id: VehicleId) -> Result<Option<TrackedVehicle>, StoreError> {
        let Some(vehicle) = self.vehicles.get(&id) else {
            return Ok(None);
        };
        let position = self
            .positions
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::Corrupt {
                entity: "vehicle",
                detail: format!("vehicle {id} has no position"),
            })?;
        Ok(Some(TrackedVehicle {
            vehicle: vehicle.clone(),
            position,
        }))
    }

    fn require_facility(&self, operation: &'static str, name: &str) -> Result<(), StoreError> {
        if self.facilities.contains_key(name) {
            Ok(())
        } else {
            Err(StoreError::Constraint {
                operation,
                detail: format!("unknown facility '{name}'"),
            })
        }
    }

    fn add_connection(&mut self, connection: Connection) -> Result<(), StoreError> {
        self.require_facility("adding a connection", &connection.from)?;
        self.require_facility("adding a connection", &connection.to)?;
        self.connections.push(connection);
        Ok(())
    }

    fn revert(&mut self, undo: Undo) {
        match undo {
            Undo::RemovePackage(id) => {
                self.packages.remove(&id);
            }
            Undo::RemoveVehicle(id) => {
                self.vehicles.remove(&id);
                self.positions.remove(&id);
            }
            Undo::RemoveTransport(package) => {
                self.transports.remove(&package);
            }
            Undo::RemoveSupply(package) => {
                self.supplies.remove(&package);
            }
            Undo::RestorePosition(vehicle, position) => {
                self.positions.insert(vehicle, position);
            }
            Undo::RestorePaid(package, paid) => {
                if let Some(supply) = self.supplies.get_mut(&package) {
                    supply.paid = paid;
                }
            }
        }
    }
}

/// Thread-safe, in-memory store.
///
/// # Examples
/// ```
/// use haulage_core::{
///     Connection, EntityStore, Facility, FacilityRole, MemoryStore, NetworkGraph, Supplier,
///     SupplierId,
/// };
///
/// let store = MemoryStore::with_network(
///     vec![
///         Facility::new("A", FacilityRole::Origin),
///         Facility::new("B", FacilityRole::Destination),
///     ],
///     vec![Connection::new("A", "B", 4, 20, 5)],
/// )?;
/// store.add_supplier(Supplier::new(1, "Acme"))?;
///
/// assert_eq!(store.snapshot()?.connections().len(), 1);
/// assert!(store.supplier(SupplierId(1))?.is_some());
/// # Ok::<(), haulage_core::StoreError>(())
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
    package_ids: AtomicU64,
    vehicle_ids: AtomicU64,
}

impl MemoryStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with a network.
    ///
    /// # Errors
    ///
    /// [`StoreError::Constraint`] when a connection references an unknown
    /// facility.
    pub fn with_network(
        facilities: impl IntoIterator<Item = Facility>,
        connections: impl IntoIterator<Item = Connection>,
    ) -> Result<Self, StoreError> {
        let store = Self::new();
        store.import(&NetworkSeed {
            facilities: facilities.into_iter().collect(),
            connections: connections.into_iter().collect(),
            suppliers: Vec::new(),
        })?;
        Ok(store)
    }

    /// Create or replace a facility.
    ///
    /// # Errors
    ///
    /// [`StoreError::LockPoisoned`] if a writer panicked.
    pub fn add_facility(&self, facility: Facility) -> Result<(), StoreError> {
        self.lock()?
            .facilities
            .insert(facility.name.clone(), facility);
        Ok(())
    }

    /// Add a connection between two existing facilities.
    ///
    /// # Errors
    ///
    /// [`StoreError::Constraint`] when either endpoint is unknown.
    pub fn add_connection(&self, connection: Connection) -> Result<(), StoreError> {
        self.lock()?.add_connection(connection)
    }

    /// Create or rename a supplier.
    ///
    /// # Errors
    ///
    /// [`StoreError::LockPoisoned`] if a writer panicked.
    pub fn add_supplier(&self, supplier: Supplier) -> Result<(), StoreError> {
        self.lock()?.suppliers.insert(supplier.id, supplier);
        Ok(())
    }

    /// Apply a [`NetworkSeed`] atomically.
    ///
    /// # Errors
    ///
    /// [`StoreError::Constraint`] when a connection references a facility
    /// that is neither stored nor part of the seed. Nothing is written in
    /// that case.
    pub fn import(&self, seed: &NetworkSeed) -> Result<ImportSummary, StoreError> {
        let mut guard = self.lock()?;
        let known = |name: &str| {
            guard.facilities.contains_key(name)
                || seed.facilities.iter().any(|facility| facility.name == name)
        };
        if let Some(name) = seed
            .connections
            .iter()
            .flat_map(|connection| [&connection.from, &connection.to])
            .find(|name| !known(name))
        {
            return Err(StoreError::Constraint {
                operation: "adding a connection",
                detail: format!("unknown facility '{name}'"),
            });
        }
        for facility in &seed.facilities {
            guard
                .facilities
                .insert(facility.name.clone(), facility.clone());
        }
        for connection in &seed.connections {
            guard.add_connection(connection.clone())?;
        }
        for supplier in &seed.suppliers {
            guard.suppliers.insert(supplier.id, supplier.clone());
        }
        debug!(
            "imported {} facilities, {} connections, {} suppliers",
            seed.facilities.len(),
            seed.connections.len(),
            seed.suppliers.len()
        );
        Ok(seed.summary())
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, StoreError> {
        self.state.lock().map_err(|_| StoreError::LockPoisoned)
    }

    const fn counter(&self, kind: IdKind) -> &AtomicU64 {
        match kind {
            IdKind::Package => &self.package_ids,
            IdKind::Vehicle => &self.vehicle_ids,
        }
    }

    fn next_id(&self, kind: IdKind) -> Result<u64, StoreError> {
        self.counter(kind)
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                last.checked_add(1)
            })
            .map(|last| last + 1)
            .map_err(|_| StoreError::IdsExhausted {
                kind: kind.as_str(),
            })
    }
}

impl NetworkGraph for MemoryStore {
    fn facility(&self, name: &str) -> Result<Option<Facility>, StoreError> {
        Ok(self.lock()?.facilities.get(name).cloned())
    }

    fn snapshot(&self) -> Result<NetworkSnapshot, StoreError> {
        let (facilities, connections) = {
            let state = self.lock()?;
            (
                state.facilities.values().cloned().collect(),
                state.connections.clone(),
            )
        };
        NetworkSnapshot::new(facilities, connections)
    }
}

impl EntityStore for MemoryStore {
    type Tx<'a> = MemoryTransaction<'a>;

    fn begin(&self) -> Result<Self::Tx<'_>, StoreError> {
        Ok(MemoryTransaction {
            store: self,
            live: self.lock()?,
            journal: Vec::new(),
        })
    }

    fn package(&self, id: PackageId) -> Result<Option<Package>, StoreError> {
        Ok(self.lock()?.packages.get(&id).cloned())
    }

    fn tracked_vehicle(&self, id: VehicleId) -> Result<Option<TrackedVehicle>, StoreError> {
        self.lock()?.tracked_vehicle(id)
    }

    fn carrier(&self, package: PackageId) -> Result<Option<VehicleId>, StoreError> {
        Ok(self.lock()?.transports.get(&package).copied())
    }

    fn supplier(&self, id: SupplierId) -> Result<Option<Supplier>, StoreError> {
        Ok(self.lock()?.suppliers.get(&id).cloned())
    }

    fn supplied_packages(
        &self,
        supplier: SupplierId,
    ) -> Result<Vec<SuppliedPackage>, StoreError> {
        let state = self.lock()?;
        state
            .supplies
            .iter()
            .filter(|(_, supply)| supply.supplier == supplier)
            .map(|(id, supply)| {
                let package = state.packages.get(id).cloned().ok_or_else(|| {
                    StoreError::Corrupt {
                        entity: "supply",
                        detail: format!("supply references missing package {id}"),
                    }
                })?;
                Ok(SuppliedPackage {
                    package,
                    paid: supply.paid,
                })
            })
            .collect()
    }
}

/// Transaction over a [`MemoryStore`].
///
/// Holds the store lock until committed or dropped. Dropping it without
/// [`commit`](StoreTransaction::commit) undoes its writes.
#[derive(Debug)]
pub struct MemoryTransaction<'a> {
    store: &'a MemoryStore,
    live: MutexGuard<'a, State>,
    journal: Vec<Undo>,
}

impl Drop for MemoryTransaction<'_> {
    fn drop(&mut self) {
        if self.journal.is_empty() {
            return;
        }
        debug!("rolling back {} staged writes", self.journal.len());
        while let Some(undo) = self.journal.pop() {
            self.live.revert(undo);
        }
    }
}

impl MemoryTransaction<'_> {
    fn require_package(&self, operation: &'static str, id: PackageId) -> Result<(), StoreError> {
        if self.live.packages.contains_key(&id) {
            Ok(())
        } else {
            Err(StoreError::Constraint {
                operation,
                detail: format!("unknown package {id}"),
            })
        }
    }
}

impl StoreTransaction for MemoryTransaction<'_> {
    fn next_id(&mut self, kind: IdKind) -> Result<u64, StoreError> {
        self.store.next_id(kind)
    }

    fn facility(&self, name: &str) -> Result<Option<Facility>, StoreError> {
        Ok(self.live.facilities.get(name).cloned())
    }

    fn package(&self, id: PackageId) -> Result<Option<Package>, StoreError> {
        Ok(self.live.packages.get(&id).cloned())
    }

    fn supplier(&self, id: SupplierId) -> Result<Option<Supplier>, StoreError> {
        Ok(self.live.suppliers.get(&id).cloned())
    }

    fn supplier_of(&self, package: PackageId) -> Result<Option<SupplierId>, StoreError> {
        Ok(self
            .live
            .supplies
            .get(&package)
            .map(|supply| supply.supplier))
    }

    fn carrier(&self, package: PackageId) -> Result<Option<VehicleId>, StoreError> {
        Ok(self.live.transports.get(&package).copied())
    }

    fn tracked_vehicle(&self, id: VehicleId) -> Result<Option<TrackedVehicle>, StoreError> {
        self.live.tracked_vehicle(id)
    }

    fn reusable_vehicle(
        &self,
        facility: &str,
        destination: &str,
        class: DeliveryClass,
    ) -> Result<Option<VehicleId>, StoreError> {
        for id in self.live.vehicles.keys() {
            if let Some(tracked) = self.live.tracked_vehicle(*id)? {
                if tracked.accepts(facility, destination, class) {
                    return Ok(Some(*id));
                }
            }
        }
        Ok(None)
    }

    fn insert_package(&mut self, package: &Package) -> Result<(), StoreError> {
        if self.live.packages.contains_key(&package.id) {
            return Err(StoreError::Constraint {
                operation: "inserting a package",
                detail: format!("package {} already exists", package.id),
            });
        }
        self.live.packages.insert(package.id, package.clone());
        self.journal.push(Undo::RemovePackage(package.id));
        Ok(())
    }

    fn insert_vehicle(
        &mut self,
        vehicle: &Vehicle,
        position: &VehiclePosition,
    ) -> Result<(), StoreError> {
        const OPERATION: &str = "inserting a vehicle";
        if self.live.vehicles.contains_key(&vehicle.id) {
            return Err(StoreError::Constraint {
                operation: OPERATION,
                detail: format!("vehicle {} already exists", vehicle.id),
            });
        }
        self.live.require_facility(OPERATION, &vehicle.origin)?;
        self.live.require_facility(OPERATION, &vehicle.destination)?;
        self.live.require_facility(OPERATION, &position.facility)?;
        self.live.vehicles.insert(vehicle.id, vehicle.clone());
        self.live.positions.insert(vehicle.id, position.clone());
        self.journal.push(Undo::RemoveVehicle(vehicle.id));
        Ok(())
    }

    fn attach_package(
        &mut self,
        vehicle: VehicleId,
        package: PackageId,
    ) -> Result<(), StoreError> {
        const OPERATION: &str = "attaching a package";
        self.require_package(OPERATION, package)?;
        if !self.live.vehicles.contains_key(&vehicle) {
            return Err(StoreError::Constraint {
                operation: OPERATION,
                detail: format!("unknown vehicle {vehicle}"),
            });
        }
        if self.live.transports.contains_key(&package) {
            return Err(StoreError::Constraint {
                operation: OPERATION,
                detail: format!("package {package} already has a vehicle"),
            });
        }
        self.live.transports.insert(package, vehicle);
        self.journal.push(Undo::RemoveTransport(package));
        Ok(())
    }

    fn link_supplier(
        &mut self,
        supplier: SupplierId,
        package: PackageId,
    ) -> Result<(), StoreError> {
        const OPERATION: &str = "linking a supplier";
        self.require_package(OPERATION, package)?;
        if !self.live.suppliers.contains_key(&supplier) {
            return Err(StoreError::Constraint {
                operation: OPERATION,
                detail: format!("unknown supplier {supplier}"),
            });
        }
        if self.live.supplies.contains_key(&package) {
            return Err(StoreError::Constraint {
                operation: OPERATION,
                detail: format!("package {package} already has a supplier"),
            });
        }
        self.live.supplies.insert(
            package,
            Supply {
                supplier,
                paid: false,
            },
        );
        self.journal.push(Undo::RemoveSupply(package));
        Ok(())
    }

    fn replace_position(
        &mut self,
        vehicle: VehicleId,
        position: &VehiclePosition,
    ) -> Result<(), StoreError> {
        const OPERATION: &str = "moving a vehicle";
        self.live.require_facility(OPERATION, &position.facility)?;
        let Some(slot) = self.live.positions.get_mut(&vehicle) else {
            return Err(StoreError::Constraint {
                operation: OPERATION,
                detail: format!("unknown vehicle {vehicle}"),
            });
        };
        let previous = std::mem::replace(slot, position.clone());
        self.journal.push(Undo::RestorePosition(vehicle, previous));
        Ok(())
    }

    fn set_paid(
        &mut self,
        supplier: SupplierId,
        package: PackageId,
        paid: bool,
    ) -> Result<bool, StoreError> {
        match self.live.supplies.get_mut(&package) {
            Some(supply) if supply.supplier == supplier => {
                let previous = std::mem::replace(&mut supply.paid, paid);
                self.journal.push(Undo::RestorePaid(package, previous));
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn commit(mut self) -> Result<(), StoreError> {
        self.journal.clear();
        Ok(())
    }
}
