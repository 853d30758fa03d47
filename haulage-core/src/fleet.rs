//! Vehicle chartering, movement and package tracking.

use chrono::NaiveDateTime;
use log::info;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    Clock, DeliveryClass, DeliveryError, EntityStore, IdKind, PackageId, StoreTransaction,
    TrackedVehicle, Vehicle, VehicleId, VehiclePosition,
};

/// Where a package is and how much of its time budget is left.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PackageStatus {
    /// The package.
    pub package_id: PackageId,
    /// Vehicle carrying it.
    pub vehicle_id: VehicleId,
    /// Facility the vehicle last reported from.
    pub facility: String,
    /// Budget minus the time elapsed between departure and the last report.
    /// Negative once the delivery is late.
    pub minutes_remaining: i64,
    /// When the vehicle last reported its position.
    pub last_seen: NaiveDateTime,
}

/// Operations on vehicles, borrowing a store and a clock.
///
/// Obtained from [`DeliveryCoordinator::fleet`](crate::DeliveryCoordinator::fleet)
/// or built directly with [`FleetTracker::new`].
#[derive(Debug)]
pub struct FleetTracker<'a, S: ?Sized, C: ?Sized> {
    store: &'a S,
    clock: &'a C,
}

impl<S: ?Sized, C: ?Sized> Clone for FleetTracker<'_, S, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S: ?Sized, C: ?Sized> Copy for FleetTracker<'_, S, C> {}

impl<'a, S, C> FleetTracker<'a, S, C>
where
    S: EntityStore + ?Sized,
    C: Clock + ?Sized,
{
    /// Tracker over `store`, stamping changes with `clock`.
    #[must_use]
    pub const fn new(store: &'a S, clock: &'a C) -> Self {
        Self { store, clock }
    }

    /// Put `package` on a vehicle from `start` to `destination`.
    ///
    /// A vehicle still waiting at `start` for the same destination and class
    /// is reused (lowest id first); otherwise a new vehicle is chartered and
    /// departs now.
    ///
    /// # Errors
    ///
    /// [`DeliveryError::PackageNotFound`], [`DeliveryError::FacilityNotFound`],
    /// [`DeliveryError::PackageAlreadyTransported`] or a store failure.
    pub fn charter_vehicle(
        &self,
        start: &str,
        destination: &str,
        class: DeliveryClass,
        package: PackageId,
    ) -> Result<VehicleId, DeliveryError> {
        let mut tx = self.store.begin()?;
        let vehicle =
            charter_in(&mut tx, start, destination, class, package, self.clock.now())?;
        tx.commit()?;
        Ok(vehicle)
    }

    /// Report that `vehicle` is now at `facility`.
    ///
    /// The previous position is replaced atomically and the vehicle stops
    /// accepting new packages.
    ///
    /// # Errors
    ///
    /// [`DeliveryError::VehicleNotFound`], [`DeliveryError::FacilityNotFound`]
    /// or a store failure.
    pub fn update_position(&self, vehicle: VehicleId, facility: &str) -> Result<(), DeliveryError> {
        let now = self.clock.now();
        let mut tx = self.store.begin()?;
        if tx.tracked_vehicle(vehicle)?.is_none() {
            return Err(DeliveryError::VehicleNotFound { id: vehicle });
        }
        require_facility(&tx, facility)?;
        tx.replace_position(vehicle, &VehiclePosition::reported(facility, now))?;
        tx.commit()?;
        info!("vehicle {vehicle} reported at {facility}");
        Ok(())
    }

    /// Current whereabouts and remaining budget of `package`.
    ///
    /// # Errors
    ///
    /// [`DeliveryError::PackageNotFound`] when the package or its vehicle is
    /// missing.
    pub fn package_status(&self, package: PackageId) -> Result<PackageStatus, DeliveryError> {
        let missing = || DeliveryError::PackageNotFound { id: package };
        let stored = self.store.package(package)?.ok_or_else(missing)?;
        let vehicle_id = self.store.carrier(package)?.ok_or_else(missing)?;
        let tracked = self
            .store
            .tracked_vehicle(vehicle_id)?
            .ok_or_else(missing)?;

        let elapsed = (tracked.position.recorded_at - tracked.vehicle.departure_time).num_minutes();
        let budget = i64::try_from(stored.time_budget_minutes).unwrap_or(i64::MAX);
        Ok(PackageStatus {
            package_id: package,
            vehicle_id,
            facility: tracked.position.facility,
            minutes_remaining: budget.saturating_sub(elapsed),
            last_seen: tracked.position.recorded_at,
        })
    }

    /// Load a vehicle and its position.
    ///
    /// # Errors
    ///
    /// [`DeliveryError::VehicleNotFound`] or a store failure.
    pub fn vehicle(&self, id: VehicleId) -> Result<TrackedVehicle, DeliveryError> {
        self.store
            .tracked_vehicle(id)?
            .ok_or(DeliveryError::VehicleNotFound { id })
    }
}

/// Charter inside an open transaction.
///
/// Used by the coordinator so the charter commits together with the package.
pub(crate) fn charter_in<T: StoreTransaction>(
    tx: &mut T,
    start: &str,
    destination: &str,
    class: DeliveryClass,
    package: PackageId,
    now: NaiveDateTime,
) -> Result<VehicleId, DeliveryError> {
    if tx.package(package)?.is_none() {
        return Err(DeliveryError::PackageNotFound { id: package });
    }
    require_facility(tx, start)?;
    require_facility(tx, destination)?;
    if let Some(vehicle) = tx.carrier(package)? {
        return Err(DeliveryError::PackageAlreadyTransported { package, vehicle });
    }

    let vehicle = if let Some(waiting) = tx.reusable_vehicle(start, destination, class)? {
        info!("package {package} joins waiting vehicle {waiting} at {start}");
        waiting
    } else {
        let id = VehicleId(tx.next_id(IdKind::Vehicle)?);
        let vehicle = Vehicle {
            id,
            origin: start.to_owned(),
            destination: destination.to_owned(),
            delivery_class: class,
            departure_time: now,
        };
        tx.insert_vehicle(&vehicle, &VehiclePosition::chartered(start, now))?;
        info!("chartered vehicle {id} {start} -> {destination} ({class})");
        id
    };
    tx.attach_package(vehicle, package)?;
    Ok(vehicle)
}

fn require_facility<T: StoreTransaction>(tx: &T, name: &str) -> Result<(), DeliveryError> {
    match tx.facility(name)? {
        Some(_) => Ok(()),
        None => Err(DeliveryError::FacilityNotFound {
            name: name.to_owned(),
        }),
    }
}
