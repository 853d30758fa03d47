//! End-to-end delivery creation.
//!
//! A delivery is quoted by the [`RouteFinder`] and then, inside a single store
//! transaction, turned into a package billed to a supplier and placed on a
//! vehicle. Either all of it commits or none of it does.

use chrono::NaiveDateTime;
use log::{info, warn};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::billing::assign_in;
use crate::fleet::charter_in;
use crate::{
    BillingLedger, Clock, DeliveryClass, DeliveryError, EntityStore, FleetTracker, IdKind,
    Package, PackageId, Route, RouteFinder, StoreTransaction, SupplierId, SystemClock, VehicleId,
};

/// Everything decided while creating a delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DeliveryReceipt {
    /// The new package.
    pub package: PackageId,
    /// Vehicle the package was placed on.
    pub vehicle_id: VehicleId,
    /// Route the package was quoted for.
    pub route: Route,
}

/// Owns a store, a clock and a router and coordinates them.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use haulage_core::{
///     Connection, DeliveryClass, DeliveryCoordinator, Facility, FacilityRole, FixedClock,
///     MemoryStore, RouteFinder, Supplier, SupplierId,
/// };
///
/// let store = MemoryStore::with_network(
///     vec![
///         Facility::new("A", FacilityRole::Origin),
///         Facility::new("B", FacilityRole::Transfer),
///         Facility::new("C", FacilityRole::Destination),
///     ],
///     vec![Connection::new("A", "B", 10, 30, 5), Connection::new("B", "C", 15, 40, 5)],
/// )?;
/// store.add_supplier(Supplier::new(1, "Acme"))?;
/// let now = NaiveDate::from_ymd_opt(2024, 3, 1)
///     .and_then(|d| d.and_hms_opt(9, 0, 0))
///     .expect("valid timestamp");
///
/// let coordinator = DeliveryCoordinator::new(store, FixedClock::new(now), RouteFinder::default());
/// let package = coordinator.create_delivery("A", "C", DeliveryClass::Economy, SupplierId(1))?;
/// let status = coordinator.fleet().package_status(package)?;
/// assert_eq!(status.minutes_remaining, 80);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct DeliveryCoordinator<S, C = SystemClock> {
    store: S,
    clock: C,
    router: RouteFinder,
}

impl<S: EntityStore, C: Clock> DeliveryCoordinator<S, C> {
    /// Coordinator over `store`, reading time from `clock`.
    #[must_use]
    pub const fn new(store: S, clock: C, router: RouteFinder) -> Self {
        Self {
            store,
            clock,
            router,
        }
    }

    /// The underlying store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// The clock stamping every change.
    #[must_use]
    pub const fn clock(&self) -> &C {
        &self.clock
    }

    /// The router quoting deliveries.
    #[must_use]
    pub const fn router(&self) -> &RouteFinder {
        &self.router
    }

    /// Fleet operations over the same store and clock.
    #[must_use]
    pub const fn fleet(&self) -> FleetTracker<'_, S, C> {
        FleetTracker::new(&self.store, &self.clock)
    }

    /// Billing operations over the same store.
    #[must_use]
    pub const fn billing(&self) -> BillingLedger<'_, S> {
        BillingLedger::new(&self.store)
    }

    /// Quote and book a delivery; returns the new package id.
    ///
    /// # Errors
    ///
    /// See [`DeliveryCoordinator::create_delivery_detailed`].
    pub fn create_delivery(
        &self,
        start: &str,
        end: &str,
        class: DeliveryClass,
        supplier: SupplierId,
    ) -> Result<PackageId, DeliveryError> {
        self.create_delivery_detailed(start, end, class, supplier)
            .map(|receipt| receipt.package)
    }

    /// Quote and book a delivery, returning the route and vehicle as well.
    ///
    /// Routing happens before anything is written. The package, its supplier
    /// link and its vehicle are then written in one transaction that is
    /// rolled back on any failure.
    ///
    /// # Errors
    ///
    /// Any routing error from [`RouteFinder::find_route`], followed by
    /// [`DeliveryError::SupplierNotFound`], fleet errors and store failures.
    pub fn create_delivery_detailed(
        &self,
        start: &str,
        end: &str,
        class: DeliveryClass,
        supplier: SupplierId,
    ) -> Result<DeliveryReceipt, DeliveryError> {
        let now = self.clock.now();
        let route = self.router.find_route(&self.store, start, end, class, now)?;

        let mut tx = self.store.begin()?;
        let (package, vehicle_id) = match book(&mut tx, start, end, class, supplier, &route, now) {
            Ok(booked) => booked,
            Err(err) => {
                drop(tx);
                warn!("delivery {start} -> {end} for supplier {supplier} rolled back: {err}");
                return Err(err);
            }
        };
        tx.commit()?;
        info!(
            "package {package} booked {start} -> {end} ({class}) on vehicle {vehicle_id}, cost {}, {} minutes",
            route.total_cost, route.total_minutes
        );
        Ok(DeliveryReceipt {
            package,
            vehicle_id,
            route,
        })
    }
}

fn book<T: StoreTransaction>(
    tx: &mut T,
    start: &str,
    end: &str,
    class: DeliveryClass,
    supplier: SupplierId,
    route: &Route,
    now: NaiveDateTime,
) -> Result<(PackageId, VehicleId), DeliveryError> {
    let package = PackageId(tx.next_id(IdKind::Package)?);
    tx.insert_package(&Package {
        id: package,
        time_budget_minutes: route.total_minutes,
        total_cost: route.total_cost,
        delivery_class: class,
        created_at: now,
    })?;
    assign_in(tx, supplier, package)?;
    let vehicle = charter_in(tx, start, end, class, package, now)?;
    Ok((package, vehicle))
}
