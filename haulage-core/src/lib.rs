//! Core domain and engine for the Haulage delivery network.
//!
//! The crate models a network of facilities joined by weighted connections
//! and the entities moving through it: packages, the vehicles carrying them
//! and the suppliers paying for them. On top of that it provides a
//! deadline-aware [`RouteFinder`], a [`FleetTracker`], a [`BillingLedger`]
//! and the [`DeliveryCoordinator`] tying them together.
//!
//! Persistence sits behind the [`EntityStore`] trait. [`MemoryStore`] is
//! always available; `SqliteStore` requires the `store-sqlite` feature.

#![forbid(unsafe_code)]

mod billing;
mod clock;
mod coordinator;
mod deadline;
mod delivery_class;
mod error;
mod facility;
mod fleet;
mod ids;
mod network;
mod package;
mod route;
mod router;
mod store;
mod vehicle;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use billing::{BillingLedger, BillingPartition, DeliveriesReport};
pub use clock::{Clock, FixedClock, SystemClock};
pub use coordinator::{DeliveryCoordinator, DeliveryReceipt};
pub use deadline::{DeadlinePolicy, DeadlineRule, TimeBudget};
pub use delivery_class::{DeliveryClass, ParseDeliveryClassError};
pub use error::{DeliveryError, StoreError};
pub use facility::{Connection, Facility, FacilityRole, ParseFacilityRoleError};
pub use fleet::{FleetTracker, PackageStatus};
pub use ids::{IdKind, PackageId, SupplierId, VehicleId};
pub use network::{NetworkGraph, NetworkSnapshot};
pub use package::{Package, SuppliedPackage, Supplier};
pub use route::Route;
pub use router::{RouteFinder, RouteFinderConfig};
pub use store::{
    EntityStore, ImportSummary, MemoryStore, MemoryTransaction, NetworkSeed, StoreTransaction,
};
#[cfg(feature = "store-sqlite")]
pub use store::{SqliteStore, SqliteTransaction};
pub use vehicle::{TrackedVehicle, Vehicle, VehiclePosition};
