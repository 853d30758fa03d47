//! Facade crate for the Haulage delivery engine.
//!
//! This crate re-exports the core domain types, the routing and delivery
//! components and the store implementations enabled by feature flags.

#![forbid(unsafe_code)]

pub use haulage_core::{
    BillingLedger, BillingPartition, Clock, Connection, DeadlinePolicy, DeadlineRule,
    DeliveriesReport, DeliveryClass, DeliveryCoordinator, DeliveryError, DeliveryReceipt,
    EntityStore, Facility, FacilityRole, FixedClock, FleetTracker, ImportSummary, MemoryStore,
    NetworkGraph, NetworkSeed, NetworkSnapshot, Package, PackageId, PackageStatus, Route,
    RouteFinder, RouteFinderConfig, StoreError, StoreTransaction, SuppliedPackage, Supplier,
    SupplierId, SystemClock, TimeBudget, TrackedVehicle, Vehicle, VehicleId, VehiclePosition,
};

#[cfg(feature = "store-sqlite")]
pub use haulage_core::SqliteStore;
