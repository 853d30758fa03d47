//! File-backed behaviour of `SqliteStore`: state and id counters survive
//! reopening, and the coordinator works the same as over memory.
#![cfg(feature = "store-sqlite")]

use std::path::PathBuf;
use std::sync::Barrier;
use std::thread;

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use haulage_core::{
    Connection, DeliveryClass, DeliveryCoordinator, DeliveryError, EntityStore, Facility,
    FacilityRole, FixedClock, NetworkGraph, NetworkSeed, PackageId, RouteFinder, SqliteStore,
    Supplier, SupplierId,
};
use rstest::{fixture, rstest};
use tempfile::TempDir;

fn nine_am() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 1)
        .and_then(|day| day.and_hms_opt(9, 0, 0))
        .expect("valid timestamp")
}

/// Temporary directory holding a seeded database.
struct Database {
    _dir: TempDir,
    path: PathBuf,
}

impl Database {
    fn open(&self) -> SqliteStore {
        SqliteStore::open(&self.path).expect("open database")
    }

    fn coordinator(&self) -> DeliveryCoordinator<SqliteStore, FixedClock> {
        DeliveryCoordinator::new(self.open(), FixedClock::new(nine_am()), RouteFinder::default())
    }
}

#[fixture]
fn database() -> Database {
    let dir = TempDir::new().expect("create temp dir");
    let path = dir.path().join("haulage.db");
    let store = SqliteStore::open(&path).expect("create database");
    store
        .import(&NetworkSeed {
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
        })
        .expect("seed database");
    Database { _dir: dir, path }
}

#[rstest]
fn network_survives_reopening(database: Database) {
    let store = database.open();
    let snapshot = store.snapshot().expect("snapshot");
    assert_eq!(snapshot.len(), 3);
    assert_eq!(snapshot.connections().len(), 2);
    assert!(store.facility("B").expect("read").is_some());
}

#[rstest]
fn deliveries_survive_reopening(database: Database) {
    let receipt = database
        .coordinator()
        .create_delivery_detailed("A", "C", DeliveryClass::Economy, SupplierId(1))
        .expect("delivery");

    let store = database.open();
    let package = store
        .package(receipt.package)
        .expect("read")
        .expect("package persisted");
    assert_eq!(package.total_cost, 25);
    assert_eq!(store.carrier(receipt.package).expect("read"), Some(receipt.vehicle_id));
    let supplied = store.supplied_packages(SupplierId(1)).expect("read");
    assert_eq!(supplied.len(), 1);
}

#[rstest]
fn identifiers_continue_after_reopening(database: Database) {
    let first = database
        .coordinator()
        .create_delivery("A", "C", DeliveryClass::Economy, SupplierId(1))
        .expect("first delivery");
    let second = database
        .coordinator()
        .create_delivery("A", "C", DeliveryClass::Economy, SupplierId(2))
        .expect("second delivery");
    assert_eq!(first, PackageId(1));
    assert_eq!(second, PackageId(2));
}

#[rstest]
fn failed_delivery_leaves_database_untouched(database: Database) {
    let err = database
        .coordinator()
        .create_delivery("A", "C", DeliveryClass::Economy, SupplierId(42))
        .expect_err("unknown supplier");
    assert!(matches!(err, DeliveryError::SupplierNotFound { id: SupplierId(42) }));

    let package = database
        .coordinator()
        .create_delivery("A", "C", DeliveryClass::Economy, SupplierId(1))
        .expect("delivery");
    assert_eq!(package, PackageId(1), "rolled back id is handed out again");
}

#[rstest]
fn tracking_and_billing_persist(database: Database) {
    let coordinator = database.coordinator();
    let receipt = coordinator
        .create_delivery_detailed("A", "C", DeliveryClass::Economy, SupplierId(1))
        .expect("delivery");
    coordinator.clock().advance(TimeDelta::minutes(35));
    coordinator
        .fleet()
        .update_position(receipt.vehicle_id, "B")
        .expect("report");
    coordinator
        .billing()
        .mark_paid(SupplierId(1), receipt.package)
        .expect("pay");
    drop(coordinator);

    let reopened = database.coordinator();
    let status = reopened
        .fleet()
        .package_status(receipt.package)
        .expect("status");
    assert_eq!(status.facility, "B");
    assert_eq!(status.minutes_remaining, 45);
    let report = reopened
        .billing()
        .deliveries_report(SupplierId(1))
        .expect("report");
    assert_eq!(report.paid.count, 1);
    assert_eq!(report.not_paid.count, 0);
}

#[rstest]
fn handles_opened_together_all_book_deliveries(database: Database) {
    const HANDLES: usize = 8;
    const PER_HANDLE: usize = 5;
    let barrier = Barrier::new(HANDLES);

    let mut ids: Vec<u64> = thread::scope(|scope| {
        let workers: Vec<_> = (0..HANDLES)
            .map(|_| {
                scope.spawn(|| {
                    barrier.wait();
                    let coordinator = database.coordinator();
                    (0..PER_HANDLE)
                        .map(|_| {
                            coordinator
                                .create_delivery("A", "C", DeliveryClass::Economy, SupplierId(1))
                                .expect("delivery")
                                .get()
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        workers
            .into_iter()
            .flat_map(|worker| worker.join().expect("worker finished"))
            .collect()
    });

    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), HANDLES * PER_HANDLE);
}

#[rstest]
fn concurrent_opens_of_a_fresh_file_agree_on_schema() {
    let dir = TempDir::new().expect("create temp dir");
    let path = dir.path().join("fresh.db");
    let barrier = Barrier::new(4);
    thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                barrier.wait();
                SqliteStore::open(&path).expect("open fresh database");
            });
        }
    });
    let store = SqliteStore::open(&path).expect("reopen");
    assert!(store.snapshot().expect("snapshot").connections().is_empty());
}
