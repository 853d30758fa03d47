//! Behavioural tests for supplier billing using rstest-bdd.

use std::cell::RefCell;

use chrono::NaiveDate;
use haulage_core::{
    Connection, DeliveryClass, DeliveryCoordinator, DeliveryError, Facility, FacilityRole,
    FixedClock, MemoryStore, PackageId, RouteFinder, Supplier, SupplierId,
};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

type Coordinator = DeliveryCoordinator<MemoryStore, FixedClock>;

/// Shared state for billing scenarios.
struct BillingWorld {
    coordinator: RefCell<Option<Coordinator>>,
    payment: RefCell<Option<Result<(), DeliveryError>>>,
}

impl BillingWorld {
    fn coordinator(&self) -> std::cell::Ref<'_, Coordinator> {
        std::cell::Ref::map(self.coordinator.borrow(), |slot| {
            slot.as_ref().expect("network should be set up first")
        })
    }
}

#[fixture]
fn world() -> BillingWorld {
    BillingWorld {
        coordinator: RefCell::new(None),
        payment: RefCell::new(None),
    }
}

// --- Given steps ---

#[given("a network where A reaches C cheaply through B and quickly through X")]
fn given_network(world: &BillingWorld) {
    let store = MemoryStore::with_network(
        vec![
            Facility::new("A", FacilityRole::Origin),
            Facility::new("B", FacilityRole::Transfer),
            Facility::new("X", FacilityRole::Transfer),
            Facility::new("C", FacilityRole::Destination),
        ],
        vec![
            Connection::new("A", "B", 10, 30, 5),
            Connection::new("B", "C", 15, 40, 5),
            Connection::new("A", "X", 30, 15, 5),
            Connection::new("X", "C", 30, 15, 5),
        ],
    )
    .expect("network is consistent");
    for supplier in [Supplier::new(1, "Acme"), Supplier::new(2, "Globex")] {
        store.add_supplier(supplier).expect("add supplier");
    }
    let now = NaiveDate::from_ymd_opt(2024, 3, 1)
        .and_then(|day| day.and_hms_opt(9, 0, 0))
        .expect("valid timestamp");
    world.coordinator.replace(Some(DeliveryCoordinator::new(
        store,
        FixedClock::new(now),
        RouteFinder::default(),
    )));
}

#[given("supplier {supplier} has booked three economy deliveries from A to C")]
fn given_three_deliveries(world: &BillingWorld, supplier: u64) {
    let coordinator = world.coordinator();
    for _ in 0..3 {
        coordinator
            .create_delivery("A", "C", DeliveryClass::Economy, SupplierId(supplier))
            .expect("booking succeeds");
    }
}

// --- When steps ---

#[when("supplier {supplier} pays for package {package}")]
fn when_pay(world: &BillingWorld, supplier: u64, package: u64) {
    let outcome = world
        .coordinator()
        .billing()
        .mark_paid(SupplierId(supplier), PackageId(package));
    world.payment.replace(Some(outcome));
}

// --- Then steps ---

#[then("the report for supplier {supplier} shows {paid} paid and {unpaid} unpaid packages")]
fn then_report_counts(world: &BillingWorld, supplier: u64, paid: usize, unpaid: usize) {
    let report = world
        .coordinator()
        .billing()
        .deliveries_report(SupplierId(supplier))
        .expect("report");
    assert_eq!(report.paid.count, paid);
    assert_eq!(report.not_paid.count, unpaid);
}

#[then("the unpaid packages of supplier {supplier} cost {total} in total")]
fn then_unpaid_total(world: &BillingWorld, supplier: u64, total: u64) {
    let report = world
        .coordinator()
        .billing()
        .deliveries_report(SupplierId(supplier))
        .expect("report");
    assert_eq!(report.not_paid.total_cost, total);
}

#[then("payment fails because the package is not supplied by them")]
fn then_payment_refused(world: &BillingWorld) {
    let payment = world.payment.borrow();
    assert!(
        matches!(&*payment, Some(Err(DeliveryError::PackageNotFound { .. }))),
        "expected PackageNotFound, got {payment:?}"
    );
}

// --- Scenario registrations ---

macro_rules! register_scenario {
    ($fn_name:ident, $title:literal) => {
        #[scenario(path = "tests/features/billing.feature", name = $title)]
        fn $fn_name(world: BillingWorld) {
            let _ = world;
        }
    };
}

register_scenario!(report_splits_by_payment, "Paid and unpaid packages are reported separately");
register_scenario!(paying_twice_is_harmless, "Paying twice is harmless");
register_scenario!(
    cannot_pay_for_foreign_package,
    "A supplier cannot pay for another supplier's package"
);
