use super::*;
use crate::{Connection, DeadlineRule, Facility};
use chrono::NaiveDate;
use rstest::{fixture, rstest};

fn at(hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 1)
        .and_then(|d| d.and_hms_opt(hour, minute, 0))
        .expect("valid timestamp")
}

fn network(facilities: &[(&str, FacilityRole)], connections: Vec<Connection>) -> NetworkSnapshot {
    NetworkSnapshot::new(
        facilities
            .iter()
            .map(|(name, role)| Facility::new(*name, *role))
            .collect(),
        connections,
    )
    .expect("valid network")
}

#[fixture]
fn chain() -> NetworkSnapshot {
    network(
        &[
            ("A", FacilityRole::Origin),
            ("B", FacilityRole::Transfer),
            ("C", FacilityRole::Destination),
        ],
        vec![
            Connection::new("A", "B", 10, 30, 5),
            Connection::new("B", "C", 15, 40, 5),
        ],
    )
}

#[fixture]
fn finder() -> RouteFinder {
    RouteFinder::new(DeadlinePolicy::default())
}

#[rstest]
fn economy_takes_the_only_route(finder: RouteFinder, chain: NetworkSnapshot) {
    let route = finder
        .route_in(&chain, "A", "C", DeliveryClass::Economy, at(9, 0))
        .expect("route exists");
    assert_eq!(route.total_cost, 25);
    assert_eq!(route.total_minutes, 80);
    assert_eq!(route.stops(), vec!["A", "B", "C"]);
    assert_eq!(route.budget, TimeBudget::Unlimited);
}

#[rstest]
fn express_near_cutoff_has_no_feasible_route(finder: RouteFinder, chain: NetworkSnapshot) {
    let err = finder
        .route_in(&chain, "A", "C", DeliveryClass::Express, at(17, 50))
        .expect_err("ten minutes is not enough");
    assert!(matches!(err, DeliveryError::NoFeasiblePath { ref start, ref end }
        if start == "A" && end == "C"));
}

#[rstest]
fn express_after_cutoff_reports_deadline(finder: RouteFinder, chain: NetworkSnapshot) {
    let err = finder
        .route_in(&chain, "A", "C", DeliveryClass::Express, at(18, 30))
        .expect_err("cutoff passed");
    assert!(matches!(err, DeliveryError::DeadlineAlreadyPassed { .. }));
}

#[rstest]
fn route_exactly_on_budget_is_feasible(chain: NetworkSnapshot) {
    let finder = RouteFinder::new(
        DeadlinePolicy::empty().with_rule(DeliveryClass::Express, DeadlineRule::Horizon { minutes: 80 }),
    );
    let route = finder
        .route_in(&chain, "A", "C", DeliveryClass::Express, at(9, 0))
        .expect("80 minutes fit in 80");
    assert_eq!(route.total_minutes, 80);
}

#[rstest]
fn prefers_cheaper_slower_route_when_it_fits() {
    let snapshot = network(
        &[
            ("A", FacilityRole::Origin),
            ("B", FacilityRole::Transfer),
            ("C", FacilityRole::Destination),
        ],
        vec![
            Connection::new("A", "C", 100, 20, 0),
            Connection::new("A", "B", 10, 60, 0),
            Connection::new("B", "C", 10, 60, 0),
        ],
    );
    let finder = RouteFinder::default();

    let slow = finder
        .search(&snapshot, "A", "C", TimeBudget::Unlimited)
        .expect("route exists");
    assert_eq!(slow.total_cost, 20);
    assert_eq!(slow.stops(), vec!["A", "B", "C"]);

    let tight = TimeBudget::Limited {
        minutes: 60,
        deadline: at(10, 0),
    };
    let fast = finder
        .search(&snapshot, "A", "C", tight)
        .expect("direct route fits");
    assert_eq!(fast.total_cost, 100);
    assert_eq!(fast.stops(), vec!["A", "C"]);
}

#[rstest]
fn equal_cost_prefers_fewer_minutes() {
    let snapshot = network(
        &[
            ("A", FacilityRole::Origin),
            ("B", FacilityRole::Transfer),
            ("D", FacilityRole::Transfer),
            ("Z", FacilityRole::Destination),
        ],
        vec![
            Connection::new("A", "B", 5, 50, 0),
            Connection::new("B", "Z", 5, 50, 0),
            Connection::new("A", "D", 5, 10, 0),
            Connection::new("D", "Z", 5, 10, 0),
        ],
    );
    let route = RouteFinder::default()
        .search(&snapshot, "A", "Z", TimeBudget::Unlimited)
        .expect("route exists");
    assert_eq!(route.stops(), vec!["A", "D", "Z"]);
    assert_eq!(route.total_minutes, 20);
}

#[rstest]
fn full_ties_resolve_by_facility_name() {
    let snapshot = network(
        &[
            ("A", FacilityRole::Origin),
            ("M", FacilityRole::Transfer),
            ("K", FacilityRole::Transfer),
            ("Z", FacilityRole::Destination),
        ],
        vec![
            Connection::new("A", "M", 5, 10, 0),
            Connection::new("M", "Z", 5, 10, 0),
            Connection::new("A", "K", 5, 10, 0),
            Connection::new("K", "Z", 5, 10, 0),
        ],
    );
    let route = RouteFinder::default()
        .search(&snapshot, "A", "Z", TimeBudget::Unlimited)
        .expect("route exists");
    assert_eq!(route.stops(), vec!["A", "K", "Z"]);
}

#[rstest]
fn bidirectional_connection_is_walked_backwards() {
    let snapshot = network(
        &[
            ("A", FacilityRole::Origin),
            ("B", FacilityRole::Transfer),
            ("C", FacilityRole::Destination),
        ],
        vec![
            Connection::new("B", "A", 3, 10, 2),
            Connection::new("C", "B", 4, 10, 2),
        ],
    );
    let route = RouteFinder::default()
        .search(&snapshot, "A", "C", TimeBudget::Unlimited)
        .expect("undirected traversal");
    assert_eq!(route.stops(), vec!["A", "B", "C"]);
    assert_eq!(route.total_cost, 7);
    assert_eq!(route.total_minutes, 24);
}

#[rstest]
fn one_way_connection_is_not_walked_backwards() {
    let snapshot = network(
        &[
            ("A", FacilityRole::Origin),
            ("C", FacilityRole::Destination),
        ],
        vec![Connection::one_way("C", "A", 1, 1, 0)],
    );
    let err = RouteFinder::default()
        .search(&snapshot, "A", "C", TimeBudget::Unlimited)
        .expect_err("wrong direction");
    assert!(matches!(err, DeliveryError::NoFeasiblePath { .. }));
}

#[rstest]
fn disconnected_facilities_have_no_route() {
    let snapshot = network(
        &[
            ("A", FacilityRole::Origin),
            ("B", FacilityRole::Transfer),
            ("C", FacilityRole::Destination),
        ],
        vec![Connection::new("A", "B", 1, 1, 1)],
    );
    let err = RouteFinder::default()
        .search(&snapshot, "A", "C", TimeBudget::Unlimited)
        .expect_err("C unreachable");
    assert!(matches!(err, DeliveryError::NoFeasiblePath { .. }));
}

#[rstest]
#[case("X", "C", "X")]
#[case("A", "Y", "Y")]
fn unknown_endpoint_is_reported(
    finder: RouteFinder,
    chain: NetworkSnapshot,
    #[case] start: &str,
    #[case] end: &str,
    #[case] missing: &str,
) {
    let err = finder
        .search(&chain, start, end, TimeBudget::Unlimited)
        .expect_err("unknown facility");
    assert!(matches!(err, DeliveryError::FacilityNotFound { ref name } if name == missing));
}

#[rstest]
#[case("B", "C", FacilityRole::Origin, FacilityRole::Transfer)]
#[case("A", "B", FacilityRole::Destination, FacilityRole::Transfer)]
#[case("C", "A", FacilityRole::Origin, FacilityRole::Destination)]
fn endpoints_must_have_matching_roles(
    finder: RouteFinder,
    chain: NetworkSnapshot,
    #[case] start: &str,
    #[case] end: &str,
    #[case] wanted: FacilityRole,
    #[case] actual: FacilityRole,
) {
    let err = finder
        .search(&chain, start, end, TimeBudget::Unlimited)
        .expect_err("role mismatch");
    assert!(matches!(
        err,
        DeliveryError::UnexpectedFacilityRole { expected, found, .. }
            if expected == wanted && found == actual
    ));
}

#[rstest]
fn route_never_passes_through_the_destination() {
    let snapshot = network(
        &[
            ("A", FacilityRole::Origin),
            ("B", FacilityRole::Transfer),
            ("C", FacilityRole::Destination),
        ],
        vec![
            Connection::new("A", "C", 50, 10, 0),
            Connection::new("C", "B", 0, 0, 0),
            Connection::new("A", "B", 100, 10, 0),
        ],
    );
    let route = RouteFinder::default()
        .search(&snapshot, "A", "C", TimeBudget::Unlimited)
        .expect("route exists");
    assert_eq!(route.stops(), vec!["A", "C"]);
}

#[rstest]
fn expansion_limit_stops_search(chain: NetworkSnapshot) {
    let finder = RouteFinder::with_config(
        DeadlinePolicy::default(),
        RouteFinderConfig { max_expansions: 1 },
    );
    let err = finder
        .search(&chain, "A", "C", TimeBudget::Unlimited)
        .expect_err("two legs need two expansions");
    assert!(matches!(err, DeliveryError::SearchLimitExceeded { limit: 1, .. }));
}

#[rstest]
fn find_route_reads_the_graph(finder: RouteFinder, chain: NetworkSnapshot) {
    struct Fixed(NetworkSnapshot);
    impl NetworkGraph for Fixed {
        fn facility(&self, name: &str) -> Result<Option<Facility>, StoreError> {
            Ok(self.0.facility_by_name(name).cloned())
        }
        fn snapshot(&self) -> Result<NetworkSnapshot, StoreError> {
            Ok(self.0.clone())
        }
    }

    let route = finder
        .find_route(&Fixed(chain), "A", "C", DeliveryClass::Overnight, at(9, 0))
        .expect("overnight route");
    assert_eq!(route.total_cost, 25);
    assert!(matches!(route.budget, TimeBudget::Limited { minutes, .. } if minutes == 20 * 60));
}

#[rstest]
fn expired_deadline_is_checked_before_the_graph(finder: RouteFinder) {
    struct Broken;
    impl NetworkGraph for Broken {
        fn facility(&self, _name: &str) -> Result<Option<Facility>, StoreError> {
            Err(StoreError::LockPoisoned)
        }
        fn snapshot(&self) -> Result<NetworkSnapshot, StoreError> {
            Err(StoreError::LockPoisoned)
        }
    }

    let err = finder
        .find_route(&Broken, "A", "C", DeliveryClass::Express, at(19, 0))
        .expect_err("deadline passed");
    assert!(matches!(err, DeliveryError::DeadlineAlreadyPassed { .. }));
    let err = finder
        .find_route(&Broken, "A", "C", DeliveryClass::Economy, at(9, 0))
        .expect_err("store down");
    assert!(err.is_retryable());
}
