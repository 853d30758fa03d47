//! Least-cost routing under a delivery deadline.
//!
//! The search is exact. It walks simple paths depth first and prunes a
//! partial path as soon as the cheapest possible completion is no better than
//! the incumbent, or the fastest possible completion misses the deadline.
//! Both completions come from Dijkstra runs towards the target, so most of
//! the network is never expanded on realistic inputs.

mod bounds;

use chrono::NaiveDateTime;
use log::debug;

use crate::network::{Edge, NetworkSnapshot};
use crate::{
    DeadlinePolicy, DeliveryClass, DeliveryError, FacilityRole, NetworkGraph, Route, StoreError,
    TimeBudget,
};

use bounds::Bounds;

/// Tunables for [`RouteFinder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteFinderConfig {
    /// Maximum number of partial paths the search may extend before giving
    /// up with [`DeliveryError::SearchLimitExceeded`].
    pub max_expansions: usize,
}

impl Default for RouteFinderConfig {
    fn default() -> Self {
        Self {
            max_expansions: 1_000_000,
        }
    }
}

/// Finds the cheapest route that meets a delivery class deadline.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use haulage_core::{
///     Connection, DeadlinePolicy, DeliveryClass, Facility, FacilityRole, NetworkSnapshot,
///     RouteFinder,
/// };
///
/// let network = NetworkSnapshot::new(
///     vec![
///         Facility::new("A", FacilityRole::Origin),
///         Facility::new("B", FacilityRole::Transfer),
///         Facility::new("C", FacilityRole::Destination),
///     ],
///     vec![Connection::new("A", "B", 10, 30, 5), Connection::new("B", "C", 15, 40, 5)],
/// )?;
/// let now = NaiveDate::from_ymd_opt(2024, 3, 1)
///     .and_then(|d| d.and_hms_opt(9, 0, 0))
///     .expect("valid timestamp");
///
/// let finder = RouteFinder::new(DeadlinePolicy::default());
/// let route = finder.route_in(&network, "A", "C", DeliveryClass::Economy, now)?;
/// assert_eq!(route.total_cost, 25);
/// assert_eq!(route.total_minutes, 80);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct RouteFinder {
    policy: DeadlinePolicy,
    config: RouteFinderConfig,
}

impl RouteFinder {
    /// Router using `policy` and default search limits.
    #[must_use]
    pub fn new(policy: DeadlinePolicy) -> Self {
        Self::with_config(policy, RouteFinderConfig::default())
    }

    /// Router with explicit search limits.
    #[must_use]
    pub const fn with_config(policy: DeadlinePolicy, config: RouteFinderConfig) -> Self {
        Self { policy, config }
    }

    /// Deadline policy in use.
    #[must_use]
    pub const fn policy(&self) -> &DeadlinePolicy {
        &self.policy
    }

    /// Find the cheapest route from `start` to `end` for `class` at `now`.
    ///
    /// The deadline is checked before the graph is read, so an expired
    /// same-day cutoff never touches the store.
    ///
    /// # Errors
    ///
    /// Deadline errors from the [`DeadlinePolicy`], store failures, unknown
    /// or misplaced facilities, [`DeliveryError::NoFeasiblePath`] and
    /// [`DeliveryError::SearchLimitExceeded`].
    pub fn find_route<G>(
        &self,
        graph: &G,
        start: &str,
        end: &str,
        class: DeliveryClass,
        now: NaiveDateTime,
    ) -> Result<Route, DeliveryError>
    where
        G: NetworkGraph + ?Sized,
    {
        let budget = self.policy.budget(class, now)?;
        let snapshot = graph.snapshot()?;
        self.search(&snapshot, start, end, budget)
    }

    /// Same as [`RouteFinder::find_route`] over an existing snapshot.
    ///
    /// # Errors
    ///
    /// See [`RouteFinder::find_route`].
    pub fn route_in(
        &self,
        snapshot: &NetworkSnapshot,
        start: &str,
        end: &str,
        class: DeliveryClass,
        now: NaiveDateTime,
    ) -> Result<Route, DeliveryError> {
        let budget = self.policy.budget(class, now)?;
        self.search(snapshot, start, end, budget)
    }

    /// Search `snapshot` under an explicit budget.
    ///
    /// # Errors
    ///
    /// See [`RouteFinder::find_route`].
    pub fn search(
        &self,
        snapshot: &NetworkSnapshot,
        start: &str,
        end: &str,
        budget: TimeBudget,
    ) -> Result<Route, DeliveryError> {
        let source = endpoint(snapshot, start, FacilityRole::Origin)?;
        let target = endpoint(snapshot, end, FacilityRole::Destination)?;
        let infeasible = || DeliveryError::NoFeasiblePath {
            start: start.to_owned(),
            end: end.to_owned(),
        };
        if source == target {
            return Err(infeasible());
        }

        let bounds = Bounds::towards(snapshot, target);
        match bounds.remaining(source) {
            Some((_, minutes)) if budget.allows(minutes) => {}
            _ => return Err(infeasible()),
        }

        let mut search = Search::new(snapshot, &bounds, budget, target, self.config.max_expansions);
        let outcome = search.run(source);
        debug!(
            "route search {start} -> {end}: {} expansions, budget {:?}",
            search.expansions,
            budget.minutes()
        );
        let best = match outcome {
            Ok(best) => best.ok_or_else(infeasible)?,
            Err(Exhausted) => {
                return Err(DeliveryError::SearchLimitExceeded {
                    start: start.to_owned(),
                    end: end.to_owned(),
                    limit: self.config.max_expansions,
                });
            }
        };

        let legs = best
            .edges
            .iter()
            .map(|edge| snapshot.leg(edge))
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| StoreError::Corrupt {
                entity: "connection",
                detail: "route leg missing from snapshot".to_owned(),
            })?;
        Ok(Route::new(legs, budget))
    }
}

fn endpoint(
    snapshot: &NetworkSnapshot,
    name: &str,
    expected: FacilityRole,
) -> Result<usize, DeliveryError> {
    let facility = snapshot
        .facility_by_name(name)
        .ok_or_else(|| DeliveryError::FacilityNotFound {
            name: name.to_owned(),
        })?;
    if facility.role != expected {
        return Err(DeliveryError::UnexpectedFacilityRole {
            name: name.to_owned(),
            expected,
            found: facility.role,
        });
    }
    snapshot
        .position(name)
        .ok_or_else(|| DeliveryError::FacilityNotFound {
            name: name.to_owned(),
        })
}

#[derive(Debug)]
struct Exhausted;

#[derive(Debug, Clone)]
struct Best {
    edges: Vec<Edge>,
    cost: u64,
    minutes: u64,
}

impl Best {
    const fn beaten_by(&self, cost: u64, minutes: u64) -> bool {
        cost < self.cost || (cost == self.cost && minutes < self.minutes)
    }
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    node: usize,
    next: usize,
}

struct Search<'a> {
    snapshot: &'a NetworkSnapshot,
    bounds: &'a Bounds,
    budget: TimeBudget,
    target: usize,
    limit: usize,
    expansions: usize,
    visited: Vec<bool>,
    path: Vec<Edge>,
    cost: u64,
    minutes: u64,
    best: Option<Best>,
}

impl<'a> Search<'a> {
    fn new(
        snapshot: &'a NetworkSnapshot,
        bounds: &'a Bounds,
        budget: TimeBudget,
        target: usize,
        limit: usize,
    ) -> Self {
        Self {
            snapshot,
            bounds,
            budget,
            target,
            limit,
            expansions: 0,
            visited: vec![false; snapshot.len()],
            path: Vec::new(),
            cost: 0,
            minutes: 0,
            best: None,
        }
    }

    fn run(&mut self, source: usize) -> Result<Option<Best>, Exhausted> {
        let mut stack = vec![Frame {
            node: source,
            next: 0,
        }];
        self.mark(source, true);

        while let Some(frame) = stack.last_mut() {
            let Frame { node, next } = *frame;
            let Some(edge) = self.snapshot.outgoing(node).get(next).copied() else {
                stack.pop();
                self.mark(node, false);
                self.retreat();
                continue;
            };
            frame.next += 1;

            if !self.worth_extending(&edge) {
                continue;
            }
            self.expansions += 1;
            if self.expansions > self.limit {
                return Err(Exhausted);
            }
            self.advance(edge);
            if edge.to == self.target {
                self.record();
                self.retreat();
            } else {
                self.mark(edge.to, true);
                stack.push(Frame {
                    node: edge.to,
                    next: 0,
                });
            }
        }

        Ok(self.best.take())
    }

    fn worth_extending(&self, edge: &Edge) -> bool {
        if self.visited.get(edge.to).copied().unwrap_or(true) {
            return false;
        }
        let Some((rest_cost, rest_minutes)) = self.bounds.remaining(edge.to) else {
            return false;
        };
        let cost = self.cost.saturating_add(edge.cost).saturating_add(rest_cost);
        let minutes = self
            .minutes
            .saturating_add(edge.minutes)
            .saturating_add(rest_minutes);
        self.budget.allows(minutes)
            && self.best.as_ref().is_none_or(|best| best.beaten_by(cost, minutes))
    }

    fn mark(&mut self, node: usize, visited: bool) {
        if let Some(slot) = self.visited.get_mut(node) {
            *slot = visited;
        }
    }

    fn advance(&mut self, edge: Edge) {
        self.cost = self.cost.saturating_add(edge.cost);
        self.minutes = self.minutes.saturating_add(edge.minutes);
        self.path.push(edge);
    }

    fn retreat(&mut self) {
        if let Some(edge) = self.path.pop() {
            self.cost = self.cost.saturating_sub(edge.cost);
            self.minutes = self.minutes.saturating_sub(edge.minutes);
        }
    }

    fn record(&mut self) {
        if self
            .best
            .as_ref()
            .is_none_or(|best| best.beaten_by(self.cost, self.minutes))
        {
            self.best = Some(Best {
                edges: self.path.clone(),
                cost: self.cost,
                minutes: self.minutes,
            });
        }
    }
}

#[cfg(test)]
mod tests;
