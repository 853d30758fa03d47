//! Routes chosen by the router.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Connection, TimeBudget};

/// An ordered sequence of connections from a start to an end facility.
///
/// Every leg is oriented in travel direction, so `legs[i].to ==
/// legs[i + 1].from`.
///
/// # Examples
/// ```
/// use haulage_core::{Connection, Route, TimeBudget};
///
/// let route = Route::new(
///     vec![Connection::new("A", "B", 10, 30, 5), Connection::new("B", "C", 15, 40, 5)],
///     TimeBudget::Unlimited,
/// );
/// assert_eq!(route.total_cost, 25);
/// assert_eq!(route.total_minutes, 80);
/// assert_eq!(route.stops(), vec!["A", "B", "C"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Route {
    /// Connections in travel order.
    pub legs: Vec<Connection>,
    /// Sum of leg costs.
    pub total_cost: u64,
    /// Sum of transit and loading minutes over all legs.
    pub total_minutes: u64,
    /// Budget the route was selected under.
    pub budget: TimeBudget,
}

impl Route {
    /// Build a route from legs, summing cost and time.
    #[must_use]
    pub fn new(legs: Vec<Connection>, budget: TimeBudget) -> Self {
        let total_cost = legs
            .iter()
            .fold(0_u64, |acc, leg| acc.saturating_add(leg.cost));
        let total_minutes = legs
            .iter()
            .fold(0_u64, |acc, leg| acc.saturating_add(leg.traversal_minutes()));
        Self {
            legs,
            total_cost,
            total_minutes,
            budget,
        }
    }

    /// Facility names visited, start and end included.
    #[must_use]
    pub fn stops(&self) -> Vec<&str> {
        let mut stops: Vec<&str> = self
            .legs
            .first()
            .map(|leg| leg.from.as_str())
            .into_iter()
            .collect();
        stops.extend(self.legs.iter().map(|leg| leg.to.as_str()));
        stops
    }
}
