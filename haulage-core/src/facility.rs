//! Facilities and the weighted connections between them.
//!
//! Facilities are identified by name. Connections carry the three weights the
//! router cares about: a monetary cost and two time components that are
//! always summed when checking a deadline.

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role a facility plays in the logistics network.
///
/// Routes always start at an [`FacilityRole::Origin`] and finish at a
/// [`FacilityRole::Destination`]; any facility may be passed through on the
/// way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum FacilityRole {
    /// Warehouse where shipments are loaded.
    Origin,
    /// Distribution platform used for hand-overs.
    Transfer,
    /// Delivery point where shipments are dropped off.
    Destination,
}

impl FacilityRole {
    /// Stable lowercase label used in storage and on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Origin => "origin",
            Self::Transfer => "transfer",
            Self::Destination => "destination",
        }
    }
}

impl fmt::Display for FacilityRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown [`FacilityRole`] label.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown facility role '{0}'")]
pub struct ParseFacilityRoleError(pub String);

impl FromStr for FacilityRole {
    type Err = ParseFacilityRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "origin" | "warehouse" => Ok(Self::Origin),
            "transfer" | "distribution_platform" => Ok(Self::Transfer),
            "destination" | "delivery_point" => Ok(Self::Destination),
            _ => Err(ParseFacilityRoleError(s.to_owned())),
        }
    }
}

/// A named location in the logistics network.
///
/// # Examples
/// ```
/// use haulage_core::{Facility, FacilityRole};
///
/// let depot = Facility::new("Caceres", FacilityRole::Origin);
/// assert_eq!(depot.name, "Caceres");
/// assert_eq!(depot.role, FacilityRole::Origin);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Facility {
    /// Unique, human-readable name.
    pub name: String,
    /// Role of the facility in the network.
    pub role: FacilityRole,
}

impl Facility {
    /// Construct a facility.
    #[must_use]
    pub fn new(name: impl Into<String>, role: FacilityRole) -> Self {
        Self {
            name: name.into(),
            role,
        }
    }
}

/// A weighted edge between two facilities.
///
/// Connections are bidirectional unless constructed with
/// [`Connection::one_way`]. The time needed to traverse a connection is
/// `transit_minutes + load_minutes`.
///
/// # Examples
/// ```
/// use haulage_core::Connection;
///
/// let leg = Connection::new("A", "B", 10, 30, 5);
/// assert_eq!(leg.traversal_minutes(), 35);
/// assert!(leg.bidirectional);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Connection {
    /// Facility the connection leaves from.
    pub from: String,
    /// Facility the connection arrives at.
    pub to: String,
    /// Monetary cost in minor currency units.
    pub cost: u64,
    /// Driving time in minutes.
    pub transit_minutes: u64,
    /// Fixed loading overhead in minutes.
    pub load_minutes: u64,
    /// Whether the connection may also be travelled from `to` to `from`.
    #[cfg_attr(feature = "serde", serde(default = "default_bidirectional"))]
    pub bidirectional: bool,
}

#[cfg(feature = "serde")]
const fn default_bidirectional() -> bool {
    true
}

impl Connection {
    /// Construct a bidirectional connection.
    #[must_use]
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        cost: u64,
        transit_minutes: u64,
        load_minutes: u64,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            cost,
            transit_minutes,
            load_minutes,
            bidirectional: true,
        }
    }

    /// Construct a connection that may only be travelled from `from` to `to`.
    #[must_use]
    pub fn one_way(
        from: impl Into<String>,
        to: impl Into<String>,
        cost: u64,
        transit_minutes: u64,
        load_minutes: u64,
    ) -> Self {
        Self {
            bidirectional: false,
            ..Self::new(from, to, cost, transit_minutes, load_minutes)
        }
    }

    /// Minutes spent traversing this connection, loading included.
    #[must_use]
    pub const fn traversal_minutes(&self) -> u64 {
        self.transit_minutes.saturating_add(self.load_minutes)
    }

    /// Return the connection as travelled in the opposite direction.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self {
            from: self.to.clone(),
            to: self.from.clone(),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("origin", FacilityRole::Origin)]
    #[case("warehouse", FacilityRole::Origin)]
    #[case("Distribution_Platform", FacilityRole::Transfer)]
    #[case(" delivery_point ", FacilityRole::Destination)]
    fn parses_role_labels(#[case] label: &str, #[case] expected: FacilityRole) {
        assert_eq!(label.parse::<FacilityRole>(), Ok(expected));
    }

    #[rstest]
    fn rejects_unknown_role() {
        let err = "depot".parse::<FacilityRole>().expect_err("unknown label");
        assert_eq!(err, ParseFacilityRoleError("depot".into()));
    }

    #[rstest]
    fn reversed_swaps_endpoints_only() {
        let leg = Connection::one_way("A", "B", 3, 4, 5);
        let back = leg.reversed();
        assert_eq!((back.from.as_str(), back.to.as_str()), ("B", "A"));
        assert_eq!(back.cost, 3);
        assert_eq!(back.traversal_minutes(), 9);
        assert!(!back.bidirectional);
    }
}
