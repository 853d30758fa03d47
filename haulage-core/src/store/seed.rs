//! Bulk data used to populate a store.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Connection, Facility, Supplier};

/// Facilities, connections and suppliers imported in one step.
///
/// Facilities and suppliers are upserted by name and id; connections are
/// appended, since parallel connections are legitimate.
///
/// # Examples
/// ```
/// use haulage_core::{Facility, FacilityRole, NetworkSeed, Supplier};
///
/// let seed = NetworkSeed {
///     facilities: vec![Facility::new("Depot", FacilityRole::Origin)],
///     connections: Vec::new(),
///     suppliers: vec![Supplier::new(7, "Acme")],
/// };
/// assert!(!seed.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NetworkSeed {
    /// Facilities to create or replace.
    #[cfg_attr(feature = "serde", serde(default))]
    pub facilities: Vec<Facility>,
    /// Connections to add.
    #[cfg_attr(feature = "serde", serde(default))]
    pub connections: Vec<Connection>,
    /// Suppliers to create or rename.
    #[cfg_attr(feature = "serde", serde(default))]
    pub suppliers: Vec<Supplier>,
}

impl NetworkSeed {
    /// Whether the seed carries no data at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.facilities.is_empty() && self.connections.is_empty() && self.suppliers.is_empty()
    }

    pub(crate) const fn summary(&self) -> ImportSummary {
        ImportSummary {
            facilities: self.facilities.len(),
            connections: self.connections.len(),
            suppliers: self.suppliers.len(),
        }
    }
}

/// Counts of records written by an import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ImportSummary {
    /// Facilities written.
    pub facilities: usize,
    /// Connections written.
    pub connections: usize,
    /// Suppliers written.
    pub suppliers: usize,
}
