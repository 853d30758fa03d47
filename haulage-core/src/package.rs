//! Packages, suppliers and the billing relation between them.

use chrono::NaiveDateTime;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{DeliveryClass, PackageId, SupplierId};

/// A shipment quoted and accepted for delivery.
///
/// The time budget and cost come from the route chosen at quote time and
/// never change afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Package {
    /// Unique identifier.
    pub id: PackageId,
    /// Minutes allotted to the whole delivery.
    pub time_budget_minutes: u64,
    /// Cost of the quoted route.
    pub total_cost: u64,
    /// Service tier.
    pub delivery_class: DeliveryClass,
    /// When the package was quoted.
    pub created_at: NaiveDateTime,
}

/// A party billed for the packages it supplies.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Supplier {
    /// Unique identifier.
    pub id: SupplierId,
    /// Display name.
    pub name: String,
}

impl Supplier {
    /// Construct a supplier.
    #[must_use]
    pub fn new(id: impl Into<SupplierId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A package as seen from its supplier's ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SuppliedPackage {
    /// The package.
    pub package: Package,
    /// Whether the supplier has settled the package.
    pub paid: bool,
}
