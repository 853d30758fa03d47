//! Strongly typed identifiers for persisted entities.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        pub struct $name(pub u64);

        impl $name {
            /// Raw numeric value.
            #[must_use]
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }
    };
}

entity_id!(
    /// Identifier of a [`Package`](crate::Package).
    PackageId
);
entity_id!(
    /// Identifier of a [`Vehicle`](crate::Vehicle).
    VehicleId
);
entity_id!(
    /// Identifier of a [`Supplier`](crate::Supplier).
    SupplierId
);

/// Entity category with its own identifier counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdKind {
    /// Package identifiers.
    Package,
    /// Vehicle identifiers.
    Vehicle,
}

impl IdKind {
    /// Name of the counter, as stored.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Package => "package",
            Self::Vehicle => "vehicle",
        }
    }
}
