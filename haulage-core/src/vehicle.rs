//! Vehicles and their reported positions.

use chrono::NaiveDateTime;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{DeliveryClass, VehicleId};

/// A vehicle chartered to carry packages from one facility to another.
///
/// Vehicles are immutable once chartered. Movement is recorded on the
/// separate [`VehiclePosition`] relation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Vehicle {
    /// Unique identifier.
    pub id: VehicleId,
    /// Facility the vehicle was chartered at.
    pub origin: String,
    /// Facility the vehicle is heading to.
    pub destination: String,
    /// Service tier of the packages it carries.
    pub delivery_class: DeliveryClass,
    /// When the vehicle was chartered.
    pub departure_time: NaiveDateTime,
}

/// Current location of a vehicle.
///
/// A vehicle has exactly one position at any time. A freshly chartered
/// vehicle sits at its origin with `departed == false`; any reported move
/// sets `departed` and stops the vehicle from taking further packages.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VehiclePosition {
    /// Facility the vehicle is at.
    pub facility: String,
    /// When the position was recorded.
    pub recorded_at: NaiveDateTime,
    /// Whether the vehicle has moved since it was chartered.
    pub departed: bool,
}

impl VehiclePosition {
    /// Position of a vehicle that has just been chartered at `facility`.
    #[must_use]
    pub fn chartered(facility: impl Into<String>, at: NaiveDateTime) -> Self {
        Self {
            facility: facility.into(),
            recorded_at: at,
            departed: false,
        }
    }

    /// Position reported after the vehicle has moved to `facility`.
    #[must_use]
    pub fn reported(facility: impl Into<String>, at: NaiveDateTime) -> Self {
        Self {
            facility: facility.into(),
            recorded_at: at,
            departed: true,
        }
    }
}

/// Vehicle together with its current position.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrackedVehicle {
    /// The vehicle.
    pub vehicle: Vehicle,
    /// Its current position.
    pub position: VehiclePosition,
}

impl TrackedVehicle {
    /// Whether the vehicle can still take a package for `destination` and
    /// `class` at `facility`.
    #[must_use]
    pub fn accepts(&self, facility: &str, destination: &str, class: DeliveryClass) -> bool {
        !self.position.departed
            && self.position.facility == facility
            && self.vehicle.destination == destination
            && self.vehicle.delivery_class == class
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rstest::{fixture, rstest};

    #[fixture]
    fn waiting() -> TrackedVehicle {
        let at = NaiveDate::from_ymd_opt(2024, 3, 1)
            .and_then(|d| d.and_hms_opt(9, 0, 0))
            .expect("valid timestamp");
        TrackedVehicle {
            vehicle: Vehicle {
                id: VehicleId(1),
                origin: "A".into(),
                destination: "C".into(),
                delivery_class: DeliveryClass::Economy,
                departure_time: at,
            },
            position: VehiclePosition::chartered("A", at),
        }
    }

    #[rstest]
    fn accepts_matching_charter(waiting: TrackedVehicle) {
        assert!(waiting.accepts("A", "C", DeliveryClass::Economy));
    }

    #[rstest]
    #[case("B", "C", DeliveryClass::Economy)]
    #[case("A", "D", DeliveryClass::Economy)]
    #[case("A", "C", DeliveryClass::Express)]
    fn rejects_mismatched_charter(
        waiting: TrackedVehicle,
        #[case] facility: &str,
        #[case] destination: &str,
        #[case] class: DeliveryClass,
    ) {
        assert!(!waiting.accepts(facility, destination, class));
    }

    #[rstest]
    fn rejects_departed_vehicle_back_at_origin(mut waiting: TrackedVehicle) {
        waiting.position = VehiclePosition::reported("A", waiting.position.recorded_at);
        assert!(!waiting.accepts("A", "C", DeliveryClass::Economy));
    }
}
