//! Service tiers that decide how much time a delivery may take.

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Service tier of a delivery.
///
/// Each class maps to a deadline rule through a
/// [`DeadlinePolicy`](crate::DeadlinePolicy). Classes parse from their name or
/// from their numeric code.
///
/// # Examples
/// ```
/// use haulage_core::DeliveryClass;
///
/// assert_eq!("express".parse(), Ok(DeliveryClass::Express));
/// assert_eq!("2".parse(), Ok(DeliveryClass::Overnight));
/// assert_eq!(DeliveryClass::Economy.code(), 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(rename_all = "snake_case", try_from = "ClassRepr")
)]
pub enum DeliveryClass {
    /// Delivered before the same-day cutoff.
    Express,
    /// Delivered before the early-morning cutoff of the following day.
    Overnight,
    /// No practical deadline.
    Economy,
}

impl DeliveryClass {
    /// Every known class, in code order.
    pub const ALL: [Self; 3] = [Self::Express, Self::Overnight, Self::Economy];

    /// Numeric code used by storage and legacy callers.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Express => 1,
            Self::Overnight => 2,
            Self::Economy => 3,
        }
    }

    /// Look a class up by numeric code.
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Express),
            2 => Some(Self::Overnight),
            3 => Some(Self::Economy),
            _ => None,
        }
    }

    /// Lowercase name of the class.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Express => "express",
            Self::Overnight => "overnight",
            Self::Economy => "economy",
        }
    }
}

impl fmt::Display for DeliveryClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a value does not name a delivery class.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown delivery class '{0}'")]
pub struct ParseDeliveryClassError(pub String);

impl FromStr for DeliveryClass {
    type Err = ParseDeliveryClassError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(code) = trimmed.parse::<u8>() {
            return Self::from_code(code).ok_or_else(|| ParseDeliveryClassError(s.to_owned()));
        }
        Self::ALL
            .into_iter()
            .find(|class| class.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseDeliveryClassError(s.to_owned()))
    }
}

/// Serialised forms accepted for a class: a name or code string, or a bare
/// numeric code.
#[cfg(feature = "serde")]
#[derive(Deserialize)]
#[serde(untagged)]
enum ClassRepr {
    Code(u64),
    Text(String),
}

#[cfg(feature = "serde")]
impl TryFrom<ClassRepr> for DeliveryClass {
    type Error = ParseDeliveryClassError;

    fn try_from(repr: ClassRepr) -> Result<Self, Self::Error> {
        match repr {
            ClassRepr::Code(code) => u8::try_from(code)
                .ok()
                .and_then(Self::from_code)
                .ok_or_else(|| ParseDeliveryClassError(code.to_string())),
            ClassRepr::Text(text) => text.parse(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("EXPRESS", DeliveryClass::Express)]
    #[case("Overnight", DeliveryClass::Overnight)]
    #[case(" economy ", DeliveryClass::Economy)]
    #[case("1", DeliveryClass::Express)]
    #[case("3", DeliveryClass::Economy)]
    fn parses_names_and_codes(#[case] raw: &str, #[case] expected: DeliveryClass) {
        assert_eq!(raw.parse::<DeliveryClass>(), Ok(expected));
    }

    #[rstest]
    #[case("0")]
    #[case("4")]
    #[case("same-day")]
    #[case("")]
    fn rejects_unknown_values(#[case] raw: &str) {
        assert!(raw.parse::<DeliveryClass>().is_err());
    }

    #[rstest]
    fn codes_round_trip() {
        for class in DeliveryClass::ALL {
            assert_eq!(DeliveryClass::from_code(class.code()), Some(class));
        }
    }

    #[cfg(feature = "serde")]
    #[rstest]
    #[case("3", DeliveryClass::Economy)]
    #[case("\"EXPRESS\"", DeliveryClass::Express)]
    #[case("\"2\"", DeliveryClass::Overnight)]
    #[case("\"economy\"", DeliveryClass::Economy)]
    fn deserialises_like_it_parses(#[case] json: &str, #[case] expected: DeliveryClass) {
        let class: DeliveryClass = serde_json::from_str(json).expect("class decodes");
        assert_eq!(class, expected);
        let written = serde_json::to_string(&class).expect("class encodes");
        assert_eq!(written, format!("\"{}\"", expected.as_str()));
    }

    #[cfg(feature = "serde")]
    #[rstest]
    #[case("0")]
    #[case("300")]
    #[case("\"teleport\"")]
    fn refuses_unknown_serialised_classes(#[case] json: &str) {
        assert!(serde_json::from_str::<DeliveryClass>(json).is_err());
    }

    #[cfg(feature = "serde")]
    #[rstest]
    fn policy_keys_accept_codes_and_any_case() {
        use crate::{DeadlinePolicy, DeadlineRule};

        let policy: DeadlinePolicy =
            serde_json::from_str(r#"{"1": {"rule": "unbounded"}, "ECONOMY": {"rule": "horizon", "minutes": 60}}"#)
                .expect("policy decodes");
        assert_eq!(policy.rule(DeliveryClass::Express), Some(&DeadlineRule::Unbounded));
        assert_eq!(
            policy.rule(DeliveryClass::Economy),
            Some(&DeadlineRule::Horizon { minutes: 60 })
        );
    }
}
