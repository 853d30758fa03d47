//! Deadline rules per delivery class.
//!
//! A [`DeadlinePolicy`] is plain configuration: a map from
//! [`DeliveryClass`] to [`DeadlineRule`]. The router turns the rule into a
//! [`TimeBudget`] for the current wall-clock time and never inspects the
//! class itself.

use std::collections::BTreeMap;

use chrono::{Days, NaiveDateTime, NaiveTime};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{DeliveryClass, DeliveryError};

/// How the deadline of a delivery class is derived from the current time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "rule", rename_all = "snake_case"))]
pub enum DeadlineRule {
    /// Wall-clock cutoff `days_after` calendar days after today.
    ///
    /// With `days_after == 0` the cutoff may already have passed, in which
    /// case no budget is granted.
    Cutoff {
        /// Time of day of the cutoff.
        at: NaiveTime,
        /// Calendar days between today and the cutoff day.
        days_after: u32,
    },
    /// Fixed number of minutes from now.
    Horizon {
        /// Minutes granted.
        minutes: u64,
    },
    /// No time constraint at all.
    Unbounded,
}

/// Minutes available to a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum TimeBudget {
    /// Routes must finish within `minutes`.
    Limited {
        /// Whole minutes between now and the deadline.
        minutes: u64,
        /// Instant by which the delivery must complete.
        deadline: NaiveDateTime,
    },
    /// Any route is acceptable.
    Unlimited,
}

impl TimeBudget {
    /// Whether a route taking `minutes` fits in the budget.
    #[must_use]
    pub const fn allows(&self, minutes: u64) -> bool {
        match self {
            Self::Limited { minutes: limit, .. } => minutes <= *limit,
            Self::Unlimited => true,
        }
    }

    /// Remaining minutes, if limited.
    #[must_use]
    pub const fn minutes(&self) -> Option<u64> {
        match self {
            Self::Limited { minutes, .. } => Some(*minutes),
            Self::Unlimited => None,
        }
    }
}

impl DeadlineRule {
    /// Compute the budget this rule grants at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError::DeadlineAlreadyPassed`] when a same-day cutoff
    /// lies in the past.
    pub fn budget(
        &self,
        class: DeliveryClass,
        now: NaiveDateTime,
    ) -> Result<TimeBudget, DeliveryError> {
        match *self {
            Self::Cutoff { at, days_after } => {
                let Some(day) = now.date().checked_add_days(Days::new(u64::from(days_after)))
                else {
                    return Ok(TimeBudget::Unlimited);
                };
                let deadline = day.and_time(at);
                if now > deadline {
                    return Err(DeliveryError::DeadlineAlreadyPassed { class, deadline });
                }
                let minutes = u64::try_from((deadline - now).num_minutes()).unwrap_or(0);
                Ok(TimeBudget::Limited { minutes, deadline })
            }
            Self::Horizon { minutes } => {
                let deadline = i64::try_from(minutes)
                    .ok()
                    .and_then(chrono::TimeDelta::try_minutes)
                    .and_then(|delta| now.checked_add_signed(delta));
                Ok(deadline.map_or(TimeBudget::Unlimited, |deadline| TimeBudget::Limited {
                    minutes,
                    deadline,
                }))
            }
            Self::Unbounded => Ok(TimeBudget::Unlimited),
        }
    }
}

/// Mapping from delivery class to deadline rule.
///
/// The default policy cuts express deliveries off at 18:00 the same day,
/// overnight deliveries at 05:00 the next day and leaves economy deliveries
/// unconstrained.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use haulage_core::{DeadlinePolicy, DeliveryClass, TimeBudget};
///
/// let now = NaiveDate::from_ymd_opt(2024, 3, 1)
///     .and_then(|d| d.and_hms_opt(17, 50, 0))
///     .expect("valid timestamp");
/// let budget = DeadlinePolicy::default()
///     .budget(DeliveryClass::Express, now)
///     .expect("deadline not passed");
/// assert_eq!(budget.minutes(), Some(10));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct DeadlinePolicy {
    rules: BTreeMap<DeliveryClass, DeadlineRule>,
}

impl Default for DeadlinePolicy {
    fn default() -> Self {
        let cutoff = |hour, days_after| DeadlineRule::Cutoff {
            at: NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or(NaiveTime::MIN),
            days_after,
        };
        Self::empty()
            .with_rule(DeliveryClass::Express, cutoff(18, 0))
            .with_rule(DeliveryClass::Overnight, cutoff(5, 1))
            .with_rule(DeliveryClass::Economy, DeadlineRule::Unbounded)
    }
}

impl DeadlinePolicy {
    /// A policy without rules; every class is rejected.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            rules: BTreeMap::new(),
        }
    }

    /// Set or replace the rule for `class`.
    #[must_use]
    pub fn with_rule(mut self, class: DeliveryClass, rule: DeadlineRule) -> Self {
        self.rules.insert(class, rule);
        self
    }

    /// Rule configured for `class`.
    #[must_use]
    pub fn rule(&self, class: DeliveryClass) -> Option<&DeadlineRule> {
        self.rules.get(&class)
    }

    /// Compute the time budget for `class` at `now`.
    ///
    /// # Errors
    ///
    /// [`DeliveryError::InvalidDeliveryClass`] when the class has no rule and
    /// [`DeliveryError::DeadlineAlreadyPassed`] when its cutoff is behind us.
    pub fn budget(
        &self,
        class: DeliveryClass,
        now: NaiveDateTime,
    ) -> Result<TimeBudget, DeliveryError> {
        let rule = self
            .rule(class)
            .ok_or_else(|| DeliveryError::InvalidDeliveryClass {
                class: class.to_string(),
            })?;
        rule.budget(class, now)
    }
}
