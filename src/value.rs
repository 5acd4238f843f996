//! Numeric values carried by quotations: plain integers and calendar durations.
//!
//! A [`Duration`] keeps each component optional. Absence is not zero: a sum has a
//! component only when at least one operand had it, and scaling keeps presence as is.
//!
//! | operation            | result                                                    |
//! |----------------------|-----------------------------------------------------------|
//! | int + int            | int                                                       |
//! | dur + dur            | per component, present if either side is; `is_date` ORed  |
//! | dur + 0              | dur unchanged                                             |
//! | dur + n              | n joins the single present component, else `KindMismatch` |
//! | dur × n, n × dur     | every present component scaled                            |
//! | dur × dur            | `KindMismatch`                                            |

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const DAYS_PER_YEAR: u64 = 365;
const DAYS_PER_MONTH: u64 = 30;

/// Calendar unit named by a temporal word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeUnit {
    Year,
    Month,
    Day,
    /// Nights are counted as days. In a phrase that already counts days, the nights overlap
    /// them instead of adding ("forty days and forty nights" is forty days).
    Night,
}

/// Years, months and days, each independently present or absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Duration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub years: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub months: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days: Option<u64>,
    /// The phrase names a calendar position ("in the second month") rather than a span.
    #[serde(default)]
    pub is_date: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Component {
    Years,
    Months,
    Days,
}

impl Duration {
    /// `count` units of `unit`.
    pub fn of(unit: TimeUnit, count: u64) -> Self {
        let mut duration = Duration::default();
        *duration.slot_mut(component_of(unit)) = Some(count);
        duration
    }

    /// A present-but-zero component of `unit`.
    pub fn zero_of(unit: TimeUnit) -> Self {
        Self::of(unit, 0)
    }

    /// Seed opened by a date-starter word: the component is present, zero, and dated.
    pub fn date_seed(unit: TimeUnit) -> Self {
        Duration {
            is_date: true,
            ..Self::zero_of(unit)
        }
    }

    pub fn years(n: u64) -> Self {
        Self::of(TimeUnit::Year, n)
    }

    pub fn months(n: u64) -> Self {
        Self::of(TimeUnit::Month, n)
    }

    pub fn days(n: u64) -> Self {
        Self::of(TimeUnit::Day, n)
    }

    pub fn dated(mut self) -> Self {
        self.is_date = true;
        self
    }

    pub fn is_year_only(&self) -> bool {
        self.single_component() == Some(Component::Years)
    }

    pub fn is_month_only(&self) -> bool {
        self.single_component() == Some(Component::Months)
    }

    pub fn is_day_only(&self) -> bool {
        self.single_component() == Some(Component::Days)
    }

    /// Total length in days (years as 365, months as 30).
    pub fn in_days(&self) -> u64 {
        self.years.unwrap_or(0).saturating_mul(DAYS_PER_YEAR)
            .saturating_add(self.months.unwrap_or(0).saturating_mul(DAYS_PER_MONTH))
            .saturating_add(self.days.unwrap_or(0))
    }

    pub fn is_zero(&self) -> bool {
        self.in_days() == 0
    }

    /// Component-wise sum. Never fails.
    pub fn plus(&self, other: &Duration) -> Duration {
        Duration {
            years: add_present(self.years, other.years),
            months: add_present(self.months, other.months),
            days: add_present(self.days, other.days),
            is_date: self.is_date || other.is_date,
        }
    }

    /// Every present component multiplied by `factor`.
    pub fn scaled(&self, factor: u64) -> Duration {
        Duration {
            years: self.years.map(|n| n.saturating_mul(factor)),
            months: self.months.map(|n| n.saturating_mul(factor)),
            days: self.days.map(|n| n.saturating_mul(factor)),
            is_date: self.is_date,
        }
    }

    /// Adds a bare count to this duration's only component.
    fn plus_count(&self, count: u64) -> Result<Duration> {
        if count == 0 {
            return Ok(*self);
        }
        match self.single_component() {
            Some(component) => {
                let mut sum = *self;
                let slot = sum.slot_mut(component);
                *slot = Some(slot.unwrap_or(0).saturating_add(count));
                Ok(sum)
            }
            None => Err(Error::KindMismatch {
                operation: "add",
                lhs: format!("{:?}", self),
                rhs: count.to_string(),
            }),
        }
    }

    fn single_component(&self) -> Option<Component> {
        match (self.years, self.months, self.days) {
            (Some(_), None, None) => Some(Component::Years),
            (None, Some(_), None) => Some(Component::Months),
            (None, None, Some(_)) => Some(Component::Days),
            _ => None,
        }
    }

    fn slot_mut(&mut self, component: Component) -> &mut Option<u64> {
        match component {
            Component::Years => &mut self.years,
            Component::Months => &mut self.months,
            Component::Days => &mut self.days,
        }
    }
}

fn component_of(unit: TimeUnit) -> Component {
    match unit {
        TimeUnit::Year => Component::Years,
        TimeUnit::Month => Component::Months,
        TimeUnit::Day | TimeUnit::Night => Component::Days,
    }
}

fn add_present(a: Option<u64>, b: Option<u64>) -> Option<u64> {
    match (a, b) {
        (None, None) => None,
        _ => Some(a.unwrap_or(0).saturating_add(b.unwrap_or(0))),
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_date {
            match self.single_component() {
                Some(Component::Days) => return write!(f, "יום מספר {}", self.days.unwrap_or(0)),
                Some(Component::Months) => return write!(f, "חודש מספר {}", self.months.unwrap_or(0)),
                Some(Component::Years) => return write!(f, "שנה מספר {}", self.years.unwrap_or(0)),
                None => {}
            }
        }
        let mut parts = Vec::new();
        if let Some(years) = self.years.filter(|n| *n > 0) {
            parts.push(format!("{} שנה", years));
        }
        if let Some(months) = self.months.filter(|n| *n > 0) {
            parts.push(format!("{} חודש", months));
        }
        if let Some(days) = self.days.filter(|n| *n > 0) {
            parts.push(format!("{} יום", days));
        }
        write!(f, "{}", parts.join(" "))
    }
}

/// The value of a quotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Integer(u64),
    Duration(Duration),
}

impl Default for Value {
    fn default() -> Self {
        Value::Integer(0)
    }
}

impl Value {
    pub fn checked_add(self, other: Value) -> Result<Value> {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => Ok(Value::Integer(a.saturating_add(b))),
            (Value::Duration(a), Value::Duration(b)) => Ok(Value::Duration(a.plus(&b))),
            (Value::Duration(d), Value::Integer(n)) | (Value::Integer(n), Value::Duration(d)) => {
                d.plus_count(n).map(Value::Duration)
            }
        }
    }

    pub fn checked_mul(self, other: Value) -> Result<Value> {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => Ok(Value::Integer(a.saturating_mul(b))),
            (Value::Duration(d), Value::Integer(n)) | (Value::Integer(n), Value::Duration(d)) => {
                Ok(Value::Duration(d.scaled(n)))
            }
            (Value::Duration(a), Value::Duration(b)) => Err(Error::KindMismatch {
                operation: "multiply",
                lhs: format!("{:?}", a),
                rhs: format!("{:?}", b),
            }),
        }
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Value::Integer(n) => *n == 0,
            Value::Duration(d) => d.is_zero(),
        }
    }

    pub fn as_integer(&self) -> Option<u64> {
        match self {
            Value::Integer(n) => Some(*n),
            Value::Duration(_) => None,
        }
    }

    pub fn as_duration(&self) -> Option<&Duration> {
        match self {
            Value::Duration(d) => Some(d),
            Value::Integer(_) => None,
        }
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::Integer(n)
    }
}

impl From<Duration> for Value {
    fn from(d: Duration) -> Self {
        Value::Duration(d)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "{}", n),
            Value::Duration(d) => write!(f, "{}", d),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sum_keeps_components_present_on_either_side() {
        let sum = Duration::years(900).plus(&Duration::years(30));
        assert_eq!(sum, Duration::years(930));

        let mixed = Duration::years(2).plus(&Duration::months(3));
        assert_eq!(mixed.years, Some(2));
        assert_eq!(mixed.months, Some(3));
        assert_eq!(mixed.days, None);
    }

    #[test]
    fn absent_is_not_zero() {
        assert_ne!(Duration::zero_of(TimeUnit::Year), Duration::default());
        assert!(Duration::zero_of(TimeUnit::Year).is_zero());
        assert!(Duration::default().is_zero());
    }

    #[test]
    fn equality_includes_date_flag() {
        assert_ne!(Duration::months(2), Duration::months(2).dated());
    }

    #[test]
    fn date_flag_is_ored_by_addition() {
        let seeded = Duration::date_seed(TimeUnit::Year).plus(&Duration::years(600));
        assert_eq!(seeded, Duration::years(600).dated());
    }

    #[test]
    fn scaling_preserves_presence() {
        let d = Duration {
            years: Some(1),
            months: None,
            days: Some(3),
            is_date: false,
        };
        let scaled = d.scaled(10);
        assert_eq!(scaled.years, Some(10));
        assert_eq!(scaled.months, None);
        assert_eq!(scaled.days, Some(30));
    }

    #[test]
    fn nights_count_as_days() {
        assert_eq!(Duration::of(TimeUnit::Night, 40), Duration::days(40));
    }

    #[test]
    fn integer_joins_single_component() {
        let seed = Value::Duration(Duration::date_seed(TimeUnit::Month));
        let sum = seed.checked_add(Value::Integer(2)).unwrap();
        assert_eq!(sum, Value::Duration(Duration::months(2).dated()));

        let flipped = Value::Integer(2).checked_add(seed).unwrap();
        assert_eq!(flipped, sum);
    }

    #[test]
    fn zero_integer_is_absorbed() {
        let d = Value::Duration(Duration::years(930));
        assert_eq!(d.checked_add(Value::Integer(0)).unwrap(), d);
    }

    #[test]
    fn integer_into_multi_component_duration_is_a_kind_mismatch() {
        let d = Value::Duration(Duration::years(2).plus(&Duration::months(3)));
        let err = d.checked_add(Value::Integer(5)).unwrap_err();
        assert!(matches!(err, Error::KindMismatch { operation: "add", .. }));
    }

    #[test]
    fn duration_times_duration_is_rejected() {
        let a = Value::Duration(Duration::years(2));
        let b = Value::Duration(Duration::days(3));
        let err = a.checked_mul(b).unwrap_err();
        assert!(matches!(err, Error::KindMismatch { operation: "multiply", .. }));
    }

    #[test]
    fn duration_times_integer_scales() {
        let d = Value::Duration(Duration::years(7));
        assert_eq!(
            d.checked_mul(Value::Integer(10)).unwrap(),
            Value::Duration(Duration::years(70))
        );
    }

    #[test]
    fn in_days_uses_calendar_approximation() {
        let d = Duration {
            years: Some(1),
            months: Some(2),
            days: Some(3),
            is_date: false,
        };
        assert_eq!(d.in_days(), 365 + 60 + 3);
    }

    #[test]
    fn display_matches_rendering_format() {
        assert_eq!(Duration::years(930).to_string(), "930 שנה");
        assert_eq!(Duration::months(2).dated().to_string(), "חודש מספר 2");
        assert_eq!(Value::Integer(470).to_string(), "470");
    }

    #[test]
    fn serializes_untagged() {
        let json = serde_json::to_string(&Value::Integer(12)).unwrap();
        assert_eq!(json, "12");
        let json = serde_json::to_string(&Value::Duration(Duration::years(930))).unwrap();
        assert_eq!(json, r#"{"years":930,"is_date":false}"#);
        let back: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Value::Duration(Duration::years(930)));
    }
}
