use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::Add;

/// A path cost or fitness value that may be unreachable.
///
/// Missing edges, invalid paths and unreachable receivers are all represented
/// by [`Cost::Unreachable`] instead of floating-point infinity, so arithmetic on
/// costs never silently produces `NaN`. Unreachable orders after every finite
/// value, which makes it the worst possible fitness under minimisation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cost {
    Finite(f64),
    Unreachable,
}

impl Cost {
    pub const ZERO: Cost = Cost::Finite(0.0);

    pub fn is_finite(&self) -> bool {
        matches!(self, Cost::Finite(_))
    }

    /// Returns the finite value, or `None` when unreachable.
    pub fn value(&self) -> Option<f64> {
        match self {
            Cost::Finite(value) => Some(*value),
            Cost::Unreachable => None,
        }
    }

    /// Lossy conversion used at presentation boundaries.
    pub fn as_f64(&self) -> f64 {
        self.value().unwrap_or(f64::INFINITY)
    }

    /// Absolute difference between two finite costs.
    pub fn distance(&self, other: &Cost) -> Option<f64> {
        Some((self.value()? - other.value()?).abs())
    }

    /// Relative deviation of `self` from `reference` in percent.
    ///
    /// Undefined when either side is unreachable or the reference is zero.
    pub fn deviation_percent(&self, reference: &Cost) -> Option<f64> {
        let reference = reference.value()?;
        if reference == 0.0 {
            return None;
        }

        Some((self.value()? - reference) / reference * 100.0)
    }
}

impl From<f64> for Cost {
    fn from(value: f64) -> Self {
        if value.is_finite() {
            Cost::Finite(value)
        } else {
            Cost::Unreachable
        }
    }
}

impl Add for Cost {
    type Output = Cost;

    fn add(self, rhs: Cost) -> Cost {
        match (self, rhs) {
            (Cost::Finite(lhs), Cost::Finite(rhs)) => Cost::Finite(lhs + rhs),
            _ => Cost::Unreachable,
        }
    }
}

impl PartialEq for Cost {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Cost {}

impl PartialOrd for Cost {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cost {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Cost::Finite(lhs), Cost::Finite(rhs)) => lhs.total_cmp(rhs),
            (Cost::Finite(_), Cost::Unreachable) => Ordering::Less,
            (Cost::Unreachable, Cost::Finite(_)) => Ordering::Greater,
            (Cost::Unreachable, Cost::Unreachable) => Ordering::Equal,
        }
    }
}

impl fmt::Display for Cost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cost::Finite(value) => match f.precision() {
                Some(precision) => write!(f, "{value:.precision$}"),
                None => write!(f, "{value}"),
            },
            Cost::Unreachable => write!(f, "∞"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreachable_orders_after_finite() {
        assert!(Cost::Finite(1e12) < Cost::Unreachable);
        assert!(Cost::Finite(1.0) < Cost::Finite(2.0));
        assert_eq!(Cost::Unreachable, Cost::Unreachable);
    }

    #[test]
    fn addition_propagates_unreachable() {
        assert_eq!(Cost::Finite(1.5) + Cost::Finite(2.0), Cost::Finite(3.5));
        assert_eq!(Cost::Finite(1.5) + Cost::Unreachable, Cost::Unreachable);
    }

    #[test]
    fn converts_infinite_floats_to_unreachable() {
        assert_eq!(Cost::from(f64::INFINITY), Cost::Unreachable);
        assert_eq!(Cost::from(f64::NAN), Cost::Unreachable);
        assert_eq!(Cost::from(4.0), Cost::Finite(4.0));
    }

    #[test]
    fn deviation_is_undefined_for_unreachable_or_zero_reference() {
        assert_eq!(Cost::Finite(12.0).deviation_percent(&Cost::Finite(10.0)), Some(20.0));
        assert_eq!(Cost::Finite(12.0).deviation_percent(&Cost::Unreachable), None);
        assert_eq!(Cost::Finite(12.0).deviation_percent(&Cost::ZERO), None);
        assert_eq!(Cost::Unreachable.deviation_percent(&Cost::Finite(10.0)), None);
    }

    #[test]
    fn formats_with_precision() {
        assert_eq!(format!("{:.2}", Cost::Finite(3.14159)), "3.14");
        assert_eq!(format!("{:.2}", Cost::Unreachable), "∞");
    }
}
