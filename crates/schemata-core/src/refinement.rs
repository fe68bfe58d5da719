//! # Refinement Constraints
//!
//! Value-level constraints layered on an existing schema without changing
//! the type it represents. A constraint measures a value (string length in
//! chars, array length, or numeric value) and compares the measurement
//! against its bound.

use std::fmt;

use serde_json::Value;

/// A named bound applied by a `refined` schema node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Constraint {
    /// Length (chars for strings, elements for arrays) must be `>= n`.
    MinLength(usize),
    /// Length (chars for strings, elements for arrays) must be `<= n`.
    MaxLength(usize),
    /// Numeric value must be `>= n`.
    Minimum(f64),
    /// Numeric value must be `<= n`.
    Maximum(f64),
}

/// What a constraint observed on a value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Measurement {
    /// A string's char count or an array's element count.
    Length(usize),
    /// A numeric value.
    Number(f64),
    /// The value has no measure this constraint understands.
    Unmeasurable,
}

impl Constraint {
    /// The constraint name as it appears in diagnostics (`minLength`, ...).
    pub fn name(&self) -> &'static str {
        match self {
            Self::MinLength(_) => "minLength",
            Self::MaxLength(_) => "maxLength",
            Self::Minimum(_) => "minimum",
            Self::Maximum(_) => "maximum",
        }
    }

    /// The bound as a JSON value, for structured error output.
    pub fn bound(&self) -> Value {
        match *self {
            Self::MinLength(n) | Self::MaxLength(n) => Value::from(n),
            Self::Minimum(n) | Self::Maximum(n) => Value::from(n),
        }
    }

    /// Measure `value` the way this constraint compares it.
    pub fn measure(&self, value: &Value) -> Measurement {
        match self {
            Self::MinLength(_) | Self::MaxLength(_) => match value {
                Value::String(s) => Measurement::Length(s.chars().count()),
                Value::Array(items) => Measurement::Length(items.len()),
                _ => Measurement::Unmeasurable,
            },
            Self::Minimum(_) | Self::Maximum(_) => value
                .as_f64()
                .map_or(Measurement::Unmeasurable, Measurement::Number),
        }
    }

    /// Whether `measurement` satisfies this constraint.
    pub fn admits(&self, measurement: Measurement) -> bool {
        match (*self, measurement) {
            (Self::MinLength(n), Measurement::Length(len)) => len >= n,
            (Self::MaxLength(n), Measurement::Length(len)) => len <= n,
            (Self::Minimum(n), Measurement::Number(x)) => x >= n,
            (Self::Maximum(n), Measurement::Number(x)) => x <= n,
            _ => false,
        }
    }

    /// Measure and compare in one step.
    pub fn check(&self, value: &Value) -> Result<(), Measurement> {
        let measurement = self.measure(value);
        if self.admits(measurement) {
            Ok(())
        } else {
            Err(measurement)
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name(), self.bound())
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Length(n) => write!(f, "length {n}"),
            Self::Number(x) => write!(f, "{x}"),
            Self::Unmeasurable => f.write_str("unmeasurable value"),
        }
    }
}

/// Generation bounds accumulated from enclosing refinements.
///
/// Arbitrary builders for leaves and collections read these to draw values
/// inside the permitted range directly instead of generating and filtering.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    /// Lower length bound, if any.
    pub min_length: Option<usize>,
    /// Upper length bound, if any.
    pub max_length: Option<usize>,
    /// Lower numeric bound, if any.
    pub minimum: Option<f64>,
    /// Upper numeric bound, if any.
    pub maximum: Option<f64>,
}

impl Bounds {
    /// Tighten these bounds with one more constraint.
    ///
    /// Nested refinements intersect: `maxLength(5)` inside `maxLength(2)`
    /// yields an upper bound of 2.
    pub fn narrow(self, constraint: &Constraint) -> Self {
        match *constraint {
            Constraint::MinLength(n) => Self {
                min_length: Some(self.min_length.map_or(n, |m| m.max(n))),
                ..self
            },
            Constraint::MaxLength(n) => Self {
                max_length: Some(self.max_length.map_or(n, |m| m.min(n))),
                ..self
            },
            Constraint::Minimum(n) => Self {
                minimum: Some(self.minimum.map_or(n, |m| m.max(n))),
                ..self
            },
            Constraint::Maximum(n) => Self {
                maximum: Some(self.maximum.map_or(n, |m| m.min(n))),
                ..self
            },
        }
    }

    /// Inclusive length range, using `ceiling` when no upper bound is set.
    ///
    /// An upper bound below the lower bound collapses to the lower bound;
    /// the refinement filter then rejects every sample.
    pub fn length_range(&self, ceiling: usize) -> (usize, usize) {
        let lo = self.min_length.unwrap_or(0);
        let hi = self.max_length.unwrap_or_else(|| ceiling.max(lo));
        (lo, hi.max(lo))
    }

    /// Inclusive numeric range, `span` wide on any open side.
    pub fn number_range(&self, span: f64) -> (f64, f64) {
        match (self.minimum, self.maximum) {
            (Some(lo), Some(hi)) => (lo, hi.max(lo)),
            (Some(lo), None) => (lo, lo + span),
            (None, Some(hi)) => (hi - span, hi),
            (None, None) => (-span, span),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn string_length_counts_chars() {
        let c = Constraint::MaxLength(2);
        assert_eq!(c.measure(&json!("é日")), Measurement::Length(2));
        assert!(c.check(&json!("é日")).is_ok());
        assert_eq!(c.check(&json!("abc")), Err(Measurement::Length(3)));
    }

    #[test]
    fn numeric_bounds() {
        assert!(Constraint::Minimum(1.0).check(&json!(1)).is_ok());
        assert_eq!(
            Constraint::Maximum(1.0).check(&json!(2)),
            Err(Measurement::Number(2.0))
        );
    }

    #[test]
    fn wrong_shape_is_unmeasurable() {
        assert_eq!(
            Constraint::MinLength(1).check(&json!(3)),
            Err(Measurement::Unmeasurable)
        );
        assert_eq!(
            Constraint::Minimum(0.0).check(&json!("3")),
            Err(Measurement::Unmeasurable)
        );
    }

    #[test]
    fn bounds_intersect() {
        let b = Bounds::default()
            .narrow(&Constraint::MaxLength(5))
            .narrow(&Constraint::MaxLength(2))
            .narrow(&Constraint::MinLength(1));
        assert_eq!(b.length_range(10), (1, 2));
    }

    #[test]
    fn open_bounds_use_defaults() {
        let b = Bounds::default().narrow(&Constraint::MinLength(3));
        assert_eq!(b.length_range(8), (3, 8));
        assert_eq!(b.length_range(2), (3, 3));

        let n = Bounds::default().narrow(&Constraint::Maximum(1.0));
        assert_eq!(n.number_range(100.0), (-99.0, 1.0));
    }
}
