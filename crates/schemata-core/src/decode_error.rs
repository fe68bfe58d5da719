//! # Decode Error Tree
//!
//! A decode failure is a tree, not a message. Each node carries a
//! [`DecodeErrorKind`], the offending input fragment, and an ordered list of
//! children, each attached by a [`PathSegment`] (field name, tuple/array
//! index, or union member index).
//!
//! Composite decoders aggregate: a struct reports every failing field, a
//! union reports every member's failure. `Display` renders one
//! path-qualified line per leaf; tooling walks [`DecodeError::leaves`] or
//! navigates with [`DecodeError::at`].

use std::borrow::Cow;
use std::fmt;

use serde_json::Value;

use crate::refinement::{Constraint, Measurement};

/// Where a child error sits relative to its parent.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Struct field or index-signature key.
    Key(String),
    /// Tuple position or array index.
    Index(usize),
    /// Union member, by declaration order.
    Member(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => write!(f, ".{key}"),
            Self::Index(i) => write!(f, "[{i}]"),
            Self::Member(i) => write!(f, "<{i}>"),
        }
    }
}

/// Composite schema tag for aggregated errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompositeTag {
    Struct,
    Tuple,
    Array,
    Union,
    IndexSignature,
}

impl CompositeTag {
    /// Tag name as used in schema diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Struct => "struct",
            Self::Tuple => "tuple",
            Self::Array => "array",
            Self::Union => "union",
            Self::IndexSignature => "indexSignature",
        }
    }
}

impl fmt::Display for CompositeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What went wrong at one node of the error tree.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeErrorKind {
    /// The input is not of the expected type or shape.
    NotType {
        /// Name of the expected type (`string`, `struct`, ...).
        expected: Cow<'static, str>,
    },
    /// A declared struct field is absent from the input.
    MissingField,
    /// A tuple input has fewer elements than declared.
    SmallerThanExpected { expected: usize, actual: usize },
    /// A tuple input has more elements than declared.
    BiggerThanExpected { expected: usize, actual: usize },
    /// A refinement rejected an otherwise well-typed value.
    Constraint {
        /// The violated constraint, carrying its name and bound.
        constraint: Constraint,
        /// What the constraint measured on the value.
        actual: Measurement,
    },
    /// One or more children of a composite failed.
    Composite(CompositeTag),
}

/// A structured decode failure.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodeError {
    kind: DecodeErrorKind,
    actual: Value,
    children: Vec<(PathSegment, DecodeError)>,
}

impl DecodeError {
    /// The input is not a `expected`.
    pub fn not_type(expected: impl Into<Cow<'static, str>>, actual: &Value) -> Self {
        Self::leaf(
            DecodeErrorKind::NotType {
                expected: expected.into(),
            },
            actual.clone(),
        )
    }

    /// A declared field is missing.
    pub fn missing_field() -> Self {
        Self::leaf(DecodeErrorKind::MissingField, Value::Null)
    }

    /// A tuple has too few elements.
    pub fn smaller_than_expected(expected: usize, actual: &Value, len: usize) -> Self {
        Self::leaf(
            DecodeErrorKind::SmallerThanExpected {
                expected,
                actual: len,
            },
            actual.clone(),
        )
    }

    /// A tuple has too many elements.
    pub fn bigger_than_expected(expected: usize, actual: &Value, len: usize) -> Self {
        Self::leaf(
            DecodeErrorKind::BiggerThanExpected {
                expected,
                actual: len,
            },
            actual.clone(),
        )
    }

    /// A refinement rejected `actual`.
    pub fn constraint(constraint: Constraint, measurement: Measurement, actual: &Value) -> Self {
        Self::leaf(
            DecodeErrorKind::Constraint {
                constraint,
                actual: measurement,
            },
            actual.clone(),
        )
    }

    /// Aggregate child failures under a composite node.
    pub fn composite(
        tag: CompositeTag,
        actual: &Value,
        children: Vec<(PathSegment, DecodeError)>,
    ) -> Self {
        Self {
            kind: DecodeErrorKind::Composite(tag),
            actual: actual.clone(),
            children,
        }
    }

    fn leaf(kind: DecodeErrorKind, actual: Value) -> Self {
        Self {
            kind,
            actual,
            children: Vec::new(),
        }
    }

    /// What went wrong at this node.
    pub fn kind(&self) -> &DecodeErrorKind {
        &self.kind
    }

    /// The input fragment this node refers to.
    pub fn actual(&self) -> &Value {
        &self.actual
    }

    /// Child errors with their path segments, in input order.
    pub fn children(&self) -> &[(PathSegment, DecodeError)] {
        &self.children
    }

    /// Navigate to the error at `path`, relative to this node.
    pub fn at(&self, path: &[PathSegment]) -> Option<&DecodeError> {
        let Some((head, rest)) = path.split_first() else {
            return Some(self);
        };
        self.children
            .iter()
            .find(|(segment, _)| segment == head)
            .and_then(|(_, child)| child.at(rest))
    }

    /// Every leaf error with its full path, depth-first in input order.
    pub fn leaves(&self) -> Vec<(Vec<PathSegment>, &DecodeError)> {
        let mut out = Vec::new();
        let mut path = Vec::new();
        self.collect_leaves(&mut path, &mut out);
        out
    }

    fn collect_leaves<'a>(
        &'a self,
        path: &mut Vec<PathSegment>,
        out: &mut Vec<(Vec<PathSegment>, &'a DecodeError)>,
    ) {
        if self.children.is_empty() {
            out.push((path.clone(), self));
            return;
        }
        for (segment, child) in &self.children {
            path.push(segment.clone());
            child.collect_leaves(path, out);
            path.pop();
        }
    }

    fn describe(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            DecodeErrorKind::NotType { expected } => {
                write!(f, "expected {expected}, got {}", self.actual)
            }
            DecodeErrorKind::MissingField => f.write_str("missing field"),
            DecodeErrorKind::SmallerThanExpected { expected, actual } => write!(
                f,
                "smaller than expected: {expected} elements required, got {actual}"
            ),
            DecodeErrorKind::BiggerThanExpected { expected, actual } => write!(
                f,
                "bigger than expected: {expected} elements allowed, got {actual}"
            ),
            DecodeErrorKind::Constraint { constraint, actual } => write!(
                f,
                "{} violated: bound {}, got {actual}",
                constraint.name(),
                constraint.bound()
            ),
            DecodeErrorKind::Composite(tag) => write!(f, "invalid {tag}"),
        }
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (path, leaf)) in self.leaves().into_iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            f.write_str("$")?;
            for segment in &path {
                write!(f, "{segment}")?;
            }
            f.write_str(": ")?;
            leaf.describe(f)?;
        }
        Ok(())
    }
}

impl std::error::Error for DecodeError {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> DecodeError {
        let input = json!({"a": 1, "b": ["x", 2]});
        DecodeError::composite(
            CompositeTag::Struct,
            &input,
            vec![
                (
                    PathSegment::Key("a".into()),
                    DecodeError::not_type("string", &json!(1)),
                ),
                (
                    PathSegment::Key("b".into()),
                    DecodeError::composite(
                        CompositeTag::Array,
                        &json!(["x", 2]),
                        vec![(PathSegment::Index(1), DecodeError::not_type("string", &json!(2)))],
                    ),
                ),
                (PathSegment::Key("c".into()), DecodeError::missing_field()),
            ],
        )
    }

    #[test]
    fn renders_one_line_per_leaf() {
        assert_eq!(
            sample().to_string(),
            "$.a: expected string, got 1\n$.b[1]: expected string, got 2\n$.c: missing field"
        );
    }

    #[test]
    fn navigates_by_path() {
        let err = sample();
        let leaf = err
            .at(&[PathSegment::Key("b".into()), PathSegment::Index(1)])
            .unwrap();
        assert_eq!(
            leaf.kind(),
            &DecodeErrorKind::NotType {
                expected: "string".into()
            }
        );
        assert!(err.at(&[PathSegment::Key("z".into())]).is_none());
    }

    #[test]
    fn leaves_carry_full_paths() {
        let err = sample();
        let paths: Vec<_> = err.leaves().into_iter().map(|(p, _)| p).collect();
        assert_eq!(paths.len(), 3);
        assert_eq!(
            paths[1],
            vec![PathSegment::Key("b".into()), PathSegment::Index(1)]
        );
    }

    #[test]
    fn constraint_message_names_bound() {
        let err = DecodeError::constraint(
            Constraint::MinLength(1),
            Measurement::Length(0),
            &json!(""),
        );
        assert_eq!(err.to_string(), "$: minLength violated: bound 1, got length 0");
    }
}
