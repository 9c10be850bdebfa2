//! Query evaluation: matching document metadata against a filter predicate.
//!
//! A [`Predicate`] is a conjunction of per-field [`Constraint`]s. There is no
//! OR, no nesting and no negation of compound predicates; the operator set is
//! deliberately small:
//!
//! | Declarative form | Constraint | Matches when |
//! |------------------|------------|--------------|
//! | `layout = "single"` | [`Constraint::Equals`] | field is present and equal |
//! | `url = { "$startsWith" = "/articles" }` | [`Constraint::StartsWith`] | field is text with that prefix |
//! | `isPagedAuto = { "$ne" = true }` | [`Constraint::NotEquals`] | field is absent or different |
//!
//! Declarative predicates come from configuration as a map of field name to
//! [`ConstraintSpec`] and are compiled with [`Predicate::from_spec`], which
//! rejects unknown operators up front so a bad collection definition fails at
//! registration rather than on every resolve.

use crate::types::{Document, FieldValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

pub const OP_STARTS_WITH: &str = "$startsWith";
pub const OP_NOT_EQUALS: &str = "$ne";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    #[error("unknown operator '{operator}' on field '{field}' (supported: $startsWith, $ne)")]
    UnknownOperator { field: String, operator: String },
    #[error("'$startsWith' on field '{0}' requires a string operand")]
    PrefixNotText(String),
    #[error("empty operator table on field '{0}'")]
    EmptyOperators(String),
    #[error("sort key #{index} must name exactly one field, found {count}")]
    MalformedSortKey { index: usize, count: usize },
    #[error("sort direction for '{field}' must be 1 or -1, got {direction}")]
    InvalidDirection { field: String, direction: i64 },
}

/// A single per-field constraint.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    Equals(FieldValue),
    StartsWith(String),
    NotEquals(FieldValue),
}

impl Constraint {
    /// Test a field value (`None` when the field is absent).
    pub fn matches(&self, value: Option<&FieldValue>) -> bool {
        match self {
            Constraint::Equals(expected) => value.is_some_and(|v| v.matches(expected)),
            Constraint::StartsWith(prefix) => {
                matches!(value, Some(FieldValue::Text(s)) if s.starts_with(prefix.as_str()))
            }
            Constraint::NotEquals(unwanted) => !value.is_some_and(|v| v.matches(unwanted)),
        }
    }
}

/// Declarative constraint as written in configuration: either a plain value
/// (equality) or a table of operators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConstraintSpec {
    Operators(BTreeMap<String, FieldValue>),
    Value(FieldValue),
}

impl ConstraintSpec {
    pub fn starts_with(prefix: &str) -> Self {
        ConstraintSpec::Operators(BTreeMap::from([(
            OP_STARTS_WITH.to_string(),
            FieldValue::from(prefix),
        )]))
    }

    pub fn not_equal(value: impl Into<FieldValue>) -> Self {
        ConstraintSpec::Operators(BTreeMap::from([(
            OP_NOT_EQUALS.to_string(),
            value.into(),
        )]))
    }

    pub fn equal(value: impl Into<FieldValue>) -> Self {
        ConstraintSpec::Value(value.into())
    }
}

/// Conjunction of field constraints.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predicate {
    terms: Vec<(String, Constraint)>,
}

impl Predicate {
    /// The empty predicate, which matches every document.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(self, field: &str, value: impl Into<FieldValue>) -> Self {
        self.with(field, Constraint::Equals(value.into()))
    }

    pub fn starts_with(self, field: &str, prefix: impl Into<String>) -> Self {
        self.with(field, Constraint::StartsWith(prefix.into()))
    }

    pub fn ne(self, field: &str, value: impl Into<FieldValue>) -> Self {
        self.with(field, Constraint::NotEquals(value.into()))
    }

    pub fn with(mut self, field: &str, constraint: Constraint) -> Self {
        self.terms.push((field.to_string(), constraint));
        self
    }

    pub fn terms(&self) -> &[(String, Constraint)] {
        &self.terms
    }

    pub fn matches(&self, document: &Document) -> bool {
        self.terms
            .iter()
            .all(|(field, constraint)| constraint.matches(document.field(field).as_ref()))
    }

    /// Compile a declarative predicate.
    ///
    /// An operator table with several operators contributes one term per
    /// operator, all ANDed with the rest of the predicate.
    pub fn from_spec(spec: &BTreeMap<String, ConstraintSpec>) -> Result<Self, QueryError> {
        let mut predicate = Predicate::new();
        for (field, constraint) in spec {
            match constraint {
                ConstraintSpec::Value(value) => {
                    predicate = predicate.eq(field, value.clone());
                }
                ConstraintSpec::Operators(ops) => {
                    if ops.is_empty() {
                        return Err(QueryError::EmptyOperators(field.clone()));
                    }
                    for (operator, operand) in ops {
                        predicate = match operator.as_str() {
                            OP_STARTS_WITH => match operand {
                                FieldValue::Text(prefix) => {
                                    predicate.starts_with(field, prefix.clone())
                                }
                                _ => return Err(QueryError::PrefixNotText(field.clone())),
                            },
                            OP_NOT_EQUALS => predicate.ne(field, operand.clone()),
                            _ => {
                                return Err(QueryError::UnknownOperator {
                                    field: field.clone(),
                                    operator: operator.clone(),
                                });
                            }
                        };
                    }
                }
            }
        }
        Ok(predicate)
    }
}
