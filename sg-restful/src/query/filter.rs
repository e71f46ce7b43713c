//! Normalized filter structure sent to the backend `read` and `summarize` calls
//!
//! Every query format decodes into a [`FilterModel`]. Its serialized form is
//! exactly what the RPC layer expects under the `filters` key:
//!
//! ```json
//! {"logical_operator": "and", "conditions": [{"path": "name", "relation": "is", "values": ["blorg"]}]}
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::QueryParseError;

/// How the conditions of a [`FilterModel`] are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicalOperator {
    /// Every condition must hold
    #[default]
    And,
    /// Any condition may hold
    Or,
}

impl LogicalOperator {
    /// Wire representation (always lowercase)
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
        }
    }
}

impl fmt::Display for LogicalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogicalOperator {
    type Err = QueryParseError;

    /// Case-insensitive: `AND`, `And` and `and` are all [`LogicalOperator::And`]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "and" => Ok(Self::And),
            "or" => Ok(Self::Or),
            _ => Err(QueryParseError::UnsupportedOperator(s.to_string())),
        }
    }
}

/// A single `(path, relation, values)` predicate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// Field path, e.g. `name` or `project.Project.name`
    pub path: String,
    /// Relation understood by the backend, e.g. `is`, `in`, `starts_with`
    pub relation: String,
    /// Operand list; always a sequence on the wire
    pub values: Vec<Value>,
}

impl Condition {
    /// Build a condition, normalizing `value` into a sequence
    ///
    /// An array is taken as-is; anything else (including `null`) becomes a
    /// one-element sequence.
    ///
    /// ```rust
    /// use serde_json::json;
    /// use sg_restful::query::Condition;
    ///
    /// let single = Condition::new("name", "is", json!("blorg"));
    /// assert_eq!(single.values, vec![json!("blorg")]);
    ///
    /// let many = Condition::new("sg_status", "in", json!(["Active", "Bidding"]));
    /// assert_eq!(many.values, vec![json!("Active"), json!("Bidding")]);
    /// ```
    pub fn new(path: impl Into<String>, relation: impl Into<String>, value: Value) -> Self {
        let values = match value {
            Value::Array(items) => items,
            other => vec![other],
        };
        Self {
            path: path.into(),
            relation: relation.into(),
            values,
        }
    }
}

impl From<ConditionTriple> for Condition {
    fn from(triple: ConditionTriple) -> Self {
        let ConditionTriple(path, relation, value) = triple;
        Self::new(path, relation, value)
    }
}

/// Raw `[path, relation, value]` triple as it appears in every query format
///
/// Decoding straight into a tuple struct lets serde enforce the arity and the
/// string types, so a bad triple surfaces as a decoder diagnostic.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConditionTriple(pub String, pub String, pub Value);

/// Logical operator plus ordered conditions
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FilterModel {
    /// How conditions are combined
    pub logical_operator: LogicalOperator,
    /// Conditions in the order they were parsed
    pub conditions: Vec<Condition>,
}

impl FilterModel {
    /// Empty `and` filter
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty filter with the given operator
    #[must_use]
    pub fn with_operator(logical_operator: LogicalOperator) -> Self {
        Self {
            logical_operator,
            conditions: Vec::new(),
        }
    }

    /// Append a condition
    pub fn add_condition(&mut self, condition: Condition) {
        self.conditions.push(condition);
    }

    /// Builder form of [`FilterModel::add_condition`]
    #[must_use]
    pub fn condition(mut self, condition: Condition) -> Self {
        self.add_condition(condition);
        self
    }

    /// Filter matching a single entity id
    #[must_use]
    pub fn by_id(id: i64) -> Self {
        Self::new().condition(Condition::new("id", "is", Value::from(id)))
    }

    /// Number of conditions
    #[must_use]
    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    /// True when no condition has been added
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub(crate) fn from_triples(
        logical_operator: LogicalOperator,
        triples: Vec<ConditionTriple>,
    ) -> Self {
        let mut filter = Self::with_operator(logical_operator);
        for triple in triples {
            filter.add_condition(triple.into());
        }
        filter
    }
}
