//! Nested-array format: `[[path, relation, value], ...]`

use super::error::QueryParseError;
use super::filter::{ConditionTriple, FilterModel, LogicalOperator};
use super::QueryFormat;

/// Bare array of triples combined with `and`
#[derive(Debug, Clone, Copy, Default)]
pub struct NestedArrayFormat;

impl NestedArrayFormat {
    /// Registry name
    pub const NAME: &'static str = "format3";
}

impl QueryFormat for NestedArrayFormat {
    fn can_parse(&self, input: &str) -> bool {
        input.starts_with("[[")
    }

    fn parse(&self, input: &str) -> Result<FilterModel, QueryParseError> {
        if !self.can_parse(input) {
            return Err(QueryParseError::InvalidFormat);
        }
        let triples: Vec<ConditionTriple> = serde_json::from_str(input)?;
        Ok(FilterModel::from_triples(LogicalOperator::And, triples))
    }
}
