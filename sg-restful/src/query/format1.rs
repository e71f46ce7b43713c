//! Function-call format: `and([path, relation, value], ...)` / `or(...)`

use once_cell::sync::Lazy;
use regex::Regex;

use super::error::QueryParseError;
use super::filter::{ConditionTriple, FilterModel, LogicalOperator};
use super::QueryFormat;

static CALL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\w+)\((.*)\)$").expect("call pattern is a valid regex"));

/// `and(...)` / `or(...)` with one triple, several triples, or an array of triples
///
/// The keyword is case-insensitive. A body that starts with a single `[` is
/// wrapped in an outer array, so `and(["a","is",1])` and `and([["a","is",1]])`
/// decode to the same filter.
#[derive(Debug, Clone, Copy, Default)]
pub struct FunctionCallFormat;

impl FunctionCallFormat {
    /// Registry name
    pub const NAME: &'static str = "format1";

    fn has_keyword_prefix(input: &str) -> bool {
        let head: String = input.chars().take(3).collect::<String>().to_ascii_lowercase();
        head.starts_with("and") || head.starts_with("or")
    }

    /// Split `name(body)` into its captured parts
    fn split_call(input: &str) -> Option<(&str, &str)> {
        let captures = CALL_PATTERN.captures(input)?;
        let name = captures.get(1)?.as_str();
        let body = captures.get(2)?.as_str();
        Some((name, body))
    }
}

impl QueryFormat for FunctionCallFormat {
    fn can_parse(&self, input: &str) -> bool {
        if !Self::has_keyword_prefix(input) {
            return false;
        }
        Self::split_call(input).is_some_and(|(_, body)| body.starts_with('['))
    }

    fn parse(&self, input: &str) -> Result<FilterModel, QueryParseError> {
        if !Self::has_keyword_prefix(input) {
            return Err(QueryParseError::InvalidFormat);
        }
        let (name, body) = Self::split_call(input).ok_or(QueryParseError::InvalidFormat)?;

        let triples: Vec<ConditionTriple> = if body.starts_with("[[") {
            serde_json::from_str(body)?
        } else if body.starts_with('[') {
            serde_json::from_str(&format!("[{body}]"))?
        } else {
            return Err(QueryParseError::InvalidFilterFormat);
        };

        let operator: LogicalOperator = name.parse()?;
        tracing::debug!(%operator, conditions = triples.len(), "parsed function-call query");

        Ok(FilterModel::from_triples(operator, triples))
    }
}
