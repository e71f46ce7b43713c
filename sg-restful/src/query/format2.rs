//! Object format: `{"logical_operator": "and", "conditions": [[path, relation, value], ...]}`

use serde_json::{Map, Value};

use super::error::QueryParseError;
use super::filter::{ConditionTriple, FilterModel, LogicalOperator};
use super::QueryFormat;

const LOGICAL_OPERATOR: &str = "logical_operator";
const CONDITIONS: &str = "conditions";

/// JSON object carrying an explicit operator and a list of triples
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjectFormat;

impl ObjectFormat {
    /// Registry name
    pub const NAME: &'static str = "format2";
}

impl QueryFormat for ObjectFormat {
    fn can_parse(&self, input: &str) -> bool {
        if !input.starts_with('{') {
            return false;
        }
        serde_json::from_str::<Map<String, Value>>(input)
            .is_ok_and(|object| object.contains_key(LOGICAL_OPERATOR) && object.contains_key(CONDITIONS))
    }

    fn parse(&self, input: &str) -> Result<FilterModel, QueryParseError> {
        if !input.starts_with('{') {
            return Err(QueryParseError::MissingPrefix("{"));
        }

        let mut object: Map<String, Value> = serde_json::from_str(input)?;
        let operator = object
            .remove(LOGICAL_OPERATOR)
            .ok_or(QueryParseError::MissingKey(LOGICAL_OPERATOR))?;
        let conditions = object
            .remove(CONDITIONS)
            .ok_or(QueryParseError::MissingKey(CONDITIONS))?;

        let operator: LogicalOperator = match operator {
            Value::String(name) => name.parse()?,
            other => return Err(QueryParseError::UnsupportedOperator(other.to_string())),
        };
        let triples: Vec<ConditionTriple> = serde_json::from_value(conditions)?;
        tracing::debug!(%operator, conditions = triples.len(), "parsed object query");

        Ok(FilterModel::from_triples(operator, triples))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Condition;
    use serde_json::json;

    #[test]
    fn test_can_parse() {
        let format = ObjectFormat;
        assert!(format.can_parse(r#"{"logical_operator": "and", "conditions": []}"#));

        assert!(!format.can_parse("{foo}"));
        assert!(!format.can_parse(r#"{"conditions": [["name", "is", "blorg"]]}"#));
        assert!(!format.can_parse(r#"{"logical_operator": "and"}"#));
        assert!(!format.can_parse(r#"[["name", "is", "blorg"]]"#));
        assert!(!format.can_parse(r#" {"logical_operator": "and", "conditions": []}"#));
    }

    #[test]
    fn test_basic_and() {
        let filter = ObjectFormat
            .parse(r#"{"logical_operator": "and", "conditions": [["name", "is", "blorg"]]}"#)
            .unwrap();

        let expected = FilterModel::new().condition(Condition::new("name", "is", json!("blorg")));
        assert_eq!(filter, expected);
    }

    #[test]
    fn test_or_with_multi_value() {
        let filter = ObjectFormat
            .parse(
                r#"{"logical_operator": "OR", "conditions": [["name", "is", "blorg"], ["sg_status", "in", ["Active", "Bidding"]]]}"#,
            )
            .unwrap();

        let expected = FilterModel::with_operator(LogicalOperator::Or)
            .condition(Condition::new("name", "is", json!("blorg")))
            .condition(Condition::new("sg_status", "in", json!(["Active", "Bidding"])));
        assert_eq!(filter, expected);
    }

    #[test]
    fn test_malformed_json_is_verbatim() {
        let expected = serde_json::from_str::<Map<String, Value>>("{foo}")
            .unwrap_err()
            .to_string();
        assert_eq!(ObjectFormat.parse("{foo}").unwrap_err(), QueryParseError::Decode(expected));
    }

    #[test]
    fn test_missing_keys() {
        assert_eq!(
            ObjectFormat
                .parse(r#"{"conditions": [["name", "is", "blorg"]]}"#)
                .unwrap_err(),
            QueryParseError::MissingKey("logical_operator")
        );
        assert_eq!(
            ObjectFormat.parse(r#"{"logical_operator": "and"}"#).unwrap_err(),
            QueryParseError::MissingKey("conditions")
        );
    }

    #[test]
    fn test_missing_prefix() {
        assert_eq!(
            ObjectFormat.parse(r#"[["name", "is", "blorg"]]"#).unwrap_err(),
            QueryParseError::MissingPrefix("{")
        );
    }

    #[test]
    fn test_non_string_operator() {
        let err = ObjectFormat
            .parse(r#"{"logical_operator": 1, "conditions": []}"#)
            .unwrap_err();
        assert_eq!(err, QueryParseError::UnsupportedOperator("1".to_string()));
    }

    #[test]
    fn test_conditions_not_a_list() {
        let err = ObjectFormat
            .parse(r#"{"logical_operator": "and", "conditions": "name"}"#)
            .unwrap_err();
        assert!(matches!(err, QueryParseError::Decode(_)));
    }
}
