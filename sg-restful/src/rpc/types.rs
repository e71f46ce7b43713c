//! Request and response payloads for the backend JSON-RPC methods

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::query::FilterModel;

/// Entities per page when the caller gives no `limit`
pub const DEFAULT_PAGE_SIZE: i64 = 500;

/// Envelope every backend method answers with
///
/// `results` is absent or `null` when `exception` is set.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcResponse<T> {
    pub results: Option<T>,
    #[serde(default)]
    pub exception: bool,
    pub message: Option<String>,
    pub error_code: Option<i64>,
}

impl<T> RpcResponse<T> {
    /// Backend message, empty when none was sent
    pub fn message(&self) -> &str {
        self.message.as_deref().unwrap_or_default()
    }
}

/// Paging window for `read`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paging {
    pub current_page: i64,
    pub entities_per_page: i64,
}

impl Default for Paging {
    fn default() -> Self {
        Self {
            current_page: 1,
            entities_per_page: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Parameters of the `read` method
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadQuery {
    pub return_fields: Vec<String>,
    #[serde(rename = "type")]
    pub entity_type: String,
    pub return_paging_info: bool,
    pub api_return_image_urls: bool,
    pub return_only: String,
    pub paging: Paging,
    pub filters: FilterModel,
}

impl ReadQuery {
    /// Active entities of `entity_type`, `id` only, first page of 500, no filter
    pub fn new(entity_type: impl Into<String>) -> Self {
        Self {
            return_fields: vec!["id".to_string()],
            entity_type: entity_type.into(),
            return_paging_info: true,
            api_return_image_urls: true,
            return_only: "active".to_string(),
            paging: Paging::default(),
            filters: FilterModel::new(),
        }
    }

    /// Single entity lookup: `id is <id>`, one entity per page
    pub fn by_id(entity_type: impl Into<String>, id: i64) -> Self {
        let mut query = Self::new(entity_type);
        query.paging.entities_per_page = 1;
        query.filters = FilterModel::by_id(id);
        query
    }

    /// Replace the returned fields; an empty list keeps the current ones
    #[must_use]
    pub fn with_fields(mut self, fields: Vec<String>) -> Self {
        if !fields.is_empty() {
            self.return_fields = fields;
        }
        self
    }

    #[must_use]
    pub fn with_filters(mut self, filters: FilterModel) -> Self {
        self.filters = filters;
        self
    }
}

/// Entities returned by `read`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityPage {
    #[serde(default)]
    pub entities: Vec<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paging_info: Option<Map<String, Value>>,
}

/// One aggregate requested from `summarize`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub field: String,
    #[serde(rename = "type")]
    pub summary_type: String,
}

/// One grouping level requested from `summarize`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grouping {
    #[serde(default)]
    pub direction: String,
    pub field: String,
    #[serde(rename = "type")]
    pub grouping_type: String,
}

/// Parameters of the `summarize` method
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummarizeQuery {
    #[serde(rename = "type")]
    pub entity_type: String,
    pub filters: FilterModel,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub grouping: Vec<Grouping>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub summaries: Vec<Summary>,
}

impl SummarizeQuery {
    pub fn new(entity_type: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            filters: FilterModel::new(),
            grouping: Vec::new(),
            summaries: Vec::new(),
        }
    }
}

/// Result of `summarize`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryResults {
    #[serde(default)]
    pub summaries: Map<String, Value>,
    #[serde(default)]
    pub groups: Vec<SummaryGroup>,
}

/// One group of a grouped summary, possibly nested
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryGroup {
    pub group_value: Value,
    pub group_name: Value,
    #[serde(default)]
    pub summaries: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<SummaryGroup>,
}

/// A `{field_name, value}` pair for `create` and `update`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldValue {
    pub field_name: String,
    pub value: Value,
}

/// Turn a JSON object body into field/value pairs in key order
pub fn fields_from_object(object: Map<String, Value>) -> Vec<FieldValue> {
    object
        .into_iter()
        .map(|(field_name, value)| FieldValue { field_name, value })
        .collect()
}

/// Parameters of the `create` method
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateQuery {
    pub return_fields: Vec<String>,
    #[serde(rename = "type")]
    pub entity_type: String,
    pub fields: Vec<FieldValue>,
}

impl CreateQuery {
    pub fn new(entity_type: impl Into<String>, object: Map<String, Value>) -> Self {
        Self {
            return_fields: vec!["id".to_string()],
            entity_type: entity_type.into(),
            fields: fields_from_object(object),
        }
    }
}

/// Parameters of the `update` method
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateQuery {
    #[serde(rename = "type")]
    pub entity_type: String,
    pub id: i64,
    pub fields: Vec<FieldValue>,
}

impl UpdateQuery {
    pub fn new(entity_type: impl Into<String>, id: i64, object: Map<String, Value>) -> Self {
        Self {
            entity_type: entity_type.into(),
            id,
            fields: fields_from_object(object),
        }
    }
}

/// Parameters of `delete` and `revive`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityRef {
    #[serde(rename = "type")]
    pub entity_type: String,
    pub id: i64,
}

impl EntityRef {
    pub fn new(entity_type: impl Into<String>, id: i64) -> Self {
        Self {
            entity_type: entity_type.into(),
            id,
        }
    }
}

/// Body of the `info` method
#[derive(Debug, Clone, Deserialize)]
pub struct ServerInfo {
    #[serde(default)]
    pub version: Vec<Value>,
}

impl ServerInfo {
    /// `vMAJOR.MINOR.PATCH` from the first three version components
    pub fn version_string(&self) -> Option<String> {
        let mut parts = self.version.iter().map(|part| part.as_f64().map(|n| n as i64));
        let major = parts.next()??;
        let minor = parts.next()??;
        let patch = parts.next()??;
        Some(format!("v{major}.{minor}.{patch}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_read_query_defaults() {
        let value = serde_json::to_value(ReadQuery::new("Shot")).unwrap();
        assert_eq!(
            value,
            json!({
                "return_fields": ["id"],
                "type": "Shot",
                "return_paging_info": true,
                "api_return_image_urls": true,
                "return_only": "active",
                "paging": {"current_page": 1, "entities_per_page": 500},
                "filters": {"logical_operator": "and", "conditions": []}
            })
        );
    }

    #[test]
    fn test_read_query_by_id() {
        let query = ReadQuery::by_id("Asset", 42).with_fields(vec!["code".into(), "id".into()]);
        let value = serde_json::to_value(&query).unwrap();

        assert_eq!(value["paging"]["entities_per_page"], 1);
        assert_eq!(value["return_fields"], json!(["code", "id"]));
        assert_eq!(
            value["filters"]["conditions"],
            json!([{"path": "id", "relation": "is", "values": [42]}])
        );
    }

    #[test]
    fn test_empty_field_list_keeps_id() {
        let query = ReadQuery::new("Shot").with_fields(Vec::new());
        assert_eq!(query.return_fields, vec!["id".to_string()]);
    }

    #[test]
    fn test_summarize_omits_empty_lists() {
        let value = serde_json::to_value(SummarizeQuery::new("Shot")).unwrap();
        assert!(value.get("grouping").is_none());
        assert!(value.get("summaries").is_none());
        assert_eq!(value["type"], "Shot");
    }

    #[test]
    fn test_summary_parameters_decode() {
        let summaries: Vec<Summary> =
            serde_json::from_str(r#"[{"field": "id", "type": "count"}]"#).unwrap();
        assert_eq!(summaries[0].summary_type, "count");

        let grouping: Vec<Grouping> = serde_json::from_str(
            r#"[{"field": "sg_status_list", "type": "exact", "direction": "asc"}]"#,
        )
        .unwrap();
        assert_eq!(grouping[0].direction, "asc");

        assert!(serde_json::from_str::<Vec<Summary>>(r#"[{"field": "id"}]"#).is_err());
    }

    #[test]
    fn test_create_query_fields() {
        let object = json!({"code": "SH001", "project": {"type": "Project", "id": 1}});
        let Value::Object(object) = object else { unreachable!() };
        let value = serde_json::to_value(CreateQuery::new("Shot", object)).unwrap();

        assert_eq!(value["return_fields"], json!(["id"]));
        assert_eq!(value["fields"].as_array().unwrap().len(), 2);
        assert!(value["fields"]
            .as_array()
            .unwrap()
            .contains(&json!({"field_name": "code", "value": "SH001"})));
    }

    #[test]
    fn test_entity_ref() {
        assert_eq!(
            serde_json::to_value(EntityRef::new("Shot", 7)).unwrap(),
            json!({"type": "Shot", "id": 7})
        );
    }

    #[test]
    fn test_response_without_results() {
        let response: RpcResponse<EntityPage> = serde_json::from_str(
            r#"{"exception": true, "message": "API read() failed", "error_code": 103}"#,
        )
        .unwrap();
        assert!(response.exception);
        assert!(response.results.is_none());
        assert_eq!(response.message(), "API read() failed");
        assert_eq!(response.error_code, Some(103));
    }

    #[test]
    fn test_response_success() {
        let response: RpcResponse<bool> = serde_json::from_str(r#"{"results": true}"#).unwrap();
        assert!(!response.exception);
        assert_eq!(response.results, Some(true));
        assert_eq!(response.message(), "");
    }

    #[test]
    fn test_server_info_version() {
        let info: ServerInfo = serde_json::from_str(r#"{"version": [7, 2, 1]}"#).unwrap();
        assert_eq!(info.version_string().as_deref(), Some("v7.2.1"));

        let short: ServerInfo = serde_json::from_str(r#"{"version": [7]}"#).unwrap();
        assert!(short.version_string().is_none());

        let missing: ServerInfo = serde_json::from_str("{}").unwrap();
        assert!(missing.version_string().is_none());
    }
}
