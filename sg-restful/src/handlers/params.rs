//! Query-string parameters for the read-style endpoints
//!
//! Parameter names are matched case-insensitively (`?Page=2` is `?page=2`);
//! when a name repeats, the first occurrence wins. Unknown parameters are
//! ignored.

use serde::de::DeserializeOwned;

use crate::error::{Error, Result};
use crate::query::{parse_query, FilterModel, FormatRegistry};
use crate::rpc::{Grouping, ReadQuery, SummarizeQuery, Summary};

/// Raw `(name, value)` pairs as they appear in the query string
pub type RawParams = Vec<(String, String)>;

fn lookup<'a>(params: &'a [(String, String)], name: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

fn parse_int(name: &str, value: &str) -> Result<i64> {
    value
        .parse()
        .map_err(|_| Error::BadRequest(format!("Could not convert {name} '{value}' to int")))
}

/// Comma-separated field list; empty input keeps the default
fn parse_fields(value: &str) -> Vec<String> {
    if value.is_empty() {
        return Vec::new();
    }
    value.split(',').map(str::to_string).collect()
}

fn parse_filter(registry: &FormatRegistry, value: &str) -> Result<FilterModel> {
    let filters = parse_query(registry, value)?;
    tracing::debug!(conditions = filters.len(), "parsed filter query");
    Ok(filters)
}

fn parse_json<T: DeserializeOwned>(name: &str, value: &str) -> Result<T> {
    serde_json::from_str(value)
        .map_err(|e| Error::BadRequest(format!("Invalid {name} parameter: {e}")))
}

/// Apply `page`, `limit`, `fields` and `q` to a `read` query
pub fn apply_read_params(
    mut query: ReadQuery,
    params: &[(String, String)],
    registry: &FormatRegistry,
) -> Result<ReadQuery> {
    if let Some(page) = lookup(params, "page").filter(|v| !v.is_empty()) {
        query.paging.current_page = parse_int("page", page)?;
    }
    if let Some(limit) = lookup(params, "limit").filter(|v| !v.is_empty()) {
        query.paging.entities_per_page = parse_int("limit", limit)?;
    }
    if let Some(fields) = lookup(params, "fields") {
        query = query.with_fields(parse_fields(fields));
    }
    if let Some(q) = lookup(params, "q") {
        query = query.with_filters(parse_filter(registry, q)?);
    }
    Ok(query)
}

/// Apply `fields` only, for single-entity reads
pub fn apply_field_params(query: ReadQuery, params: &[(String, String)]) -> ReadQuery {
    match lookup(params, "fields") {
        Some(fields) => query.with_fields(parse_fields(fields)),
        None => query,
    }
}

/// Apply `q`, `summaries` and `grouping` to a `summarize` query
///
/// `summaries` and `grouping` are JSON arrays of `{field, type}` and
/// `{field, type, direction}` objects.
pub fn apply_summarize_params(
    mut query: SummarizeQuery,
    params: &[(String, String)],
    registry: &FormatRegistry,
) -> Result<SummarizeQuery> {
    if let Some(q) = lookup(params, "q") {
        query.filters = parse_filter(registry, q)?;
    }
    if let Some(summaries) = lookup(params, "summaries") {
        query.summaries = parse_json::<Vec<Summary>>("summaries", summaries)?;
    }
    if let Some(grouping) = lookup(params, "grouping") {
        query.grouping = parse_json::<Vec<Grouping>>("grouping", grouping)?;
    }
    Ok(query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::QueryParseError;
    use axum::http::StatusCode;

    fn params(pairs: &[(&str, &str)]) -> RawParams {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn registry() -> FormatRegistry {
        let mut registry = FormatRegistry::with_builtin_formats();
        registry.activate(FormatRegistry::builtin_names()).unwrap();
        registry
    }

    #[test]
    fn test_read_defaults_untouched() {
        let query = apply_read_params(ReadQuery::new("Shot"), &[], &registry()).unwrap();
        assert_eq!(query, ReadQuery::new("Shot"));
    }

    #[test]
    fn test_paging_and_fields() {
        let query = apply_read_params(
            ReadQuery::new("Shot"),
            &params(&[("PAGE", "3"), ("Limit", "25"), ("fields", "code,sg_status_list")]),
            &registry(),
        )
        .unwrap();

        assert_eq!(query.paging.current_page, 3);
        assert_eq!(query.paging.entities_per_page, 25);
        assert_eq!(query.return_fields, vec!["code", "sg_status_list"]);
    }

    #[test]
    fn test_empty_values_are_ignored() {
        let query = apply_read_params(
            ReadQuery::new("Shot"),
            &params(&[("page", ""), ("limit", ""), ("fields", "")]),
            &registry(),
        )
        .unwrap();
        assert_eq!(query, ReadQuery::new("Shot"));
    }

    #[test]
    fn test_bad_page_message() {
        let err = apply_read_params(ReadQuery::new("Shot"), &params(&[("page", "two")]), &registry())
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Could not convert page 'two' to int");

        let err = apply_read_params(ReadQuery::new("Shot"), &params(&[("limit", "1.5")]), &registry())
            .unwrap_err();
        assert_eq!(err.to_string(), "Could not convert limit '1.5' to int");
    }

    #[test]
    fn test_filter_query() {
        let query = apply_read_params(
            ReadQuery::new("Shot"),
            &params(&[("q", r#"and(["code", "is", "SH001"])"#)]),
            &registry(),
        )
        .unwrap();
        assert_eq!(query.filters.len(), 1);
    }

    #[test]
    fn test_unparseable_filter_query() {
        let err = apply_read_params(
            ReadQuery::new("Shot"),
            &params(&[("q", "andwell_this_is_bad")]),
            &registry(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Query(QueryParseError::NoFormat)));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_first_occurrence_wins() {
        let query = apply_read_params(
            ReadQuery::new("Shot"),
            &params(&[("page", "2"), ("Page", "9")]),
            &registry(),
        )
        .unwrap();
        assert_eq!(query.paging.current_page, 2);
    }

    #[test]
    fn test_field_params_only() {
        let query = apply_field_params(
            ReadQuery::by_id("Shot", 1),
            &params(&[("fields", "code"), ("page", "not-checked")]),
        );
        assert_eq!(query.return_fields, vec!["code"]);
        assert_eq!(query.paging.entities_per_page, 1);
    }

    #[test]
    fn test_summarize_params() {
        let query = apply_summarize_params(
            SummarizeQuery::new("Shot"),
            &params(&[
                ("q", r#"[["project", "is", {"type": "Project", "id": 1}]]"#),
                ("summaries", r#"[{"field": "id", "type": "count"}]"#),
                ("grouping", r#"[{"field": "sg_status_list", "type": "exact", "direction": "asc"}]"#),
            ]),
            &registry(),
        )
        .unwrap();

        assert_eq!(query.filters.len(), 1);
        assert_eq!(query.summaries[0].field, "id");
        assert_eq!(query.grouping[0].grouping_type, "exact");
    }

    #[test]
    fn test_malformed_summaries_is_bad_request() {
        for (name, value) in [("summaries", "[{"), ("grouping", r#"{"field": "id"}"#)] {
            let err = apply_summarize_params(
                SummarizeQuery::new("Shot"),
                &params(&[(name, value)]),
                &registry(),
            )
            .unwrap_err();
            assert_eq!(err.status_code(), StatusCode::BAD_REQUEST, "param: {name}");
        }
    }
}
