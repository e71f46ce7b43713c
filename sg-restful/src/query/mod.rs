//! Filter query grammar
//!
//! The `q` parameter of list and summarize endpoints accepts several query
//! shapes. Each shape is a [`QueryFormat`]; formats are registered by name in a
//! [`FormatRegistry`] and an ordered subset is activated at startup. The
//! dispatcher ([`parse_query`]) hands the input to the first active format
//! whose [`QueryFormat::can_parse`] claims it.
//!
//! | name      | shape                                                       |
//! |-----------|-------------------------------------------------------------|
//! | `format1` | `and(["name", "is", "x"])`, `or([[..], [..]])`              |
//! | `format2` | `{"logical_operator": "or", "conditions": [[..], [..]]}`    |
//! | `format3` | `[["name", "is", "x"], ..]` (operator is always `and`)      |
//!
//! # Example
//!
//! ```rust
//! use sg_restful::query::{parse_query, FormatRegistry, LogicalOperator};
//!
//! let mut registry = FormatRegistry::with_builtin_formats();
//! registry.activate(["format1", "format2", "format3"]).unwrap();
//!
//! let filter = parse_query(&registry, r#"or(["name", "starts_with", "Big"])"#).unwrap();
//! assert_eq!(filter.logical_operator, LogicalOperator::Or);
//! assert_eq!(filter.conditions[0].values, vec![serde_json::json!("Big")]);
//! ```

mod dispatch;
mod error;
mod filter;
mod format1;
mod format2;
mod format3;
mod registry;

pub use dispatch::parse_query;
pub use error::{QueryParseError, RegistryError, NO_FORMAT_MESSAGE};
pub use filter::{Condition, ConditionTriple, FilterModel, LogicalOperator};
pub use format1::FunctionCallFormat;
pub use format2::ObjectFormat;
pub use format3::NestedArrayFormat;
pub use registry::FormatRegistry;

/// A query grammar
///
/// `can_parse` is a cheap structural check; it does not promise that `parse`
/// will succeed. The two are computed independently, so `parse` may be called
/// directly and still reports a precise error for input outside the grammar.
pub trait QueryFormat: Send + Sync {
    /// Whether this format claims the input
    fn can_parse(&self, input: &str) -> bool;

    /// Decode the input into a filter
    fn parse(&self, input: &str) -> Result<FilterModel, QueryParseError>;
}
