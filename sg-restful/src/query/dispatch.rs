//! Selects the active format that handles a query string

use super::error::QueryParseError;
use super::filter::FilterModel;
use super::registry::FormatRegistry;

/// Parse `input` with the first active format that claims it
///
/// The claiming format's result is returned as-is, errors included; later
/// formats are never tried once one has claimed the input. If nothing claims
/// it the result is [`QueryParseError::NoFormat`].
pub fn parse_query(registry: &FormatRegistry, input: &str) -> Result<FilterModel, QueryParseError> {
    for (name, format) in registry.active() {
        if format.can_parse(input) {
            tracing::debug!(format = name, "query format selected");
            return format.parse(input);
        }
    }
    tracing::debug!(input, "no query format claimed input");
    Err(QueryParseError::NoFormat)
}
