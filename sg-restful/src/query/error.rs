//! Errors raised while recognizing or decoding a filter query

use thiserror::Error;

/// Message used when no active format claims the input
pub const NO_FORMAT_MESSAGE: &str = "No QueryFormats can parse input";

/// Failure to turn a query string into a [`FilterModel`](super::FilterModel)
///
/// Every variant is a client input error. `Display` yields the message that is
/// returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryParseError {
    /// No active format claims the input
    #[error("No QueryFormats can parse input")]
    NoFormat,

    /// Input does not have the outer shape of the invoked format
    #[error("Invalid query format")]
    InvalidFormat,

    /// Function-call body is neither a triple nor an array of triples
    #[error("Invalid query filter format")]
    InvalidFilterFormat,

    /// Object format invoked on input that is not an object
    #[error("Missing Prefix: '{0}'")]
    MissingPrefix(&'static str),

    /// Object format without a required key
    #[error("Missing key: '{0}'")]
    MissingKey(&'static str),

    /// Logical operator other than `and`/`or`
    #[error("Unsupported logical operator: '{0}'")]
    UnsupportedOperator(String),

    /// The format claimed the input but its body did not decode
    ///
    /// Carries the decoder diagnostic verbatim.
    #[error("{0}")]
    Decode(String),
}

impl QueryParseError {
    /// True when the failure means "not a query at all" rather than a broken body
    #[must_use]
    pub const fn is_grammar_mismatch(&self) -> bool {
        matches!(self, Self::NoFormat)
    }
}

impl From<serde_json::Error> for QueryParseError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Misconfiguration of the format registry, detected at startup
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Activation named a format that was never registered
    #[error("unknown query format '{0}'")]
    UnknownFormat(String),
}
