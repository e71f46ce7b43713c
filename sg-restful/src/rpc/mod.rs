//! Backend JSON-RPC client
//!
//! Every call is a POST to `<host>/api3/json` with body
//! `{"method_name": <method>, "params": [<credentials>, <params>]}`; the
//! backend answers with an envelope carrying either `results` or an
//! `exception` flag and `message`.

mod client;
mod types;

pub use client::{Credentials, RpcError, Shotgun, DEFAULT_API_PATH};
pub use types::{
    fields_from_object, CreateQuery, EntityPage, EntityRef, FieldValue, Grouping, Paging,
    ReadQuery, RpcResponse, ServerInfo, SummarizeQuery, Summary, SummaryGroup, SummaryResults,
    UpdateQuery, DEFAULT_PAGE_SIZE,
};
