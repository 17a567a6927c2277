//! Error types shared by the explorer engine and the backends.

use crate::types::NodeId;
use std::time::Duration;

/// Failure talking to the forecast API (or evaluating a query in memory).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BackendError {
    /// The request never produced a response (connection refused, reset, …).
    #[error("transport error: {0}")]
    Transport(String),
    /// The API answered with a non-success status. `detail` is taken from the
    /// `{"detail": ...}` error body when present.
    #[error("backend returned {status}: {detail}")]
    Status { status: u16, detail: String },
    /// The response body could not be decoded.
    #[error("malformed response: {0}")]
    Decode(String),
    /// The request exceeded the configured fetch timeout.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    /// The request was rejected before it was sent.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Errors surfaced by the explorer. All of them are recovered locally and
/// stored in the explorer's shared error slot.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExplorerError {
    #[error("failed to load metadata: {0}")]
    MetadataLoad(String),
    /// A level or root load failed. `node` is `None` for the root level.
    #[error("failed to load data{}: {source}", node_suffix(.node))]
    Fetch {
        node: Option<NodeId>,
        #[source]
        source: BackendError,
    },
    /// A scoped (per-node) or global search failed.
    #[error("failed to search data: {0}")]
    Search(#[source] BackendError),
    #[error("invalid hierarchy level `{0}`")]
    InvalidLevel(String),
    #[error("unknown node `{0}`")]
    UnknownNode(NodeId),
}

fn node_suffix(node: &Option<NodeId>) -> String {
    match node {
        Some(id) => format!(" for {id}"),
        None => String::new(),
    }
}

pub type Result<T, E = ExplorerError> = std::result::Result<T, E>;
