//! drill-core — engine of the forecast drill-down explorer.
//!
//! This crate holds everything that does not depend on a transport or a
//! screen: the value types, the hierarchy, the query builder, the node store
//! and the [`Explorer`] state machine that ties them together.
//!
//! # Architecture
//!
//! ```text
//! ForecastBackend ──► Explorer ──► NodeStore ──► UI
//!   (metadata,          │
//!    queries)           └──► Selection sink
//! ```
//!
//! Backends implement [`ForecastBackend`]; `drill-backend` ships an HTTP and
//! an in-memory implementation.

pub mod backend;
pub mod config;
pub mod error;
pub mod explorer;
pub mod hierarchy;
pub mod query;
pub mod store;
pub mod types;

pub use backend::{ForecastBackend, ForecastMetadata, QueryResponse};
pub use config::{Config, ExplorerSettings};
pub use error::{BackendError, ExplorerError};
pub use explorer::{DragPayload, Explorer, GlobalSearch, SearchResult, Selection, SelectionKind};
pub use hierarchy::{Domain, Hierarchy};
pub use query::{ChildOrder, ForecastQuery, SqlRequest};
pub use store::{Children, Node, NodeState, NodeStore};
pub use types::{Context, Ident, NodeId, Row, Scalar};
