//! The two collaborator operations the explorer depends on.
//!
//! Implementations live in `drill-backend` (HTTP and in-memory); tests supply
//! their own recording fakes.

use crate::error::BackendError;
use crate::query::ForecastQuery;
use crate::types::Row;
use serde::{Deserialize, Serialize};
use std::future::Future;

/// Response of `getMetadata()`. Only the hierarchy lists are interpreted;
/// everything else the API returns is kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastMetadata {
    #[serde(default)]
    pub product_category_hierarchy: Option<Vec<String>>,
    #[serde(default)]
    pub store_location_hierarchy: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Response of `executeSqlQuery(request)`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub data: Vec<Row>,
}

/// Access to the forecast dataset.
///
/// Futures must be `Send` because the explorer runs each request on its own
/// task and posts the result back to the owning loop.
pub trait ForecastBackend: Send + Sync + 'static {
    fn get_metadata(&self) -> impl Future<Output = Result<ForecastMetadata, BackendError>> + Send;

    fn execute_sql_query(
        &self,
        query: ForecastQuery,
    ) -> impl Future<Output = Result<QueryResponse, BackendError>> + Send;
}
