//! drill-backend — forecast API backends for drill.
//!
//! [`HttpBackend`] talks to the real API; [`InMemoryBackend`] evaluates the
//! same structured queries over rows held in memory. [`AnyBackend`] lets the
//! binary pick one at runtime.

pub mod http;
pub mod memory;

pub use http::HttpBackend;
pub use memory::InMemoryBackend;

use drill_core::{BackendError, ForecastBackend, ForecastMetadata, ForecastQuery, QueryResponse};

/// Runtime choice between the two backends.
#[derive(Debug, Clone)]
pub enum AnyBackend {
    Http(HttpBackend),
    Memory(InMemoryBackend),
}

impl ForecastBackend for AnyBackend {
    async fn get_metadata(&self) -> Result<ForecastMetadata, BackendError> {
        match self {
            AnyBackend::Http(b) => b.get_metadata().await,
            AnyBackend::Memory(b) => b.get_metadata().await,
        }
    }

    async fn execute_sql_query(&self, query: ForecastQuery) -> Result<QueryResponse, BackendError> {
        match self {
            AnyBackend::Http(b) => b.execute_sql_query(query).await,
            AnyBackend::Memory(b) => b.execute_sql_query(query).await,
        }
    }
}

impl From<HttpBackend> for AnyBackend {
    fn from(backend: HttpBackend) -> Self {
        AnyBackend::Http(backend)
    }
}

impl From<InMemoryBackend> for AnyBackend {
    fn from(backend: InMemoryBackend) -> Self {
        AnyBackend::Memory(backend)
    }
}
