//! HTTP backend — talks to the forecast API over plain HTTP/1.
//!
//! - `GET  {base}/core/forecast-metadata`
//! - `POST {base}/core/forecast-table-sql` with `{"sql_query": …, "params": […]}`
//!
//! Non-success responses carry `{"detail": …}`; the detail ends up in
//! [`BackendError::Status`].

use bytes::Bytes;
use drill_core::config::BackendConfig;
use drill_core::{BackendError, ExplorerError, ForecastBackend, ForecastMetadata, ForecastQuery, Ident, QueryResponse};
use http_body_util::{BodyExt, Full};
use hyper::header::{ACCEPT, CONTENT_TYPE};
use hyper::{Method, Request, StatusCode, Uri};
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;

const METADATA_PATH: &str = "/core/forecast-metadata";
const SQL_PATH: &str = "/core/forecast-table-sql";

#[derive(Clone)]
pub struct HttpBackend {
    client: Client<HttpConnector, Full<Bytes>>,
    base_url: String,
    table: Ident,
}

impl std::fmt::Debug for HttpBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpBackend")
            .field("base_url", &self.base_url)
            .field("table", &self.table)
            .finish()
    }
}

impl HttpBackend {
    pub fn new(base_url: &str, table: Ident) -> Self {
        Self {
            client: Client::builder(TokioExecutor::new()).build_http(),
            base_url: base_url.trim_end_matches('/').to_string(),
            table,
        }
    }

    /// Build from the `[backend]` config section. Fails on an invalid table
    /// name.
    pub fn from_config(config: &BackendConfig) -> Result<Self, ExplorerError> {
        Ok(Self::new(&config.base_url, config.table_ident()?))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Uri, BackendError> {
        format!("{}{}", self.base_url, path)
            .parse()
            .map_err(|e| BackendError::InvalidRequest(format!("bad url {}{path}: {e}", self.base_url)))
    }

    async fn send(&self, method: Method, path: &str, body: Option<Vec<u8>>) -> Result<Bytes, BackendError> {
        let mut builder = Request::builder()
            .method(method)
            .uri(self.endpoint(path)?)
            .header(ACCEPT, "application/json");
        if body.is_some() {
            builder = builder.header(CONTENT_TYPE, "application/json");
        }
        let request = builder
            .body(Full::new(Bytes::from(body.unwrap_or_default())))
            .map_err(|e| BackendError::InvalidRequest(e.to_string()))?;

        let response = self
            .client
            .request(request)
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?
            .to_bytes();

        if !status.is_success() {
            return Err(BackendError::Status {
                status: status.as_u16(),
                detail: error_detail(status, &bytes),
            });
        }
        Ok(bytes)
    }
}

impl ForecastBackend for HttpBackend {
    async fn get_metadata(&self) -> Result<ForecastMetadata, BackendError> {
        tracing::debug!(base_url = %self.base_url, "http: get metadata");
        let bytes = self.send(Method::GET, METADATA_PATH, None).await?;
        serde_json::from_slice(&bytes).map_err(|e| BackendError::Decode(e.to_string()))
    }

    async fn execute_sql_query(&self, query: ForecastQuery) -> Result<QueryResponse, BackendError> {
        let request = query.to_sql(&self.table);
        tracing::debug!(sql = %request.sql_query, params = request.params.len(), "http: execute sql");
        let body = serde_json::to_vec(&request).map_err(|e| BackendError::InvalidRequest(e.to_string()))?;
        let bytes = self.send(Method::POST, SQL_PATH, Some(body)).await?;
        serde_json::from_slice(&bytes).map_err(|e| BackendError::Decode(e.to_string()))
    }
}

/// Human-readable detail of an error response: the `detail` field when the
/// body is `{"detail": …}`, else the body text, else the status reason.
fn error_detail(status: StatusCode, body: &[u8]) -> String {
    if let Ok(serde_json::Value::Object(map)) = serde_json::from_slice::<serde_json::Value>(body) {
        match map.get("detail") {
            Some(serde_json::Value::String(s)) => return s.clone(),
            Some(other) => return other.to_string(),
            None => {}
        }
    }
    let text = String::from_utf8_lossy(body).trim().to_string();
    if !text.is_empty() {
        return text;
    }
    status
        .canonical_reason()
        .unwrap_or("request failed")
        .to_string()
}
