//! Fake forecast API server for integration tests.
//!
//! Spins up a minimal `axum` HTTP server on a random TCP port bound to
//! 127.0.0.1. Serves:
//! - `GET  /core/forecast-metadata`: the configured metadata document
//! - `POST /core/forecast-table-sql`: queued `{"data": [...]}` responses
//!
//! The server cannot evaluate SQL. It records every request body so tests
//! can assert on the SQL text and parameters, and answers each query with
//! the next queued row set (an empty set once the queue runs dry).
//!
//! # Example
//!
//! ```rust,no_run
//! # tokio_test::block_on(async {
//! use common::fake_forecast_api::FakeForecastApi;
//!
//! let api = FakeForecastApi::start(serde_json::json!({
//!     "product_category_hierarchy": ["vertical"],
//! }))
//! .await
//! .unwrap();
//! api.push_rows(vec![serde_json::json!({ "vertical": "Apparel", "count": 3 })]).await;
//!
//! // Point an HttpBackend at api.base_url()
//! let url = api.base_url();
//! # });
//! ```

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

/// State shared between the router and test code.
#[derive(Default)]
struct ApiState {
    metadata: Value,
    /// Row sets answered to successive SQL requests.
    responses: VecDeque<Vec<Value>>,
    /// Bodies of every SQL request received, in arrival order.
    requests: Vec<Value>,
    metadata_calls: usize,
    /// `(status, detail)` for the next request of any kind.
    failure: Option<(StatusCode, String)>,
    delay: Option<Duration>,
}

type Shared = Arc<Mutex<ApiState>>;

/// Handle to the running fake forecast API.
pub struct FakeForecastApi {
    addr: SocketAddr,
    state: Shared,
}

impl FakeForecastApi {
    /// Start the server on a random port with `metadata` as the metadata
    /// document. Returns once the server is listening.
    pub async fn start(metadata: Value) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let state = Arc::new(Mutex::new(ApiState {
            metadata,
            ..ApiState::default()
        }));

        let app = Router::new()
            .route("/core/forecast-metadata", get(metadata_handler))
            .route("/core/forecast-table-sql", post(table_sql))
            .with_state(state.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Give the task a moment to register.
        tokio::time::sleep(Duration::from_millis(5)).await;

        Ok(Self { addr, state })
    }

    /// Base URL for the API (e.g. `http://127.0.0.1:PORT`).
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Queue the rows answered to the next unanswered SQL request.
    pub async fn push_rows(&self, rows: Vec<Value>) {
        self.state.lock().await.responses.push_back(rows);
    }

    /// Make the next request fail with `status` and `{"detail": detail}`.
    pub async fn fail_next(&self, status: u16, detail: &str) {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        self.state.lock().await.failure = Some((status, detail.to_string()));
    }

    /// Hold every response for `delay` before answering.
    pub async fn set_delay(&self, delay: Duration) {
        self.state.lock().await.delay = Some(delay);
    }

    /// Every SQL request body received so far.
    pub async fn requests(&self) -> Vec<Value> {
        self.state.lock().await.requests.clone()
    }

    pub async fn metadata_calls(&self) -> usize {
        self.state.lock().await.metadata_calls
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn metadata_handler(State(state): State<Shared>) -> Response {
    let (delay, outcome) = {
        let mut s = state.lock().await;
        s.metadata_calls += 1;
        let outcome = match s.failure.take() {
            Some(failure) => Err(failure),
            None => Ok(s.metadata.clone()),
        };
        (s.delay, outcome)
    };
    respond(delay, outcome.map(Json)).await
}

async fn table_sql(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let (delay, outcome) = {
        let mut s = state.lock().await;
        s.requests.push(body);
        let outcome = match s.failure.take() {
            Some(failure) => Err(failure),
            None => Ok(json!({ "data": s.responses.pop_front().unwrap_or_default() })),
        };
        (s.delay, outcome)
    };
    respond(delay, outcome.map(Json)).await
}

async fn respond(
    delay: Option<Duration>,
    outcome: Result<Json<Value>, (StatusCode, String)>,
) -> Response {
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    match outcome {
        Ok(body) => body.into_response(),
        Err((status, detail)) => (status, Json(json!({ "detail": detail }))).into_response(),
    }
}
