//! Recording fake of the forecast API for explorer harnesses.
//!
//! Answers queries with [`InMemoryBackend::evaluate`] over the scenario rows
//! and records every request it receives, so harnesses can assert *how many*
//! queries were issued and *which* ones. Latency and failures are injectable;
//! combine with `#[tokio::test(start_paused = true)]` for deterministic
//! timing.
//!
//! # Example
//!
//! ```rust,no_run
//! let backend = RecordingBackend::scenario()
//!     .with_latency_fn(|q| if search_of(q).is_some() { ms(500) } else { ms(10) });
//! backend.fail_next_query(BackendError::Transport("down".into()));
//! ```

use super::fixtures::{scenario_metadata, scenario_rows};
use drill_backend::InMemoryBackend;
use drill_core::{BackendError, ForecastBackend, ForecastMetadata, ForecastQuery, QueryResponse};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

type LatencyFn = dyn Fn(&ForecastQuery) -> Duration + Send + Sync;

#[derive(Clone)]
pub struct RecordingBackend {
    inner: InMemoryBackend,
    queries: Arc<Mutex<Vec<ForecastQuery>>>,
    metadata_calls: Arc<AtomicUsize>,
    latency: Arc<LatencyFn>,
    query_failures: Arc<Mutex<VecDeque<BackendError>>>,
    metadata_failures: Arc<Mutex<VecDeque<BackendError>>>,
}

impl RecordingBackend {
    pub fn new(inner: InMemoryBackend) -> Self {
        Self {
            inner,
            queries: Arc::default(),
            metadata_calls: Arc::default(),
            latency: Arc::new(|_: &ForecastQuery| Duration::ZERO),
            query_failures: Arc::default(),
            metadata_failures: Arc::default(),
        }
    }

    /// Backend over [`scenario_rows`] with [`scenario_metadata`].
    pub fn scenario() -> Self {
        Self::new(InMemoryBackend::new(scenario_metadata(), scenario_rows()))
    }

    /// Same delay for every call.
    pub fn with_latency(self, latency: Duration) -> Self {
        self.with_latency_fn(move |_| latency)
    }

    /// Per-query delay, decided when the request arrives.
    pub fn with_latency_fn(
        mut self,
        f: impl Fn(&ForecastQuery) -> Duration + Send + Sync + 'static,
    ) -> Self {
        self.latency = Arc::new(f);
        self
    }

    /// Make the next query fail with `err` (after its latency).
    pub fn fail_next_query(&self, err: BackendError) {
        self.query_failures.lock().unwrap().push_back(err);
    }

    pub fn fail_next_metadata(&self, err: BackendError) {
        self.metadata_failures.lock().unwrap().push_back(err);
    }

    /// Every query received so far, in arrival order.
    pub fn queries(&self) -> Vec<ForecastQuery> {
        self.queries.lock().unwrap().clone()
    }

    pub fn query_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }

    /// Queries whose target level is `level`.
    pub fn queries_for(&self, level: &str) -> Vec<ForecastQuery> {
        self.queries()
            .into_iter()
            .filter(|q| q.target() == level)
            .collect()
    }

    pub fn global_queries(&self) -> Vec<ForecastQuery> {
        self.queries()
            .into_iter()
            .filter(|q| matches!(q, ForecastQuery::GlobalMatch { .. }))
            .collect()
    }

    pub fn metadata_calls(&self) -> usize {
        self.metadata_calls.load(Ordering::SeqCst)
    }

    pub fn clear_log(&self) {
        self.queries.lock().unwrap().clear();
    }
}

impl ForecastBackend for RecordingBackend {
    async fn get_metadata(&self) -> Result<ForecastMetadata, BackendError> {
        self.metadata_calls.fetch_add(1, Ordering::SeqCst);
        let failure = self.metadata_failures.lock().unwrap().pop_front();
        if let Some(err) = failure {
            return Err(err);
        }
        self.inner.get_metadata().await
    }

    async fn execute_sql_query(&self, query: ForecastQuery) -> Result<QueryResponse, BackendError> {
        self.queries.lock().unwrap().push(query.clone());
        let delay = (self.latency)(&query);
        let failure = self.query_failures.lock().unwrap().pop_front();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        match failure {
            Some(err) => Err(err),
            None => self.inner.evaluate(&query),
        }
    }
}

/// Search text of a child query, if any.
pub fn search_of(query: &ForecastQuery) -> Option<&str> {
    match query {
        ForecastQuery::LevelValues { search, .. } => search.as_deref(),
        ForecastQuery::GlobalMatch { term, .. } => Some(term.as_str()),
    }
}

pub fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}
