//! Explorer — the lazy drill-down engine behind both the product and the
//! store tree.
//!
//! An [`Explorer`] owns the [`NodeStore`], the debounce timers and the error
//! slot. It never blocks: every backend call runs on its own tokio task and
//! posts a completion back over a channel. The owner drives the engine either
//! with [`Explorer::pump`] / [`Explorer::settle`] (async callers, tests) or
//! with [`Explorer::poll_ready`] from a synchronous UI tick.
//!
//! ```text
//!  mount ──► metadata ──► roots ──► NodeStore ◄── expand / collapse
//!                                      ▲
//!                 scoped search ───────┤
//!                 global search ── local scan ──► dataset fallback
//!                                      │
//!                                      └──► Selection sink / drag payload
//! ```
//!
//! Every request is tagged with a token. A node (and the root load and the
//! global search) remembers the token of its newest request; a completion
//! carrying an older token is dropped. The one exception is an unfiltered
//! child load, which still records the node's unfiltered child set when that
//! set is missing.

mod debounce;
mod global;
mod loader;
mod scoped;
mod selection;

pub use debounce::{Debouncer, TimerKey};
pub use global::{GlobalSearch, ResultSource, SearchResult};
pub use selection::{DragPayload, Selection, SelectionKind};

use crate::backend::{ForecastBackend, ForecastMetadata, QueryResponse};
use crate::config::ExplorerSettings;
use crate::error::{BackendError, ExplorerError};
use crate::hierarchy::{Domain, Hierarchy};
use crate::query::ForecastQuery;
use crate::store::{Node, NodeStore};
use crate::types::{Context, Ident, NodeId, Row, Scalar};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;

// ---------------------------------------------------------------------------
// Completions
// ---------------------------------------------------------------------------

/// Result of a spawned backend call, posted back to the owning explorer.
#[derive(Debug)]
pub(crate) enum Completion {
    Metadata {
        seq: u64,
        result: Result<ForecastMetadata, BackendError>,
    },
    Roots {
        seq: u64,
        result: Result<QueryResponse, BackendError>,
    },
    Children {
        node: NodeId,
        seq: u64,
        result: Result<QueryResponse, BackendError>,
    },
    ScopedSearch {
        node: NodeId,
        seq: u64,
        term: String,
        result: Result<QueryResponse, BackendError>,
    },
    GlobalFallback {
        seq: u64,
        result: Result<QueryResponse, BackendError>,
    },
}

// ---------------------------------------------------------------------------
// Explorer
// ---------------------------------------------------------------------------

pub struct Explorer<B: ForecastBackend> {
    backend: Arc<B>,
    domain: Domain,
    settings: ExplorerSettings,
    hierarchy: Option<Hierarchy>,
    store: NodeStore,
    /// Last token handed out; shared by every request kind.
    seq: u64,
    root_seq: u64,
    root_loading: bool,
    global: GlobalSearch,
    /// Context of a search result being located in the tree.
    reveal: Option<Context>,
    timers: Debouncer,
    error: Option<ExplorerError>,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
    in_flight: usize,
    selections: mpsc::UnboundedSender<Selection>,
}

impl<B: ForecastBackend> Explorer<B> {
    /// Create an idle explorer. Nothing is fetched until [`Explorer::mount`].
    pub fn new(
        backend: Arc<B>,
        domain: Domain,
        settings: ExplorerSettings,
        selections: mpsc::UnboundedSender<Selection>,
    ) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            backend,
            domain,
            settings,
            hierarchy: None,
            store: NodeStore::new(),
            seq: 0,
            root_seq: 0,
            root_loading: false,
            global: GlobalSearch::default(),
            reveal: None,
            timers: Debouncer::default(),
            error: None,
            completions_tx,
            completions_rx,
            in_flight: 0,
            selections,
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn domain(&self) -> Domain {
        self.domain
    }

    pub fn settings(&self) -> &ExplorerSettings {
        &self.settings
    }

    /// `None` until metadata has loaded.
    pub fn hierarchy(&self) -> Option<&Hierarchy> {
        self.hierarchy.as_ref()
    }

    pub fn store(&self) -> &NodeStore {
        &self.store
    }

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.store.get(id)
    }

    pub fn global(&self) -> &GlobalSearch {
        &self.global
    }

    /// Whether metadata or the root level is being fetched.
    pub fn is_root_loading(&self) -> bool {
        self.root_loading
    }

    pub fn error(&self) -> Option<&ExplorerError> {
        self.error.as_ref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Requests still running on background tasks.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Nothing in flight and no timer armed.
    pub fn is_idle(&self) -> bool {
        self.in_flight == 0 && self.timers.is_empty()
    }

    // -----------------------------------------------------------------------
    // Driving the engine
    // -----------------------------------------------------------------------

    /// Wait for the next completion or timer and apply it.
    ///
    /// Returns `false` without waiting when the explorer is idle.
    pub async fn pump(&mut self) -> bool {
        let deadline = self.timers.next_deadline();
        if self.in_flight == 0 && deadline.is_none() {
            return false;
        }
        let timer = async move {
            match deadline {
                Some(at) => tokio::time::sleep_until(at).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::select! {
            Some(msg) = self.completions_rx.recv(), if self.in_flight > 0 => self.apply(msg),
            () = timer => self.fire_due_timers(),
        }
        true
    }

    /// Pump until idle: every timer fired, every request applied.
    pub async fn settle(&mut self) {
        while self.pump().await {}
    }

    /// Apply whatever is ready right now without waiting. Returns whether
    /// anything changed.
    pub fn poll_ready(&mut self) -> bool {
        let mut changed = false;
        while let Ok(msg) = self.completions_rx.try_recv() {
            self.apply(msg);
            changed = true;
        }
        let due = self.timers.take_expired(Instant::now());
        changed |= !due.is_empty();
        for key in due {
            self.fire(key);
        }
        changed
    }

    fn fire_due_timers(&mut self) {
        for key in self.timers.take_expired(Instant::now()) {
            self.fire(key);
        }
    }

    fn fire(&mut self, key: TimerKey) {
        tracing::debug!(timer = ?key, "explorer: debounce fired");
        match key {
            TimerKey::Scoped(id) => self.run_scoped_search(&id),
            TimerKey::Global => self.run_global_search(),
        }
    }

    fn apply(&mut self, msg: Completion) {
        self.in_flight = self.in_flight.saturating_sub(1);
        match msg {
            Completion::Metadata { seq, result } => self.on_metadata(seq, result),
            Completion::Roots { seq, result } => self.on_roots(seq, result),
            Completion::Children { node, seq, result } => self.on_children(node, seq, result),
            Completion::ScopedSearch {
                node,
                seq,
                term,
                result,
            } => self.on_scoped_search(node, seq, term, result),
            Completion::GlobalFallback { seq, result } => self.on_global_fallback(seq, result),
        }
    }

    // -----------------------------------------------------------------------
    // Shared helpers
    // -----------------------------------------------------------------------

    fn next_seq(&mut self) -> u64 {
        self.seq += 1;
        self.seq
    }

    fn fail(&mut self, err: ExplorerError) {
        tracing::warn!(domain = %self.domain, error = %err, "explorer: request failed");
        self.error = Some(err);
    }

    fn spawn_metadata(&mut self, seq: u64) {
        let backend = Arc::clone(&self.backend);
        let tx = self.completions_tx.clone();
        let limit = self.settings.fetch_timeout;
        self.in_flight += 1;
        tokio::spawn(async move {
            let result = bounded(limit, backend.get_metadata()).await;
            let _ = tx.send(Completion::Metadata { seq, result });
        });
    }

    /// Run `query` on a background task and post `wrap(result)` back.
    fn spawn_query<W>(&mut self, query: ForecastQuery, wrap: W)
    where
        W: FnOnce(Result<QueryResponse, BackendError>) -> Completion + Send + 'static,
    {
        let backend = Arc::clone(&self.backend);
        let tx = self.completions_tx.clone();
        let limit = self.settings.fetch_timeout;
        self.in_flight += 1;
        tokio::spawn(async move {
            let result = bounded(limit, backend.execute_sql_query(query)).await;
            let _ = tx.send(wrap(result));
        });
    }

    /// Turn `(level, count)` rows into nodes below `parent`. Rows whose level
    /// value is null are skipped.
    fn rows_to_nodes(&self, level: &Ident, parent: Option<&Node>, rows: Vec<Row>) -> Vec<Node> {
        let leaf = self
            .hierarchy
            .as_ref()
            .is_some_and(|h| h.is_terminal(level.as_str()));
        rows.iter()
            .filter_map(|row| {
                let value = row.get(level.as_str()).and_then(Scalar::from_json)?;
                Some(Node::new(level.clone(), value, row_count(row), parent, leaf))
            })
            .collect()
    }
}

/// Apply the fetch timeout to a backend call.
async fn bounded<T>(
    limit: Duration,
    fut: impl Future<Output = Result<T, BackendError>>,
) -> Result<T, BackendError> {
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(BackendError::Timeout(limit)),
    }
}

fn row_count(row: &Row) -> u64 {
    match row.get("count") {
        Some(serde_json::Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .unwrap_or(0),
        Some(serde_json::Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: serde_json::Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn counts_accept_numbers_and_numeric_text() {
        assert_eq!(row_count(&row(json!({ "count": 12 }))), 12);
        assert_eq!(row_count(&row(json!({ "count": "7" }))), 7);
        assert_eq!(row_count(&row(json!({ "count": 3.0 }))), 3);
        assert_eq!(row_count(&row(json!({ "count": -1 }))), 0);
        assert_eq!(row_count(&row(json!({}))), 0);
    }
}
