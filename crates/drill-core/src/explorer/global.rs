//! Global search: scan the materialized tree first, ask the dataset only
//! when nothing local matches.

use super::{Completion, Explorer, SelectionKind, TimerKey};
use crate::backend::{ForecastBackend, QueryResponse};
use crate::error::{BackendError, ExplorerError, Result};
use crate::hierarchy::Hierarchy;
use crate::query::ForecastQuery;
use crate::store::Node;
use crate::types::{Context, Ident, NodeId, Row, Scalar};
use serde::Serialize;

/// One entry of the flat result list. Never inserted into the tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub id: NodeId,
    pub name: String,
    pub level: Ident,
    pub context: Context,
    /// Names from the root down to this entry.
    pub path: String,
    /// Row count, when the result came from the tree.
    pub count: Option<u64>,
    pub search_match: bool,
    /// Terminal-level results are selected directly.
    pub terminal: bool,
}

/// Where the current result list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultSource {
    Local,
    Dataset,
}

/// State of the global search box.
#[derive(Debug, Default)]
pub struct GlobalSearch {
    term: String,
    results: Vec<SearchResult>,
    loading: bool,
    source: Option<ResultSource>,
    seq: u64,
    /// The debounce fired before the hierarchy was known.
    pending: bool,
}

impl GlobalSearch {
    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn results(&self) -> &[SearchResult] {
        &self.results
    }

    /// The flat result view replaces the tree while this is true.
    pub fn is_active(&self) -> bool {
        !self.term.trim().is_empty()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn source(&self) -> Option<ResultSource> {
        self.source
    }
}

impl<B: ForecastBackend> Explorer<B> {
    /// Record the global search text and (re)arm its debounce. Blank text
    /// clears the search immediately. A new term abandons any reveal still
    /// walking towards a previous result.
    pub fn global_search_input(&mut self, term: &str) {
        if term.trim().is_empty() {
            self.clear_global_search();
            self.global.term = term.to_string();
            return;
        }
        if term != self.global.term {
            self.reveal = None;
        }
        self.global.term = term.to_string();
        self.timers.schedule(TimerKey::Global, self.settings.debounce);
    }

    /// Drop the text and the results and go back to the tree. The tree itself
    /// is not touched.
    pub fn clear_global_search(&mut self) {
        let seq = self.next_seq();
        self.timers.cancel(&TimerKey::Global);
        self.reveal = None;
        self.global = GlobalSearch {
            seq,
            ..GlobalSearch::default()
        };
        tracing::debug!(token = seq, "global: cleared");
    }

    /// Debounce expiry: local scan, then the dataset fallback if needed.
    pub(super) fn run_global_search(&mut self) {
        let term = self.global.term.trim().to_string();
        if term.is_empty() {
            return;
        }
        let seq = self.next_seq();
        self.global.seq = seq;
        self.global.pending = false;

        let local = self.scan_materialized(&term);
        if !local.is_empty() {
            tracing::debug!(token = seq, term = %term, matches = local.len(), "global: local matches");
            self.global.results = local;
            self.global.loading = false;
            self.global.source = Some(ResultSource::Local);
            return;
        }

        let Some(hierarchy) = self.hierarchy.as_ref() else {
            tracing::debug!(token = seq, term = %term, "global: waiting for metadata");
            self.global.results.clear();
            self.global.pending = true;
            self.global.loading = self.root_loading;
            return;
        };
        let query = ForecastQuery::global_match(hierarchy, &term, self.settings.global_result_limit);
        self.global.results.clear();
        self.global.loading = true;
        self.global.source = None;
        tracing::debug!(token = seq, term = %term, "global: dataset fallback");
        self.spawn_query(query, move |result| Completion::GlobalFallback { seq, result });
    }

    /// Run a search whose debounce fired before the roots were in. Called
    /// once a mount has finished.
    pub(super) fn resume_global_search(&mut self) {
        if !self.global.pending {
            return;
        }
        if self.root_loading {
            return;
        }
        if self.hierarchy.is_none() {
            // Mount failed; the next retry picks the search up again.
            self.global.loading = false;
            return;
        }
        self.global.pending = false;
        if self.global.is_active() {
            tracing::debug!(term = %self.global.term, "global: resumed after mount");
            self.run_global_search();
        } else {
            self.global.loading = false;
        }
    }

    /// Case-insensitive substring match over every materialized node name.
    fn scan_materialized(&self, term: &str) -> Vec<SearchResult> {
        let needle = term.to_lowercase();
        self.store
            .materialized()
            .into_iter()
            .filter(|node| node.name.to_lowercase().contains(&needle))
            .map(|node| self.local_result(node))
            .collect()
    }

    fn local_result(&self, node: &Node) -> SearchResult {
        let path = self
            .store
            .path(&node.id)
            .iter()
            .map(|n| n.name.as_str())
            .collect::<Vec<_>>()
            .join(&self.settings.path_separator);
        SearchResult {
            id: node.id.clone(),
            name: node.name.clone(),
            level: node.level.clone(),
            context: node.context.clone(),
            path,
            count: Some(node.count),
            search_match: true,
            terminal: node.is_leaf(),
        }
    }

    pub(super) fn on_global_fallback(
        &mut self,
        seq: u64,
        result: std::result::Result<QueryResponse, BackendError>,
    ) {
        if seq != self.global.seq {
            tracing::debug!(token = seq, "global: stale fallback dropped");
            return;
        }
        self.global.loading = false;
        match result {
            Ok(response) => {
                let Some(hierarchy) = self.hierarchy.as_ref() else {
                    return;
                };
                let sep = &self.settings.path_separator;
                let results: Vec<SearchResult> = response
                    .data
                    .iter()
                    .filter_map(|row| dataset_result(row, hierarchy, sep))
                    .collect();
                tracing::debug!(token = seq, matches = results.len(), "global: fallback applied");
                self.global.results = results;
                self.global.source = Some(ResultSource::Dataset);
            }
            Err(source) => {
                self.global.results.clear();
                self.fail(ExplorerError::Search(source));
            }
        }
    }

    // -----------------------------------------------------------------------
    // Selecting a result
    // -----------------------------------------------------------------------

    /// Act on the `index`-th result.
    ///
    /// Terminal results are dispatched as they are. Other results are located
    /// in the tree first: ancestors whose children are missing get loaded
    /// (without expanding them) and the selection is dispatched once the node
    /// exists. Out-of-range indices are ignored.
    pub fn select_search_result(&mut self, index: usize) -> Result<()> {
        let Some(result) = self.global.results.get(index).cloned() else {
            return Ok(());
        };
        if result.terminal {
            self.dispatch_result(&result);
            return Ok(());
        }
        tracing::debug!(node = %result.id, "global: reveal");
        self.reveal = Some(result.context);
        self.continue_reveal();
        Ok(())
    }

    /// Advance a pending reveal as far as the loaded tree allows.
    pub(super) fn continue_reveal(&mut self) {
        let Some(context) = self.reveal.clone() else {
            return;
        };
        let mut parent: Option<NodeId> = None;
        for prefix in context.prefixes() {
            let Some(id) = NodeId::for_context(&prefix) else {
                break;
            };
            if self.store.contains(&id) {
                parent = Some(id);
                continue;
            }
            let Some(parent_id) = parent else {
                if !self.root_loading {
                    self.reveal = None;
                    self.fail(ExplorerError::UnknownNode(id));
                }
                return;
            };
            let (loaded, loading) = self
                .store
                .get(&parent_id)
                .map(|n| (n.all_children.is_some(), n.loading))
                .unwrap_or((false, false));
            if loaded {
                self.reveal = None;
                self.fail(ExplorerError::UnknownNode(id));
            } else if !loading {
                self.load_children(&parent_id);
            }
            return;
        }

        self.reveal = None;
        if let Some(id) = parent {
            if let Err(err) = self.select(&id, SelectionKind::SearchResult) {
                self.fail(err);
            }
        }
    }

    /// Whether the pending reveal walks through `id`.
    pub(super) fn reveal_passes_through(&self, id: &NodeId) -> bool {
        self.reveal.as_ref().is_some_and(|ctx| {
            ctx.prefixes()
                .any(|prefix| NodeId::for_context(&prefix).as_ref() == Some(id))
        })
    }
}

/// Build a result from a `(terminal, level_1, …, level_n)` fallback row.
/// Null levels are left out of the context.
fn dataset_result(row: &Row, hierarchy: &Hierarchy, sep: &str) -> Option<SearchResult> {
    let terminal = hierarchy.terminal();
    let value = row.get(terminal.as_str()).and_then(Scalar::from_json)?;
    let context: Context = hierarchy
        .non_terminal()
        .iter()
        .filter_map(|level| {
            let v = row.get(level.as_str()).and_then(Scalar::from_json)?;
            Some((level.clone(), v))
        })
        .chain(std::iter::once((terminal.clone(), value.clone())))
        .collect();
    let id = NodeId::for_context(&context)?;
    let path = context
        .iter()
        .map(|(_, v)| v.to_string())
        .collect::<Vec<_>>()
        .join(sep);
    Some(SearchResult {
        id,
        name: value.to_string(),
        level: terminal.clone(),
        context,
        path,
        count: None,
        search_match: true,
        terminal: true,
    })
}
