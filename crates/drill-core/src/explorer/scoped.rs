//! Per-node inline search over a node's immediate children.

use super::{Completion, Explorer, TimerKey};
use crate::backend::{ForecastBackend, QueryResponse};
use crate::error::{BackendError, ExplorerError, Result};
use crate::store::Children;
use crate::types::NodeId;

impl<B: ForecastBackend> Explorer<B> {
    /// Open or close the search box of `id`.
    ///
    /// Opening expands the node (loading its children if needed). Closing
    /// restores the unfiltered children and drops any pending or in-flight
    /// search. Terminal nodes have no children to search and are ignored.
    pub fn toggle_scoped_search(&mut self, id: &NodeId) -> Result<()> {
        let node = self
            .store
            .get_mut(id)
            .ok_or_else(|| ExplorerError::UnknownNode(id.clone()))?;
        if node.is_leaf() {
            return Ok(());
        }

        if !node.search_active {
            node.search_active = true;
            node.search_term.clear();
            node.expanded = true;
            let needs_load = node.children == Children::Unloaded && !node.loading;
            tracing::debug!(node = %id, "scoped: open");
            if needs_load {
                self.load_children(id);
            }
            return Ok(());
        }

        let seq = self.next_seq();
        let Some(node) = self.store.get_mut(id) else {
            return Ok(());
        };
        node.search_active = false;
        node.search_term.clear();
        node.children = node.unfiltered_children();
        node.loading = false;
        node.request_seq = seq;
        let reload = node.expanded && node.children == Children::Unloaded;
        self.timers.cancel(&TimerKey::Scoped(id.clone()));
        tracing::debug!(node = %id, token = seq, "scoped: close");
        if reload {
            self.await_or_load_children(id);
        }
        Ok(())
    }

    /// Record a keystroke in the search box of `id` and (re)arm its debounce.
    ///
    /// The term is stored immediately; the query runs once typing pauses.
    /// Ignored when the node's search box is not open.
    pub fn scoped_search_input(&mut self, id: &NodeId, term: &str) -> Result<()> {
        let node = self
            .store
            .get_mut(id)
            .ok_or_else(|| ExplorerError::UnknownNode(id.clone()))?;
        if !node.search_active {
            return Ok(());
        }
        node.search_term = term.to_string();
        self.timers
            .schedule(TimerKey::Scoped(id.clone()), self.settings.debounce);
        Ok(())
    }

    /// Debounce expiry: re-query the node's children with its current term.
    pub(super) fn run_scoped_search(&mut self, id: &NodeId) {
        let Some(node) = self.store.get(id) else {
            return;
        };
        if !node.search_active {
            return;
        }
        let term = node.search_term.trim().to_string();
        let all_children = node.all_children.clone();

        if term.is_empty() {
            match all_children {
                Some(all) => {
                    let seq = self.next_seq();
                    if let Some(node) = self.store.get_mut(id) {
                        node.children = Children::Loaded(all);
                        node.loading = false;
                        node.request_seq = seq;
                    }
                    tracing::debug!(node = %id, token = seq, "scoped: empty term, unfiltered set restored");
                }
                None => self.await_or_load_children(id),
            }
            return;
        }

        let Some(query) = self.child_query(id, Some(&term)) else {
            return;
        };
        let seq = self.next_seq();
        if let Some(node) = self.store.get_mut(id) {
            node.loading = true;
            node.request_seq = seq;
        }
        tracing::debug!(node = %id, token = seq, term = %term, "scoped: query");
        let node = id.clone();
        self.spawn_query(query, move |result| Completion::ScopedSearch {
            node,
            seq,
            term,
            result,
        });
    }

    pub(super) fn on_scoped_search(
        &mut self,
        id: NodeId,
        seq: u64,
        term: String,
        result: std::result::Result<QueryResponse, BackendError>,
    ) {
        let Some(parent) = self.store.get(&id).cloned() else {
            return;
        };
        if parent.request_seq != seq {
            tracing::debug!(node = %id, token = seq, term = %term, "scoped: stale result dropped");
            return;
        }
        match result {
            Ok(response) => {
                let Some(level) = self
                    .hierarchy
                    .as_ref()
                    .and_then(|h| h.next_level(parent.level.as_str()))
                    .cloned()
                else {
                    return;
                };
                let nodes = self.rows_to_nodes(&level, Some(&parent), response.data);
                let ids = self.store.insert_children(nodes);
                tracing::debug!(node = %id, token = seq, term = %term, matches = ids.len(), "scoped: applied");
                if let Some(node) = self.store.get_mut(&id) {
                    node.children = Children::Loaded(ids);
                    node.loading = false;
                }
                self.continue_reveal();
            }
            Err(source) => {
                if let Some(node) = self.store.get_mut(&id) {
                    node.loading = false;
                }
                self.fail(ExplorerError::Search(source));
            }
        }
    }
}
