//! Mount, expand and collapse.

use super::{Completion, Explorer, TimerKey};
use crate::backend::{ForecastBackend, ForecastMetadata, QueryResponse};
use crate::error::{BackendError, ExplorerError, Result};
use crate::hierarchy::Hierarchy;
use crate::query::ForecastQuery;
use crate::store::Children;
use crate::types::{Context, NodeId};

impl<B: ForecastBackend> Explorer<B> {
    /// Load metadata, then the top level. Calling it again is the retry
    /// action of the root view: the tree is rebuilt from scratch once the new
    /// roots arrive.
    pub fn mount(&mut self) {
        let seq = self.next_seq();
        self.root_seq = seq;
        self.root_loading = true;
        self.error = None;
        tracing::debug!(domain = %self.domain, token = seq, "explorer: mount");
        self.spawn_metadata(seq);
    }

    pub(super) fn on_metadata(
        &mut self,
        seq: u64,
        result: std::result::Result<ForecastMetadata, BackendError>,
    ) {
        if seq != self.root_seq {
            tracing::debug!(token = seq, "explorer: stale metadata dropped");
            return;
        }
        let hierarchy = result
            .map_err(|e| ExplorerError::MetadataLoad(e.to_string()))
            .and_then(|md| Hierarchy::from_metadata(&md, self.domain));
        match hierarchy {
            Ok(hierarchy) => {
                tracing::debug!(
                    domain = %self.domain,
                    levels = hierarchy.levels().len(),
                    "explorer: hierarchy loaded"
                );
                let query = ForecastQuery::level_values(
                    hierarchy.top(),
                    &Context::new(),
                    None,
                    self.settings.child_order,
                );
                self.hierarchy = Some(hierarchy);
                self.spawn_query(query, move |result| Completion::Roots { seq, result });
            }
            Err(err) => {
                self.root_loading = false;
                self.fail(err);
                self.resume_global_search();
            }
        }
    }

    pub(super) fn on_roots(&mut self, seq: u64, result: std::result::Result<QueryResponse, BackendError>) {
        if seq != self.root_seq {
            tracing::debug!(token = seq, "explorer: stale roots dropped");
            return;
        }
        self.root_loading = false;
        match result {
            Ok(response) => {
                let Some(top) = self.hierarchy.as_ref().map(|h| h.top().clone()) else {
                    return;
                };
                let roots = self.rows_to_nodes(&top, None, response.data);
                tracing::debug!(domain = %self.domain, roots = roots.len(), "explorer: roots loaded");
                self.store.reset_roots(roots);
                self.continue_reveal();
            }
            Err(source) => self.fail(ExplorerError::Fetch { node: None, source }),
        }
        self.resume_global_search();
    }

    // -----------------------------------------------------------------------
    // Expand / collapse
    // -----------------------------------------------------------------------

    /// Show a node's children, fetching them on first expansion.
    ///
    /// Terminal nodes never expand. Expanding a node whose children are
    /// already loaded, or whose load is still running, issues no request.
    pub fn expand(&mut self, id: &NodeId) -> Result<()> {
        let node = self
            .store
            .get_mut(id)
            .ok_or_else(|| ExplorerError::UnknownNode(id.clone()))?;
        if node.is_leaf() {
            return Ok(());
        }
        node.expanded = true;
        let (loaded, loading) = (node.is_loaded(), node.loading);
        if loaded {
            tracing::debug!(node = %id, "tree: expand (loaded)");
        } else if loading {
            tracing::debug!(node = %id, "tree: expand (load in flight)");
        } else {
            self.load_children(id);
        }
        Ok(())
    }

    /// Hide a node's children.
    ///
    /// Also ends its scoped search: the unfiltered child set comes back, the
    /// pending debounce is dropped and in-flight requests for the node become
    /// stale.
    pub fn collapse(&mut self, id: &NodeId) -> Result<()> {
        let seq = self.next_seq();
        let node = self
            .store
            .get_mut(id)
            .ok_or_else(|| ExplorerError::UnknownNode(id.clone()))?;
        if node.is_leaf() {
            return Ok(());
        }
        node.expanded = false;
        node.search_active = false;
        node.search_term.clear();
        node.children = node.unfiltered_children();
        node.loading = false;
        node.request_seq = seq;
        self.timers.cancel(&TimerKey::Scoped(id.clone()));
        tracing::debug!(node = %id, token = seq, "tree: collapse");
        Ok(())
    }

    pub fn toggle_expanded(&mut self, id: &NodeId) -> Result<()> {
        let expanded = self
            .store
            .get(id)
            .map(|n| n.expanded)
            .ok_or_else(|| ExplorerError::UnknownNode(id.clone()))?;
        if expanded {
            self.collapse(id)
        } else {
            self.expand(id)
        }
    }

    /// Primary action on a row: terminal nodes are selected, unloaded nodes
    /// expand, loaded nodes toggle.
    pub fn click(&mut self, id: &NodeId) -> Result<()> {
        let (leaf, loaded) = self
            .store
            .get(id)
            .map(|n| (n.is_leaf(), n.is_loaded()))
            .ok_or_else(|| ExplorerError::UnknownNode(id.clone()))?;
        if leaf {
            self.select(id, super::SelectionKind::Leaf)
        } else if loaded {
            self.toggle_expanded(id)
        } else {
            self.expand(id)
        }
    }

    // -----------------------------------------------------------------------
    // Child loads
    // -----------------------------------------------------------------------

    /// Issue an unfiltered child load for `id`, superseding any request in
    /// flight for it.
    pub(super) fn load_children(&mut self, id: &NodeId) {
        let Some(query) = self.child_query(id, None) else {
            return;
        };
        let seq = self.next_seq();
        if let Some(node) = self.store.get_mut(id) {
            node.loading = true;
            node.request_seq = seq;
            node.unfiltered_seq = Some(seq);
        }
        tracing::debug!(node = %id, token = seq, "tree: fetch children");
        let node = id.clone();
        self.spawn_query(query, move |result| Completion::Children { node, seq, result });
    }

    /// Wait on the unfiltered load already in flight for `id`, or start one.
    pub(super) fn await_or_load_children(&mut self, id: &NodeId) {
        let pending = self.store.get(id).and_then(|n| n.unfiltered_seq);
        let Some(seq) = pending else {
            self.load_children(id);
            return;
        };
        if let Some(node) = self.store.get_mut(id) {
            node.loading = true;
            node.request_seq = seq;
        }
        tracing::debug!(node = %id, token = seq, "tree: awaiting unfiltered load in flight");
    }

    /// Query for the level below `id`, narrowed by `search` when given.
    pub(super) fn child_query(&self, id: &NodeId, search: Option<&str>) -> Option<ForecastQuery> {
        let node = self.store.get(id)?;
        let target = self.hierarchy.as_ref()?.next_level(node.level.as_str())?;
        Some(ForecastQuery::level_values(
            target,
            &node.context,
            search,
            self.settings.child_order,
        ))
    }

    pub(super) fn on_children(
        &mut self,
        id: NodeId,
        seq: u64,
        result: std::result::Result<QueryResponse, BackendError>,
    ) {
        let Some(parent) = self.store.get(&id).cloned() else {
            tracing::debug!(node = %id, token = seq, "tree: children for unknown node dropped");
            return;
        };
        let current = parent.request_seq == seq;
        if parent.unfiltered_seq == Some(seq) {
            if let Some(node) = self.store.get_mut(&id) {
                node.unfiltered_seq = None;
            }
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
                let Some(node) = self.store.get_mut(&id) else {
                    return;
                };
                // Unfiltered results always seed the unfiltered set.
                if node.all_children.is_none() {
                    node.all_children = Some(ids.clone());
                }
                if current || node.children == Children::Unloaded {
                    node.children = Children::Loaded(ids);
                }
                if current {
                    node.loading = false;
                    tracing::debug!(node = %id, token = seq, "tree: children applied");
                } else {
                    tracing::debug!(node = %id, token = seq, "tree: stale children kept as unfiltered set");
                }
                self.continue_reveal();
            }
            Err(source) if current => {
                if let Some(node) = self.store.get_mut(&id) {
                    node.loading = false;
                    if !node.is_loaded() {
                        node.expanded = false;
                    }
                }
                if self.reveal_passes_through(&id) {
                    self.reveal = None;
                }
                self.fail(ExplorerError::Fetch {
                    node: Some(id),
                    source,
                });
            }
            Err(err) => {
                tracing::debug!(node = %id, token = seq, error = %err, "tree: stale failure dropped");
            }
        }
    }
}
