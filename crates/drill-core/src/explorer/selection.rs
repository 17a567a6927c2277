//! Selection dispatch and drag payloads.

use super::{Explorer, SearchResult};
use crate::backend::ForecastBackend;
use crate::error::{ExplorerError, Result};
use crate::hierarchy::Domain;
use crate::store::Node;
use crate::types::{Context, Ident, NodeId};
use serde::Serialize;

/// Why a selection was dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionKind {
    /// Click on a terminal node.
    Leaf,
    /// Explicit analytics action on any node.
    Analytics,
    /// A global search result was picked.
    SearchResult,
}

/// What the selection sink receives: the node id plus everything needed to
/// filter the dataset down to it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Selection {
    pub domain: Domain,
    pub kind: SelectionKind,
    pub id: NodeId,
    pub name: String,
    pub level: Ident,
    pub context: Context,
    pub count: Option<u64>,
}

impl Selection {
    fn from_node(domain: Domain, kind: SelectionKind, node: &Node) -> Self {
        Self {
            domain,
            kind,
            id: node.id.clone(),
            name: node.name.clone(),
            level: node.level.clone(),
            context: node.context.clone(),
            count: Some(node.count),
        }
    }
}

/// Serialized form of a dragged node: `{id, type, level, name, context}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DragPayload {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub level: Ident,
    pub name: String,
    pub context: Context,
}

impl DragPayload {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl<B: ForecastBackend> Explorer<B> {
    /// Dispatch a selection for any node, terminal or not.
    pub fn show_analytics(&mut self, id: &NodeId) -> Result<()> {
        self.select(id, SelectionKind::Analytics)
    }

    /// Payload for dragging `id` elsewhere. The node stays in the tree.
    pub fn drag_payload(&self, id: &NodeId) -> Result<DragPayload> {
        let node = self
            .store
            .get(id)
            .ok_or_else(|| ExplorerError::UnknownNode(id.clone()))?;
        Ok(DragPayload {
            id: node.id.clone(),
            kind: self.domain.drag_type(),
            level: node.level.clone(),
            name: node.name.clone(),
            context: node.context.clone(),
        })
    }

    pub(super) fn select(&mut self, id: &NodeId, kind: SelectionKind) -> Result<()> {
        let node = self
            .store
            .get(id)
            .ok_or_else(|| ExplorerError::UnknownNode(id.clone()))?;
        let selection = Selection::from_node(self.domain, kind, node);
        self.dispatch(selection);
        Ok(())
    }

    pub(super) fn dispatch_result(&mut self, result: &SearchResult) {
        self.dispatch(Selection {
            domain: self.domain,
            kind: SelectionKind::SearchResult,
            id: result.id.clone(),
            name: result.name.clone(),
            level: result.level.clone(),
            context: result.context.clone(),
            count: result.count,
        });
    }

    fn dispatch(&self, selection: Selection) {
        tracing::debug!(node = %selection.id, kind = ?selection.kind, "selection: dispatch");
        if self.selections.send(selection).is_err() {
            tracing::debug!("selection: sink closed");
        }
    }
}
