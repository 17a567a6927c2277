//! Test builders: explorers wired to a [`RecordingBackend`] and the node ids
//! of the scenario hierarchies.
//!
//! These are for readability in assertions, not for production use. They
//! panic instead of returning `Result`.

use super::fake_backend::RecordingBackend;
use drill_core::{ChildOrder, Domain, Explorer, ExplorerSettings, NodeId, Selection};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver};

pub type TestExplorer = Explorer<RecordingBackend>;

// ---------------------------------------------------------------------------
// SettingsBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for [`ExplorerSettings`], starting from the defaults
/// (300 ms debounce, 30 s fetch timeout, value order).
///
/// ```rust
/// let settings = SettingsBuilder::new()
///     .debounce(ms(50))
///     .fetch_timeout(Duration::from_secs(1))
///     .build();
/// ```
pub struct SettingsBuilder {
    settings: ExplorerSettings,
}

impl SettingsBuilder {
    pub fn new() -> Self {
        Self {
            settings: ExplorerSettings::default(),
        }
    }

    pub fn debounce(mut self, debounce: Duration) -> Self {
        self.settings.debounce = debounce;
        self
    }

    pub fn fetch_timeout(mut self, timeout: Duration) -> Self {
        self.settings.fetch_timeout = timeout;
        self
    }

    pub fn child_order(mut self, order: ChildOrder) -> Self {
        self.settings.child_order = order;
        self
    }

    pub fn global_result_limit(mut self, limit: u32) -> Self {
        self.settings.global_result_limit = limit;
        self
    }

    pub fn path_separator(mut self, sep: &str) -> Self {
        self.settings.path_separator = sep.to_string();
        self
    }

    pub fn build(self) -> ExplorerSettings {
        self.settings
    }
}

impl Default for SettingsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Explorers
// ---------------------------------------------------------------------------

/// Unmounted explorer with default settings, plus the receiving end of its
/// selection sink.
pub fn explorer(backend: &RecordingBackend, domain: Domain) -> (TestExplorer, UnboundedReceiver<Selection>) {
    explorer_with(backend, domain, ExplorerSettings::default())
}

pub fn explorer_with(
    backend: &RecordingBackend,
    domain: Domain,
    settings: ExplorerSettings,
) -> (TestExplorer, UnboundedReceiver<Selection>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let explorer = Explorer::new(Arc::new(backend.clone()), domain, settings, tx);
    (explorer, rx)
}

/// Explorer whose metadata and root level have loaded.
pub async fn mounted(backend: &RecordingBackend, domain: Domain) -> (TestExplorer, UnboundedReceiver<Selection>) {
    mounted_with(backend, domain, ExplorerSettings::default()).await
}

pub async fn mounted_with(
    backend: &RecordingBackend,
    domain: Domain,
    settings: ExplorerSettings,
) -> (TestExplorer, UnboundedReceiver<Selection>) {
    let (mut explorer, rx) = explorer_with(backend, domain, settings);
    explorer.mount();
    explorer.settle().await;
    assert!(
        explorer.error().is_none(),
        "mount failed: {:?}",
        explorer.error()
    );
    (explorer, rx)
}

/// Expand every node along `ids` in order, settling after each step.
pub async fn expand_path(explorer: &mut TestExplorer, ids: &[NodeId]) {
    for id in ids {
        explorer.expand(id).expect("expand a known node");
        explorer.settle().await;
    }
}

/// Drive the explorer for `duration`, applying whatever completes or fires in
/// that window, then stop even if requests are still running.
pub async fn run_for(explorer: &mut TestExplorer, duration: Duration) {
    let _ = tokio::time::timeout(duration, explorer.settle()).await;
}

// ---------------------------------------------------------------------------
// Node ids of the scenario hierarchies
// ---------------------------------------------------------------------------

pub fn vertical(name: &str) -> NodeId {
    NodeId::root("vertical", name)
}

pub fn super_category(vertical_name: &str, name: &str) -> NodeId {
    NodeId::child("super_category", &vertical(vertical_name), name)
}

pub fn article(vertical_name: &str, category: &str, article_id: i64) -> NodeId {
    NodeId::child(
        "article_id",
        &super_category(vertical_name, category),
        &article_id.to_string(),
    )
}

pub fn region(name: &str) -> NodeId {
    NodeId::root("region", name)
}

pub fn store_no(region_name: &str, store: i64) -> NodeId {
    NodeId::child("store_no", &region(region_name), &store.to_string())
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// Names of the rows the tree currently shows, depth first.
pub fn visible_names(explorer: &TestExplorer) -> Vec<String> {
    explorer
        .store()
        .visible()
        .into_iter()
        .map(|n| n.name.clone())
        .collect()
}

/// Names of the children currently shown under `id` (filtered or not).
pub fn child_names(explorer: &TestExplorer, id: &NodeId) -> Vec<String> {
    let node = explorer.node(id).unwrap_or_else(|| panic!("node {id} not in store"));
    node.child_ids()
        .iter()
        .map(|child| {
            explorer
                .node(child)
                .map(|n| n.name.clone())
                .unwrap_or_else(|| panic!("child {child} not in store"))
        })
        .collect()
}

/// Names of the current global search results, in order.
pub fn result_names(explorer: &TestExplorer) -> Vec<String> {
    explorer
        .global()
        .results()
        .iter()
        .map(|r| r.name.clone())
        .collect()
}

/// Drain every selection dispatched so far.
pub fn drain(rx: &mut UnboundedReceiver<Selection>) -> Vec<Selection> {
    let mut out = Vec::new();
    while let Ok(selection) = rx.try_recv() {
        out.push(selection);
    }
    out
}
