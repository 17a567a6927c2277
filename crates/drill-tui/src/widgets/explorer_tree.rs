//! Explorer tree widget — the lazily loaded hierarchy in the left pane.
//!
//! # Navigation
//! - `↑`/`k` and `↓`/`j` move the cursor up and down the visible list.
//! - `Enter` clicks the focused node: terminal nodes are selected, loaded
//!   nodes toggle, unloaded nodes start loading.
//! - `→`/`l` expands the focused node; on an expanded node it steps into the
//!   first child.
//! - `←`/`h` collapses the focused node, or jumps to its parent when it is
//!   already collapsed.
//!
//! The rows come straight from [`NodeStore::visible`]; this module only keeps
//! a cursor.

use crate::domain;
use crate::event::{AppEvent, Direction};
use crate::theme::Theme;
use drill_core::error::Result;
use drill_core::{Domain, Explorer, ForecastBackend, Node, NodeId, NodeState, NodeStore};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, List, ListItem, ListState, StatefulWidget, Widget},
};

// ---------------------------------------------------------------------------
// Tree state
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct ExplorerTreeState {
    /// Index into the visible (flattened) list.
    pub cursor: usize,
}

impl ExplorerTreeState {
    /// Id of the node under the cursor, if any.
    pub fn focused_id(&self, store: &NodeStore) -> Option<NodeId> {
        store.visible().get(self.cursor).map(|n| n.id.clone())
    }

    /// Handle a navigation event against `explorer`.
    pub fn handle<B: ForecastBackend>(
        &mut self,
        event: &AppEvent,
        explorer: &mut Explorer<B>,
    ) -> Result<()> {
        match event {
            AppEvent::TreeNav(Direction::Up) => {
                self.cursor = self.cursor.saturating_sub(1);
                tracing::debug!(cursor = self.cursor, "tree: cursor up");
            }
            AppEvent::TreeNav(Direction::Down) => {
                let max = explorer.store().visible().len().saturating_sub(1);
                if self.cursor < max {
                    self.cursor += 1;
                }
                tracing::debug!(cursor = self.cursor, "tree: cursor down");
            }
            AppEvent::Enter => {
                if let Some(id) = self.focused_id(explorer.store()) {
                    tracing::debug!(node = %id, "tree: click");
                    explorer.click(&id)?;
                }
            }
            AppEvent::TreeNav(Direction::Right) => {
                if let Some(node) = self.focused(explorer.store()) {
                    let id = node.id.clone();
                    match node.state() {
                        NodeState::Expanded if !node.child_ids().is_empty() => self.cursor += 1,
                        _ if node.is_leaf() => {}
                        _ => explorer.expand(&id)?,
                    }
                }
            }
            AppEvent::TreeNav(Direction::Left) => {
                if let Some(node) = self.focused(explorer.store()) {
                    let id = node.id.clone();
                    let parent = node.parent.clone();
                    if node.expanded {
                        tracing::debug!(node = %id, "tree: collapse");
                        explorer.collapse(&id)?;
                    } else if let Some(parent) = parent {
                        self.jump_to(explorer.store(), &parent);
                    }
                }
            }
            _ => {}
        }
        self.clamp(explorer.store());
        Ok(())
    }

    fn focused<'a>(&self, store: &'a NodeStore) -> Option<&'a Node> {
        store.visible().get(self.cursor).copied()
    }

    fn jump_to(&mut self, store: &NodeStore, id: &NodeId) {
        if let Some(pos) = store.visible().iter().position(|n| &n.id == id) {
            self.cursor = pos;
        }
    }

    /// Keep the cursor on a row after the tree shrank.
    pub fn clamp(&mut self, store: &NodeStore) {
        let max = store.visible().len().saturating_sub(1);
        if self.cursor > max {
            self.cursor = max;
        }
    }
}

// ---------------------------------------------------------------------------
// Widget
// ---------------------------------------------------------------------------

pub struct ExplorerTree<'a> {
    store: &'a NodeStore,
    domain: Domain,
    state: &'a ExplorerTreeState,
    /// Whether the root level is still being fetched.
    loading: bool,
    focused: bool,
    theme: &'a Theme,
}

impl<'a> ExplorerTree<'a> {
    pub fn new<B: ForecastBackend>(
        explorer: &'a Explorer<B>,
        state: &'a ExplorerTreeState,
        focused: bool,
        theme: &'a Theme,
    ) -> Self {
        Self {
            store: explorer.store(),
            domain: explorer.domain(),
            state,
            loading: explorer.is_root_loading(),
            focused,
            theme,
        }
    }

    fn row(&self, node: &Node) -> ListItem<'a> {
        let indent = "  ".repeat(node.depth);
        let marker = match node.state() {
            _ if node.is_leaf() => "  ",
            NodeState::Loading => "⟳ ",
            NodeState::Expanded => "▼ ",
            NodeState::Collapsed => "▶ ",
        };
        let name_style = if node.loading {
            self.theme.tree_loading
        } else if node.is_leaf() {
            self.theme.tree_leaf
        } else {
            self.theme.tree_node
        };

        let mut spans = vec![
            Span::raw(indent),
            Span::raw(marker),
            Span::styled(
                format!("{} ", domain::icon(self.domain, node.depth, node.is_leaf())),
                self.theme.depth_style(node.depth),
            ),
            Span::styled(domain::label(self.domain, node), name_style),
            Span::styled(format!(" ({})", node.count), self.theme.tree_count),
        ];
        if node.search_active {
            spans.push(Span::styled("  ⌕ ", self.theme.search_prompt));
            spans.push(Span::raw(format!("[{}▏]", node.search_term)));
        }
        ListItem::new(Line::from(spans))
    }
}

impl Widget for ExplorerTree<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::bordered()
            .title(format!(" {} ", domain::title(self.domain)))
            .border_style(self.theme.border(self.focused));

        let inner = block.inner(area);
        block.render(area, buf);

        let visible = self.store.visible();
        if visible.is_empty() {
            let text = if self.loading { "loading…" } else { "no data" };
            Line::styled(text, self.theme.tree_loading).render(inner, buf);
            return;
        }

        let items: Vec<ListItem> = visible.iter().map(|node| self.row(node)).collect();
        let list = List::new(items).highlight_style(self.theme.tree_cursor);

        let mut list_state = ListState::default().with_selected(Some(self.state.cursor));
        StatefulWidget::render(list, inner, buf, &mut list_state);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
