//! Flat result list shown in place of the tree while a global search is
//! active. Each row carries the full path of its match.

use crate::domain;
use crate::event::{AppEvent, Direction};
use crate::theme::Theme;
use drill_core::{Domain, GlobalSearch, SearchResult};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, List, ListItem, ListState, StatefulWidget, Widget},
};

#[derive(Debug, Default)]
pub struct ResultsState {
    pub cursor: usize,
}

impl ResultsState {
    /// Move the cursor; `len` is the current number of results.
    pub fn handle(&mut self, event: &AppEvent, len: usize) {
        match event {
            AppEvent::TreeNav(Direction::Up) => self.cursor = self.cursor.saturating_sub(1),
            AppEvent::TreeNav(Direction::Down) => {
                if self.cursor + 1 < len {
                    self.cursor += 1;
                }
            }
            _ => {}
        }
    }

    pub fn clamp(&mut self, len: usize) {
        self.cursor = self.cursor.min(len.saturating_sub(1));
    }
}

pub struct Results<'a> {
    global: &'a GlobalSearch,
    domain: Domain,
    state: &'a ResultsState,
    focused: bool,
    theme: &'a Theme,
}

impl<'a> Results<'a> {
    pub fn new(
        global: &'a GlobalSearch,
        domain: Domain,
        state: &'a ResultsState,
        focused: bool,
        theme: &'a Theme,
    ) -> Self {
        Self {
            global,
            domain,
            state,
            focused,
            theme,
        }
    }

    fn row(&self, result: &SearchResult) -> ListItem<'a> {
        let name = domain::leaf_label(self.domain, &result.name, result.terminal);
        let mut spans = highlight(&name, self.global.term().trim(), self.theme.tree_node, self.theme.search_highlight);
        if let Some(count) = result.count {
            spans.push(Span::styled(format!(" ({count})"), self.theme.tree_count));
        }
        spans.push(Span::styled(format!("  {}", result.path), self.theme.search_path));
        ListItem::new(Line::from(spans))
    }
}

impl Widget for Results<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::bordered()
            .title(format!(" Results for \"{}\" ", self.global.term().trim()))
            .border_style(self.theme.border(self.focused));

        let inner = block.inner(area);
        block.render(area, buf);

        let results = self.global.results();
        if results.is_empty() {
            let (text, style) = if self.global.is_loading() {
                ("searching…", self.theme.tree_loading)
            } else {
                ("no matches", self.theme.search_path)
            };
            Line::styled(text, style).render(inner, buf);
            return;
        }

        let items: Vec<ListItem> = results.iter().map(|r| self.row(r)).collect();
        let list = List::new(items).highlight_style(self.theme.tree_cursor);
        let mut list_state = ListState::default().with_selected(Some(self.state.cursor));
        StatefulWidget::render(list, inner, buf, &mut list_state);
    }
}

/// Split `text` into spans with every case-insensitive occurrence of
/// `needle` styled as a match.
fn highlight(text: &str, needle: &str, base: Style, hit: Style) -> Vec<Span<'static>> {
    if needle.is_empty() {
        return vec![Span::styled(text.to_string(), base)];
    }
    let lower = text.to_lowercase();
    let needle = needle.to_lowercase();
    // Lowercasing can change byte lengths; fall back to plain text then.
    if lower.len() != text.len() {
        return vec![Span::styled(text.to_string(), base)];
    }

    let mut spans = Vec::new();
    let mut at = 0;
    while let Some(pos) = lower[at..].find(&needle) {
        let start = at + pos;
        let end = start + needle.len();
        if start > at {
            spans.push(Span::styled(text[at..start].to_string(), base));
        }
        spans.push(Span::styled(text[start..end].to_string(), hit));
        at = end;
    }
    if at < text.len() {
        spans.push(Span::styled(text[at..].to_string(), base));
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Color;

    #[test]
    fn every_match_is_highlighted() {
        let hit = Style::default().fg(Color::Yellow);
        let spans = highlight("T-Shirts and shirts", "SHIRT", Style::default(), hit);
        let parts: Vec<(&str, bool)> = spans
            .iter()
            .map(|s| (s.content.as_ref(), s.style == hit))
            .collect();
        assert_eq!(
            parts,
            vec![
                ("T-", false),
                ("Shirt", true),
                ("s and ", false),
                ("shirt", true),
                ("s", false),
            ]
        );
    }

    #[test]
    fn empty_needle_is_plain() {
        let spans = highlight("Home", "", Style::default(), Style::default());
        assert_eq!(spans.len(), 1);
    }

    #[test]
    fn cursor_is_clamped_to_results() {
        let mut state = ResultsState { cursor: 5 };
        state.clamp(3);
        assert_eq!(state.cursor, 2);
        state.handle(&AppEvent::TreeNav(Direction::Down), 3);
        assert_eq!(state.cursor, 2);
        state.handle(&AppEvent::TreeNav(Direction::Up), 3);
        assert_eq!(state.cursor, 1);
    }
}
