//! Search bar widget — the global search input at the bottom of the screen.
//!
//! # Editing
//!
//! - `Char(c)` inserts at the cursor.
//! - `Backspace` deletes the character before the cursor.
//! - `TreeNav(Left)` / `TreeNav(Right)` move the cursor.
//!
//! The same [`LineInput`] backs the inline scoped search box of a node.

use crate::event::{AppEvent, Direction};
use crate::theme::Theme;
use drill_core::explorer::ResultSource;
use drill_core::GlobalSearch;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction as LayoutDir, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph, Widget},
};

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// A single-line text buffer with a cursor.
#[derive(Debug, Default, Clone)]
pub struct LineInput {
    pub text: String,
    /// Byte offset of the cursor within `text`.
    pub cursor: usize,
}

impl LineInput {
    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    /// Replace the text and put the cursor at its end.
    pub fn set(&mut self, text: &str) {
        self.text = text.to_string();
        self.cursor = self.text.len();
    }

    /// Apply an editing event. Returns whether the text changed.
    pub fn handle(&mut self, event: &AppEvent) -> bool {
        match event {
            AppEvent::Char(c) => {
                self.text.insert(self.cursor, *c);
                self.cursor += c.len_utf8();
                true
            }
            AppEvent::Backspace => {
                if self.cursor == 0 {
                    return false;
                }
                let prev = self.prev_boundary();
                self.text.remove(prev);
                self.cursor = prev;
                true
            }
            AppEvent::TreeNav(Direction::Left) => {
                self.cursor = self.prev_boundary();
                false
            }
            AppEvent::TreeNav(Direction::Right) => {
                if self.cursor < self.text.len() {
                    self.cursor = self.text[self.cursor..]
                        .char_indices()
                        .nth(1)
                        .map(|(i, _)| self.cursor + i)
                        .unwrap_or(self.text.len());
                }
                false
            }
            _ => false,
        }
    }

    fn prev_boundary(&self) -> usize {
        self.text[..self.cursor]
            .char_indices()
            .last()
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    /// Cursor column in characters.
    pub fn column(&self) -> u16 {
        self.text[..self.cursor].chars().count() as u16
    }
}

// ---------------------------------------------------------------------------
// Widget
// ---------------------------------------------------------------------------

pub struct SearchBar<'a> {
    input: &'a LineInput,
    global: &'a GlobalSearch,
    focused: bool,
    theme: &'a Theme,
}

impl<'a> SearchBar<'a> {
    pub fn new(input: &'a LineInput, global: &'a GlobalSearch, focused: bool, theme: &'a Theme) -> Self {
        Self {
            input,
            global,
            focused,
            theme,
        }
    }

    /// Absolute terminal position of the text cursor. Pass to
    /// `frame.set_cursor_position()` after rendering.
    pub fn cursor_position(&self, area: Rect) -> (u16, u16) {
        // 1-cell border plus the "⌕ " prompt
        let x = (area.x + 3 + self.input.column()).min(area.right().saturating_sub(1));
        (x, area.y + 1)
    }

    fn status(&self) -> Span<'static> {
        if self.global.is_loading() {
            return Span::styled("searching dataset…", self.theme.tree_loading);
        }
        if !self.global.is_active() {
            return Span::raw("");
        }
        let n = self.global.results().len();
        let from = match self.global.source() {
            Some(ResultSource::Local) => "tree",
            Some(ResultSource::Dataset) => "dataset",
            None => "",
        };
        Span::styled(format!("{n} from {from}"), self.theme.status_info)
    }
}

impl Widget for SearchBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::bordered()
            .title(" Search ")
            .border_style(self.theme.border(self.focused));

        let inner = block.inner(area);
        block.render(area, buf);

        let chunks = Layout::default()
            .direction(LayoutDir::Horizontal)
            .constraints([Constraint::Fill(1), Constraint::Length(24)])
            .split(inner);

        let prompt = Span::styled("⌕ ", self.theme.search_prompt);
        let text = if self.input.text.is_empty() && !self.focused {
            Span::styled(
                "press / to search",
                Style::default().add_modifier(Modifier::DIM),
            )
        } else {
            Span::raw(self.input.text.as_str())
        };
        Paragraph::new(Line::from(vec![prompt, text])).render(chunks[0], buf);
        Paragraph::new(Line::from(self.status()))
            .right_aligned()
            .render(chunks[1], buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(s: &str) -> LineInput {
        let mut input = LineInput::default();
        for c in s.chars() {
            input.handle(&AppEvent::Char(c));
        }
        input
    }

    #[test]
    fn typing_and_backspace() {
        let mut input = typed("shirt");
        assert_eq!(input.text, "shirt");
        assert!(input.handle(&AppEvent::Backspace));
        assert_eq!(input.text, "shir");
        assert_eq!(input.cursor, 4);
    }

    #[test]
    fn backspace_at_start_changes_nothing() {
        let mut input = LineInput::default();
        assert!(!input.handle(&AppEvent::Backspace));
    }

    #[test]
    fn cursor_moves_over_multibyte_chars() {
        let mut input = typed("añb");
        input.handle(&AppEvent::TreeNav(Direction::Left));
        input.handle(&AppEvent::TreeNav(Direction::Left));
        assert_eq!(input.column(), 1);
        input.handle(&AppEvent::Backspace);
        assert_eq!(input.text, "ñb");
        input.handle(&AppEvent::TreeNav(Direction::Right));
        assert_eq!(input.cursor, "ñ".len());
    }

    #[test]
    fn set_moves_cursor_to_end() {
        let mut input = LineInput::default();
        input.set("home");
        assert_eq!(input.cursor, 4);
        input.clear();
        assert_eq!(input.text, "");
    }
}
