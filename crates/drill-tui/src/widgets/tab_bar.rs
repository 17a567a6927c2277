//! Tab bar widget — one tab per drill-down domain.

use crate::domain;
use crate::theme::Theme;
use drill_core::Domain;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::Line,
    widgets::{Tabs, Widget},
};

/// Renders the 1-line strip of domain tabs at the top of the screen.
///
/// A `●` suffix marks tabs with requests in flight. Keybinding hints are
/// right-aligned in the same row.
pub struct TabBar<'a> {
    tabs: &'a [(Domain, bool)],
    active: usize,
    theme: &'a Theme,
}

impl<'a> TabBar<'a> {
    /// `tabs` pairs each domain with its busy flag.
    pub fn new(tabs: &'a [(Domain, bool)], active: usize, theme: &'a Theme) -> Self {
        Self { tabs, active, theme }
    }
}

impl Widget for TabBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let labels: Vec<Line> = self
            .tabs
            .iter()
            .enumerate()
            .map(|(i, (domain, busy))| {
                let busy = if *busy { " ●" } else { "" };
                Line::from(format!(" {}:{}{} ", i + 1, domain::title(*domain), busy))
            })
            .collect();

        Tabs::new(labels)
            .select(self.active)
            .highlight_style(self.theme.tree_cursor.add_modifier(Modifier::BOLD))
            .divider("")
            .render(area, buf);

        let hint = " [/]:tab  q:quit  ?:help ";
        let hint_x = area.right().saturating_sub(hint.chars().count() as u16);
        buf.set_string(
            hint_x,
            area.y,
            hint,
            Style::default().add_modifier(Modifier::DIM),
        );
    }
}
