//! Detail pane — the last dispatched selection and the last drag payload.

use crate::domain;
use crate::theme::Theme;
use drill_core::Selection;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction as LayoutDir, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Paragraph, Widget, Wrap},
};

pub struct Detail<'a> {
    selection: Option<&'a Selection>,
    drag: Option<&'a str>,
    theme: &'a Theme,
}

impl<'a> Detail<'a> {
    pub fn new(selection: Option<&'a Selection>, drag: Option<&'a str>, theme: &'a Theme) -> Self {
        Self {
            selection,
            drag,
            theme,
        }
    }

    fn selection_lines(&self) -> Vec<Line<'static>> {
        let Some(sel) = self.selection else {
            return vec![Line::styled("nothing selected yet", self.theme.search_path)];
        };
        let bold = self.theme.tree_node.add_modifier(Modifier::BOLD);
        let leaf = sel.level.as_str() == sel.domain.terminal_level();
        let mut lines = vec![
            Line::from(Span::styled(domain::leaf_label(sel.domain, &sel.name, leaf), bold)),
            Line::from(format!("{:?} · {} · {}", sel.kind, sel.domain, sel.level)),
        ];
        if let Some(count) = sel.count {
            lines.push(Line::styled(format!("{count} rows"), self.theme.tree_count));
        }
        for (level, value) in sel.context.iter() {
            lines.push(Line::from(vec![
                Span::styled(format!("  {level} = "), self.theme.search_path),
                Span::raw(value.to_string()),
            ]));
        }
        lines
    }
}

impl Widget for Detail<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(LayoutDir::Vertical)
            .constraints([Constraint::Fill(1), Constraint::Length(8)])
            .split(area);

        let block = Block::bordered()
            .title(" Selection ")
            .border_style(self.theme.border_unfocused);
        Paragraph::new(self.selection_lines())
            .block(block)
            .wrap(Wrap { trim: false })
            .render(chunks[0], buf);

        let block = Block::bordered()
            .title(" Drag payload ")
            .border_style(self.theme.border_unfocused);
        let body = match self.drag {
            Some(json) => Line::raw(json.to_string()),
            None => Line::styled("press d on a node", self.theme.search_path),
        };
        Paragraph::new(body)
            .block(block)
            .wrap(Wrap { trim: false })
            .render(chunks[1], buf);
    }
}
