//! Ratatui widgets for the drill TUI.

pub mod detail;
pub mod explorer_tree;
pub mod help;
pub mod results;
pub mod search_bar;
pub mod tab_bar;
