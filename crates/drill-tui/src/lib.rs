//! drill TUI — ratatui application shell.
//!
//! One tab per drill-down domain, each backed by its own
//! [`drill_core::Explorer`].

pub mod app;
pub mod domain;
pub mod event;
pub mod theme;
pub mod widgets;

pub use app::App;

use drill_backend::AnyBackend;
use drill_core::{Config, Domain};
use std::sync::Arc;

/// Run the TUI until the user quits.
///
/// Must be called from a thread that has entered a tokio runtime: the
/// explorers spawn their requests onto it.
pub fn run(config: Config, backend: AnyBackend, domain: Domain) -> anyhow::Result<()> {
    let theme = theme::Theme::load_default();
    App::new(Arc::new(backend), config, theme, domain).run()
}
