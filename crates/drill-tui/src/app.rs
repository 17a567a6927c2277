//! Top-level application state and the main event loop.
//!
//! [`App::run`] sets up the terminal, drives the crossterm event loop, and
//! tears everything down cleanly on exit or panic. Every loop iteration first
//! lets each [`Explorer`] apply finished requests and due debounce timers,
//! then draws, then waits up to 16 ms for a key.
//!
//! The app must be created and run inside a tokio runtime context: explorers
//! spawn their requests onto it.

use crate::{
    domain,
    event::{self, AppEvent, Direction},
    theme::Theme,
    widgets::{
        detail::Detail,
        explorer_tree::{ExplorerTree, ExplorerTreeState},
        help::HelpPopup,
        results::{Results, ResultsState},
        search_bar::{LineInput, SearchBar},
        tab_bar::TabBar,
    },
};
use crossterm::{
    event::{self as ct_event, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use drill_core::{Config, Domain, Explorer, ForecastBackend, NodeId, Selection};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction as LayoutDir, Layout},
    text::{Line, Span},
    Frame, Terminal,
};
use std::{io, sync::Arc, time::Duration};
use tokio::sync::mpsc;

// ---------------------------------------------------------------------------
// Focus + tab types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Focus {
    /// Tree pane, or the result list while a global search is active.
    Tree,
    /// Global search bar.
    Search,
    /// Inline search box of a node.
    Scoped(NodeId),
}

/// One drill-down domain: its engine plus the view state around it.
pub struct DomainTab<B: ForecastBackend> {
    pub explorer: Explorer<B>,
    pub tree: ExplorerTreeState,
    pub results: ResultsState,
    pub search: LineInput,
    pub scoped: LineInput,
}

impl<B: ForecastBackend> DomainTab<B> {
    fn new(explorer: Explorer<B>) -> Self {
        Self {
            explorer,
            tree: ExplorerTreeState::default(),
            results: ResultsState::default(),
            search: LineInput::default(),
            scoped: LineInput::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

pub struct AppState<B: ForecastBackend> {
    pub tabs: Vec<DomainTab<B>>,
    pub active_tab: usize,
    pub focus: Focus,
    pub theme: Theme,
    pub config: Config,
    pub show_help: bool,
    /// Failure of a UI action (as opposed to a failed request, which the
    /// explorer keeps itself).
    pub notice: Option<String>,
    pub last_selection: Option<Selection>,
    pub last_drag: Option<String>,
    pub quit: bool,
    selections: mpsc::UnboundedReceiver<Selection>,
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

pub struct App<B: ForecastBackend> {
    state: AppState<B>,
}

impl<B: ForecastBackend> App<B> {
    /// Build one mounted explorer per domain; `first` picks the initial tab.
    pub fn new(backend: Arc<B>, config: Config, theme: Theme, first: Domain) -> Self {
        let (tx, selections) = mpsc::unbounded_channel();
        let settings = config.explorer_settings();
        let tabs: Vec<DomainTab<B>> = [Domain::Product, Domain::Store]
            .into_iter()
            .map(|domain| {
                let mut explorer =
                    Explorer::new(Arc::clone(&backend), domain, settings.clone(), tx.clone());
                explorer.mount();
                DomainTab::new(explorer)
            })
            .collect();
        let active_tab = tabs
            .iter()
            .position(|t| t.explorer.domain() == first)
            .unwrap_or(0);

        let state = AppState {
            tabs,
            active_tab,
            focus: Focus::Tree,
            theme,
            config,
            show_help: false,
            notice: None,
            last_selection: None,
            last_drag: None,
            quit: false,
            selections,
        };
        App { state }
    }

    pub fn state(&self) -> &AppState<B> {
        &self.state
    }

    /// Set up the terminal, run the event loop, and restore the terminal on exit.
    pub fn run(mut self) -> anyhow::Result<()> {
        install_panic_hook();

        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(io::stdout());
        let mut terminal = Terminal::new(backend)?;

        let result = self.event_loop(&mut terminal);

        // Always restore terminal, even if the loop returned an error
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        let _ = terminal.show_cursor();

        result
    }

    fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> anyhow::Result<()> {
        loop {
            self.tick();
            {
                let s = &self.state;
                terminal.draw(|frame| draw(frame, s))?;
            }

            if self.state.quit {
                break;
            }

            if ct_event::poll(Duration::from_millis(16))? {
                match ct_event::read()? {
                    Event::Key(key) if key.kind == crossterm::event::KeyEventKind::Press => {
                        let raw = Event::Key(key);
                        let app_event = if is_insert_mode(&self.state.focus) {
                            event::to_app_event_insert(raw)
                        } else {
                            event::to_app_event(raw)
                        };
                        if let Some(ev) = app_event {
                            tracing::debug!(focus = ?self.state.focus, event = ?ev, "key event");
                            self.handle(ev);
                        }
                    }
                    other => {
                        if let Some(ev) = event::to_app_event(other) {
                            self.handle(ev);
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Apply finished requests, fire due timers and collect selections.
    pub fn tick(&mut self) {
        for tab in &mut self.state.tabs {
            if tab.explorer.poll_ready() {
                tab.tree.clamp(tab.explorer.store());
                tab.results.clamp(tab.explorer.global().results().len());
            }
        }
        while let Ok(selection) = self.state.selections.try_recv() {
            tracing::debug!(node = %selection.id, kind = ?selection.kind, "app: selection received");
            self.state.last_selection = Some(selection);
        }
    }

    pub fn handle(&mut self, event: AppEvent) {
        let s = &mut self.state;

        // Help popup intercepts all events; only close keys pass through.
        if s.show_help {
            if matches!(event, AppEvent::Help | AppEvent::Escape | AppEvent::Quit) {
                tracing::debug!("help popup closed");
                s.show_help = false;
            }
            return;
        }

        match s.focus.clone() {
            Focus::Search => handle_search(s, event),
            Focus::Scoped(id) => handle_scoped(s, &id, event),
            Focus::Tree => handle_tree(s, event),
        }
    }
}

/// Returns true when the focus is on a text input, meaning letters should
/// produce characters rather than trigger shortcuts.
fn is_insert_mode(focus: &Focus) -> bool {
    matches!(focus, Focus::Search | Focus::Scoped(_))
}

// ---------------------------------------------------------------------------
// Event routing
// ---------------------------------------------------------------------------

fn handle_search<B: ForecastBackend>(s: &mut AppState<B>, event: AppEvent) {
    let tab = &mut s.tabs[s.active_tab];
    match event {
        AppEvent::Quit => s.quit = true,
        AppEvent::Escape => {
            tracing::debug!("search: cleared");
            tab.explorer.clear_global_search();
            tab.search.clear();
            tab.results.cursor = 0;
            s.focus = Focus::Tree;
        }
        AppEvent::Enter | AppEvent::FocusNext => s.focus = Focus::Tree,
        AppEvent::TreeNav(Direction::Up | Direction::Down) => {
            tab.results.handle(&event, tab.explorer.global().results().len());
        }
        other => {
            if tab.search.handle(&other) {
                tab.explorer.global_search_input(&tab.search.text);
                tab.results.cursor = 0;
            }
        }
    }
}

fn handle_scoped<B: ForecastBackend>(s: &mut AppState<B>, id: &NodeId, event: AppEvent) {
    let tab = &mut s.tabs[s.active_tab];
    let result = match event {
        AppEvent::Quit => {
            s.quit = true;
            Ok(())
        }
        AppEvent::Escape => {
            s.focus = Focus::Tree;
            tab.scoped.clear();
            tab.explorer.toggle_scoped_search(id)
        }
        AppEvent::Enter | AppEvent::FocusNext => {
            s.focus = Focus::Tree;
            Ok(())
        }
        other => {
            if tab.scoped.handle(&other) {
                tab.explorer.scoped_search_input(id, &tab.scoped.text)
            } else {
                Ok(())
            }
        }
    };
    if let Err(err) = result {
        report(s, err);
    }
}

fn handle_tree<B: ForecastBackend>(s: &mut AppState<B>, event: AppEvent) {
    match event {
        AppEvent::Quit => {
            tracing::debug!("quit");
            s.quit = true;
            return;
        }
        AppEvent::Help => {
            s.show_help = true;
            return;
        }
        AppEvent::PrevTab | AppEvent::NextTab => {
            let n = s.tabs.len();
            s.active_tab = if event == AppEvent::NextTab {
                (s.active_tab + 1) % n
            } else {
                (s.active_tab + n - 1) % n
            };
            tracing::debug!(tab = s.active_tab, "tab switched");
            return;
        }
        AppEvent::QueryFocus | AppEvent::FocusNext => {
            let tab = &mut s.tabs[s.active_tab];
            let term = tab.explorer.global().term().to_string();
            tab.search.set(&term);
            s.focus = Focus::Search;
            return;
        }
        AppEvent::Retry => {
            let tab = &mut s.tabs[s.active_tab];
            tracing::debug!(domain = %tab.explorer.domain(), "retry");
            s.notice = None;
            tab.explorer.clear_error();
            tab.explorer.mount();
            return;
        }
        AppEvent::Resize(_, _) => return,
        _ => {}
    }

    let tab = &mut s.tabs[s.active_tab];
    let result = if tab.explorer.global().is_active() {
        match event {
            AppEvent::Escape => {
                tab.explorer.clear_global_search();
                tab.search.clear();
                tab.results.cursor = 0;
                Ok(())
            }
            AppEvent::Enter => tab.explorer.select_search_result(tab.results.cursor),
            other => {
                tab.results.handle(&other, tab.explorer.global().results().len());
                Ok(())
            }
        }
    } else {
        let focused = tab.tree.focused_id(tab.explorer.store());
        match (event, focused) {
            (AppEvent::Escape, _) => {
                s.notice = None;
                tab.explorer.clear_error();
                Ok(())
            }
            (AppEvent::ScopedSearch, Some(id)) => {
                let opened = tab.explorer.toggle_scoped_search(&id).map(|()| {
                    tab.explorer
                        .node(&id)
                        .filter(|n| n.search_active)
                        .map(|n| n.search_term.clone())
                });
                match opened {
                    Ok(Some(term)) => {
                        tab.scoped.set(&term);
                        s.focus = Focus::Scoped(id);
                        Ok(())
                    }
                    Ok(None) => Ok(()),
                    Err(err) => Err(err),
                }
            }
            (AppEvent::Analytics, Some(id)) => tab.explorer.show_analytics(&id),
            (AppEvent::Drag, Some(id)) => tab.explorer.drag_payload(&id).map(|payload| {
                match payload.to_json() {
                    Ok(json) => s.last_drag = Some(json),
                    Err(err) => tracing::warn!(error = %err, "drag payload not serializable"),
                }
            }),
            (other, _) => tab.tree.handle(&other, &mut tab.explorer),
        }
    };
    if let Err(err) = result {
        report(s, err);
    }
}

fn report<B: ForecastBackend>(s: &mut AppState<B>, err: drill_core::ExplorerError) {
    tracing::warn!(error = %err, "app: action failed");
    s.notice = Some(err.to_string());
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn draw<B: ForecastBackend>(frame: &mut Frame, state: &AppState<B>) {
    let area = frame.area();

    // Vertical: tab bar | body | search bar | status line
    let vert = Layout::default()
        .direction(LayoutDir::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Fill(1),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(area);

    let pct = state.config.ui.tree_pane_width_pct;
    let horiz = Layout::default()
        .direction(LayoutDir::Horizontal)
        .constraints([Constraint::Percentage(pct), Constraint::Fill(1)])
        .split(vert[1]);

    let tab = &state.tabs[state.active_tab];
    let explorer = &tab.explorer;

    let tab_flags: Vec<(Domain, bool)> = state
        .tabs
        .iter()
        .map(|t| (t.explorer.domain(), t.explorer.in_flight() > 0))
        .collect();
    frame.render_widget(TabBar::new(&tab_flags, state.active_tab, &state.theme), vert[0]);

    let tree_focused = state.focus != Focus::Search;
    if explorer.global().is_active() {
        frame.render_widget(
            Results::new(
                explorer.global(),
                explorer.domain(),
                &tab.results,
                tree_focused,
                &state.theme,
            ),
            horiz[0],
        );
    } else {
        frame.render_widget(
            ExplorerTree::new(explorer, &tab.tree, tree_focused, &state.theme),
            horiz[0],
        );
    }

    frame.render_widget(
        Detail::new(
            state.last_selection.as_ref(),
            state.last_drag.as_deref(),
            &state.theme,
        ),
        horiz[1],
    );

    let bar = SearchBar::new(
        &tab.search,
        explorer.global(),
        state.focus == Focus::Search,
        &state.theme,
    );
    let cursor = bar.cursor_position(vert[2]);
    frame.render_widget(bar, vert[2]);

    frame.render_widget(status_line(state), vert[3]);

    if state.show_help {
        frame.render_widget(HelpPopup::new(&state.theme), area);
    } else if state.focus == Focus::Search {
        frame.set_cursor_position(cursor);
    }
}

fn status_line<B: ForecastBackend>(state: &AppState<B>) -> Line<'static> {
    let tab = &state.tabs[state.active_tab];
    let theme = &state.theme;
    if let Some(err) = tab.explorer.error() {
        return Line::from(vec![
            Span::styled(format!(" {err}"), theme.status_error),
            Span::styled("  (r to retry, Esc to dismiss)", theme.search_path),
        ]);
    }
    if let Some(notice) = &state.notice {
        return Line::styled(format!(" {notice}"), theme.status_error);
    }
    if let Focus::Scoped(id) = &state.focus {
        let name = tab
            .explorer
            .node(id)
            .map(|n| domain::label(tab.explorer.domain(), n))
            .unwrap_or_default();
        return Line::styled(
            format!(" filtering children of {name} (Enter keeps, Esc closes)"),
            theme.search_prompt,
        );
    }
    if tab.explorer.is_root_loading() || tab.explorer.in_flight() > 0 {
        return Line::styled(" loading…", theme.tree_loading);
    }
    Line::styled(" ready", theme.status_info)
}

// ---------------------------------------------------------------------------
// Terminal helpers
// ---------------------------------------------------------------------------

fn install_panic_hook() {
    let original = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original(info);
    }));
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
