//! Semantic application events — crossterm key events mapped to a
//! widget-agnostic vocabulary so widgets never touch crossterm directly.
//!
//! # Keybindings
//!
//! | Key(s)                  | Event                      |
//! |-------------------------|----------------------------|
//! | `q`, `Ctrl+c`           | `Quit`                     |
//! | `Tab`                   | `FocusNext`                |
//! | `/`                     | `QueryFocus`               |
//! | `s`                     | `ScopedSearch`             |
//! | `a`                     | `Analytics`                |
//! | `d`                     | `Drag`                     |
//! | `r`                     | `Retry`                    |
//! | `?`                     | `Help`                     |
//! | `[` / `]`               | `PrevTab` / `NextTab`      |
//! | `↑` / `k`               | `TreeNav(Up)`              |
//! | `↓` / `j`               | `TreeNav(Down)`            |
//! | `←` / `h`               | `TreeNav(Left)`            |
//! | `→` / `l`               | `TreeNav(Right)`           |
//! | printable char          | `Char(c)`                  |
//! | `Backspace`             | `Backspace`                |
//! | `Enter`                 | `Enter`                    |
//! | terminal resize         | `Resize(w, h)`             |
//!
//! ## Insert mode
//!
//! While the global search bar or a node's scoped search box has focus the
//! event loop calls [`to_app_event_insert`] instead. Every printable
//! character, shortcut letters included, arrives as `Char`. Only `Ctrl+c`,
//! `Escape`, `Enter`, `Tab`, `Backspace` and the arrow keys keep their
//! bindings.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};

/// Cardinal direction for tree and result-list navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// A semantic application event derived from a raw crossterm [`Event`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    Quit,
    /// Cycle focus between the tree pane and the search bar.
    FocusNext,
    /// Jump into the global search bar.
    QueryFocus,
    /// Open or close the scoped search box of the focused node.
    ScopedSearch,
    /// Dispatch the focused node to the analytics sink.
    Analytics,
    /// Build the drag payload of the focused node.
    Drag,
    /// Remount the active tab after an error.
    Retry,
    Help,
    PrevTab,
    NextTab,
    TreeNav(Direction),
    Char(char),
    Backspace,
    Enter,
    Resize(u16, u16),
    /// Dismiss the active input, popup or result list.
    Escape,
}

/// Map a raw crossterm [`Event`] to an [`AppEvent`] (navigation mode).
///
/// Returns `None` for mouse events and unbound keys.
pub fn to_app_event(event: Event) -> Option<AppEvent> {
    match event {
        Event::Resize(w, h) => Some(AppEvent::Resize(w, h)),
        Event::Key(key) => map_key(key),
        _ => None,
    }
}

/// Map a raw crossterm [`Event`] to an [`AppEvent`] for text-input mode.
pub fn to_app_event_insert(event: Event) -> Option<AppEvent> {
    match event {
        Event::Resize(w, h) => Some(AppEvent::Resize(w, h)),
        Event::Key(key) => map_key_insert(key),
        _ => None,
    }
}

fn map_key(key: KeyEvent) -> Option<AppEvent> {
    use KeyCode::*;
    use KeyModifiers as Mod;

    let plain = key.modifiers == Mod::NONE;
    match key.code {
        Char('q') if plain => Some(AppEvent::Quit),
        Char('c') if key.modifiers == Mod::CONTROL => Some(AppEvent::Quit),

        Tab if plain => Some(AppEvent::FocusNext),
        Char('/') if plain => Some(AppEvent::QueryFocus),

        Char('s') if plain => Some(AppEvent::ScopedSearch),
        Char('a') if plain => Some(AppEvent::Analytics),
        Char('d') if plain => Some(AppEvent::Drag),
        Char('r') if plain => Some(AppEvent::Retry),

        // `?` needs SHIFT on most layouts; match on the code alone
        Char('?') => Some(AppEvent::Help),

        Char('[') if plain => Some(AppEvent::PrevTab),
        Char(']') if plain => Some(AppEvent::NextTab),

        Up | Char('k') if plain => Some(AppEvent::TreeNav(Direction::Up)),
        Down | Char('j') if plain => Some(AppEvent::TreeNav(Direction::Down)),
        Left | Char('h') if plain => Some(AppEvent::TreeNav(Direction::Left)),
        Right | Char('l') if plain => Some(AppEvent::TreeNav(Direction::Right)),

        Char(c) if plain || key.modifiers == Mod::SHIFT => Some(AppEvent::Char(c)),

        Backspace if plain => Some(AppEvent::Backspace),
        Enter if plain => Some(AppEvent::Enter),
        Esc => Some(AppEvent::Escape),

        _ => None,
    }
}

fn map_key_insert(key: KeyEvent) -> Option<AppEvent> {
    use KeyCode::*;
    use KeyModifiers as Mod;

    match key.code {
        Char('c') if key.modifiers == Mod::CONTROL => Some(AppEvent::Quit),

        Up => Some(AppEvent::TreeNav(Direction::Up)),
        Down => Some(AppEvent::TreeNav(Direction::Down)),
        Left => Some(AppEvent::TreeNav(Direction::Left)),
        Right => Some(AppEvent::TreeNav(Direction::Right)),

        Tab if key.modifiers == Mod::NONE => Some(AppEvent::FocusNext),

        Char(c) if key.modifiers == Mod::NONE || key.modifiers == Mod::SHIFT => {
            Some(AppEvent::Char(c))
        }

        Backspace if key.modifiers == Mod::NONE => Some(AppEvent::Backspace),
        Enter if key.modifiers == Mod::NONE => Some(AppEvent::Enter),
        Esc => Some(AppEvent::Escape),

        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
