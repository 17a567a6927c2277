//! Colour theme for the drill TUI.
//!
//! The theme is a TOML file embedded in the binary via [`include_str!`], so
//! the application works without any files on disk. Call
//! [`Theme::load_default`] at startup and pass the result through the
//! application as a shared reference.
//!
//! Tree levels are coloured by depth: depth `n` takes entry `n` of the
//! `[depths] palette`, wrapping around for deep hierarchies.

use config::{Config, File, FileFormat};
use ratatui::style::{Color, Modifier, Style};
use serde::Deserialize;

const DEFAULT_THEME_SRC: &str = include_str!("themes/default.toml");

// ---------------------------------------------------------------------------
// Raw (serde) types — mirror the TOML structure
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawStyle {
    fg: Option<String>,
    bg: Option<String>,
    #[serde(default)]
    bold: bool,
    #[serde(default)]
    dim: bool,
    #[serde(default)]
    italic: bool,
    #[serde(default)]
    underlined: bool,
}

impl RawStyle {
    fn into_style(self) -> Style {
        let mut style = Style::default();
        if let Some(c) = self.fg.as_deref().and_then(parse_color) {
            style = style.fg(c);
        }
        if let Some(c) = self.bg.as_deref().and_then(parse_color) {
            style = style.bg(c);
        }
        if self.bold {
            style = style.add_modifier(Modifier::BOLD);
        }
        if self.dim {
            style = style.add_modifier(Modifier::DIM);
        }
        if self.italic {
            style = style.add_modifier(Modifier::ITALIC);
        }
        if self.underlined {
            style = style.add_modifier(Modifier::UNDERLINED);
        }
        style
    }
}

#[derive(Debug, Deserialize)]
struct RawTree {
    node: RawStyle,
    leaf: RawStyle,
    loading: RawStyle,
    count: RawStyle,
    cursor: RawStyle,
}

#[derive(Debug, Deserialize)]
struct RawBorders {
    focused: RawStyle,
    unfocused: RawStyle,
}

#[derive(Debug, Deserialize)]
struct RawSearch {
    prompt: RawStyle,
    highlight: RawStyle,
    path: RawStyle,
}

#[derive(Debug, Deserialize)]
struct RawStatus {
    error: RawStyle,
    info: RawStyle,
}

#[derive(Debug, Deserialize)]
struct RawDepths {
    palette: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawTheme {
    tree: RawTree,
    borders: RawBorders,
    search: RawSearch,
    status: RawStatus,
    depths: RawDepths,
}

// ---------------------------------------------------------------------------
// Public Theme type
// ---------------------------------------------------------------------------

/// Application colour theme. All styles are pre-resolved ratatui [`Style`]
/// values.
#[derive(Debug, Clone)]
pub struct Theme {
    pub tree_node: Style,
    pub tree_leaf: Style,
    /// Nodes with a request in flight.
    pub tree_loading: Style,
    pub tree_count: Style,
    pub tree_cursor: Style,

    pub border_focused: Style,
    pub border_unfocused: Style,

    pub search_prompt: Style,
    /// Matched span inside a result or scoped-search child.
    pub search_highlight: Style,
    pub search_path: Style,

    pub status_error: Style,
    pub status_info: Style,

    depth_palette: Vec<Color>,
}

impl Theme {
    /// Load and parse the embedded default theme.
    ///
    /// # Panics
    ///
    /// Panics if the embedded TOML is malformed.
    pub fn load_default() -> Self {
        Self::from_toml_str(DEFAULT_THEME_SRC).expect("embedded default theme must be valid TOML")
    }

    /// Parse a theme from a TOML string. Unknown keys are ignored.
    pub fn from_toml_str(src: &str) -> anyhow::Result<Self> {
        let raw: RawTheme = Config::builder()
            .add_source(File::from_str(src, FileFormat::Toml))
            .build()?
            .try_deserialize()?;

        Ok(Self {
            tree_node: raw.tree.node.into_style(),
            tree_leaf: raw.tree.leaf.into_style(),
            tree_loading: raw.tree.loading.into_style(),
            tree_count: raw.tree.count.into_style(),
            tree_cursor: raw.tree.cursor.into_style(),
            border_focused: raw.borders.focused.into_style(),
            border_unfocused: raw.borders.unfocused.into_style(),
            search_prompt: raw.search.prompt.into_style(),
            search_highlight: raw.search.highlight.into_style(),
            search_path: raw.search.path.into_style(),
            status_error: raw.status.error.into_style(),
            status_info: raw.status.info.into_style(),
            depth_palette: raw
                .depths
                .palette
                .iter()
                .filter_map(|s| parse_color(s))
                .collect(),
        })
    }

    /// Style for the icon of a node at `depth`.
    pub fn depth_style(&self, depth: usize) -> Style {
        if self.depth_palette.is_empty() {
            return Style::default();
        }
        Style::default().fg(self.depth_palette[depth % self.depth_palette.len()])
    }

    pub fn border(&self, focused: bool) -> Style {
        if focused {
            self.border_focused
        } else {
            self.border_unfocused
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse a colour name into a ratatui [`Color`].
///
/// Accepts:
/// - Named terminal colours (case-insensitive): `red`, `dark_gray`, etc.
/// - Hex RGB: `#rrggbb`
/// - 256-colour indexed: `indexed:N`
fn parse_color(s: &str) -> Option<Color> {
    match s.to_ascii_lowercase().as_str() {
        "black" => Some(Color::Black),
        "red" => Some(Color::Red),
        "green" => Some(Color::Green),
        "yellow" => Some(Color::Yellow),
        "blue" => Some(Color::Blue),
        "magenta" => Some(Color::Magenta),
        "cyan" => Some(Color::Cyan),
        "gray" | "grey" => Some(Color::Gray),
        "dark_gray" | "darkgray" | "dark_grey" | "darkgrey" => Some(Color::DarkGray),
        "light_red" => Some(Color::LightRed),
        "light_green" => Some(Color::LightGreen),
        "light_yellow" => Some(Color::LightYellow),
        "light_blue" => Some(Color::LightBlue),
        "light_magenta" => Some(Color::LightMagenta),
        "light_cyan" => Some(Color::LightCyan),
        "white" => Some(Color::White),
        s if s.starts_with('#') && s.len() == 7 => {
            let r = u8::from_str_radix(&s[1..3], 16).ok()?;
            let g = u8::from_str_radix(&s[3..5], 16).ok()?;
            let b = u8::from_str_radix(&s[5..7], 16).ok()?;
            Some(Color::Rgb(r, g, b))
        }
        s if s.starts_with("indexed:") => {
            let n: u8 = s["indexed:".len()..].parse().ok()?;
            Some(Color::Indexed(n))
        }
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
