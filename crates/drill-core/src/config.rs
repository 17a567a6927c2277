//! Configuration types for drill.
//!
//! [`Config::load`] reads `~/.config/drill/config.toml`, creating it with
//! hardcoded defaults if it does not yet exist, then applies `DRILL_*`
//! environment overrides. [`Config::defaults`] returns the same defaults
//! without touching the filesystem (useful in tests).

use crate::hierarchy::Domain;
use crate::query::ChildOrder;
use crate::types::Ident;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

// ---------------------------------------------------------------------------
// Embedded defaults
// ---------------------------------------------------------------------------

const DEFAULT_CONFIG: &str = r#"
[backend]
base_url         = "http://localhost:8000"
table            = "forecast"
fetch_timeout_ms = 30000

[explorer]
child_order         = "value"
debounce_ms         = 300
global_result_limit = 100
path_separator      = " > "

[ui]
tree_pane_width_pct = 40
default_domain      = "product"
"#;

// ---------------------------------------------------------------------------
// Public config types
// ---------------------------------------------------------------------------

/// Top-level application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub explorer: ExplorerConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

/// `[backend]` section of `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_table")]
    pub table: String,
    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,
}

fn default_base_url() -> String { "http://localhost:8000".to_string() }
fn default_table() -> String { "forecast".to_string() }
fn default_fetch_timeout_ms() -> u64 { 30_000 }

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            table: default_table(),
            fetch_timeout_ms: default_fetch_timeout_ms(),
        }
    }
}

impl BackendConfig {
    /// The table name as a validated identifier.
    pub fn table_ident(&self) -> crate::error::Result<Ident> {
        Ident::new(self.table.as_str())
    }
}

/// `[explorer]` section of `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct ExplorerConfig {
    #[serde(default)]
    pub child_order: ChildOrder,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "default_global_result_limit")]
    pub global_result_limit: u32,
    #[serde(default = "default_path_separator")]
    pub path_separator: String,
}

fn default_debounce_ms() -> u64 { 300 }
fn default_global_result_limit() -> u32 { 100 }
fn default_path_separator() -> String { " > ".to_string() }

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            child_order: ChildOrder::default(),
            debounce_ms: default_debounce_ms(),
            global_result_limit: default_global_result_limit(),
            path_separator: default_path_separator(),
        }
    }
}

/// `[ui]` section of `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_tree_pane_width_pct")]
    pub tree_pane_width_pct: u16,
    #[serde(default = "default_domain")]
    pub default_domain: Domain,
}

fn default_tree_pane_width_pct() -> u16 { 40 }
fn default_domain() -> Domain { Domain::Product }

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tree_pane_width_pct: default_tree_pane_width_pct(),
            default_domain: default_domain(),
        }
    }
}

/// Runtime knobs of one explorer, resolved from `[explorer]` plus the
/// backend fetch timeout.
#[derive(Debug, Clone, PartialEq)]
pub struct ExplorerSettings {
    pub child_order: ChildOrder,
    pub debounce: Duration,
    pub global_result_limit: u32,
    pub path_separator: String,
    pub fetch_timeout: Duration,
}

impl Default for ExplorerSettings {
    fn default() -> Self {
        Config::default().explorer_settings()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::defaults()
    }
}

impl Config {
    /// Load from `~/.config/drill/config.toml`, layered on top of the built-in
    /// defaults and under `DRILL_*` environment overrides. Creates the file
    /// with defaults if it does not exist.
    pub fn load() -> anyhow::Result<Self> {
        let path = config_path();

        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, DEFAULT_CONFIG.trim_start())?;
        }

        layered(&path)
            .add_source(
                config::Environment::with_prefix("DRILL")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
            .map_err(Into::into)
    }

    /// Load an explicit file on top of the built-in defaults. A missing file
    /// yields the defaults. Environment overrides are not applied.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        layered(path).build()?.try_deserialize().map_err(Into::into)
    }

    /// Return the built-in defaults without touching the filesystem.
    pub fn defaults() -> Self {
        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .build()
            .expect("built-in default config must be valid TOML")
            .try_deserialize()
            .expect("built-in default config must deserialize correctly")
    }

    pub fn explorer_settings(&self) -> ExplorerSettings {
        ExplorerSettings {
            child_order: self.explorer.child_order,
            debounce: Duration::from_millis(self.explorer.debounce_ms),
            global_result_limit: self.explorer.global_result_limit,
            path_separator: self.explorer.path_separator.clone(),
            fetch_timeout: Duration::from_millis(self.backend.fetch_timeout_ms),
        }
    }
}

fn layered(path: &Path) -> config::ConfigBuilder<config::builder::DefaultState> {
    config::Config::builder()
        .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
        .add_source(
            config::File::from(path)
                .format(config::FileFormat::Toml)
                .required(false),
        )
}

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

fn config_path() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".to_string()))
                .join(".config")
        })
        .join("drill")
        .join("config.toml")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
