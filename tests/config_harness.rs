#![allow(unused)]
//! Configuration integration harness.
//!
//! # What this covers
//!
//! - **File layering**: a partial `config.toml` overrides only the keys it
//!   names; everything else keeps the built-in default.
//! - **Explorer settings**: the debounce, ordering, separator and fetch
//!   timeout read from a file actually drive an explorer.
//! - **Backend construction**: an invalid table name in `[backend]` is
//!   rejected before any request is built.
//!
//! # What this does NOT cover
//!
//! - `DRILL_*` environment overrides (process-global, unsafe to mutate from
//!   parallel tests)
//!
//! # Running
//!
//! ```sh
//! cargo test --test config_harness
//! ```

mod common;
use common::*;
use drill_backend::HttpBackend;
use drill_core::{ChildOrder, Config, Domain, ExplorerError};
use pretty_assertions::assert_eq;
use std::time::Duration;

fn write_config(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, contents).unwrap();
    (dir, path)
}

#[test]
fn partial_file_keeps_other_defaults() {
    let (_dir, path) = write_config("[backend]\nbase_url = \"http://forecast.internal:9000\"\n");

    let cfg = Config::load_from(&path).unwrap();

    assert_eq!(cfg.backend.base_url, "http://forecast.internal:9000");
    assert_eq!(cfg.backend.table, "forecast");
    assert_eq!(cfg.explorer_settings().debounce, Duration::from_millis(300));
}

#[test]
fn malformed_file_is_an_error() {
    let (_dir, path) = write_config("[explorer\ndebounce_ms = ");
    assert!(Config::load_from(&path).is_err());
}

#[test]
fn unknown_child_order_is_an_error() {
    let (_dir, path) = write_config("[explorer]\nchild_order = \"random\"\n");
    assert!(Config::load_from(&path).is_err());
}

#[test]
fn invalid_table_name_blocks_the_http_backend() {
    let (_dir, path) = write_config("[backend]\ntable = \"forecast where 1=1\"\n");
    let cfg = Config::load_from(&path).unwrap();

    let err = HttpBackend::from_config(&cfg.backend).unwrap_err();
    assert!(matches!(err, ExplorerError::InvalidLevel(name) if name == "forecast where 1=1"));
}

#[tokio::test(start_paused = true)]
async fn file_settings_drive_the_explorer() {
    let (_dir, path) = write_config(
        "[explorer]\nchild_order = \"count_desc\"\ndebounce_ms = 40\npath_separator = \" / \"\n",
    );
    let settings = Config::load_from(&path).unwrap().explorer_settings();
    assert_eq!(settings.child_order, ChildOrder::CountDesc);

    let backend = RecordingBackend::scenario();
    let (mut explorer, _rx) = mounted_with(&backend, Domain::Product, settings).await;
    let apparel = vertical("Apparel");
    explorer.toggle_scoped_search(&apparel).unwrap();
    explorer.settle().await;
    assert_children!(explorer, apparel.clone(), ["Shirts", "Outerwear", "Pants"]);

    // 40 ms debounce: the search fires well before the default 300 ms.
    explorer.scoped_search_input(&apparel, "wear").unwrap();
    run_for(&mut explorer, ms(60)).await;
    assert_search_queries!(backend, 1);
    explorer.settle().await;
    assert_children!(explorer, apparel, ["Outerwear"]);

    explorer.global_search_input("outer");
    explorer.settle().await;
    assert_eq!(explorer.global().results()[0].path, "Apparel / Outerwear");
}
