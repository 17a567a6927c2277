#![allow(unused)]
//! Selection and drag integration harness.
//!
//! # What this covers
//!
//! - **Leaf click**: clicking a terminal node dispatches a `Leaf` selection
//!   carrying the node's full context.
//! - **Analytics**: any node can be selected explicitly without changing its
//!   expansion.
//! - **Drag payload**: `{id, type, level, name, context}` with the context in
//!   hierarchy order; building it leaves the tree alone.
//! - **Closed sink**: a dropped receiver never turns a click into an error.
//!
//! # What this does NOT cover
//!
//! - What the host does with a selection (the TUI detail pane)
//!
//! # Running
//!
//! ```sh
//! cargo test --test selection_harness
//! ```

mod common;
use common::*;
use drill_core::{Domain, ExplorerError, Scalar, SelectionKind};
use pretty_assertions::assert_eq;

#[tokio::test(start_paused = true)]
async fn leaf_click_dispatches_the_full_context() {
    let backend = RecordingBackend::scenario();
    let (mut explorer, mut rx) = mounted(&backend, Domain::Product).await;
    expand_path(
        &mut explorer,
        &[vertical("Apparel"), super_category("Apparel", "Shirts")],
    )
    .await;
    let leaf = article("Apparel", "Shirts", 1002);

    explorer.click(&leaf).unwrap();

    let selections = drain(&mut rx);
    assert_eq!(selections.len(), 1);
    let picked = &selections[0];
    assert_eq!(picked.kind, SelectionKind::Leaf);
    assert_eq!(picked.domain, Domain::Product);
    assert_eq!(picked.id, leaf);
    assert_eq!(picked.level, "article_id");
    assert_eq!(picked.count, Some(1));
    let context: Vec<(String, Scalar)> = picked
        .context
        .iter()
        .map(|(l, v)| (l.to_string(), v.clone()))
        .collect();
    assert_eq!(
        context,
        vec![
            ("vertical".to_string(), Scalar::from("Apparel")),
            ("super_category".to_string(), Scalar::from("Shirts")),
            ("article_id".to_string(), Scalar::Int(1002)),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn analytics_selects_inner_nodes_without_toggling() {
    let backend = RecordingBackend::scenario();
    let (mut explorer, mut rx) = mounted(&backend, Domain::Product).await;
    let apparel = vertical("Apparel");

    explorer.show_analytics(&apparel).unwrap();

    let selections = drain(&mut rx);
    assert_eq!(selections.len(), 1);
    assert_eq!(selections[0].kind, SelectionKind::Analytics);
    assert_eq!(selections[0].count, Some(5));
    assert!(!explorer.node(&apparel).unwrap().expanded);
    assert_eq!(backend.queries_for("super_category").len(), 0);
}

#[tokio::test(start_paused = true)]
async fn store_selections_name_their_domain() {
    let backend = RecordingBackend::scenario();
    let (mut explorer, mut rx) = mounted(&backend, Domain::Store).await;
    expand_path(&mut explorer, &[region("South")]).await;

    explorer.click(&store_no("South", 21)).unwrap();

    let selections = drain(&mut rx);
    assert_eq!(selections.len(), 1);
    assert_eq!(selections[0].domain, Domain::Store);
    assert_eq!(selections[0].name, "21");
    assert_eq!(selections[0].context.get("region"), Some(&Scalar::from("South")));
}

#[tokio::test(start_paused = true)]
async fn closed_sink_is_not_an_error() {
    let backend = RecordingBackend::scenario();
    let (mut explorer, rx) = mounted(&backend, Domain::Product).await;
    drop(rx);

    explorer.show_analytics(&vertical("Home")).unwrap();
    assert_no_error!(explorer);
}

// ---------------------------------------------------------------------------
// Drag payloads
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn drag_payload_shape() {
    let backend = RecordingBackend::scenario();
    let (mut explorer, mut rx) = mounted(&backend, Domain::Product).await;
    expand_path(&mut explorer, &[vertical("Apparel")]).await;
    let before = visible_names(&explorer);

    let payload = explorer
        .drag_payload(&super_category("Apparel", "Shirts"))
        .unwrap();

    insta::assert_json_snapshot!(payload, @r#"
    {
      "id": "super_category-vertical-Apparel-Shirts",
      "type": "product",
      "level": "super_category",
      "name": "Shirts",
      "context": {
        "vertical": "Apparel",
        "super_category": "Shirts"
      }
    }
    "#);
    assert_eq!(
        payload.to_json().unwrap(),
        r#"{"id":"super_category-vertical-Apparel-Shirts","type":"product","level":"super_category","name":"Shirts","context":{"vertical":"Apparel","super_category":"Shirts"}}"#
    );
    assert_eq!(visible_names(&explorer), before);
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test(start_paused = true)]
async fn store_drag_keeps_numeric_values() {
    let backend = RecordingBackend::scenario();
    let (mut explorer, _rx) = mounted(&backend, Domain::Store).await;
    expand_path(&mut explorer, &[region("West")]).await;

    let payload = explorer.drag_payload(&store_no("West", 30)).unwrap();
    let json: serde_json::Value = serde_json::from_str(&payload.to_json().unwrap()).unwrap();

    assert_eq!(
        json,
        serde_json::json!({
            "id": "store_no-region-West-30",
            "type": "store",
            "level": "store_no",
            "name": "30",
            "context": { "region": "West", "store_no": 30 },
        })
    );
}

#[tokio::test(start_paused = true)]
async fn dragging_an_unknown_node_fails() {
    let backend = RecordingBackend::scenario();
    let (explorer, _rx) = mounted(&backend, Domain::Product).await;

    assert!(matches!(
        explorer.drag_payload(&vertical("Garden")),
        Err(ExplorerError::UnknownNode(_))
    ));
}
