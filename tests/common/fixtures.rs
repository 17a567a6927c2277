//! Static forecast tables used across harnesses.
//!
//! The product hierarchy is `[vertical, super_category]` with `article_id` as
//! the terminal level; the store hierarchy is `[region]` with `store_no`.

use drill_core::{ForecastMetadata, Row};
use serde_json::{json, Value};

/// `(article_id, vertical, super_category, store_no, region)`
pub const FORECAST_ROWS: &[(i64, Option<&str>, Option<&str>, i64, &str)] = &[
    (1001, Some("Apparel"), Some("Shirts"), 10, "North"),
    (1001, Some("Apparel"), Some("Shirts"), 11, "North"),
    (1002, Some("Apparel"), Some("Shirts"), 10, "North"),
    (1003, Some("Apparel"), Some("Pants"), 20, "South"),
    (1004, Some("Apparel"), Some("Outerwear"), 20, "South"),
    (2001, Some("Footwear"), Some("Boots"), 11, "North"),
    (2002, Some("Footwear"), Some("Sneakers"), 21, "South"),
    (2003, Some("Footwear"), Some("Sneakers"), 21, "South"),
    (3001, Some("Home"), Some("Bedding"), 30, "West"),
    (3002, Some("Home"), None, 30, "West"),
    (4001, None, Some("Sweatshirts"), 30, "West"),
];

/// Metadata with both hierarchies. The terminal levels are left out so the
/// explorer has to append them.
pub fn scenario_metadata() -> ForecastMetadata {
    ForecastMetadata {
        product_category_hierarchy: Some(vec!["vertical".into(), "super_category".into()]),
        store_location_hierarchy: Some(vec!["region".into()]),
        extra: serde_json::Map::new(),
    }
}

/// [`FORECAST_ROWS`] as JSON rows.
pub fn scenario_rows() -> Vec<Row> {
    FORECAST_ROWS
        .iter()
        .map(|(article, vertical, super_category, store, region)| {
            let row = json!({
                "article_id": article,
                "vertical": vertical,
                "super_category": super_category,
                "store_no": store,
                "region": region,
                "forecast_qty": 12,
            });
            match row {
                Value::Object(map) => map,
                _ => unreachable!("json! object literal"),
            }
        })
        .collect()
}
