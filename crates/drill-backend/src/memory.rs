//! In-memory backend — evaluates [`ForecastQuery`]s directly over a row set.
//!
//! Used by `drill --demo` (see [`InMemoryBackend::demo`]) and as a
//! deterministic backend in tests.

use drill_core::{BackendError, ForecastBackend, ForecastMetadata, ForecastQuery, QueryResponse, Row, Scalar};
use drill_core::query::ChildOrder;
use serde_json::{json, Value};
use std::time::Duration;

#[derive(Debug, Clone, Default)]
pub struct InMemoryBackend {
    metadata: ForecastMetadata,
    rows: Vec<Row>,
    latency: Option<Duration>,
}

impl InMemoryBackend {
    pub fn new(metadata: ForecastMetadata, rows: Vec<Row>) -> Self {
        Self {
            metadata,
            rows,
            latency: None,
        }
    }

    /// Delay every response by `latency`, to make loading states visible.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Answer `query` synchronously.
    pub fn evaluate(&self, query: &ForecastQuery) -> Result<QueryResponse, BackendError> {
        let data = match query {
            ForecastQuery::LevelValues {
                target,
                context,
                search,
                order,
            } => {
                let needle = search.as_deref().map(str::to_lowercase);
                let mut groups: Vec<(Scalar, u64)> = Vec::new();
                for row in &self.rows {
                    let in_context = context
                        .iter()
                        .all(|(level, value)| row.get(level.as_str()).is_some_and(|c| value.matches_json(c)));
                    if !in_context {
                        continue;
                    }
                    let Some(value) = row.get(target.as_str()).and_then(Scalar::from_json) else {
                        continue;
                    };
                    if let Some(needle) = &needle {
                        if !value.to_string().to_lowercase().contains(needle) {
                            continue;
                        }
                    }
                    match groups.iter_mut().find(|(v, _)| v.total_cmp(&value).is_eq()) {
                        Some((_, count)) => *count += 1,
                        None => groups.push((value, 1)),
                    }
                }
                match order {
                    ChildOrder::Value => groups.sort_by(|a, b| a.0.total_cmp(&b.0)),
                    ChildOrder::CountDesc => {
                        groups.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.total_cmp(&b.0)))
                    }
                }
                groups
                    .into_iter()
                    .map(|(value, count)| {
                        let mut row = Row::new();
                        row.insert(target.to_string(), value.to_json());
                        row.insert("count".to_string(), Value::from(count));
                        row
                    })
                    .collect()
            }
            ForecastQuery::GlobalMatch {
                terminal,
                levels,
                term,
                limit,
            } => {
                let needle = term.to_lowercase();
                let matched = if levels.is_empty() {
                    std::slice::from_ref(terminal)
                } else {
                    levels.as_slice()
                };
                let mut out: Vec<(Scalar, Row)> = Vec::new();
                for row in &self.rows {
                    let Some(key) = row.get(terminal.as_str()).and_then(Scalar::from_json) else {
                        continue;
                    };
                    let hit = matched.iter().any(|level| {
                        row.get(level.as_str())
                            .and_then(Scalar::from_json)
                            .is_some_and(|v| v.to_string().to_lowercase().contains(&needle))
                    });
                    if !hit {
                        continue;
                    }
                    let mut projected = Row::new();
                    projected.insert(terminal.to_string(), key.to_json());
                    for level in levels {
                        let cell = row.get(level.as_str()).cloned().unwrap_or(Value::Null);
                        projected.insert(level.to_string(), cell);
                    }
                    if !out.iter().any(|(_, r)| *r == projected) {
                        out.push((key, projected));
                    }
                }
                out.sort_by(|a, b| a.0.total_cmp(&b.0));
                out.into_iter()
                    .take(*limit as usize)
                    .map(|(_, row)| row)
                    .collect()
            }
        };
        Ok(QueryResponse { data })
    }

    async fn delay(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

impl ForecastBackend for InMemoryBackend {
    async fn get_metadata(&self) -> Result<ForecastMetadata, BackendError> {
        self.delay().await;
        Ok(self.metadata.clone())
    }

    async fn execute_sql_query(&self, query: ForecastQuery) -> Result<QueryResponse, BackendError> {
        self.delay().await;
        tracing::debug!(level = %query.target(), "memory: evaluate");
        self.evaluate(&query)
    }
}

// ---------------------------------------------------------------------------
// Demo dataset
// ---------------------------------------------------------------------------

const CATALOG: &[(&str, &[(&str, &[&str])])] = &[
    ("Apparel", &[
        ("Shirts", &["Casual", "Formal"]),
        ("Pants", &["Denim", "Chinos"]),
        ("Outerwear", &["Jackets"]),
    ]),
    ("Footwear", &[
        ("Sneakers", &["Running", "Lifestyle"]),
        ("Boots", &["Hiking"]),
    ]),
    ("Home", &[
        ("Kitchen", &["Cookware", "Cutlery"]),
        ("Bedding", &["Sheets"]),
    ]),
];

const LOCATIONS: &[(&str, &[(&str, &[&str])])] = &[
    ("North", &[("Hamburg", &["Hamburg", "Altona"]), ("Bremen", &["Bremen"])]),
    ("South", &[("Bavaria", &["Munich", "Nuremberg"]), ("Baden", &["Stuttgart"])]),
    ("West", &[("Rhineland", &["Cologne", "Dusseldorf"])]),
];

impl InMemoryBackend {
    /// A small but complete forecast table: every article is stocked in a
    /// handful of stores over two weeks.
    pub fn demo() -> Self {
        let mut articles = Vec::new();
        for (vertical, supers) in CATALOG {
            for (super_category, segments) in *supers {
                for segment in *segments {
                    for _ in 0..3 {
                        let article_id = 1001 + articles.len() as i64;
                        articles.push((article_id, *vertical, *super_category, *segment));
                    }
                }
            }
        }

        let mut stores = Vec::new();
        for (region, states) in LOCATIONS {
            for (state, cities) in *states {
                for city in *cities {
                    for _ in 0..2 {
                        let store_no = 100 + stores.len() as i64;
                        stores.push((store_no, *region, *state, *city));
                    }
                }
            }
        }

        let mut rows = Vec::new();
        for (i, (article_id, vertical, super_category, segment)) in articles.iter().enumerate() {
            // Three stores per article, spread over the chain.
            for k in 0..3 {
                let (store_no, region, state, city) = stores[(i * 5 + k * 7) % stores.len()];
                for week in 1..=2 {
                    let qty = ((article_id * 7 + store_no * 3 + week * 11) % 40) + 5;
                    let row = json!({
                        "article_id": article_id,
                        "vertical": vertical,
                        "super_category": super_category,
                        "segment": segment,
                        "store_no": store_no,
                        "region": region,
                        "state": state,
                        "city": city,
                        "week": week,
                        "forecast_qty": qty,
                    });
                    if let Value::Object(map) = row {
                        rows.push(map);
                    }
                }
            }
        }

        let metadata = ForecastMetadata {
            product_category_hierarchy: Some(
                ["vertical", "super_category", "segment"].map(String::from).to_vec(),
            ),
            store_location_hierarchy: Some(["region", "state", "city"].map(String::from).to_vec()),
            extra: serde_json::Map::new(),
        };
        Self::new(metadata, rows)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
