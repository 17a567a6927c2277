//! Hierarchy levels discovered from metadata, and the two drill-down domains.

use crate::backend::ForecastMetadata;
use crate::error::{ExplorerError, Result};
use crate::types::Ident;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Domain
// ---------------------------------------------------------------------------

/// Which tree an explorer drives. Both run the same engine; they differ only
/// in the metadata key, the terminal level and the drag payload type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Product,
    Store,
}

impl Domain {
    /// The non-expandable leaf level.
    pub fn terminal_level(self) -> &'static str {
        match self {
            Domain::Product => "article_id",
            Domain::Store => "store_no",
        }
    }

    /// `type` field of the drag payload.
    pub fn drag_type(self) -> &'static str {
        match self {
            Domain::Product => "product",
            Domain::Store => "store",
        }
    }

    /// Name of the metadata field listing this domain's levels.
    pub fn metadata_key(self) -> &'static str {
        match self {
            Domain::Product => "product_category_hierarchy",
            Domain::Store => "store_location_hierarchy",
        }
    }

    fn levels(self, metadata: &ForecastMetadata) -> Option<&[String]> {
        match self {
            Domain::Product => metadata.product_category_hierarchy.as_deref(),
            Domain::Store => metadata.store_location_hierarchy.as_deref(),
        }
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Domain::Product => write!(f, "product"),
            Domain::Store => write!(f, "store"),
        }
    }
}

impl std::str::FromStr for Domain {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "product" | "products" => Ok(Domain::Product),
            "store" | "stores" => Ok(Domain::Store),
            other => Err(format!("unknown domain `{other}` (expected product or store)")),
        }
    }
}

// ---------------------------------------------------------------------------
// Hierarchy
// ---------------------------------------------------------------------------

/// Ordered drill-down levels. Never empty; the last level is terminal.
#[derive(Debug, Clone, PartialEq)]
pub struct Hierarchy {
    levels: Vec<Ident>,
}

impl Hierarchy {
    /// Build from raw level names, placing `terminal` last.
    ///
    /// The terminal level is appended when missing. Listing it anywhere but
    /// last is rejected, as is any name that is not a valid identifier or
    /// appears twice.
    pub fn new<S: AsRef<str>>(levels: &[S], terminal: &str) -> Result<Self> {
        let terminal = Ident::new(terminal)?;
        let mut out: Vec<Ident> = Vec::with_capacity(levels.len() + 1);
        for (i, name) in levels.iter().enumerate() {
            let level = Ident::new(name.as_ref())?;
            if level == terminal {
                if i + 1 != levels.len() {
                    return Err(ExplorerError::InvalidLevel(format!(
                        "{level} (terminal level listed before {})",
                        levels[i + 1].as_ref()
                    )));
                }
                continue;
            }
            if out.contains(&level) {
                return Err(ExplorerError::InvalidLevel(format!(
                    "{level} (listed twice)"
                )));
            }
            out.push(level);
        }
        out.push(terminal);
        Ok(Self { levels: out })
    }

    /// Resolve the hierarchy for `domain` from API metadata.
    pub fn from_metadata(metadata: &ForecastMetadata, domain: Domain) -> Result<Self> {
        let levels = domain.levels(metadata).ok_or_else(|| {
            ExplorerError::MetadataLoad(format!("metadata has no `{}`", domain.metadata_key()))
        })?;
        Self::new(levels, domain.terminal_level())
    }

    pub fn levels(&self) -> &[Ident] {
        &self.levels
    }

    /// The first (root) level.
    pub fn top(&self) -> &Ident {
        &self.levels[0]
    }

    pub fn terminal(&self) -> &Ident {
        &self.levels[self.levels.len() - 1]
    }

    /// Every level above the terminal one.
    pub fn non_terminal(&self) -> &[Ident] {
        &self.levels[..self.levels.len() - 1]
    }

    pub fn is_terminal(&self, level: &str) -> bool {
        self.terminal() == level
    }

    pub fn depth_of(&self, level: &str) -> Option<usize> {
        self.levels.iter().position(|l| l == level)
    }

    /// The level below `level`, or `None` at the terminal level or for an
    /// unknown name.
    pub fn next_level(&self, level: &str) -> Option<&Ident> {
        self.depth_of(level).and_then(|i| self.levels.get(i + 1))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn names(h: &Hierarchy) -> Vec<&str> {
        h.levels().iter().map(Ident::as_str).collect()
    }

    #[rstest]
    #[case::appended(&["vertical", "super_category"], vec!["vertical", "super_category", "article_id"])]
    #[case::already_last(&["vertical", "article_id"], vec!["vertical", "article_id"])]
    #[case::only_terminal(&[], vec!["article_id"])]
    fn terminal_is_always_last(#[case] raw: &[&str], #[case] expected: Vec<&str>) {
        let h = Hierarchy::new(raw, "article_id").unwrap();
        assert_eq!(names(&h), expected);
        assert!(h.is_terminal("article_id"));
    }

    #[test]
    fn terminal_before_other_levels_is_rejected() {
        let err = Hierarchy::new(&["vertical", "article_id", "super_category"], "article_id").unwrap_err();
        assert!(
            matches!(&err, ExplorerError::InvalidLevel(msg) if msg.contains("before super_category")),
            "{err}"
        );
    }

    #[test]
    fn next_level_walks_down_and_stops_at_terminal() {
        let h = Hierarchy::new(&["region", "state", "city"], "store_no").unwrap();
        assert_eq!(h.next_level("region").map(Ident::as_str), Some("state"));
        assert_eq!(h.next_level("city").map(Ident::as_str), Some("store_no"));
        assert_eq!(h.next_level("store_no"), None);
        assert_eq!(h.next_level("country"), None);
        assert_eq!(h.top(), "region");
        assert_eq!(h.non_terminal().len(), 3);
    }

    #[test]
    fn rejects_invalid_and_duplicate_levels() {
        assert!(Hierarchy::new(&["vertical", "vertical"], "article_id").is_err());
        assert_eq!(
            Hierarchy::new(&["vertical) OR (1=1"], "article_id"),
            Err(ExplorerError::InvalidLevel("vertical) OR (1=1".to_string()))
        );
    }

    #[test]
    fn from_metadata_picks_the_domain_key() {
        let md: ForecastMetadata = serde_json::from_value(serde_json::json!({
            "product_category_hierarchy": ["vertical", "super_category", "segment"],
            "store_location_hierarchy": ["region", "state"],
            "columns": ["vertical", "region", "sold_qty"]
        }))
        .unwrap();
        let product = Hierarchy::from_metadata(&md, Domain::Product).unwrap();
        let store = Hierarchy::from_metadata(&md, Domain::Store).unwrap();
        assert_eq!(names(&product), vec!["vertical", "super_category", "segment", "article_id"]);
        assert_eq!(names(&store), vec!["region", "state", "store_no"]);
    }

    #[test]
    fn from_metadata_without_key_is_a_metadata_error() {
        let md = ForecastMetadata::default();
        assert!(matches!(
            Hierarchy::from_metadata(&md, Domain::Store),
            Err(ExplorerError::MetadataLoad(_))
        ));
    }

    #[test]
    fn domain_parses_from_cli_text() {
        assert_eq!("Stores".parse::<Domain>(), Ok(Domain::Store));
        assert!("warehouse".parse::<Domain>().is_err());
    }
}
