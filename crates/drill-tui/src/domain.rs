//! Per-domain presentation: tab titles, icons and leaf labels.
//!
//! The engine treats both trees alike; only what is drawn differs.

use drill_core::{Domain, Node};

const PRODUCT_ICONS: &[&str] = &["◆", "◇", "▪", "▫"];
const STORE_ICONS: &[&str] = &["◉", "○", "◦", "·"];

/// Tab title of a domain.
pub fn title(domain: Domain) -> &'static str {
    match domain {
        Domain::Product => "Products",
        Domain::Store => "Stores",
    }
}

/// Icon for a node at `depth`; terminal nodes get their own glyph.
pub fn icon(domain: Domain, depth: usize, leaf: bool) -> &'static str {
    if leaf {
        return match domain {
            Domain::Product => "▸",
            Domain::Store => "⌂",
        };
    }
    let icons = match domain {
        Domain::Product => PRODUCT_ICONS,
        Domain::Store => STORE_ICONS,
    };
    icons[depth.min(icons.len() - 1)]
}

/// Display text of a node: terminal nodes read `Article 1001` or
/// `Store 104`, everything else shows its value.
pub fn label(domain: Domain, node: &Node) -> String {
    leaf_label(domain, &node.name, node.is_leaf())
}

pub fn leaf_label(domain: Domain, name: &str, leaf: bool) -> String {
    if !leaf {
        return name.to_string();
    }
    match domain {
        Domain::Product => format!("Article {name}"),
        Domain::Store => format!("Store {name}"),
    }
}
