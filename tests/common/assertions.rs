//! Domain-specific assertion macros for drill harnesses.
//!
//! These wrap `pretty_assertions` and say *which* node or view was wrong, so
//! a failure in a long drill-down scenario points at the right step.

// ---------------------------------------------------------------------------
// Tree shape
// ---------------------------------------------------------------------------

/// Assert the names of the children currently shown under a node.
///
/// ```rust
/// assert_children!(explorer, vertical("Apparel"), ["Outerwear", "Pants", "Shirts"]);
/// ```
#[macro_export]
macro_rules! assert_children {
    ($explorer:expr, $id:expr, [$($name:expr),* $(,)?]) => {{
        let id: drill_core::NodeId = $id;
        let expected: Vec<String> = vec![$($name.to_string()),*];
        let actual = $crate::common::child_names(&$explorer, &id);
        pretty_assertions::assert_eq!(actual, expected, "children of {}", id);
    }};
}

/// Assert the rows of the tree view, depth first.
#[macro_export]
macro_rules! assert_visible {
    ($explorer:expr, [$($name:expr),* $(,)?]) => {{
        let expected: Vec<String> = vec![$($name.to_string()),*];
        let actual = $crate::common::visible_names(&$explorer);
        pretty_assertions::assert_eq!(actual, expected, "visible tree rows");
    }};
}

/// Assert the names of the global search results, in order.
#[macro_export]
macro_rules! assert_results {
    ($explorer:expr, [$($name:expr),* $(,)?]) => {{
        let expected: Vec<String> = vec![$($name.to_string()),*];
        let actual = $crate::common::result_names(&$explorer);
        pretty_assertions::assert_eq!(
            actual,
            expected,
            "global results for {:?}",
            $explorer.global().term()
        );
    }};
}

// ---------------------------------------------------------------------------
// Error slot
// ---------------------------------------------------------------------------

/// Assert the explorer's error slot is empty.
#[macro_export]
macro_rules! assert_no_error {
    ($explorer:expr) => {{
        if let Some(err) = $explorer.error() {
            panic!("assert_no_error! failed: explorer reports `{}`", err);
        }
    }};
}

/// Assert the explorer's error slot holds an error matching a pattern.
///
/// ```rust
/// assert_error!(explorer, ExplorerError::Fetch { node: None, .. });
/// ```
#[macro_export]
macro_rules! assert_error {
    ($explorer:expr, $pattern:pat $(if $guard:expr)? $(,)?) => {{
        match $explorer.error() {
            Some($pattern) $(if $guard)? => {}
            Some(other) => panic!(
                "assert_error! failed: expected {}, got {:?}",
                stringify!($pattern),
                other
            ),
            None => panic!(
                "assert_error! failed: expected {}, error slot is empty",
                stringify!($pattern)
            ),
        }
    }};
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Assert how many filtered (scoped or global) queries the backend received.
#[macro_export]
macro_rules! assert_search_queries {
    ($backend:expr, $n:expr) => {{
        let searches: Vec<_> = $backend
            .queries()
            .into_iter()
            .filter(|q| $crate::common::search_of(q).is_some())
            .collect();
        assert_eq!(
            searches.len(),
            $n,
            "assert_search_queries! failed, received: {:#?}",
            searches
        );
    }};
}
