//! Query construction — structured requests and their parameterized SQL.
//!
//! A [`ForecastQuery`] states *what* is being asked (distinct values of one
//! level under a context, or a dataset-wide match). [`ForecastQuery::to_sql`]
//! renders it as SQL text with `$n` placeholders plus the bound values.
//! Filter values never enter the text; identifiers only do so as validated
//! [`Ident`]s.

use crate::hierarchy::Hierarchy;
use crate::types::{Context, Ident, Scalar};
use serde::{Deserialize, Serialize};

/// How sibling nodes are ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChildOrder {
    /// By the value itself.
    #[default]
    Value,
    /// By row count, largest first, ties broken by value.
    CountDesc,
}

/// A request against the forecast table.
#[derive(Debug, Clone, PartialEq)]
pub enum ForecastQuery {
    /// Distinct values of `target` (with row counts) under `context`,
    /// optionally narrowed to values containing `search`.
    LevelValues {
        target: Ident,
        context: Context,
        search: Option<String>,
        order: ChildOrder,
    },
    /// Distinct `(terminal, levels...)` tuples where any of `levels` contains
    /// `term`, ordered by the terminal column.
    GlobalMatch {
        terminal: Ident,
        levels: Vec<Ident>,
        term: String,
        limit: u32,
    },
}

impl ForecastQuery {
    /// Children (or roots, with an empty context) of a node.
    ///
    /// A blank search is the same as no search.
    pub fn level_values(
        target: &Ident,
        context: &Context,
        search: Option<&str>,
        order: ChildOrder,
    ) -> Self {
        ForecastQuery::LevelValues {
            target: target.clone(),
            context: context.clone(),
            search: search
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            order,
        }
    }

    /// Dataset-wide fallback for the global search box.
    pub fn global_match(hierarchy: &Hierarchy, term: &str, limit: u32) -> Self {
        ForecastQuery::GlobalMatch {
            terminal: hierarchy.terminal().clone(),
            levels: hierarchy.non_terminal().to_vec(),
            term: term.trim().to_string(),
            limit,
        }
    }

    /// Render as parameterized SQL against `table`.
    pub fn to_sql(&self, table: &Ident) -> SqlRequest {
        match self {
            ForecastQuery::LevelValues {
                target,
                context,
                search,
                order,
            } => {
                let mut b = SqlBuilder::new("SELECT ");
                b.push_ident(target)
                    .push(", COUNT(*) AS count FROM ")
                    .push_ident(table)
                    .push(" WHERE ");
                for (level, value) in context.iter() {
                    b.push_ident(level).push(" = ");
                    b.push_bind(value.clone());
                    b.push(" AND ");
                }
                b.push_ident(target).push(" IS NOT NULL");
                if let Some(term) = search {
                    b.push(" AND ");
                    b.push_text_cast(target).push(" ILIKE ");
                    b.push_bind(Scalar::Text(like_pattern(term)));
                }
                b.push(" GROUP BY ").push_ident(target).push(" ORDER BY ");
                match order {
                    ChildOrder::Value => b.push_ident(target),
                    ChildOrder::CountDesc => b.push("count DESC, ").push_ident(target),
                };
                b.build()
            }
            ForecastQuery::GlobalMatch {
                terminal,
                levels,
                term,
                limit,
            } => {
                // With no levels above the terminal one, match the terminal
                // column itself.
                let matched: &[Ident] = if levels.is_empty() {
                    std::slice::from_ref(terminal)
                } else {
                    levels
                };

                let mut b = SqlBuilder::new("SELECT DISTINCT ");
                b.push_ident(terminal);
                for level in levels {
                    b.push(", ").push_ident(level);
                }
                b.push(" FROM ").push_ident(table).push(" WHERE (");
                let pattern = b.bind_slot(Scalar::Text(like_pattern(term)));
                for (i, level) in matched.iter().enumerate() {
                    if i > 0 {
                        b.push(" OR ");
                    }
                    b.push_text_cast(level).push(" ILIKE ").push_slot(pattern);
                }
                b.push(") AND ")
                    .push_ident(terminal)
                    .push(" IS NOT NULL ORDER BY ")
                    .push_ident(terminal)
                    .push(" LIMIT ");
                b.push_bind(Scalar::Int(i64::from(*limit)));
                b.build()
            }
        }
    }

    /// The column whose values this query returns as node names.
    pub fn target(&self) -> &Ident {
        match self {
            ForecastQuery::LevelValues { target, .. } => target,
            ForecastQuery::GlobalMatch { terminal, .. } => terminal,
        }
    }
}

/// `%term%` with LIKE metacharacters escaped, so the match is a plain
/// case-insensitive substring test.
pub fn like_pattern(term: &str) -> String {
    let mut out = String::with_capacity(term.len() + 2);
    out.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}

// ---------------------------------------------------------------------------
// SQL text + bound values
// ---------------------------------------------------------------------------

/// Parameterized SQL as sent to the forecast API.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SqlRequest {
    pub sql_query: String,
    pub params: Vec<Scalar>,
}

/// Incremental builder in the style of `sqlx::QueryBuilder`: text is pushed
/// verbatim, values are pushed as `$n` placeholders.
#[derive(Debug)]
pub struct SqlBuilder {
    sql: String,
    params: Vec<Scalar>,
}

impl SqlBuilder {
    pub fn new(init: &str) -> Self {
        Self {
            sql: init.to_string(),
            params: Vec::new(),
        }
    }

    pub fn push(&mut self, text: &str) -> &mut Self {
        self.sql.push_str(text);
        self
    }

    pub fn push_ident(&mut self, ident: &Ident) -> &mut Self {
        self.sql.push_str(ident.as_str());
        self
    }

    fn push_text_cast(&mut self, ident: &Ident) -> &mut Self {
        self.push("CAST(").push_ident(ident).push(" AS TEXT)")
    }

    /// Bind `value` and write its placeholder.
    pub fn push_bind(&mut self, value: Scalar) -> &mut Self {
        let slot = self.bind_slot(value);
        self.push_slot(slot)
    }

    /// Bind `value` without writing anything; returns its 1-based slot.
    pub fn bind_slot(&mut self, value: Scalar) -> usize {
        self.params.push(value);
        self.params.len()
    }

    /// Write the placeholder of an already bound slot.
    pub fn push_slot(&mut self, slot: usize) -> &mut Self {
        self.sql.push('$');
        self.sql.push_str(&slot.to_string());
        self
    }

    pub fn build(self) -> SqlRequest {
        SqlRequest {
            sql_query: self.sql,
            params: self.params,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
