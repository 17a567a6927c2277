//! Core value types for drill-core.
//!
//! This module defines the fundamental data structures shared across the
//! engine and the backends: dataset [`Scalar`] values and [`Row`]s, validated
//! SQL identifiers ([`Ident`]), the ordered filter [`Context`] a node carries,
//! and the deterministic [`NodeId`].

use crate::error::ExplorerError;
use regex::Regex;
use serde::{ser::SerializeMap, Deserialize, Serialize, Serializer};
use std::cmp::Ordering;
use std::sync::OnceLock;

/// One row returned by the forecast API: column name → JSON value.
pub type Row = serde_json::Map<String, serde_json::Value>;

// ---------------------------------------------------------------------------
// Scalar
// ---------------------------------------------------------------------------

/// A non-null dataset value. Category names are text, store numbers and
/// article ids are usually integers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    /// Convert a JSON cell into a scalar. `null`, arrays and objects have no
    /// scalar form and yield `None`.
    pub fn from_json(value: &serde_json::Value) -> Option<Scalar> {
        match value {
            serde_json::Value::Bool(b) => Some(Scalar::Bool(*b)),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(Scalar::Int)
                .or_else(|| n.as_f64().map(Scalar::Float)),
            serde_json::Value::String(s) => Some(Scalar::Text(s.clone())),
            _ => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Scalar::Bool(b) => serde_json::Value::Bool(*b),
            Scalar::Int(i) => serde_json::Value::from(*i),
            Scalar::Float(f) => serde_json::Value::from(*f),
            Scalar::Text(s) => serde_json::Value::String(s.clone()),
        }
    }

    /// Whether this value equals a JSON cell. Numbers compare numerically so
    /// `1` matches `1.0`.
    pub fn matches_json(&self, cell: &serde_json::Value) -> bool {
        match (self, Scalar::from_json(cell)) {
            (_, None) => false,
            (a, Some(b)) => a.total_cmp(&b) == Ordering::Equal,
        }
    }

    /// Deterministic ordering: numbers numerically, everything else by its
    /// display text. Mixed number/text compares as text.
    pub fn total_cmp(&self, other: &Scalar) -> Ordering {
        match (self.as_f64(), other.as_f64()) {
            (Some(a), Some(b)) => a.total_cmp(&b),
            _ => self.to_string().cmp(&other.to_string()),
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Int(i) => Some(*i as f64),
            Scalar::Float(f) => Some(*f),
            _ => None,
        }
    }
}

impl std::fmt::Display for Scalar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Int(i) => write!(f, "{i}"),
            Scalar::Float(x) => write!(f, "{x}"),
            Scalar::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Text(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::Text(s)
    }
}

impl From<i64> for Scalar {
    fn from(i: i64) -> Self {
        Scalar::Int(i)
    }
}

// ---------------------------------------------------------------------------
// Ident
// ---------------------------------------------------------------------------

/// A validated SQL identifier (`[A-Za-z_][A-Za-z0-9_]*`).
///
/// Hierarchy levels and the table name are spliced into query text, so they
/// are only ever accepted through [`Ident::new`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ident(String);

fn ident_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is a valid regex")
    })
}

impl Ident {
    pub fn new(name: impl Into<String>) -> Result<Self, ExplorerError> {
        let name = name.into();
        if ident_pattern().is_match(&name) {
            Ok(Ident(name))
        } else {
            Err(ExplorerError::InvalidLevel(name))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Ident {
    type Error = ExplorerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Ident::new(value)
    }
}

impl From<Ident> for String {
    fn from(ident: Ident) -> Self {
        ident.0
    }
}

impl std::fmt::Display for Ident {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for Ident {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Ident {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

/// Ordered level → value filter set identifying a node's position.
///
/// Entries keep hierarchy order. Serializes as a JSON object in that order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context(Vec<(Ident, Scalar)>);

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a copy of this context extended by one entry.
    ///
    /// An existing entry for `level` is replaced in place, so a context never
    /// holds the same level twice.
    pub fn with(&self, level: Ident, value: Scalar) -> Context {
        let mut entries = self.0.clone();
        match entries.iter_mut().find(|(l, _)| *l == level) {
            Some(entry) => entry.1 = value,
            None => entries.push((level, value)),
        }
        Context(entries)
    }

    pub fn get(&self, level: &str) -> Option<&Scalar> {
        self.0.iter().find(|(l, _)| l == level).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Ident, &Scalar)> {
        self.0.iter().map(|(l, v)| (l, v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The last entry, i.e. the node's own `(level, value)`.
    pub fn last(&self) -> Option<(&Ident, &Scalar)> {
        self.0.last().map(|(l, v)| (l, v))
    }

    /// Every prefix of this context, shortest first (`[a]`, `[a, b]`, …).
    pub fn prefixes(&self) -> impl Iterator<Item = Context> + '_ {
        (1..=self.0.len()).map(|n| Context(self.0[..n].to_vec()))
    }

    /// Whether `self` equals `parent` plus exactly one new entry.
    pub fn extends(&self, parent: &Context) -> bool {
        self.0.len() == parent.0.len() + 1
            && self.0[..parent.0.len()] == parent.0[..]
            && !parent.0.iter().any(|(l, _)| Some(l) == self.0.last().map(|(l, _)| l))
    }
}

impl Serialize for Context {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (level, value) in &self.0 {
            map.serialize_entry(level.as_str(), value)?;
        }
        map.end()
    }
}

impl FromIterator<(Ident, Scalar)> for Context {
    fn from_iter<I: IntoIterator<Item = (Ident, Scalar)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Context::new(), |ctx, (level, value)| ctx.with(level, value))
    }
}

// ---------------------------------------------------------------------------
// NodeId
// ---------------------------------------------------------------------------

/// Deterministic node identity: `level-value` at the root,
/// `level-parentId-value` below it.
///
/// Values are escaped (`%` → `%25`, `-` → `%2D`) before concatenation and
/// levels are identifiers without `-`, so two different paths never produce
/// the same id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

const SEPARATOR: char = '-';

fn escape_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '%' => out.push_str("%25"),
            SEPARATOR => out.push_str("%2D"),
            c => out.push(c),
        }
    }
    out
}

impl NodeId {
    pub fn root(level: &str, value: &str) -> Self {
        NodeId(format!("{level}{SEPARATOR}{}", escape_value(value)))
    }

    pub fn child(level: &str, parent: &NodeId, value: &str) -> Self {
        NodeId(format!(
            "{level}{SEPARATOR}{}{SEPARATOR}{}",
            parent.0,
            escape_value(value)
        ))
    }

    /// Derive the id of the node addressed by `context` (root first).
    pub fn for_context(context: &Context) -> Option<NodeId> {
        context.iter().fold(None, |parent, (level, value)| {
            let value = value.to_string();
            Some(match parent {
                None => NodeId::root(level.as_str(), &value),
                Some(parent) => NodeId::child(level.as_str(), &parent, &value),
            })
        })
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
