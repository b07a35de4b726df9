//! Compiled query descriptors.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Execution semantics selected by the tag suffix on a query's name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    /// Tag `<!`: insert that hands a value back (e.g. the generated key).
    InsertReturning,
    /// Tag `!`: single mutating statement, result discarded.
    InsertUpdateDelete,
    /// Tag `*!`: batch of mutating statements, result discarded.
    InsertUpdateDeleteMany,
    /// Tag `#`: multi-statement script; bound values are never forwarded.
    Script,
    /// Tag `?`: select collapsed to exactly one row, or nothing.
    SelectOneRow,
    /// No tag: plain select, result returned as-is.
    Select,
}

/// One placeholder occurrence in a query body.
///
/// Every `?` in the body is its own `Positional` entry; order in the
/// descriptor's parameter list is what lines entries up with caller values,
/// never identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Parameter {
    /// A bare `?`: consumes the next unused positional argument.
    Positional,
    /// `:name`: resolved from the caller's keyword arguments.
    Named { name: String },
}

/// An immutable compiled query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    /// Unique key within a [`CompiledSet`].
    pub name: String,
    /// Dispatch semantics derived from the name's tag suffix.
    pub operation: Operation,
    /// Doc-comment text, one line per comment, empty if the query has none.
    pub docs: String,
    /// SQL body with header and doc lines removed, surrounding whitespace
    /// trimmed, placeholders left in their original textual form.
    pub query_string: String,
    /// One entry per placeholder occurrence, in textual order.
    pub params: Vec<Parameter>,
}

impl Query {
    /// Names of the named placeholders, in order of appearance.
    ///
    /// A name used twice in the body appears twice here.
    pub fn named_params(&self) -> Vec<&str> {
        self.params
            .iter()
            .filter_map(|param| match param {
                Parameter::Named { name } => Some(name.as_str()),
                Parameter::Positional => None,
            })
            .collect()
    }

    /// Body rewritten for drivers that only bind positionally: the first
    /// occurrence of each distinct `:name` becomes `?`.
    pub fn to_positional_sql(&self) -> String {
        let mut seen: Vec<&str> = Vec::new();
        let mut sql = self.query_string.clone();
        for name in self.named_params() {
            if seen.contains(&name) {
                continue;
            }
            seen.push(name);
            sql = sql.replacen(&format!(":{name}"), "?", 1);
        }
        sql
    }
}

/// Queries compiled from one source text, keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompiledSet {
    pub queries: BTreeMap<String, Query>,
}

impl CompiledSet {
    /// Look a query up by name.
    pub fn get(&self, name: &str) -> Option<&Query> {
        self.queries.get(name)
    }

    pub fn len(&self) -> usize {
        self.queries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }

    /// Iterate descriptors in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Query> {
        self.queries.values()
    }

    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, String> {
        serde_json::to_string_pretty(self).map_err(|e| format!("JSON serialization failed: {}", e))
    }

    /// Import from JSON.
    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| format!("JSON deserialization failed: {}", e))
    }
}
