//! Dispatch executor: binds caller arguments and routes descriptors to an
//! adapter.
//!
//! The executor owns nothing but the adapter handle. Argument resolution is
//! pure computation local to each call, so concurrent `execute` calls never
//! interfere; ordering across independent calls is whatever the adapter
//! makes of it.

use std::collections::HashMap;
use std::sync::Arc;

use crate::adapter::{Adapter, Value};
use crate::error::{SqlbookError, SqlbookResult};
use crate::query::{Operation, Parameter, Query};

/// Caller-supplied arguments for one `execute` call.
///
/// Not retained by the executor; build a fresh bundle per call.
#[derive(Debug, Clone, Default)]
pub struct Args {
    /// Values consumed by `?` placeholders, in order.
    pub positional: Vec<Value>,
    /// Values looked up by `:name` placeholders.
    pub keyword: HashMap<String, Value>,
}

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value for the next `?` placeholder.
    pub fn bind(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Supply a value for a `:name` placeholder.
    pub fn bind_named(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.keyword.insert(name.into(), value.into());
        self
    }
}

/// Executes compiled queries against one adapter.
///
/// The adapter is an explicit dependency of the value, not process state:
/// inject it at construction with [`Executor::with_adapter`] or swap it later
/// with [`Executor::register_adapter`] (the last registration wins).
#[derive(Clone, Default)]
pub struct Executor {
    adapter: Option<Arc<dyn Adapter>>,
}

impl Executor {
    /// An executor with no adapter; `execute` fails until one is registered.
    pub fn new() -> Self {
        Self { adapter: None }
    }

    /// An executor bound to `adapter` from the start.
    pub fn with_adapter(adapter: impl Adapter + 'static) -> Self {
        Self {
            adapter: Some(Arc::new(adapter)),
        }
    }

    /// Replace the held adapter.
    pub fn register_adapter(&mut self, adapter: impl Adapter + 'static) {
        self.adapter = Some(Arc::new(adapter));
    }

    /// Execute a compiled query with the given argument bundle.
    ///
    /// Returns `Ok(None)` for the operations whose result is discarded
    /// (mutations, scripts) and for a `SelectOneRow` that did not find
    /// exactly one row. Adapter failures propagate unchanged.
    pub async fn execute(
        &self,
        query: &Query,
        args: &Args,
    ) -> SqlbookResult<Option<serde_json::Value>> {
        let adapter = self
            .adapter
            .as_ref()
            .ok_or(SqlbookError::AdapterNotRegistered)?;
        let sql = query.query_string.as_str();

        match query.operation {
            Operation::InsertReturning => {
                let params = resolve_params(&query.params, args);
                adapter.insert_returning(sql, &params).await.map(Some)
            }
            Operation::InsertUpdateDelete => {
                let params = resolve_params(&query.params, args);
                adapter.insert_update_delete(sql, &params).await?;
                Ok(None)
            }
            Operation::InsertUpdateDeleteMany => {
                let params = resolve_params(&query.params, args);
                adapter.insert_update_delete_many(sql, &params).await?;
                Ok(None)
            }
            Operation::Script => {
                adapter.execute_script(sql).await?;
                Ok(None)
            }
            Operation::SelectOneRow => {
                let params = resolve_params(&query.params, args);
                let result = adapter.select(sql, &params).await?;
                match result {
                    serde_json::Value::Array(mut rows) if rows.len() == 1 => {
                        Ok(Some(rows.remove(0)))
                    }
                    _ => Ok(None),
                }
            }
            Operation::Select => {
                let params = resolve_params(&query.params, args);
                adapter.select(sql, &params).await.map(Some)
            }
        }
    }
}

/// Flatten an argument bundle into the ordered list the adapter expects.
///
/// Walks the parameter list left to right with a cursor counting consumed
/// positional entries, so the Nth `?` in the query text always takes the Nth
/// caller-supplied positional value no matter how many named placeholders
/// are interleaved. Missing values resolve to [`Value::Null`].
fn resolve_params(params: &[Parameter], args: &Args) -> Vec<Value> {
    let mut resolved = Vec::with_capacity(params.len());
    let mut consumed = 0;

    for param in params {
        match param {
            Parameter::Positional => {
                resolved.push(
                    args.positional
                        .get(consumed)
                        .cloned()
                        .unwrap_or(Value::Null),
                );
                consumed += 1;
            }
            Parameter::Named { name } => {
                resolved.push(args.keyword.get(name).cloned().unwrap_or(Value::Null));
            }
        }
    }

    resolved
}
