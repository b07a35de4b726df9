//! The storage adapter contract and dynamic binding values.

use async_trait::async_trait;

use crate::error::SqlbookResult;

/// Dynamic value type for query bindings.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

/// Storage backend invoked by the executor.
///
/// Implementations own connections, transactions, and the driver's own
/// placeholder substitution; the executor hands them trimmed SQL text plus
/// bound values in placeholder order. Failures surface to the `execute`
/// caller exactly as returned, typically as
/// [`SqlbookError::Database`](crate::error::SqlbookError::Database).
#[async_trait]
pub trait Adapter: Send + Sync {
    /// Run a multi-statement script. Bound values are never forwarded.
    async fn execute_script(&self, sql: &str) -> SqlbookResult<()>;

    /// Run an insert that hands a value back.
    async fn insert_returning(
        &self,
        sql: &str,
        params: &[Value],
    ) -> SqlbookResult<serde_json::Value>;

    /// Run a single mutating statement.
    async fn insert_update_delete(&self, sql: &str, params: &[Value]) -> SqlbookResult<()>;

    /// Run a batch of mutating statements.
    async fn insert_update_delete_many(&self, sql: &str, params: &[Value]) -> SqlbookResult<()>;

    /// Run a query that yields rows.
    async fn select(&self, sql: &str, params: &[Value]) -> SqlbookResult<serde_json::Value>;
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&Value> for serde_json::Value {
    fn from(v: &Value) -> Self {
        match v {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::Number((*i).into()),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.clone()),
        }
    }
}

impl From<Value> for serde_json::Value {
    fn from(v: Value) -> Self {
        (&v).into()
    }
}
