//! End-to-end compile → execute scenarios over a blog query file.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::json;
use sqlbook::prelude::*;

const BLOG_SQL: &str = "
-- name: publishBlog<!
insert into blogs (
  userid,
  title,
  content,
  published
)
values (
  :userid,
  :title,
  :content,
  :published
)

-- name: removeTwoBlogs*!
delete from blogs where blogid = :blogid1
delete from blogs where blogid = :blogid2

-- name: runMaintenance#
select * from blogs

-- name: removeBlog!
-- Remove a blog from the database
delete from blogs where blogid = :blogid;

-- name: getCurrentUser?
select * from users where userid = :userid

-- name: getUserBlogs
-- Get blogs authored by a user.
  select title,
         published
    from blogs
   where userid = :userid
order by published desc;
";

#[derive(Debug, Clone, PartialEq)]
struct Call {
    method: &'static str,
    sql: String,
    params: Vec<Value>,
}

/// Test double standing in for a database driver: records every call and
/// echoes its bindings back as the result.
#[derive(Clone, Default)]
struct RecordingAdapter {
    calls: Arc<Mutex<Vec<Call>>>,
    select_result: Arc<Mutex<Option<serde_json::Value>>>,
}

impl RecordingAdapter {
    fn record(&self, method: &'static str, sql: &str, params: &[Value]) {
        self.calls.lock().unwrap().push(Call {
            method,
            sql: sql.to_string(),
            params: params.to_vec(),
        });
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Make `select` return `result` instead of echoing its bindings.
    fn fix_select(&self, result: serde_json::Value) {
        *self.select_result.lock().unwrap() = Some(result);
    }

    fn echo(params: &[Value]) -> serde_json::Value {
        serde_json::Value::Array(params.iter().map(serde_json::Value::from).collect())
    }
}

#[async_trait]
impl Adapter for RecordingAdapter {
    async fn execute_script(&self, sql: &str) -> SqlbookResult<()> {
        self.record("execute_script", sql, &[]);
        Ok(())
    }

    async fn insert_returning(
        &self,
        sql: &str,
        params: &[Value],
    ) -> SqlbookResult<serde_json::Value> {
        self.record("insert_returning", sql, params);
        Ok(Self::echo(params))
    }

    async fn insert_update_delete(&self, sql: &str, params: &[Value]) -> SqlbookResult<()> {
        self.record("insert_update_delete", sql, params);
        Ok(())
    }

    async fn insert_update_delete_many(&self, sql: &str, params: &[Value]) -> SqlbookResult<()> {
        self.record("insert_update_delete_many", sql, params);
        Ok(())
    }

    async fn select(&self, sql: &str, params: &[Value]) -> SqlbookResult<serde_json::Value> {
        self.record("select", sql, params);
        let fixed = self.select_result.lock().unwrap().clone();
        Ok(fixed.unwrap_or_else(|| Self::echo(params)))
    }
}

fn setup() -> (CompiledSet, RecordingAdapter, Executor) {
    let queries = sqlbook::compile(BLOG_SQL).expect("fixture should compile");
    let adapter = RecordingAdapter::default();
    let executor = Executor::with_adapter(adapter.clone());
    (queries, adapter, executor)
}

#[test]
fn fixture_compiles_to_all_named_queries() {
    let queries = sqlbook::compile(BLOG_SQL).expect("fixture should compile");
    assert_eq!(queries.len(), 6);
    for name in [
        "publishBlog",
        "removeTwoBlogs",
        "runMaintenance",
        "removeBlog",
        "getCurrentUser",
        "getUserBlogs",
    ] {
        assert!(queries.get(name).is_some(), "missing {name}");
    }
}

#[tokio::test]
async fn publish_blog_forwards_named_values_in_textual_order() {
    let (queries, adapter, executor) = setup();
    let query = queries.get("publishBlog").unwrap();
    assert_eq!(query.operation, Operation::InsertReturning);

    let args = Args::new()
        .bind_named("userid", 10)
        .bind_named("title", "title")
        .bind_named("content", "content")
        .bind_named("published", true);
    let result = executor.execute(query, &args).await.unwrap();

    assert_eq!(result, Some(json!([10, "title", "content", true])));
    let calls = adapter.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].method, "insert_returning");
    assert_eq!(calls[0].sql, query.query_string);
}

#[tokio::test]
async fn script_runs_without_bindings() {
    let (queries, adapter, executor) = setup();
    let query = queries.get("runMaintenance").unwrap();
    assert_eq!(query.operation, Operation::Script);

    // Bound values are ignored for scripts.
    let result = executor.execute(query, &Args::new().bind(1)).await.unwrap();

    assert_eq!(result, None);
    assert_eq!(
        adapter.calls(),
        vec![Call {
            method: "execute_script",
            sql: query.query_string.clone(),
            params: vec![],
        }]
    );
}

#[tokio::test]
async fn remove_blog_dispatches_a_single_mutation() {
    let (queries, adapter, executor) = setup();
    let query = queries.get("removeBlog").unwrap();
    assert_eq!(query.operation, Operation::InsertUpdateDelete);
    assert_eq!(query.docs, "Remove a blog from the database\n");
    assert_eq!(query.query_string, "delete from blogs where blogid = :blogid;");
    assert_eq!(
        query.params,
        vec![Parameter::Named {
            name: "blogid".to_string()
        }]
    );

    let result = executor
        .execute(query, &Args::new().bind_named("blogid", 10))
        .await
        .unwrap();

    assert_eq!(result, None);
    assert_eq!(
        adapter.calls(),
        vec![Call {
            method: "insert_update_delete",
            sql: query.query_string.clone(),
            params: vec![Value::Int(10)],
        }]
    );
}

#[tokio::test]
async fn remove_two_blogs_dispatches_a_batch() {
    let (queries, adapter, executor) = setup();
    let query = queries.get("removeTwoBlogs").unwrap();
    assert_eq!(query.operation, Operation::InsertUpdateDeleteMany);

    let args = Args::new().bind_named("blogid1", 10).bind_named("blogid2", 20);
    let result = executor.execute(query, &args).await.unwrap();

    assert_eq!(result, None);
    assert_eq!(
        adapter.calls(),
        vec![Call {
            method: "insert_update_delete_many",
            sql: query.query_string.clone(),
            params: vec![Value::Int(10), Value::Int(20)],
        }]
    );
}

#[tokio::test]
async fn select_returns_the_adapter_result_as_is() {
    let (queries, _adapter, executor) = setup();
    let query = queries.get("getUserBlogs").unwrap();
    assert_eq!(query.operation, Operation::Select);
    assert_eq!(query.docs, "Get blogs authored by a user.\n");

    let result = executor
        .execute(query, &Args::new().bind_named("userid", 100))
        .await
        .unwrap();

    assert_eq!(result, Some(json!([100])));
}

#[tokio::test]
async fn select_one_row_collapses_a_single_row() {
    let (queries, _adapter, executor) = setup();
    let query = queries.get("getCurrentUser").unwrap();
    assert_eq!(query.operation, Operation::SelectOneRow);

    // The echo adapter yields one row: the single bound value.
    let result = executor
        .execute(query, &Args::new().bind_named("userid", 100))
        .await
        .unwrap();

    assert_eq!(result, Some(json!(100)));
}

#[tokio::test]
async fn select_one_row_yields_nothing_when_not_found() {
    let (queries, adapter, executor) = setup();
    adapter.fix_select(json!([]));

    let result = executor
        .execute(
            queries.get("getCurrentUser").unwrap(),
            &Args::new().bind_named("userid", 100),
        )
        .await
        .unwrap();

    assert_eq!(result, None);
}

#[tokio::test]
async fn select_one_row_yields_nothing_on_many_rows() {
    let (queries, adapter, executor) = setup();
    adapter.fix_select(json!([100, 20]));

    let result = executor
        .execute(
            queries.get("getCurrentUser").unwrap(),
            &Args::new().bind_named("userid", 100),
        )
        .await
        .unwrap();

    assert_eq!(result, None);
}

#[tokio::test]
async fn select_one_row_yields_nothing_on_non_sequence_result() {
    let (queries, adapter, executor) = setup();
    adapter.fix_select(json!({"userid": 100}));

    let result = executor
        .execute(
            queries.get("getCurrentUser").unwrap(),
            &Args::new().bind_named("userid", 100),
        )
        .await
        .unwrap();

    assert_eq!(result, None);
}

#[tokio::test]
async fn interleaved_positional_and_named_values_line_up() {
    let queries =
        sqlbook::compile("-- name: interleaved\nselect * from t where a = ? and b = :b and c = ?")
            .expect("compile failed");
    let query = queries.get("interleaved").unwrap();

    let adapter = RecordingAdapter::default();
    let executor = Executor::with_adapter(adapter.clone());

    let args = Args::new().bind(10).bind(20).bind_named("b", 99);
    let result = executor.execute(query, &args).await.unwrap();

    assert_eq!(result, Some(json!([10, 99, 20])));
    assert_eq!(
        adapter.calls()[0].params,
        vec![Value::Int(10), Value::Int(99), Value::Int(20)]
    );
}

#[tokio::test]
async fn execute_without_an_adapter_fails() {
    let queries = sqlbook::compile(BLOG_SQL).expect("fixture should compile");
    let executor = Executor::new();

    let err = executor
        .execute(queries.get("getCurrentUser").unwrap(), &Args::new())
        .await
        .unwrap_err();

    assert!(matches!(err, SqlbookError::AdapterNotRegistered));
}
