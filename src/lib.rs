//! # sqlbook — named SQL compiled from plain text
//!
//! > **Call your queries, not your strings.**
//!
//! sqlbook turns a block of annotated SQL into named, tagged query
//! descriptors and dispatches them through a pluggable storage adapter.
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use sqlbook::prelude::*;
//!
//! let queries = sqlbook::compile("
//! -- name: currentUser?
//! select * from users where userid = :userid
//! ")?;
//!
//! let executor = Executor::with_adapter(MyAdapter::connect(url).await?);
//! let user = executor
//!     .execute(queries.get("currentUser").unwrap(), &Args::new().bind_named("userid", 7))
//!     .await?;
//! ```
//!
//! ## Name tags
//!
//! | Suffix | Operation              | Adapter method              | Result             |
//! |--------|------------------------|-----------------------------|--------------------|
//! | `<!`   | InsertReturning        | `insert_returning`          | returned           |
//! | `*!`   | InsertUpdateDeleteMany | `insert_update_delete_many` | discarded          |
//! | `!`    | InsertUpdateDelete     | `insert_update_delete`      | discarded          |
//! | `#`    | Script                 | `execute_script`            | discarded          |
//! | `?`    | SelectOneRow           | `select`                    | one row or nothing |
//! | none   | Select                 | `select`                    | returned           |

pub mod adapter;
pub mod compiler;
pub mod error;
pub mod executor;
pub mod query;

pub mod prelude {
    pub use crate::adapter::{Adapter, Value};
    pub use crate::compile;
    pub use crate::error::{SqlbookError, SqlbookResult};
    pub use crate::executor::{Args, Executor};
    pub use crate::query::{CompiledSet, Operation, Parameter, Query};
}

/// Compile annotated SQL source text into named query descriptors.
///
/// # Example
///
/// ```
/// let queries = sqlbook::compile("-- name: listUsers\nselect * from users").unwrap();
/// assert!(queries.get("listUsers").is_some());
/// ```
pub fn compile(source: &str) -> error::SqlbookResult<query::CompiledSet> {
    compiler::compile(source)
}
