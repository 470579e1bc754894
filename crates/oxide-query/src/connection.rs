//! The database collaborator.
//!
//! A [`Connection`] supplies the dialect and table prefix and executes
//! finalized SQL. Everything else (building, binding, inlining) happens in
//! this crate, so a connection only has to run statements.

use std::future::Future;

use indexmap::IndexMap;

use crate::builder::QueryBuilder;
use crate::command::Command;
use crate::dialect::Dialect;
use crate::error::Result;
use crate::value::{Params, Value};

/// A result row: column name to value, in select order.
pub type Row = IndexMap<String, Value>;

/// Rows returned by a statement plus the affected row count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    /// Returned rows.
    pub rows: Vec<Row>,
    /// Rows affected by a write statement.
    pub row_count: u64,
}

/// A database connection that can execute raw SQL.
pub trait Connection {
    /// Returns the SQL dialect of this connection.
    fn dialect(&self) -> &dyn Dialect;

    /// Returns the prefix substituted for `%` in `{{%table}}` markers.
    fn table_prefix(&self) -> &str {
        ""
    }

    /// Quotes a table name for this connection's dialect.
    fn quote_table_name(&self, name: &str) -> String {
        self.dialect().quote_table_name(name)
    }

    /// Quotes a column name for this connection's dialect.
    fn quote_column_name(&self, name: &str) -> String {
        self.dialect().quote_column_name(name)
    }

    /// Quotes a string literal for this connection's dialect.
    fn quote_value(&self, value: &str) -> String {
        self.dialect().quote_value(value)
    }

    /// Replaces `{{table}}` and `[[column]]` markers in `sql`.
    fn quote_sql(&self, sql: &str) -> String {
        self.dialect().quote_sql(sql, self.table_prefix())
    }

    /// Returns a query builder for this connection's dialect.
    fn query_builder(&self) -> QueryBuilder<'_> {
        QueryBuilder::new(self.dialect())
    }

    /// Creates a command for `sql` with its bound parameters.
    fn create_command(&self, sql: impl Into<String>, params: Params) -> Command<'_, Self>
    where
        Self: Sized,
    {
        Command::new(self, sql, params)
    }

    /// Executes finalized SQL.
    ///
    /// # Errors
    ///
    /// Implementations report driver failures as
    /// [`QueryError::Execution`](crate::error::QueryError::Execution).
    fn execute(&self, sql: &str) -> impl Future<Output = Result<QueryResult>> + Send;
}
