//! # oxide-query
//!
//! A fluent SQL query model with a dialect-aware renderer.
//!
//! This crate provides:
//! - A [`Query`] model recording SELECT clauses as data
//! - Declarative conditions (strings, hash mappings, operator arrays)
//!   normalized into a closed [`Condition`] tree
//! - A [`QueryBuilder`] rendering queries to SQL with bound `:qpN`
//!   parameters
//! - Dialect quoting for PostgreSQL, MySQL and ANSI SQL
//! - [`Command`] finalization into raw SQL for a [`Connection`]
//!
//! ## Building a query
//!
//! ```rust
//! use oxide_query::{GenericDialect, Params, Query, QueryBuilder};
//! use serde_json::json;
//!
//! let query = Query::new()
//!     .select("id, name")
//!     .from("customer")
//!     .where_clause(json!({"status": 1, "type": [1, 2]}))
//!     .and_filter_where(json!({"city": null}));
//!
//! let dialect = GenericDialect::new();
//! let (sql, params) = QueryBuilder::new(&dialect)
//!     .build(&query, Params::new())
//!     .unwrap();
//!
//! assert_eq!(
//!     sql,
//!     r#"SELECT "id", "name" FROM "customer" WHERE "status" = :qp0 AND "type" IN (:qp1, :qp2)"#
//! );
//! assert_eq!(params.len(), 3);
//! ```
//!
//! ## SQL Injection Prevention
//!
//! Values in conditions are always bound as parameters:
//!
//! ```rust
//! use oxide_query::{GenericDialect, Params, Query, QueryBuilder, Value};
//! use serde_json::json;
//!
//! let user_input = "'; DROP TABLE users; --";
//! let query = Query::new().from("users").where_clause(json!({"name": user_input}));
//! let dialect = GenericDialect::new();
//! let (sql, params) = QueryBuilder::new(&dialect).build(&query, Params::new()).unwrap();
//!
//! assert_eq!(sql, r#"SELECT * FROM "users" WHERE "name" = :qp0"#);
//! assert_eq!(params[":qp0"], Value::from(user_input));
//! ```
//!
//! [`Expression`] text is spliced in verbatim and never escaped.

pub mod builder;
pub mod command;
pub mod condition;
pub mod config;
pub mod connection;
pub mod dialect;
pub mod error;
pub mod expression;
pub mod query;
pub mod schema;
pub mod value;

pub use builder::{ColumnDefinition, QueryBuilder};
pub use command::Command;
pub use condition::{filter_condition, Condition, ConditionRegistry};
pub use config::{ConnectionConfig, Driver};
pub use connection::{Connection, QueryResult, Row};
pub use dialect::{Dialect, GenericDialect, MysqlDialect, PostgresDialect};
pub use error::{QueryError, Result};
pub use expression::Expression;
pub use query::{ClauseInput, ClauseItem, Limit, OrderBy, Query, SortDirection};
pub use schema::{ColumnSchemaBuilder, ColumnType};
pub use value::{Params, Value};
