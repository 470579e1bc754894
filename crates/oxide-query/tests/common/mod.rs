#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use oxide_query::{
    Connection, ConnectionConfig, Dialect, GenericDialect, Params, Query, QueryBuilder,
    QueryError, QueryResult, Result, Row, Value,
};

/// In-memory connection that records executed SQL and replays canned
/// results in order.
pub struct MockConnection {
    dialect: Box<dyn Dialect>,
    table_prefix: String,
    executed: Mutex<Vec<String>>,
    results: Mutex<VecDeque<QueryResult>>,
    fail: bool,
}

impl MockConnection {
    pub fn new() -> Self {
        Self::with_dialect(Box::new(GenericDialect::new()))
    }

    pub fn with_dialect(dialect: Box<dyn Dialect>) -> Self {
        Self {
            dialect,
            table_prefix: String::new(),
            executed: Mutex::new(Vec::new()),
            results: Mutex::new(VecDeque::new()),
            fail: false,
        }
    }

    pub fn from_config(json: &str) -> Self {
        let config = ConnectionConfig::from_json_str(json)
            .unwrap_or_else(|e| panic!("Invalid config: {json}\nError: {e}"));
        let mut db = Self::with_dialect(config.dialect());
        db.table_prefix = config.table_prefix;
        db
    }

    pub fn failing() -> Self {
        let mut db = Self::new();
        db.fail = true;
        db
    }

    /// Queues a result holding `rows`.
    pub fn push_rows(&self, rows: Vec<Row>) {
        let row_count = rows.len() as u64;
        self.results
            .lock()
            .unwrap()
            .push_back(QueryResult { rows, row_count });
    }

    /// Queues a single-row, single-column result.
    pub fn push_scalar(&self, value: impl Into<Value>) {
        self.push_rows(vec![row(&[("value", value.into())])]);
    }

    /// Returns every SQL string executed so far.
    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }

    pub fn last_sql(&self) -> String {
        self.executed()
            .last()
            .cloned()
            .unwrap_or_else(|| panic!("No SQL executed"))
    }
}

impl Connection for MockConnection {
    fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    fn table_prefix(&self) -> &str {
        &self.table_prefix
    }

    async fn execute(&self, sql: &str) -> Result<QueryResult> {
        self.executed.lock().unwrap().push(String::from(sql));
        if self.fail {
            return Err(QueryError::Execution(Box::new(std::io::Error::other(
                "connection refused",
            ))));
        }
        Ok(self.results.lock().unwrap().pop_front().unwrap_or_default())
    }
}

pub fn row(entries: &[(&str, Value)]) -> Row {
    entries
        .iter()
        .map(|(k, v)| (String::from(*k), v.clone()))
        .collect()
}

/// Builds `query` with the generic dialect.
pub fn build(query: &Query) -> (String, Params) {
    build_with(&GenericDialect::new(), query)
}

pub fn build_with(dialect: &dyn Dialect, query: &Query) -> (String, Params) {
    QueryBuilder::new(dialect)
        .build(query, Params::new())
        .unwrap_or_else(|e| panic!("Failed to build: {query:?}\nError: {e}"))
}

pub fn sql(query: &Query) -> String {
    build(query).0
}

/// Builds `query` for `db` and returns the SQL with parameters inlined.
pub fn raw_sql<C: Connection>(db: &C, query: &Query) -> String {
    query
        .create_command(db)
        .unwrap_or_else(|e| panic!("Failed to create command: {e}"))
        .raw_sql()
}
