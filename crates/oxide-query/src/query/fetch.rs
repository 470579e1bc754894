//! Executing a query through a [`Connection`].

use super::{ClauseInput, ClauseItem, ColumnKey, Columns, Query};
use crate::connection::{Connection, Row};
use crate::error::Result;
use crate::expression::Expression;
use crate::value::{Params, Value};

impl Query {
    /// Executes the query and returns all rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the query cannot be built or execution fails.
    pub async fn all<C: Connection>(&self, db: &C) -> Result<Vec<Row>> {
        self.create_command(db)?.query_all().await
    }

    /// Executes the query and returns the first row.
    ///
    /// # Errors
    ///
    /// Returns an error if the query cannot be built or execution fails.
    pub async fn one<C: Connection>(&self, db: &C) -> Result<Option<Row>> {
        self.create_command(db)?.query_one().await
    }

    /// Returns the first column of the first row.
    ///
    /// # Errors
    ///
    /// Returns an error if the query cannot be built or execution fails.
    pub async fn scalar<C: Connection>(&self, db: &C) -> Result<Option<Value>> {
        self.create_command(db)?.query_scalar().await
    }

    /// Returns the first column of every row.
    ///
    /// # Errors
    ///
    /// Returns an error if the query cannot be built or execution fails.
    pub async fn column<C: Connection>(&self, db: &C) -> Result<Vec<Value>> {
        self.create_command(db)?.query_column().await
    }

    /// Returns whether the query yields any row, via `SELECT EXISTS(...)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query cannot be built or execution fails.
    pub async fn exists<C: Connection>(&self, db: &C) -> Result<bool> {
        let (sql, params) = db.query_builder().build(self, Params::new())?;
        let command = db.create_command(format!("SELECT EXISTS({sql})"), params);
        Ok(command.query_scalar().await?.as_ref().is_some_and(is_truthy))
    }

    /// Returns `COUNT(expr)`; `expr` is usually `*`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query cannot be built or execution fails.
    pub async fn count<C: Connection>(&self, db: &C, expr: &str) -> Result<i64> {
        let value = self.aggregate(format!("COUNT({expr})")).scalar(db).await?;
        Ok(value.as_ref().map_or(0, as_i64))
    }

    /// Returns `SUM(expr)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query cannot be built or execution fails.
    pub async fn sum<C: Connection>(&self, db: &C, expr: &str) -> Result<Option<Value>> {
        self.aggregate(format!("SUM({expr})")).scalar(db).await
    }

    /// Returns `AVG(expr)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query cannot be built or execution fails.
    pub async fn average<C: Connection>(&self, db: &C, expr: &str) -> Result<Option<Value>> {
        self.aggregate(format!("AVG({expr})")).scalar(db).await
    }

    /// Returns `MIN(expr)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query cannot be built or execution fails.
    pub async fn min<C: Connection>(&self, db: &C, expr: &str) -> Result<Option<Value>> {
        self.aggregate(format!("MIN({expr})")).scalar(db).await
    }

    /// Returns `MAX(expr)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query cannot be built or execution fails.
    pub async fn max<C: Connection>(&self, db: &C, expr: &str) -> Result<Option<Value>> {
        self.aggregate(format!("MAX({expr})")).scalar(db).await
    }

    /// Rewrites the query to select only `select`.
    ///
    /// ORDER BY, LIMIT and OFFSET are dropped since they do not change an
    /// aggregate. Distinct or grouped queries are wrapped as a sub-query so
    /// the aggregate runs over their rows.
    #[must_use]
    pub fn aggregate(&self, select: String) -> Self {
        let expression = Expression::new(select);
        if self.distinct || !self.group_by.is_empty() || self.having.is_some() {
            return Self::new()
                .select(expression)
                .from(ClauseInput::map([("c", ClauseItem::from(self.clone()))]));
        }
        let mut query = self.clone();
        query.select = Columns::from([(ColumnKey::Position(0), ClauseItem::Expression(expression))]);
        query.select_option = None;
        query.order_by.clear();
        query.limit = None;
        query.offset = None;
        query
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Int(n) => *n != 0,
        Value::Float(f) => f.abs() > f64::EPSILON,
        Value::Text(s) => matches!(s.as_str(), "1" | "t" | "true" | "TRUE"),
        _ => false,
    }
}

#[allow(clippy::cast_possible_truncation)]
fn as_i64(value: &Value) -> i64 {
    match value {
        Value::Int(n) => *n,
        Value::Float(f) => *f as i64,
        Value::Text(s) => s.trim().parse().unwrap_or(0),
        Value::Bool(b) => i64::from(*b),
        _ => 0,
    }
}
