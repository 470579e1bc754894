//! The fluent query model.
//!
//! A [`Query`] records the clauses of a SELECT statement as data; nothing
//! is rendered until a [`QueryBuilder`] builds it. Every configuration
//! method takes the query by value and returns it, so chains read like
//!
//! ```
//! use oxide_query::{GenericDialect, Query, QueryBuilder, Params};
//! use serde_json::json;
//!
//! let query = Query::new()
//!     .select("id, name")
//!     .from("customer")
//!     .where_clause(json!({"status": 1}))
//!     .order_by("name DESC")
//!     .limit(10_u64);
//!
//! let dialect = GenericDialect::new();
//! let (sql, params) = QueryBuilder::new(&dialect).build(&query, Params::new()).unwrap();
//! assert_eq!(
//!     sql,
//!     r#"SELECT "id", "name" FROM "customer" WHERE "status" = :qp0 ORDER BY "name" DESC LIMIT 10"#
//! );
//! assert_eq!(params.len(), 1);
//! ```
//!
//! A cloned query is independent of the original.
//!
//! [`QueryBuilder`]: crate::builder::QueryBuilder

mod fetch;
mod input;
mod order;
pub(crate) mod tokenizer;

pub use input::{ClauseInput, ClauseItem, ColumnKey, Columns};
pub use order::{Limit, OrderBy, SortDirection};

use crate::command::Command;
use crate::condition::filter_condition;
use crate::condition::registry::normalize_keyword;
use crate::connection::Connection;
use crate::dialect::is_numeric;
use crate::error::Result;
use crate::value::{Params, Value};

use tokenizer::{split_alias, split_direction, split_list};

/// A JOIN clause.
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    /// Join keyword, e.g. `INNER JOIN`.
    pub kind: String,
    /// Joined table(s), normalized like FROM entries.
    pub tables: Columns,
    /// Join condition, if any.
    pub on: Option<Value>,
}

/// A SELECT query under construction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    select: Columns,
    select_option: Option<String>,
    distinct: bool,
    from: Columns,
    joins: Vec<Join>,
    where_condition: Option<Value>,
    group_by: Vec<ClauseItem>,
    having: Option<Value>,
    order_by: Vec<OrderBy>,
    limit: Option<Limit>,
    offset: Option<Limit>,
    params: Params,
}

impl Query {
    /// Creates an empty query (`SELECT *`).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // SELECT

    /// Sets the selected columns, replacing any previous selection.
    ///
    /// Text is split on top-level commas and each entry may carry an alias
    /// (`"id AS uid"`, `"t.id tid"`). Mapping keys are aliases.
    #[must_use]
    pub fn select(self, columns: impl Into<ClauseInput>) -> Self {
        self.select_with_option(columns, None::<String>)
    }

    /// Sets the selected columns and a select option such as
    /// `SQL_CALC_FOUND_ROWS`, rendered right after `SELECT`.
    #[must_use]
    pub fn select_with_option(
        mut self,
        columns: impl Into<ClauseInput>,
        option: Option<impl Into<String>>,
    ) -> Self {
        self.select = Columns::new();
        merge_columns(&mut self.select, normalize_select(columns.into()));
        self.select_option = option.map(Into::into);
        self
    }

    /// Adds columns to the selection.
    ///
    /// An alias that is already selected is replaced in place.
    #[must_use]
    pub fn add_select(mut self, columns: impl Into<ClauseInput>) -> Self {
        merge_columns(&mut self.select, normalize_select(columns.into()));
        self
    }

    /// Sets whether to select distinct rows.
    #[must_use]
    pub const fn distinct(mut self, distinct: bool) -> Self {
        self.distinct = distinct;
        self
    }

    // FROM / JOIN

    /// Sets the FROM tables.
    ///
    /// Text is split on top-level commas. Mapping keys are table aliases.
    #[must_use]
    pub fn from(mut self, tables: impl Into<ClauseInput>) -> Self {
        self.from = normalize_tables(tables.into());
        self
    }

    /// Appends a join of the given kind, e.g. `"LEFT JOIN"`.
    #[must_use]
    pub fn join(
        mut self,
        kind: impl Into<String>,
        tables: impl Into<ClauseInput>,
        on: impl Into<Value>,
    ) -> Self {
        let on = on.into();
        self.joins.push(Join {
            kind: kind.into(),
            tables: normalize_tables(tables.into()),
            on: (!matches!(on, Value::Null)).then_some(on),
        });
        self
    }

    /// Appends an `INNER JOIN`.
    #[must_use]
    pub fn inner_join(self, tables: impl Into<ClauseInput>, on: impl Into<Value>) -> Self {
        self.join("INNER JOIN", tables, on)
    }

    /// Appends a `LEFT JOIN`.
    #[must_use]
    pub fn left_join(self, tables: impl Into<ClauseInput>, on: impl Into<Value>) -> Self {
        self.join("LEFT JOIN", tables, on)
    }

    /// Appends a `RIGHT JOIN`.
    #[must_use]
    pub fn right_join(self, tables: impl Into<ClauseInput>, on: impl Into<Value>) -> Self {
        self.join("RIGHT JOIN", tables, on)
    }

    // WHERE

    /// Sets the WHERE condition, replacing any previous one.
    #[must_use]
    pub fn where_clause(mut self, condition: impl Into<Value>) -> Self {
        self.where_condition = Some(condition.into());
        self
    }

    /// Sets the WHERE condition, adding `params`.
    #[must_use]
    pub fn where_with<I, K, V>(self, condition: impl Into<Value>, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.where_clause(condition).add_params(params)
    }

    /// Combines `condition` with the existing WHERE condition using `AND`.
    #[must_use]
    pub fn and_where(mut self, condition: impl Into<Value>) -> Self {
        self.where_condition = Some(compose(self.where_condition.take(), "and", condition.into()));
        self
    }

    /// Like [`and_where`](Self::and_where), adding `params`.
    #[must_use]
    pub fn and_where_with<I, K, V>(self, condition: impl Into<Value>, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.and_where(condition).add_params(params)
    }

    /// Combines `condition` with the existing WHERE condition using `OR`.
    #[must_use]
    pub fn or_where(mut self, condition: impl Into<Value>) -> Self {
        self.where_condition = Some(compose(self.where_condition.take(), "or", condition.into()));
        self
    }

    /// Like [`or_where`](Self::or_where), adding `params`.
    #[must_use]
    pub fn or_where_with<I, K, V>(self, condition: impl Into<Value>, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.or_where(condition).add_params(params)
    }

    /// Sets the WHERE condition after dropping empty operands.
    ///
    /// Nothing happens when the filtered condition is empty. Plain text
    /// conditions are never applied.
    #[must_use]
    pub fn filter_where(self, condition: impl Into<Value>) -> Self {
        match filtered(condition.into()) {
            Some(condition) => self.where_clause(condition),
            None => self,
        }
    }

    /// Filtered [`and_where`](Self::and_where).
    #[must_use]
    pub fn and_filter_where(self, condition: impl Into<Value>) -> Self {
        match filtered(condition.into()) {
            Some(condition) => self.and_where(condition),
            None => self,
        }
    }

    /// Filtered [`or_where`](Self::or_where).
    #[must_use]
    pub fn or_filter_where(self, condition: impl Into<Value>) -> Self {
        match filtered(condition.into()) {
            Some(condition) => self.or_where(condition),
            None => self,
        }
    }

    // GROUP BY / HAVING

    /// Sets the GROUP BY columns.
    ///
    /// Text is split on commas; a mapping groups by its keys.
    #[must_use]
    pub fn group_by(mut self, columns: impl Into<ClauseInput>) -> Self {
        self.group_by = normalize_group_by(columns.into());
        self
    }

    /// Appends GROUP BY columns.
    #[must_use]
    pub fn add_group_by(mut self, columns: impl Into<ClauseInput>) -> Self {
        self.group_by.extend(normalize_group_by(columns.into()));
        self
    }

    /// Sets the HAVING condition, replacing any previous one.
    #[must_use]
    pub fn having(mut self, condition: impl Into<Value>) -> Self {
        self.having = Some(condition.into());
        self
    }

    /// Sets the HAVING condition, adding `params`.
    #[must_use]
    pub fn having_with<I, K, V>(self, condition: impl Into<Value>, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.having(condition).add_params(params)
    }

    /// Combines `condition` with the existing HAVING condition using `AND`.
    #[must_use]
    pub fn and_having(mut self, condition: impl Into<Value>) -> Self {
        self.having = Some(compose(self.having.take(), "and", condition.into()));
        self
    }

    /// Like [`and_having`](Self::and_having), adding `params`.
    #[must_use]
    pub fn and_having_with<I, K, V>(self, condition: impl Into<Value>, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.and_having(condition).add_params(params)
    }

    /// Combines `condition` with the existing HAVING condition using `OR`.
    #[must_use]
    pub fn or_having(mut self, condition: impl Into<Value>) -> Self {
        self.having = Some(compose(self.having.take(), "or", condition.into()));
        self
    }

    /// Like [`or_having`](Self::or_having), adding `params`.
    #[must_use]
    pub fn or_having_with<I, K, V>(self, condition: impl Into<Value>, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.or_having(condition).add_params(params)
    }

    /// Filtered [`having`](Self::having).
    #[must_use]
    pub fn filter_having(self, condition: impl Into<Value>) -> Self {
        match filtered(condition.into()) {
            Some(condition) => self.having(condition),
            None => self,
        }
    }

    /// Filtered [`and_having`](Self::and_having).
    #[must_use]
    pub fn and_filter_having(self, condition: impl Into<Value>) -> Self {
        match filtered(condition.into()) {
            Some(condition) => self.and_having(condition),
            None => self,
        }
    }

    /// Filtered [`or_having`](Self::or_having).
    #[must_use]
    pub fn or_filter_having(self, condition: impl Into<Value>) -> Self {
        match filtered(condition.into()) {
            Some(condition) => self.or_having(condition),
            None => self,
        }
    }

    // ORDER BY / LIMIT

    /// Sets the ORDER BY entries.
    ///
    /// Text entries may end in `ASC` or `DESC`. In a mapping, the value is
    /// the direction.
    #[must_use]
    pub fn order_by(mut self, columns: impl Into<ClauseInput>) -> Self {
        self.order_by = normalize_order_by(columns.into());
        self
    }

    /// Appends ORDER BY entries.
    #[must_use]
    pub fn add_order_by(mut self, columns: impl Into<ClauseInput>) -> Self {
        self.order_by.extend(normalize_order_by(columns.into()));
        self
    }

    /// Sets the LIMIT.
    #[must_use]
    pub fn limit(mut self, limit: impl Into<Limit>) -> Self {
        self.limit = Some(limit.into());
        self
    }

    /// Sets the OFFSET. An offset of zero is not rendered.
    #[must_use]
    pub fn offset(mut self, offset: impl Into<Limit>) -> Self {
        self.offset = Some(offset.into());
        self
    }

    // Parameters

    /// Replaces the query parameters.
    #[must_use]
    pub fn params<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.params = params
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self
    }

    /// Adds query parameters. Existing names are overwritten.
    #[must_use]
    pub fn add_params<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        for (k, v) in params {
            self.params.insert(k.into(), v.into());
        }
        self
    }

    /// Builds the query for `db` and wraps it in a [`Command`].
    ///
    /// # Errors
    ///
    /// Returns an error if a condition is malformed.
    pub fn create_command<'c, C: Connection>(&self, db: &'c C) -> Result<Command<'c, C>> {
        let (sql, params) = db.query_builder().build(self, Params::new())?;
        Ok(db.create_command(sql, params))
    }

    // Accessors

    /// Returns the normalized selection. Empty means `*`.
    #[must_use]
    pub const fn select_columns(&self) -> &Columns {
        &self.select
    }

    /// Returns the select option, if set.
    #[must_use]
    pub fn select_option(&self) -> Option<&str> {
        self.select_option.as_deref()
    }

    /// Returns whether the query selects distinct rows.
    #[must_use]
    pub const fn is_distinct(&self) -> bool {
        self.distinct
    }

    /// Returns the normalized FROM tables.
    #[must_use]
    pub const fn from_tables(&self) -> &Columns {
        &self.from
    }

    /// Returns the JOIN clauses in order.
    #[must_use]
    pub fn join_clauses(&self) -> &[Join] {
        &self.joins
    }

    /// Returns the WHERE condition.
    #[must_use]
    pub const fn where_condition(&self) -> Option<&Value> {
        self.where_condition.as_ref()
    }

    /// Returns the GROUP BY columns.
    #[must_use]
    pub fn group_by_columns(&self) -> &[ClauseItem] {
        &self.group_by
    }

    /// Returns the HAVING condition.
    #[must_use]
    pub const fn having_condition(&self) -> Option<&Value> {
        self.having.as_ref()
    }

    /// Returns the ORDER BY entries.
    #[must_use]
    pub fn order_by_columns(&self) -> &[OrderBy] {
        &self.order_by
    }

    /// Returns the LIMIT.
    #[must_use]
    pub const fn limit_value(&self) -> Option<&Limit> {
        self.limit.as_ref()
    }

    /// Returns the OFFSET.
    #[must_use]
    pub const fn offset_value(&self) -> Option<&Limit> {
        self.offset.as_ref()
    }

    /// Returns the query parameters.
    #[must_use]
    pub const fn params_map(&self) -> &Params {
        &self.params
    }
}

/// Adds `condition` to `existing` under `operator`.
///
/// An existing operator array with the same operator absorbs the new
/// operand; anything else is wrapped as `[operator, existing, condition]`.
fn compose(existing: Option<Value>, operator: &str, condition: Value) -> Value {
    match existing {
        None => condition,
        Some(Value::List(mut items))
            if items
                .first()
                .and_then(Value::as_str)
                .is_some_and(|op| normalize_keyword(op) == normalize_keyword(operator)) =>
        {
            items.push(condition);
            Value::List(items)
        }
        Some(existing) => Value::List(vec![Value::from(operator), existing, condition]),
    }
}

/// Prunes `condition`; `None` when nothing worth applying is left.
fn filtered(condition: Value) -> Option<Value> {
    match filter_condition(condition) {
        Value::List(items) if !items.is_empty() => Some(Value::List(items)),
        Value::Map(entries) if !entries.is_empty() => Some(Value::Map(entries)),
        _ => None,
    }
}

/// Normalizes one select entry written as text.
fn select_entry(entry: &str) -> (Option<String>, ClauseItem) {
    if let Some((expr, alias)) = split_alias(entry) {
        if !is_numeric(alias) && !alias.contains('.') {
            return (Some(String::from(alias)), ClauseItem::from(expr));
        }
    }
    if entry.contains('(') {
        (None, ClauseItem::from(entry))
    } else {
        (Some(String::from(entry)), ClauseItem::from(entry))
    }
}

/// Normalizes select input to `(alias, item)` pairs; `None` is positional.
fn normalize_select(input: ClauseInput) -> Vec<(Option<String>, ClauseItem)> {
    match input {
        ClauseInput::Text(text) => split_list(&text).iter().map(|e| select_entry(e)).collect(),
        ClauseInput::List(items) => items
            .into_iter()
            .map(|item| match item {
                ClauseItem::Name(name) => select_entry(name.trim()),
                other => (None, other),
            })
            .collect(),
        ClauseInput::Map(entries) => entries
            .into_iter()
            .map(|(key, item)| match item {
                ClauseItem::Name(name) if is_numeric(&key) => select_entry(name.trim()),
                other if is_numeric(&key) => (None, other),
                other => (Some(key), other),
            })
            .collect(),
        ClauseInput::Expression(e) => vec![(None, ClauseItem::Expression(e))],
    }
}

fn normalize_tables(input: ClauseInput) -> Columns {
    let entries = match input {
        ClauseInput::Text(text) => split_list(&text)
            .into_iter()
            .map(|t| (None, ClauseItem::Name(t)))
            .collect(),
        ClauseInput::List(items) => items.into_iter().map(|item| (None, item)).collect(),
        ClauseInput::Map(entries) => entries.into_iter().map(|(k, v)| (Some(k), v)).collect(),
        ClauseInput::Expression(e) => vec![(None, ClauseItem::Expression(e))],
    };
    let mut tables = Columns::new();
    merge_columns(&mut tables, entries);
    tables
}

/// Merges entries into `target`, numbering positional entries after the
/// highest position already present.
fn merge_columns(target: &mut Columns, entries: Vec<(Option<String>, ClauseItem)>) {
    let mut next = target
        .keys()
        .filter_map(|key| match key {
            ColumnKey::Position(n) => Some(n + 1),
            ColumnKey::Alias(_) => None,
        })
        .max()
        .unwrap_or(0);
    for (alias, item) in entries {
        let key = alias.map_or_else(
            || {
                next += 1;
                ColumnKey::Position(next - 1)
            },
            ColumnKey::Alias,
        );
        target.insert(key, item);
    }
}

fn normalize_group_by(input: ClauseInput) -> Vec<ClauseItem> {
    match input {
        ClauseInput::Text(text) => split_list(&text).into_iter().map(ClauseItem::Name).collect(),
        ClauseInput::List(items) => items,
        ClauseInput::Map(entries) => entries.into_keys().map(ClauseItem::Name).collect(),
        ClauseInput::Expression(e) => vec![ClauseItem::Expression(e)],
    }
}

fn order_entry(entry: &str) -> OrderBy {
    let (column, direction) = split_direction(entry);
    OrderBy::Column {
        column: String::from(column),
        direction,
    }
}

fn normalize_order_by(input: ClauseInput) -> Vec<OrderBy> {
    match input {
        ClauseInput::Text(text) => split_list(&text).iter().map(|e| order_entry(e)).collect(),
        ClauseInput::List(items) => items
            .into_iter()
            .map(|item| match item {
                ClauseItem::Name(name) => order_entry(&name),
                ClauseItem::Expression(e) => OrderBy::Expression(e),
                ClauseItem::Query(q) => OrderBy::Query(q),
            })
            .collect(),
        ClauseInput::Map(entries) => entries
            .into_iter()
            .map(|(column, direction)| match direction {
                ClauseItem::Name(d) => OrderBy::Column {
                    column,
                    direction: SortDirection::parse(&d),
                },
                ClauseItem::Expression(e) => OrderBy::Expression(e),
                ClauseItem::Query(q) => OrderBy::Query(q),
            })
            .collect(),
        ClauseInput::Expression(e) => vec![OrderBy::Expression(e)],
    }
}
