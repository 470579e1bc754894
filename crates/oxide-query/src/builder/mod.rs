//! Rendering queries to SQL.
//!
//! [`QueryBuilder`] turns a [`Query`] into SQL text plus a parameter
//! mapping. Values are never interpolated: each one is bound under a
//! generated `:qpN` placeholder. Expressions are spliced in verbatim with
//! their parameters merged, and sub-queries are rendered recursively into
//! the same parameter mapping.

mod condition;
mod dml;

pub use dml::ColumnDefinition;

use tracing::debug;

use crate::condition::{ConditionConstructor, ConditionRegistry};
use crate::dialect::{is_numeric, Dialect};
use crate::error::Result;
use crate::expression::Expression;
use crate::query::tokenizer::split_alias;
use crate::query::{ClauseItem, ColumnKey, Columns, Join, Limit, OrderBy, Query};
use crate::value::{Params, Value};

/// Prefix of generated parameter placeholders.
pub const PARAM_PREFIX: &str = ":qp";

/// Renders queries and conditions for one dialect.
///
/// The condition registry is built once per builder: the built-in
/// operators, then the dialect's own, then anything added with
/// [`with_condition`](Self::with_condition).
#[derive(Clone)]
pub struct QueryBuilder<'a> {
    dialect: &'a dyn Dialect,
    separator: &'static str,
    conditions: ConditionRegistry,
}

impl std::fmt::Debug for QueryBuilder<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryBuilder")
            .field("dialect", &self.dialect.name())
            .field("separator", &self.separator)
            .finish_non_exhaustive()
    }
}

impl<'a> QueryBuilder<'a> {
    /// Creates a builder for `dialect`.
    #[must_use]
    pub fn new(dialect: &'a dyn Dialect) -> Self {
        let mut conditions = ConditionRegistry::new();
        for (keyword, constructor) in dialect.condition_constructors() {
            conditions.register(keyword, constructor);
        }
        Self {
            dialect,
            separator: " ",
            conditions,
        }
    }

    /// Registers an additional condition operator.
    #[must_use]
    pub fn with_condition(mut self, keyword: &str, constructor: ConditionConstructor) -> Self {
        self.conditions.register(keyword, constructor);
        self
    }

    /// Returns the dialect.
    #[must_use]
    pub fn dialect(&self) -> &'a dyn Dialect {
        self.dialect
    }

    /// Returns the condition registry.
    #[must_use]
    pub const fn conditions(&self) -> &ConditionRegistry {
        &self.conditions
    }

    /// Builds `query` into SQL and its parameters.
    ///
    /// `params` seeds the mapping; the query's own parameters override
    /// entries of the same name. Clauses render in the order SELECT, FROM,
    /// JOIN, WHERE, GROUP BY, HAVING, ORDER BY, LIMIT/OFFSET, and empty
    /// clauses are left out.
    ///
    /// # Errors
    ///
    /// Returns an error if a condition is malformed.
    pub fn build(&self, query: &Query, params: Params) -> Result<(String, Params)> {
        let mut params = params;
        for (name, value) in query.params_map() {
            params.insert(name.clone(), value.clone());
        }

        let clauses = [
            self.build_select(
                query.select_columns(),
                query.is_distinct(),
                query.select_option(),
                &mut params,
            )?,
            self.build_from(query.from_tables(), &mut params)?,
            self.build_join(query.join_clauses(), &mut params)?,
            self.build_where(query.where_condition(), &mut params)?,
            self.build_group_by(query.group_by_columns(), &mut params)?,
            self.build_having(query.having_condition(), &mut params)?,
            self.build_order_by(query.order_by_columns(), &mut params)?,
            self.build_limit(query.limit_value(), query.offset_value(), &mut params),
        ];
        let sql = clauses
            .into_iter()
            .filter(|clause| !clause.is_empty())
            .collect::<Vec<_>>()
            .join(self.separator);

        debug!(sql = %sql, params = params.len(), "Built query");
        Ok((sql, params))
    }

    /// Builds the SELECT clause. An empty selection renders `*`.
    ///
    /// # Errors
    ///
    /// Returns an error if a selected sub-query cannot be built.
    pub fn build_select(
        &self,
        columns: &Columns,
        distinct: bool,
        option: Option<&str>,
        params: &mut Params,
    ) -> Result<String> {
        let mut select = String::from(if distinct { "SELECT DISTINCT" } else { "SELECT" });
        if let Some(option) = option.filter(|o| !o.is_empty()) {
            select.push(' ');
            select.push_str(option);
        }
        if columns.is_empty() {
            return Ok(format!("{select} *"));
        }
        let parts = columns
            .iter()
            .map(|(key, item)| self.build_select_column(key, item, params))
            .collect::<Result<Vec<_>>>()?;
        Ok(format!("{select} {}", parts.join(", ")))
    }

    fn build_select_column(
        &self,
        key: &ColumnKey,
        item: &ClauseItem,
        params: &mut Params,
    ) -> Result<String> {
        let alias = match key {
            ColumnKey::Alias(alias) => Some(alias.as_str()),
            ColumnKey::Position(_) => None,
        };
        let sql = match item {
            ClauseItem::Name(name) => {
                let quoted = self.dialect.quote_column_name(name);
                return Ok(match alias {
                    Some(alias) if alias != name => {
                        format!("{quoted} AS {}", self.dialect.quote_column_name(alias))
                    }
                    _ => quoted,
                });
            }
            ClauseItem::Expression(e) => Self::build_expression(e, params),
            ClauseItem::Query(q) => self.build_subquery(q, params)?,
        };
        Ok(match alias {
            Some(alias) => format!("{sql} AS {}", self.dialect.quote_column_name(alias)),
            None => sql,
        })
    }

    /// Builds the FROM clause.
    ///
    /// # Errors
    ///
    /// Returns an error if a sub-query table cannot be built.
    pub fn build_from(&self, tables: &Columns, params: &mut Params) -> Result<String> {
        if tables.is_empty() {
            return Ok(String::new());
        }
        Ok(format!("FROM {}", self.quote_tables(tables, params)?.join(", ")))
    }

    fn quote_tables(&self, tables: &Columns, params: &mut Params) -> Result<Vec<String>> {
        tables
            .iter()
            .map(|(key, item)| {
                let alias = match key {
                    ColumnKey::Alias(alias) => Some(alias.as_str()),
                    ColumnKey::Position(_) => None,
                };
                Ok(match (item, alias) {
                    (ClauseItem::Name(table), Some(alias)) => format!(
                        "{} {}",
                        self.dialect.quote_table_name(table),
                        self.dialect.quote_table_name(alias)
                    ),
                    (ClauseItem::Name(table), None) => self.quote_table_entry(table),
                    (ClauseItem::Expression(e), alias) => {
                        let sql = Self::build_expression(e, params);
                        match alias {
                            Some(alias) => {
                                format!("{sql} {}", self.dialect.quote_table_name(alias))
                            }
                            None => sql,
                        }
                    }
                    (ClauseItem::Query(q), alias) => {
                        let sql = self.build_subquery(q, params)?;
                        match alias {
                            Some(alias) => {
                                format!("{sql} AS {}", self.dialect.quote_table_name(alias))
                            }
                            None => sql,
                        }
                    }
                })
            })
            .collect()
    }

    /// Quotes a table written as text, splitting off `[AS] alias`.
    fn quote_table_entry(&self, table: &str) -> String {
        if table.contains('(') {
            return String::from(table);
        }
        match split_alias(table) {
            Some((name, alias)) if !is_numeric(alias) && !alias.contains('.') => format!(
                "{} {}",
                self.dialect.quote_table_name(name),
                self.dialect.quote_table_name(alias)
            ),
            _ => self.dialect.quote_table_name(table),
        }
    }

    /// Builds the JOIN clauses.
    ///
    /// # Errors
    ///
    /// Returns an error if a join condition is malformed.
    pub fn build_join(&self, joins: &[Join], params: &mut Params) -> Result<String> {
        let mut parts = Vec::with_capacity(joins.len());
        for join in joins {
            let tables = self.quote_tables(&join.tables, params)?.join(", ");
            let on = match &join.on {
                Some(condition) => self.build_condition(condition, params)?,
                None => String::new(),
            };
            if on.is_empty() {
                parts.push(format!("{} {tables}", join.kind));
            } else {
                parts.push(format!("{} {tables} ON {on}", join.kind));
            }
        }
        Ok(parts.join(self.separator))
    }

    /// Builds the WHERE clause. An empty condition renders nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the condition is malformed.
    pub fn build_where(&self, condition: Option<&Value>, params: &mut Params) -> Result<String> {
        self.build_prefixed_condition("WHERE", condition, params)
    }

    /// Builds the HAVING clause. An empty condition renders nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the condition is malformed.
    pub fn build_having(&self, condition: Option<&Value>, params: &mut Params) -> Result<String> {
        self.build_prefixed_condition("HAVING", condition, params)
    }

    fn build_prefixed_condition(
        &self,
        keyword: &str,
        condition: Option<&Value>,
        params: &mut Params,
    ) -> Result<String> {
        let Some(condition) = condition else {
            return Ok(String::new());
        };
        let sql = self.build_condition(condition, params)?;
        if sql.is_empty() {
            Ok(sql)
        } else {
            Ok(format!("{keyword} {sql}"))
        }
    }

    /// Builds the GROUP BY clause.
    ///
    /// # Errors
    ///
    /// Returns an error if a sub-query cannot be built.
    pub fn build_group_by(&self, columns: &[ClauseItem], params: &mut Params) -> Result<String> {
        if columns.is_empty() {
            return Ok(String::new());
        }
        let parts = columns
            .iter()
            .map(|item| match item {
                ClauseItem::Name(name) => Ok(self.dialect.quote_column_name(name)),
                ClauseItem::Expression(e) => Ok(Self::build_expression(e, params)),
                ClauseItem::Query(q) => self.build_subquery(q, params),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(format!("GROUP BY {}", parts.join(", ")))
    }

    /// Builds the ORDER BY clause.
    ///
    /// # Errors
    ///
    /// Returns an error if a sub-query cannot be built.
    pub fn build_order_by(&self, columns: &[OrderBy], params: &mut Params) -> Result<String> {
        if columns.is_empty() {
            return Ok(String::new());
        }
        let parts = columns
            .iter()
            .map(|entry| match entry {
                OrderBy::Column { column, direction } => Ok(format!(
                    "{} {}",
                    self.dialect.quote_column_name(column),
                    direction.as_sql()
                )),
                OrderBy::Expression(e) => Ok(Self::build_expression(e, params)),
                OrderBy::Query(q) => self.build_subquery(q, params),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(format!("ORDER BY {}", parts.join(", ")))
    }

    /// Builds the LIMIT/OFFSET fragment. An offset of zero is left out.
    pub fn build_limit(
        &self,
        limit: Option<&Limit>,
        offset: Option<&Limit>,
        params: &mut Params,
    ) -> String {
        let limit = limit.map(|l| Self::build_limit_value(l, params));
        let offset = offset
            .filter(|o| !matches!(o, Limit::Count(0)))
            .map(|o| Self::build_limit_value(o, params));
        self.dialect.build_limit(limit.as_deref(), offset.as_deref())
    }

    fn build_limit_value(value: &Limit, params: &mut Params) -> String {
        match value {
            Limit::Count(n) => n.to_string(),
            Limit::Expression(e) => Self::build_expression(e, params),
        }
    }

    /// Normalizes and renders a declarative condition.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::MalformedCondition`] if the condition has the
    /// wrong shape.
    ///
    /// [`QueryError::MalformedCondition`]: crate::error::QueryError::MalformedCondition
    pub fn build_condition(&self, condition: &Value, params: &mut Params) -> Result<String> {
        let condition = self.conditions.create(condition)?;
        self.render_condition(&condition, params)
    }

    /// Returns the expression text, merging its parameters into `params`.
    pub fn build_expression(expression: &Expression, params: &mut Params) -> String {
        for (name, value) in expression.params() {
            params.insert(name.clone(), value.clone());
        }
        String::from(expression.sql())
    }

    /// Renders a sub-query in parentheses, sharing `params`.
    fn build_subquery(&self, query: &Query, params: &mut Params) -> Result<String> {
        let (sql, merged) = self.build(query, std::mem::take(params))?;
        *params = merged;
        Ok(format!("({sql})"))
    }

    /// Binds `value` under the next free `:qpN` name and returns the name.
    pub fn bind_param(value: Value, params: &mut Params) -> String {
        let mut n = params.len();
        loop {
            let name = format!("{PARAM_PREFIX}{n}");
            if !params.contains_key(&name) {
                params.insert(name.clone(), value);
                return name;
            }
            n += 1;
        }
    }

    /// Renders a right-hand operand: expressions inline, sub-queries in
    /// parentheses, null as `NULL`, anything else bound.
    fn build_operand(&self, value: &Value, params: &mut Params) -> Result<String> {
        match value {
            Value::Null => Ok(String::from("NULL")),
            Value::Expression(e) => Ok(Self::build_expression(e, params)),
            Value::Query(q) => self.build_subquery(q, params),
            other => Ok(Self::bind_param(other.clone(), params)),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::dialect::{GenericDialect, MysqlDialect};
    use crate::query::ClauseInput;

    fn build(query: &Query) -> (String, Params) {
        QueryBuilder::new(&GenericDialect::new())
            .build(query, Params::new())
            .unwrap()
    }

    #[test]
    fn test_select_star_by_default() {
        let (sql, params) = build(&Query::new().from("user"));
        assert_eq!(sql, r#"SELECT * FROM "user""#);
        assert!(params.is_empty());
    }

    #[test]
    fn test_select_aliases() {
        let query = Query::new()
            .select("field1 as a, field 1 as b, COUNT(*) AS cnt, t.name")
            .from("tbl t");
        let (sql, _) = build(&query);
        assert_eq!(
            sql,
            r#"SELECT "field1" AS "a", "field 1" AS "b", COUNT(*) AS "cnt", "t"."name" FROM "tbl" "t""#
        );
    }

    #[test]
    fn test_distinct_with_option() {
        let query = Query::new()
            .select_with_option(["id", "name"], Some("something"))
            .distinct(true);
        let (sql, _) = build(&query);
        assert_eq!(sql, r#"SELECT DISTINCT something "id", "name""#);
    }

    #[test]
    fn test_clause_order() {
        let query = Query::new()
            .select("id")
            .from("user")
            .where_clause(json!({"active": true}))
            .group_by("id")
            .having(json!([">", "id", 2]))
            .order_by("id DESC")
            .limit(5_u64)
            .offset(10_u64);
        let (sql, params) = build(&query);
        assert_eq!(
            sql,
            r#"SELECT "id" FROM "user" WHERE "active" = :qp0 GROUP BY "id" HAVING "id" > :qp1 ORDER BY "id" DESC LIMIT 5 OFFSET 10"#
        );
        assert_eq!(params[":qp0"], Value::Bool(true));
        assert_eq!(params[":qp1"], Value::Int(2));
    }

    #[test]
    fn test_zero_offset_is_dropped() {
        let (sql, _) = build(&Query::new().from("user").offset(0_u64));
        assert_eq!(sql, r#"SELECT * FROM "user""#);
    }

    #[test]
    fn test_mysql_offset_only() {
        let dialect = MysqlDialect::new();
        let (sql, _) = QueryBuilder::new(&dialect)
            .build(&Query::new().from("user").offset(20_u64), Params::new())
            .unwrap();
        assert_eq!(sql, "SELECT * FROM `user` LIMIT 18446744073709551615 OFFSET 20");
    }

    #[test]
    fn test_query_params_override_seed() {
        let query = Query::new()
            .from("user")
            .where_with("id = :id", [(":id", 2)]);
        let seed: Params = [(String::from(":id"), Value::Int(1))].into_iter().collect();
        let (_, params) = QueryBuilder::new(&GenericDialect::new())
            .build(&query, seed)
            .unwrap();
        assert_eq!(params[":id"], Value::Int(2));
    }

    #[test]
    fn test_subquery_in_from_and_select() {
        let sub = Query::new()
            .select("id")
            .from("order")
            .where_clause(json!({"status": "paid"}));
        let count = Query::new()
            .select(Expression::new("COUNT(*)"))
            .from("order o")
            .where_clause("o.user_id = u.id");
        let query = Query::new()
            .select(ClauseInput::map([("orders", count)]))
            .add_select("u.id")
            .from(ClauseInput::map([("u", "user")]))
            .where_clause(json!({"u.active": 1}))
            .and_where(Value::list([Value::from("in"), Value::from("u.id"), Value::from(sub)]));
        let (sql, params) = build(&query);
        assert_eq!(
            sql,
            concat!(
                r#"SELECT (SELECT COUNT(*) FROM "order" "o" WHERE o.user_id = u.id) AS "orders", "u"."id" "#,
                r#"FROM "user" "u" WHERE ("u"."active" = :qp0) AND ("u"."id" IN "#,
                r#"(SELECT "id" FROM "order" WHERE "status" = :qp1))"#
            )
        );
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_join_rendering() {
        let query = Query::new()
            .from("user u")
            .left_join("profile p", "p.user_id = u.id")
            .inner_join(ClauseInput::map([("t", "team")]), json!({"t.id": 3}));
        let (sql, _) = build(&query);
        assert_eq!(
            sql,
            r#"SELECT * FROM "user" "u" LEFT JOIN "profile" "p" ON p.user_id = u.id INNER JOIN "team" "t" ON "t"."id" = :qp0"#
        );
    }

    #[test]
    fn test_bind_param_skips_taken_names() {
        let mut params: Params = [(String::from(":qp1"), Value::Int(0))].into_iter().collect();
        assert_eq!(QueryBuilder::bind_param(Value::Int(5), &mut params), ":qp2");
        assert_eq!(QueryBuilder::bind_param(Value::Int(6), &mut params), ":qp3");
    }

    #[test]
    fn test_expression_params_are_merged() {
        let query = Query::new()
            .from("user")
            .order_by(Expression::with_params("FIELD(id, :a, :b)", [(":a", 3), (":b", 1)]));
        let (sql, params) = build(&query);
        assert_eq!(sql, r#"SELECT * FROM "user" ORDER BY FIELD(id, :a, :b)"#);
        assert_eq!(params.len(), 2);
    }
}
