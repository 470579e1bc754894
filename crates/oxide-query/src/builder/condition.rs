//! Condition rendering.

use indexmap::IndexMap;

use super::QueryBuilder;
use crate::condition::{ColumnExpr, Condition, LogicalOperator};
use crate::error::Result;
use crate::value::{Params, Value};

impl QueryBuilder<'_> {
    /// Renders a normalized condition. An empty condition renders an empty
    /// string.
    ///
    /// # Errors
    ///
    /// Returns an error if a nested sub-query cannot be built.
    pub fn render_condition(&self, condition: &Condition, params: &mut Params) -> Result<String> {
        match condition {
            Condition::Expression(e) => Ok(Self::build_expression(e, params)),
            Condition::Simple {
                operator,
                column,
                value,
            } => {
                let column = self.build_column(column, params);
                let operand = self.build_operand(value, params)?;
                Ok(format!("{column} {operator} {operand}"))
            }
            Condition::Conjunction {
                operator,
                conditions,
            } => self.render_conjunction(*operator, conditions, params),
            Condition::Not(inner) => {
                let inner = self.render_condition(inner, params)?;
                if inner.is_empty() {
                    Ok(inner)
                } else {
                    Ok(format!("NOT ({inner})"))
                }
            }
            Condition::Between {
                negated,
                column,
                start,
                end,
            } => {
                let column = self.build_column(column, params);
                let start = self.build_operand(start, params)?;
                let end = self.build_operand(end, params)?;
                let not = if *negated { "NOT " } else { "" };
                Ok(format!("{column} {not}BETWEEN {start} AND {end}"))
            }
            Condition::In {
                negated,
                column,
                values,
            } => self.render_in(*negated, column, values, params),
            Condition::Like {
                negated,
                or,
                keyword,
                column,
                patterns,
            } => self.render_like(*negated, *or, keyword, column, patterns, params),
            Condition::Exists { negated, query } => {
                let sql = self.build_subquery(query, params)?;
                let not = if *negated { "NOT " } else { "" };
                Ok(format!("{not}EXISTS {sql}"))
            }
            Condition::Hash(entries) => self.render_hash(entries, params),
        }
    }

    fn build_column(&self, column: &ColumnExpr, params: &mut Params) -> String {
        match column {
            ColumnExpr::Name(name) => self.dialect.quote_column_name(name),
            ColumnExpr::Expression(e) => Self::build_expression(e, params),
        }
    }

    fn render_conjunction(
        &self,
        operator: LogicalOperator,
        conditions: &[Condition],
        params: &mut Params,
    ) -> Result<String> {
        let mut parts = Vec::with_capacity(conditions.len());
        for condition in conditions {
            let sql = self.render_condition(condition, params)?;
            if !sql.is_empty() {
                parts.push(sql);
            }
        }
        Ok(match parts.len() {
            0 => String::new(),
            1 => parts.swap_remove(0),
            _ => {
                let separator = format!(") {} (", operator.as_sql());
                format!("({})", parts.join(separator.as_str()))
            }
        })
    }

    fn render_in(
        &self,
        negated: bool,
        column: &ColumnExpr,
        values: &Value,
        params: &mut Params,
    ) -> Result<String> {
        let column = self.build_column(column, params);
        let operator = if negated { "NOT IN" } else { "IN" };
        let items = match values {
            Value::Query(query) => {
                let sql = self.build_subquery(query, params)?;
                return Ok(format!("{column} {operator} {sql}"));
            }
            Value::List(items) => items.as_slice(),
            single => std::slice::from_ref(single),
        };

        let mut has_null = false;
        let mut parts = Vec::with_capacity(items.len());
        for item in items {
            match item {
                Value::Null => has_null = true,
                other => parts.push(self.build_operand(other, params)?),
            }
        }

        if parts.is_empty() {
            return Ok(match (has_null, negated) {
                (true, false) => format!("{column} IS NULL"),
                (true, true) => format!("{column} IS NOT NULL"),
                (false, false) => String::from("0=1"),
                (false, true) => String::from("1=1"),
            });
        }
        let sql = format!("{column} {operator} ({})", parts.join(", "));
        Ok(match (has_null, negated) {
            (false, _) => sql,
            (true, false) => format!("({sql} OR {column} IS NULL)"),
            (true, true) => format!("{sql} AND {column} IS NOT NULL"),
        })
    }

    fn render_like(
        &self,
        negated: bool,
        or: bool,
        keyword: &str,
        column: &ColumnExpr,
        patterns: &[Value],
        params: &mut Params,
    ) -> Result<String> {
        if patterns.is_empty() {
            return Ok(if negated {
                String::new()
            } else {
                String::from("0=1")
            });
        }
        let column = self.build_column(column, params);
        let not = if negated { "NOT " } else { "" };
        let mut parts = Vec::with_capacity(patterns.len());
        for pattern in patterns {
            let operand = self.build_operand(pattern, params)?;
            parts.push(format!("{column} {not}{keyword} {operand}"));
        }
        Ok(parts.join(if or { " OR " } else { " AND " }))
    }

    fn render_hash(&self, entries: &IndexMap<String, Value>, params: &mut Params) -> Result<String> {
        let mut parts = Vec::with_capacity(entries.len());
        for (name, value) in entries {
            let sql = match value {
                Value::Null => format!("{} IS NULL", self.dialect.quote_column_name(name)),
                Value::List(_) | Value::Query(_) => {
                    self.render_in(false, &ColumnExpr::Name(name.clone()), value, params)?
                }
                other => {
                    let operand = self.build_operand(other, params)?;
                    format!("{} = {operand}", self.dialect.quote_column_name(name))
                }
            };
            parts.push(sql);
        }
        Ok(parts.join(" AND "))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::condition::registry::simple_condition;
    use crate::dialect::{GenericDialect, PostgresDialect};
    use crate::expression::Expression;
    use crate::query::Query;

    fn render(condition: impl Into<Value>) -> (String, Params) {
        let dialect = GenericDialect::new();
        let builder = QueryBuilder::new(&dialect);
        let mut params = Params::new();
        let sql = builder.build_condition(&condition.into(), &mut params).unwrap();
        (sql, params)
    }

    #[test]
    fn test_hash_condition() {
        let (sql, params) = render(json!({"a": 1, "b": null, "c": [1, 2]}));
        assert_eq!(sql, r#""a" = :qp0 AND "b" IS NULL AND "c" IN (:qp1, :qp2)"#);
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn test_hash_null_only() {
        let (sql, params) = render(json!({"a": null}));
        assert_eq!(sql, r#""a" IS NULL"#);
        assert!(params.is_empty());
    }

    #[test]
    fn test_hash_with_expression_value() {
        let (sql, _) = render(Value::map([("updated_at", Expression::new("NOW()"))]));
        assert_eq!(sql, r#""updated_at" = NOW()"#);
    }

    #[test]
    fn test_empty_in() {
        assert_eq!(render(json!(["in", "id", []])).0, "0=1");
        assert_eq!(render(json!(["not in", "id", []])).0, "1=1");
    }

    #[test]
    fn test_in_with_nulls() {
        assert_eq!(
            render(json!(["in", "id", [1, null]])).0,
            r#"("id" IN (:qp0) OR "id" IS NULL)"#
        );
        assert_eq!(
            render(json!(["not in", "id", [1, null]])).0,
            r#""id" NOT IN (:qp0) AND "id" IS NOT NULL"#
        );
        assert_eq!(render(json!(["in", "id", [null]])).0, r#""id" IS NULL"#);
    }

    #[test]
    fn test_in_scalar_and_subquery() {
        assert_eq!(render(json!(["in", "id", 5])).0, r#""id" IN (:qp0)"#);
        let sub = Query::new().select("id").from("banned");
        let condition = Value::list([Value::from("not in"), Value::from("id"), Value::from(sub)]);
        assert_eq!(render(condition).0, r#""id" NOT IN (SELECT "id" FROM "banned")"#);
    }

    #[test]
    fn test_between() {
        let (sql, params) = render(json!(["between", "age", 18, 30]));
        assert_eq!(sql, r#""age" BETWEEN :qp0 AND :qp1"#);
        assert_eq!(params[":qp1"], Value::Int(30));
        assert_eq!(
            render(json!(["not between", "age", 1, 2])).0,
            r#""age" NOT BETWEEN :qp0 AND :qp1"#
        );
    }

    #[test]
    fn test_like_variants() {
        assert_eq!(
            render(json!(["like", "name", ["a%", "b%"]])).0,
            r#""name" LIKE :qp0 AND "name" LIKE :qp1"#
        );
        assert_eq!(
            render(json!(["or not like", "name", ["a%", "b%"]])).0,
            r#""name" NOT LIKE :qp0 OR "name" NOT LIKE :qp1"#
        );
        assert_eq!(render(json!(["like", "name", []])).0, "0=1");
        assert_eq!(render(json!(["not like", "name", []])).0, "");
    }

    #[test]
    fn test_nested_conjunctions() {
        let (sql, _) = render(json!(["or", ["and", "a = 1", "b = 2"], {"c": 3}]));
        assert_eq!(sql, r#"((a = 1) AND (b = 2)) OR ("c" = :qp0)"#);
    }

    #[test]
    fn test_conjunction_drops_empty_operands() {
        assert_eq!(render(json!(["and", {}, "a = 1", ["or"]])).0, "a = 1");
        assert_eq!(render(json!(["and"])).0, "");
    }

    #[test]
    fn test_not_and_exists() {
        assert_eq!(render(json!(["not", {"a": 1}])).0, r#"NOT ("a" = :qp0)"#);
        assert_eq!(render(json!(["not", {}])).0, "");
        let sub = Query::new().from("order").where_clause("order.user_id = user.id");
        let condition = Value::list([Value::from("not exists"), Value::from(sub)]);
        assert_eq!(
            render(condition).0,
            r#"NOT EXISTS (SELECT * FROM "order" WHERE order.user_id = user.id)"#
        );
    }

    #[test]
    fn test_simple_operator_fallback() {
        assert_eq!(render(json!([">=", "age", 21])).0, r#""age" >= :qp0"#);
        assert_eq!(render(json!(["=", "deleted_at", null])).0, r#""deleted_at" = NULL"#);
        assert_eq!(render(json!(["@>", "tags", "x"])).0, r#""tags" @> :qp0"#);
    }

    #[test]
    fn test_postgres_ilike() {
        let dialect = PostgresDialect::new();
        let builder = QueryBuilder::new(&dialect);
        let mut params = Params::new();
        let sql = builder
            .build_condition(&Value::from(json!(["or ilike", "name", ["a%", "b%"]])), &mut params)
            .unwrap();
        assert_eq!(sql, r#""name" ILIKE :qp0 OR "name" ILIKE :qp1"#);
    }

    #[test]
    fn test_custom_operator() {
        let dialect = GenericDialect::new();
        let builder = QueryBuilder::new(&dialect).with_condition("IS DISTINCT FROM", simple_condition);
        let mut params = Params::new();
        let sql = builder
            .build_condition(&Value::from(json!(["is distinct from", "a", 1])), &mut params)
            .unwrap();
        assert_eq!(sql, r#""a" IS DISTINCT FROM :qp0"#);
    }
}
