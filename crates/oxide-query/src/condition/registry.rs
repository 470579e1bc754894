//! Operator keyword to condition constructor table.

use std::collections::HashMap;

use indexmap::IndexMap;
use tracing::trace;

use super::{ColumnExpr, Condition, LogicalOperator};
use crate::error::{QueryError, Result};
use crate::expression::Expression;
use crate::value::Value;

/// Builds a [`Condition`] from an operator keyword and its operands.
///
/// The keyword is passed upper-cased with single spaces, the operands are
/// the operator array without its leading keyword.
pub type ConditionConstructor = fn(&ConditionRegistry, &str, &[Value]) -> Result<Condition>;

/// Maps operator keywords to condition constructors.
///
/// Keywords are matched case-insensitively. An operator that is not
/// registered is not an error: it becomes a [`Condition::Simple`] rendering
/// `"column" operator operand`.
#[derive(Debug, Clone)]
pub struct ConditionRegistry {
    constructors: HashMap<String, ConditionConstructor>,
}

impl Default for ConditionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ConditionRegistry {
    /// Creates a registry holding the built-in operators.
    #[must_use]
    pub fn new() -> Self {
        let builtins: [(&str, ConditionConstructor); 13] = [
            ("AND", conjunction_condition),
            ("OR", conjunction_condition),
            ("NOT", not_condition),
            ("BETWEEN", between_condition),
            ("NOT BETWEEN", between_condition),
            ("IN", in_condition),
            ("NOT IN", in_condition),
            ("EXISTS", exists_condition),
            ("NOT EXISTS", exists_condition),
            ("LIKE", like_condition),
            ("NOT LIKE", like_condition),
            ("OR LIKE", like_condition),
            ("OR NOT LIKE", like_condition),
        ];
        let mut registry = Self {
            constructors: HashMap::with_capacity(builtins.len()),
        };
        for (keyword, constructor) in builtins {
            registry.register(keyword, constructor);
        }
        registry
    }

    /// Registers (or replaces) the constructor for `keyword`.
    pub fn register(&mut self, keyword: &str, constructor: ConditionConstructor) {
        self.constructors
            .insert(normalize_keyword(keyword), constructor);
    }

    /// Whether `keyword` has a registered constructor.
    #[must_use]
    pub fn contains(&self, keyword: &str) -> bool {
        self.constructors.contains_key(&normalize_keyword(keyword))
    }

    /// Normalizes declarative input into a [`Condition`].
    ///
    /// - text and expressions become [`Condition::Expression`];
    /// - a mapping becomes [`Condition::Hash`];
    /// - a list must start with an operator string;
    /// - null and empty inputs yield conditions that render to nothing.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::MalformedCondition`] if an operator array does
    /// not start with a string, has the wrong number of operands, or if the
    /// input is a scalar or sub-query.
    pub fn create(&self, condition: &Value) -> Result<Condition> {
        match condition {
            Value::Null => Ok(Condition::Hash(IndexMap::new())),
            Value::Text(sql) => Ok(Condition::Expression(Expression::new(sql.clone()))),
            Value::Expression(expr) => Ok(Condition::Expression(expr.clone())),
            Value::Map(entries) => Ok(Condition::Hash(entries.clone())),
            Value::List(items) => {
                let Some(first) = items.first() else {
                    return Ok(Condition::Conjunction {
                        operator: LogicalOperator::And,
                        conditions: vec![],
                    });
                };
                let Value::Text(operator) = first else {
                    return Err(QueryError::malformed(
                        "operator array must start with an operator string",
                        condition,
                    ));
                };
                let keyword = normalize_keyword(operator);
                let operands = &items[1..];
                if let Some(constructor) = self.constructors.get(&keyword) {
                    constructor(self, &keyword, operands)
                } else {
                    trace!(operator = %operator, "Unknown operator, using simple condition");
                    simple_condition(self, operator.trim(), operands)
                }
            }
            other => Err(QueryError::malformed(
                format!("a {} value cannot be used as a condition", other.kind()),
                other,
            )),
        }
    }
}

/// Upper-cases `operator` and collapses inner whitespace.
pub(crate) fn normalize_keyword(operator: &str) -> String {
    operator
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

fn malformed(operator: &str, operands: &[Value], reason: impl Into<String>) -> QueryError {
    let mut items = Vec::with_capacity(operands.len() + 1);
    items.push(Value::from(operator));
    items.extend_from_slice(operands);
    QueryError::malformed(reason, &Value::List(items))
}

fn expect_operands(operator: &str, operands: &[Value], count: usize) -> Result<()> {
    if operands.len() == count {
        Ok(())
    } else {
        let noun = if count == 1 { "operand" } else { "operands" };
        Err(malformed(
            operator,
            operands,
            format!("operator '{operator}' requires {count} {noun}"),
        ))
    }
}

fn column_operand(operator: &str, operands: &[Value]) -> Result<ColumnExpr> {
    match operands.first() {
        Some(Value::Text(name)) => Ok(ColumnExpr::Name(name.clone())),
        Some(Value::Expression(expr)) => Ok(ColumnExpr::Expression(expr.clone())),
        _ => Err(malformed(
            operator,
            operands,
            format!("operator '{operator}' requires a column name or expression"),
        )),
    }
}

/// `AND` / `OR` over any number of operands.
///
/// # Errors
///
/// Propagates errors from nested operands.
pub fn conjunction_condition(
    registry: &ConditionRegistry,
    operator: &str,
    operands: &[Value],
) -> Result<Condition> {
    let operator = if operator == "OR" {
        LogicalOperator::Or
    } else {
        LogicalOperator::And
    };
    let conditions = operands
        .iter()
        .map(|operand| registry.create(operand))
        .collect::<Result<Vec<_>>>()?;
    Ok(Condition::Conjunction {
        operator,
        conditions,
    })
}

/// `NOT` with exactly one operand.
///
/// # Errors
///
/// Fails unless there is exactly one operand.
pub fn not_condition(
    registry: &ConditionRegistry,
    operator: &str,
    operands: &[Value],
) -> Result<Condition> {
    expect_operands(operator, operands, 1)?;
    Ok(Condition::Not(Box::new(registry.create(&operands[0])?)))
}

/// `[NOT] BETWEEN` with column, start and end.
///
/// # Errors
///
/// Fails unless there are exactly three operands and the first is a column.
pub fn between_condition(
    _registry: &ConditionRegistry,
    operator: &str,
    operands: &[Value],
) -> Result<Condition> {
    expect_operands(operator, operands, 3)?;
    Ok(Condition::Between {
        negated: operator.starts_with("NOT "),
        column: column_operand(operator, operands)?,
        start: operands[1].clone(),
        end: operands[2].clone(),
    })
}

/// `[NOT] IN` with column and values.
///
/// # Errors
///
/// Fails unless there are exactly two operands and the first is a column.
pub fn in_condition(
    _registry: &ConditionRegistry,
    operator: &str,
    operands: &[Value],
) -> Result<Condition> {
    expect_operands(operator, operands, 2)?;
    Ok(Condition::In {
        negated: operator.starts_with("NOT "),
        column: column_operand(operator, operands)?,
        values: operands[1].clone(),
    })
}

/// `[NOT] EXISTS` with a sub-query.
///
/// # Errors
///
/// Fails unless the single operand is a sub-query.
pub fn exists_condition(
    _registry: &ConditionRegistry,
    operator: &str,
    operands: &[Value],
) -> Result<Condition> {
    expect_operands(operator, operands, 1)?;
    match &operands[0] {
        Value::Query(query) => Ok(Condition::Exists {
            negated: operator.starts_with("NOT "),
            query: query.clone(),
        }),
        _ => Err(malformed(
            operator,
            operands,
            format!("operator '{operator}' requires a sub-query"),
        )),
    }
}

/// The `LIKE` family: `[OR] [NOT] <keyword>` with column and pattern(s).
///
/// Any comparison keyword works, so dialects reuse this for `ILIKE`.
///
/// # Errors
///
/// Fails unless there are exactly two operands and the first is a column.
pub fn like_condition(
    _registry: &ConditionRegistry,
    operator: &str,
    operands: &[Value],
) -> Result<Condition> {
    expect_operands(operator, operands, 2)?;
    let (or, rest) = match operator.strip_prefix("OR ") {
        Some(rest) => (true, rest),
        None => (false, operator),
    };
    let (negated, keyword) = match rest.strip_prefix("NOT ") {
        Some(keyword) => (true, keyword),
        None => (false, rest),
    };
    let patterns = match &operands[1] {
        Value::List(items) => items.clone(),
        single => vec![single.clone()],
    };
    Ok(Condition::Like {
        negated,
        or,
        keyword: String::from(keyword),
        column: column_operand(operator, operands)?,
        patterns,
    })
}

/// Generic binary condition: `"column" operator operand`.
///
/// # Errors
///
/// Fails unless there are exactly two operands and the first is a column.
pub fn simple_condition(
    _registry: &ConditionRegistry,
    operator: &str,
    operands: &[Value],
) -> Result<Condition> {
    expect_operands(operator, operands, 2)?;
    Ok(Condition::Simple {
        operator: String::from(operator),
        column: column_operand(operator, operands)?,
        value: operands[1].clone(),
    })
}
