//! Condition trees.
//!
//! Declarative condition input (strings, hash mappings, operator arrays) is
//! normalized by a [`ConditionRegistry`] into the closed [`Condition`] sum
//! type, which the query builder renders with an exhaustive match.

mod filter;
pub mod registry;

pub use filter::filter_condition;
pub use registry::{ConditionConstructor, ConditionRegistry};

use indexmap::IndexMap;

use crate::expression::Expression;
use crate::query::Query;
use crate::value::Value;

/// The column side of an operator condition.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnExpr {
    /// A column name, quoted on render.
    Name(String),
    /// A raw expression, rendered as-is.
    Expression(Expression),
}

/// Operator joining the operands of a conjunction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOperator {
    /// `AND`
    And,
    /// `OR`
    Or,
}

impl LogicalOperator {
    /// Returns the SQL keyword.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

/// A normalized condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Raw SQL text, e.g. a plain string condition like `"id = :id"`.
    Expression(Expression),
    /// `"column" operator operand`, also the fallback for unknown operators.
    Simple {
        /// Operator as written by the caller.
        operator: String,
        /// Left-hand column.
        column: ColumnExpr,
        /// Right-hand operand.
        value: Value,
    },
    /// Operands joined by `AND` or `OR`.
    Conjunction {
        /// Joining operator.
        operator: LogicalOperator,
        /// Sub-conditions in order.
        conditions: Vec<Condition>,
    },
    /// `NOT (condition)`.
    Not(Box<Condition>),
    /// `"column" [NOT] BETWEEN start AND end`.
    Between {
        /// Whether this is `NOT BETWEEN`.
        negated: bool,
        /// Tested column.
        column: ColumnExpr,
        /// Lower bound.
        start: Value,
        /// Upper bound.
        end: Value,
    },
    /// `"column" [NOT] IN (...)`.
    In {
        /// Whether this is `NOT IN`.
        negated: bool,
        /// Tested column.
        column: ColumnExpr,
        /// A list of values, a sub-query or a single scalar.
        values: Value,
    },
    /// `"column" [NOT] LIKE pattern`, one fragment per pattern.
    Like {
        /// Whether the comparison is negated.
        negated: bool,
        /// Whether multiple patterns join with `OR` instead of `AND`.
        or: bool,
        /// Comparison keyword without `NOT` (`LIKE`, `ILIKE`).
        keyword: String,
        /// Tested column.
        column: ColumnExpr,
        /// Patterns in order.
        patterns: Vec<Value>,
    },
    /// `[NOT] EXISTS (sub-query)`.
    Exists {
        /// Whether this is `NOT EXISTS`.
        negated: bool,
        /// The sub-query.
        query: Box<Query>,
    },
    /// Column to value equality mapping joined with `AND`.
    Hash(IndexMap<String, Value>),
}
