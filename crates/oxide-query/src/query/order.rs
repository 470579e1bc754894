//! ORDER BY entries and LIMIT/OFFSET values.

use crate::expression::Expression;
use crate::query::Query;

/// Sort direction of an ORDER BY entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    /// Ascending (the default).
    #[default]
    Asc,
    /// Descending.
    Desc,
}

impl SortDirection {
    /// Parses a direction keyword. Anything other than `desc`
    /// (case-insensitive) sorts ascending.
    #[must_use]
    pub fn parse(direction: &str) -> Self {
        if direction.trim().eq_ignore_ascii_case("desc") {
            Self::Desc
        } else {
            Self::Asc
        }
    }

    /// Returns the SQL keyword.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// One ORDER BY entry.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderBy {
    /// A column with a direction.
    Column {
        /// Column name, quoted on render.
        column: String,
        /// Sort direction.
        direction: SortDirection,
    },
    /// A raw expression in place of column and direction.
    Expression(Expression),
    /// A sub-query, rendered in parentheses.
    Query(Box<Query>),
}

/// A LIMIT or OFFSET value.
#[derive(Debug, Clone, PartialEq)]
pub enum Limit {
    /// A row count.
    Count(u64),
    /// A raw expression, passed through.
    Expression(Expression),
}

impl From<u64> for Limit {
    fn from(value: u64) -> Self {
        Self::Count(value)
    }
}

impl From<u32> for Limit {
    fn from(value: u32) -> Self {
        Self::Count(u64::from(value))
    }
}

impl From<usize> for Limit {
    fn from(value: usize) -> Self {
        Self::Count(u64::try_from(value).unwrap_or(u64::MAX))
    }
}

impl From<Expression> for Limit {
    fn from(value: Expression) -> Self {
        Self::Expression(value)
    }
}
