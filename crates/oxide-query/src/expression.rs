//! Raw SQL expressions.

use crate::value::{Params, Value};

/// An opaque SQL fragment passed through rendering unmodified.
///
/// Its parameters are merged into the statement's parameter mapping when
/// the expression is rendered.
///
/// **Warning**: only use this for SQL fragments that don't contain user
/// input. The text is never escaped.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Expression {
    sql: String,
    params: Params,
}

impl Expression {
    /// Creates an expression without parameters.
    #[must_use]
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Params::new(),
        }
    }

    /// Creates an expression with bound parameters.
    pub fn with_params<I, K, V>(sql: impl Into<String>, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Self {
            sql: sql.into(),
            params: params
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Returns the SQL text.
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Returns the attached parameters.
    #[must_use]
    pub const fn params(&self) -> &Params {
        &self.params
    }
}

impl std::fmt::Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.sql)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expression_keeps_params_in_order() {
        let expr = Expression::with_params("a = :a OR b = :b", [(":b", 2), (":a", 1)]);
        assert_eq!(expr.sql(), "a = :a OR b = :b");
        let keys: Vec<&String> = expr.params().keys().collect();
        assert_eq!(keys, [":b", ":a"]);
        assert_eq!(expr.to_string(), "a = :a OR b = :b");
    }
}
