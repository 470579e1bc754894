//! Dynamic values and parameter handling.
//!
//! [`Value`] is the declarative input model of the crate: conditions, hash
//! mappings, operator arrays and bound parameters are all expressed with it.
//! It converts from plain Rust types and from `serde_json::Value`, so
//! conditions can be written with `json!`.

use std::fmt;

use indexmap::IndexMap;

use crate::dialect::Dialect;
use crate::expression::Expression;
use crate::query::Query;

/// Ordered parameter mapping: placeholder name to bound value.
pub type Params = IndexMap<String, Value>;

/// A dynamic value used for conditions, operands and parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// NULL value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Float value.
    Float(f64),
    /// Text value.
    Text(String),
    /// Ordered list. A list whose first element is text is an operator array
    /// when used as a condition.
    List(Vec<Value>),
    /// Ordered mapping. Used as a condition it is a hash condition.
    Map(IndexMap<String, Value>),
    /// Raw SQL fragment with its own parameters.
    Expression(Expression),
    /// Nested sub-query.
    Query(Box<Query>),
}

impl Value {
    /// Builds a list value from anything convertible to values.
    pub fn list<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Self>,
    {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    /// Builds a mapping value, preserving the order of `entries`.
    pub fn map<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Self>,
    {
        Self::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Returns a short name for the kind of value, used in error messages.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Expression(_) => "expression",
            Self::Query(_) => "query",
        }
    }

    /// Returns the text content, if this is a text value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Whether the value counts as empty for filter conditions.
    ///
    /// Empty means: null, an empty or whitespace-only string, an empty list
    /// or an empty mapping. Numeric zero and `false` are not empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Text(s) => s.trim().is_empty(),
            Self::List(items) => items.is_empty(),
            Self::Map(entries) => entries.is_empty(),
            _ => false,
        }
    }

    /// Returns the SQL literal for inline use.
    ///
    /// Strings and expressions are quoted by the dialect, booleans become
    /// `TRUE`/`FALSE`, null and non-finite floats become `NULL` and other
    /// numbers pass through. Lists and mappings are inlined as quoted JSON
    /// text.
    ///
    /// **Warning**: the text of an [`Expression`] is quoted like any
    /// string, but nothing guards an expression that is spliced into the
    /// SQL template itself. Prefer bound parameters for untrusted input.
    #[must_use]
    pub fn to_sql_inline(&self, dialect: &dyn Dialect) -> String {
        match self {
            Self::Null => String::from("NULL"),
            Self::Bool(b) => {
                if *b {
                    String::from("TRUE")
                } else {
                    String::from("FALSE")
                }
            }
            Self::Int(n) => format!("{n}"),
            Self::Float(f) if f.is_finite() => format!("{f}"),
            Self::Float(_) => String::from("NULL"),
            Self::Text(s) => dialect.quote_value(s),
            Self::Expression(e) => dialect.quote_value(e.sql()),
            Self::List(_) | Self::Map(_) => dialect.quote_value(&self.to_string()),
            Self::Query(_) => String::from("NULL"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", serde_json::Value::from(self))
    }
}

impl From<&Value> for serde_json::Value {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null | Value::Query(_) => Self::Null,
            Value::Bool(b) => Self::Bool(*b),
            Value::Int(n) => Self::from(*n),
            Value::Float(f) => serde_json::Number::from_f64(*f).map_or(Self::Null, Self::Number),
            Value::Text(s) => Self::String(s.clone()),
            Value::Expression(e) => Self::String(e.sql().to_string()),
            Value::List(items) => Self::Array(items.iter().map(Self::from).collect()),
            Value::Map(entries) => Self::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), Self::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Int(i)
                } else {
                    n.as_f64().map_or(Self::Null, Self::Float)
                }
            }
            serde_json::Value::String(s) => Self::Text(s),
            serde_json::Value::Array(items) => {
                Self::List(items.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(entries) => Self::Map(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, Self::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<i16> for Value {
    fn from(value: i16) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<i8> for Value {
    fn from(value: i8) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u16> for Value {
    fn from(value: u16) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u8> for Value {
    fn from(value: u8) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u64> for Value {
    #[allow(clippy::cast_precision_loss)]
    fn from(value: u64) -> Self {
        i64::try_from(value).map_or(Self::Float(value as f64), Self::Int)
    }
}

impl From<usize> for Value {
    #[allow(clippy::cast_precision_loss)]
    fn from(value: usize) -> Self {
        i64::try_from(value).map_or(Self::Float(value as f64), Self::Int)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Self::Float(f64::from(value))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(String::from(value))
    }
}

impl From<&String> for Value {
    fn from(value: &String) -> Self {
        Self::Text(value.clone())
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => Self::Null,
        }
    }
}

impl<T: Into<Self>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Self::list(value)
    }
}

impl<T: Into<Self>, const N: usize> From<[T; N]> for Value {
    fn from(value: [T; N]) -> Self {
        Self::list(value)
    }
}

impl<K: Into<String>, V: Into<Self>> From<IndexMap<K, V>> for Value {
    fn from(value: IndexMap<K, V>) -> Self {
        Self::map(value)
    }
}

impl From<Expression> for Value {
    fn from(value: Expression) -> Self {
        Self::Expression(value)
    }
}

impl From<Query> for Value {
    fn from(value: Query) -> Self {
        Self::Query(Box::new(value))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::dialect::GenericDialect;

    #[test]
    fn test_inline_scalars() {
        let d = GenericDialect::new();
        assert_eq!(Value::Null.to_sql_inline(&d), "NULL");
        assert_eq!(Value::Bool(true).to_sql_inline(&d), "TRUE");
        assert_eq!(Value::Bool(false).to_sql_inline(&d), "FALSE");
        assert_eq!(Value::Int(-100).to_sql_inline(&d), "-100");
        assert_eq!(Value::Float(2.5).to_sql_inline(&d), "2.5");
        assert_eq!(Value::Float(f64::NAN).to_sql_inline(&d), "NULL");
        assert_eq!(Value::Float(f64::INFINITY).to_sql_inline(&d), "NULL");
        assert_eq!(Value::Float(f64::NEG_INFINITY).to_sql_inline(&d), "NULL");
    }

    #[test]
    fn test_inline_text_escaping() {
        let d = GenericDialect::new();
        assert_eq!(Value::from("O'Brien").to_sql_inline(&d), "'O''Brien'");
        assert_eq!(
            Value::from("'; DROP TABLE users; --").to_sql_inline(&d),
            "'''; DROP TABLE users; --'"
        );
    }

    #[test]
    fn test_inline_numeric_text_passes_through() {
        let d = GenericDialect::new();
        assert_eq!(Value::from("42").to_sql_inline(&d), "42");
    }

    #[test]
    fn test_inline_expression_is_quoted() {
        let d = GenericDialect::new();
        let value = Value::from(Expression::new("NOW()"));
        assert_eq!(value.to_sql_inline(&d), "'NOW()'");
    }

    #[test]
    fn test_emptiness() {
        assert!(Value::Null.is_empty());
        assert!(Value::from("").is_empty());
        assert!(Value::from("   ").is_empty());
        assert!(Value::List(vec![]).is_empty());
        assert!(Value::Map(IndexMap::new()).is_empty());
        assert!(!Value::Int(0).is_empty());
        assert!(!Value::Bool(false).is_empty());
        assert!(!Value::from("0").is_empty());
    }

    #[test]
    fn test_from_json_preserves_key_order() {
        let value = Value::from(json!({"b": 1, "a": null, "c": [1, 2.5]}));
        let Value::Map(entries) = value else {
            panic!("expected a map");
        };
        let keys: Vec<&str> = entries.keys().map(String::as_str).collect();
        assert_eq!(keys, ["b", "a", "c"]);
        assert_eq!(entries["a"], Value::Null);
        assert_eq!(
            entries["c"],
            Value::List(vec![Value::Int(1), Value::Float(2.5)])
        );
    }

    #[test]
    fn test_display_is_json() {
        let value = Value::from(json!(["in", "id", [1, 2]]));
        assert_eq!(value.to_string(), r#"["in","id",[1,2]]"#);
    }

    #[test]
    fn test_conversions() {
        assert_eq!(Value::from(42_i32), Value::Int(42));
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::Text(String::from("x")));
        assert_eq!(
            Value::from(vec![1, 2]),
            Value::List(vec![Value::Int(1), Value::Int(2)])
        );
        assert_eq!(Value::from(u64::MAX).kind(), "float");
    }
}
