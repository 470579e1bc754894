//! Typed inputs for select, from, group-by and order-by clauses.

use indexmap::IndexMap;

use crate::error::{QueryError, Result};
use crate::expression::Expression;
use crate::query::Query;
use crate::value::Value;

/// Key of a normalized select or from entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ColumnKey {
    /// Entry selected under an alias (or under its own name).
    Alias(String),
    /// Entry without a usable alias, kept in position.
    Position(usize),
}

/// Normalized select or from entries, in insertion order.
pub type Columns = IndexMap<ColumnKey, ClauseItem>;

/// One element of a clause input.
#[derive(Debug, Clone, PartialEq)]
pub enum ClauseItem {
    /// A column or table name, quoted on render.
    Name(String),
    /// A raw expression, passed through.
    Expression(Expression),
    /// A sub-query, rendered in parentheses.
    Query(Box<Query>),
}

impl ClauseItem {
    /// Converts a dynamic value, rejecting anything other than text,
    /// expressions and queries.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::UnsupportedInputType`] naming `clause`.
    pub fn from_value(clause: &'static str, value: Value) -> Result<Self> {
        match value {
            Value::Text(s) => Ok(Self::Name(s)),
            Value::Expression(e) => Ok(Self::Expression(e)),
            Value::Query(q) => Ok(Self::Query(q)),
            other => Err(QueryError::UnsupportedInputType {
                clause,
                found: other.kind(),
            }),
        }
    }
}

impl From<&str> for ClauseItem {
    fn from(value: &str) -> Self {
        Self::Name(String::from(value))
    }
}

impl From<String> for ClauseItem {
    fn from(value: String) -> Self {
        Self::Name(value)
    }
}

impl From<&String> for ClauseItem {
    fn from(value: &String) -> Self {
        Self::Name(value.clone())
    }
}

impl From<Expression> for ClauseItem {
    fn from(value: Expression) -> Self {
        Self::Expression(value)
    }
}

impl From<Query> for ClauseItem {
    fn from(value: Query) -> Self {
        Self::Query(Box::new(value))
    }
}

/// Input accepted by `select`, `from`, `group_by` and `order_by`.
///
/// Text is split on top-level commas. Lists are taken element by element.
/// Mappings key each element by an alias (select, from) or carry the sort
/// direction as the value (order-by).
#[derive(Debug, Clone, PartialEq)]
pub enum ClauseInput {
    /// Comma-separated text.
    Text(String),
    /// Ordered elements.
    List(Vec<ClauseItem>),
    /// Keyed elements.
    Map(IndexMap<String, ClauseItem>),
    /// A single raw expression.
    Expression(Expression),
}

impl ClauseInput {
    /// Builds a keyed input, preserving the order of `entries`.
    pub fn map<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<ClauseItem>,
    {
        Self::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Converts a dynamic value.
    ///
    /// Text, expressions, lists and mappings of text/expression/query
    /// elements are accepted. A query becomes a single-element list.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::UnsupportedInputType`] naming `clause` for
    /// numbers, booleans, null and nested lists.
    pub fn from_value(clause: &'static str, value: Value) -> Result<Self> {
        match value {
            Value::Text(s) => Ok(Self::Text(s)),
            Value::Expression(e) => Ok(Self::Expression(e)),
            Value::Query(q) => Ok(Self::List(vec![ClauseItem::Query(q)])),
            Value::List(items) => items
                .into_iter()
                .map(|item| ClauseItem::from_value(clause, item))
                .collect::<Result<_>>()
                .map(Self::List),
            Value::Map(entries) => entries
                .into_iter()
                .map(|(k, v)| ClauseItem::from_value(clause, v).map(|item| (k, item)))
                .collect::<Result<_>>()
                .map(Self::Map),
            other => Err(QueryError::UnsupportedInputType {
                clause,
                found: other.kind(),
            }),
        }
    }
}

impl TryFrom<Value> for ClauseInput {
    type Error = QueryError;

    fn try_from(value: Value) -> Result<Self> {
        Self::from_value("clause", value)
    }
}

impl TryFrom<serde_json::Value> for ClauseInput {
    type Error = QueryError;

    fn try_from(value: serde_json::Value) -> Result<Self> {
        Self::from_value("clause", Value::from(value))
    }
}

impl From<&str> for ClauseInput {
    fn from(value: &str) -> Self {
        Self::Text(String::from(value))
    }
}

impl From<String> for ClauseInput {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&String> for ClauseInput {
    fn from(value: &String) -> Self {
        Self::Text(value.clone())
    }
}

impl From<Expression> for ClauseInput {
    fn from(value: Expression) -> Self {
        Self::Expression(value)
    }
}

impl From<Query> for ClauseInput {
    fn from(value: Query) -> Self {
        Self::List(vec![ClauseItem::from(value)])
    }
}

impl<T: Into<ClauseItem>> From<Vec<T>> for ClauseInput {
    fn from(value: Vec<T>) -> Self {
        Self::List(value.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<ClauseItem>, const N: usize> From<[T; N]> for ClauseInput {
    fn from(value: [T; N]) -> Self {
        Self::List(value.into_iter().map(Into::into).collect())
    }
}

impl<K: Into<String>, V: Into<ClauseItem>> From<IndexMap<K, V>> for ClauseInput {
    fn from(value: IndexMap<K, V>) -> Self {
        Self::map(value)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_from_json_list() {
        let input = ClauseInput::try_from(json!(["id", "name"])).unwrap();
        assert_eq!(
            input,
            ClauseInput::List(vec![ClauseItem::from("id"), ClauseItem::from("name")])
        );
    }

    #[test]
    fn test_from_json_map_keeps_order() {
        let input = ClauseInput::try_from(json!({"z": "a", "b": "c"})).unwrap();
        let ClauseInput::Map(entries) = input else {
            panic!("expected a map");
        };
        let keys: Vec<&str> = entries.keys().map(String::as_str).collect();
        assert_eq!(keys, ["z", "b"]);
    }

    #[test]
    fn test_rejects_unsupported_types() {
        for value in [json!(5), json!(true), json!(null), json!([["nested"]])] {
            let err = ClauseInput::from_value("select", Value::from(value)).unwrap_err();
            assert!(
                matches!(err, QueryError::UnsupportedInputType { clause: "select", .. }),
                "unexpected error: {err}"
            );
        }
    }

    #[test]
    fn test_query_becomes_single_item_list() {
        let input = ClauseInput::from(Query::new().from("user"));
        assert!(matches!(&input, ClauseInput::List(items) if items.len() == 1));
    }
}
