//! PostgreSQL dialect.

use super::{escape_string, is_numeric, Dialect};
use crate::condition::{registry, ConditionConstructor};
use crate::schema::ColumnType;

/// PostgreSQL dialect.
///
/// Literals that need backslash escapes are emitted as `E'...'` strings so
/// they survive `standard_conforming_strings`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresDialect;

impl PostgresDialect {
    /// Creates a new PostgreSQL dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgresql"
    }

    fn quote_value(&self, value: &str) -> String {
        if is_numeric(value) {
            return String::from(value);
        }
        match escape_string(value) {
            (escaped, true) => format!("E'{escaped}'"),
            (escaped, false) => format!("'{escaped}'"),
        }
    }

    fn condition_constructors(&self) -> Vec<(&'static str, ConditionConstructor)> {
        vec![
            ("ILIKE", registry::like_condition),
            ("NOT ILIKE", registry::like_condition),
            ("OR ILIKE", registry::like_condition),
            ("OR NOT ILIKE", registry::like_condition),
        ]
    }

    fn map_column_type(&self, column_type: &ColumnType) -> String {
        match column_type {
            ColumnType::Pk | ColumnType::UnsignedPk => String::from("serial NOT NULL PRIMARY KEY"),
            ColumnType::BigPk | ColumnType::UnsignedBigPk => {
                String::from("bigserial NOT NULL PRIMARY KEY")
            }
            ColumnType::Float | ColumnType::Double => String::from("double precision"),
            ColumnType::Decimal => String::from("numeric(10,0)"),
            ColumnType::Datetime | ColumnType::Timestamp => String::from("timestamp(0)"),
            ColumnType::Time => String::from("time(0)"),
            ColumnType::Binary => String::from("bytea"),
            ColumnType::Money => String::from("numeric(19,4)"),
            ColumnType::Json => String::from("jsonb"),
            other => super::GenericDialect.map_column_type(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_postgres_quoting() {
        let d = PostgresDialect::new();
        assert_eq!(d.name(), "postgresql");
        assert_eq!(d.quote_column_name("t.name"), "\"t\".\"name\"");
        assert_eq!(d.quote_value("plain"), "'plain'");
        assert_eq!(d.quote_value("a\\b"), "E'a\\\\b'");
        assert_eq!(d.quote_value("7"), "7");
    }

    #[test]
    fn test_postgres_column_types() {
        let d = PostgresDialect::new();
        assert_eq!(d.map_column_type(&ColumnType::Pk), "serial NOT NULL PRIMARY KEY");
        assert_eq!(d.map_column_type(&ColumnType::Json), "jsonb");
        assert_eq!(d.map_column_type(&ColumnType::String), "varchar(255)");
    }

    #[test]
    fn test_postgres_registers_ilike() {
        let keywords: Vec<&str> = PostgresDialect::new()
            .condition_constructors()
            .into_iter()
            .map(|(k, _)| k)
            .collect();
        assert_eq!(keywords, ["ILIKE", "NOT ILIKE", "OR ILIKE", "OR NOT ILIKE"]);
    }
}
