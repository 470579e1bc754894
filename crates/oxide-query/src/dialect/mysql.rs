//! MySQL dialect.

use super::Dialect;
use crate::schema::ColumnType;

/// MySQL dialect: backtick identifiers, inline column comments and a
/// mandatory LIMIT whenever OFFSET is used.
#[derive(Debug, Clone, Copy, Default)]
pub struct MysqlDialect;

impl MysqlDialect {
    /// Creates a new MySQL dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for MysqlDialect {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn identifier_quote(&self) -> char {
        '`'
    }

    fn build_limit(&self, limit: Option<&str>, offset: Option<&str>) -> String {
        match (limit, offset) {
            (Some(l), Some(o)) => format!("LIMIT {l} OFFSET {o}"),
            (Some(l), None) => format!("LIMIT {l}"),
            // MySQL has no standalone OFFSET; use the largest row count.
            (None, Some(o)) => format!("LIMIT 18446744073709551615 OFFSET {o}"),
            (None, None) => String::new(),
        }
    }

    fn map_column_type(&self, column_type: &ColumnType) -> String {
        match column_type {
            ColumnType::Pk => String::from("int(11) NOT NULL AUTO_INCREMENT PRIMARY KEY"),
            ColumnType::UnsignedPk => {
                String::from("int(10) UNSIGNED NOT NULL AUTO_INCREMENT PRIMARY KEY")
            }
            ColumnType::BigPk => String::from("bigint(20) NOT NULL AUTO_INCREMENT PRIMARY KEY"),
            ColumnType::UnsignedBigPk => {
                String::from("bigint(20) UNSIGNED NOT NULL AUTO_INCREMENT PRIMARY KEY")
            }
            ColumnType::Smallint => String::from("smallint(6)"),
            ColumnType::Integer => String::from("int(11)"),
            ColumnType::Bigint => String::from("bigint(20)"),
            ColumnType::Double => String::from("double"),
            ColumnType::Datetime => String::from("datetime"),
            ColumnType::Binary => String::from("blob"),
            ColumnType::Boolean => String::from("tinyint(1)"),
            ColumnType::Json => String::from("json"),
            other => super::GenericDialect.map_column_type(other),
        }
    }

    fn unsigned_keyword(&self) -> &'static str {
        " UNSIGNED"
    }

    fn column_comment(&self, comment: &str) -> String {
        format!(" COMMENT {}", self.quote_value(comment))
    }
}
