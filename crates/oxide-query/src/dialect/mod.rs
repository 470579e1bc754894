//! SQL Dialect support.
//!
//! Different databases quote identifiers and literals differently and
//! disagree on some clause syntax. The [`Dialect`] trait carries those
//! rules; every method has an ANSI default so a dialect only overrides what
//! it changes.

mod generic;
mod mysql;
mod postgres;

pub use generic::GenericDialect;
pub use mysql::MysqlDialect;
pub use postgres::PostgresDialect;

use crate::condition::ConditionConstructor;
use crate::schema::ColumnType;

/// Trait for SQL dialect-specific behavior.
///
/// Implementations are stateless and shared across renders.
pub trait Dialect: Send + Sync {
    /// Returns the name of the dialect.
    fn name(&self) -> &'static str;

    /// Returns the identifier quote character (e.g., `"` for standard SQL, `` ` `` for MySQL).
    fn identifier_quote(&self) -> char {
        '"'
    }

    /// Quotes a single table name part. Already quoted names pass through.
    fn quote_simple_table_name(&self, name: &str) -> String {
        quote_identifier(name, self.identifier_quote())
    }

    /// Quotes a single column name part. `*` and already quoted names pass
    /// through.
    fn quote_simple_column_name(&self, name: &str) -> String {
        if name == "*" {
            return String::from(name);
        }
        quote_identifier(name, self.identifier_quote())
    }

    /// Quotes a possibly schema-qualified table name.
    ///
    /// Sub-query text (anything containing `(`) and `{{...}}` markers pass
    /// through unchanged.
    fn quote_table_name(&self, name: &str) -> String {
        if name.contains('(') || name.contains("{{") {
            return String::from(name);
        }
        name.split('.')
            .map(|part| self.quote_simple_table_name(part))
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Quotes a possibly table-qualified column name.
    ///
    /// Names containing `(` or `[[...]]` markers pass through unchanged.
    fn quote_column_name(&self, name: &str) -> String {
        if name.contains('(') || name.contains("[[") {
            return String::from(name);
        }
        let (prefix, column) = match name.rfind('.') {
            Some(pos) => (
                format!("{}.", self.quote_table_name(&name[..pos])),
                &name[pos + 1..],
            ),
            None => (String::new(), name),
        };
        if column.contains("{{") {
            return String::from(name);
        }
        format!("{prefix}{}", self.quote_simple_column_name(column))
    }

    /// Quotes a string value for inline use.
    ///
    /// Numeric-looking text passes unquoted. Otherwise the value is wrapped
    /// in single quotes with embedded quotes doubled and backslash, NUL, CR
    /// and LF escaped.
    fn quote_value(&self, value: &str) -> String {
        if is_numeric(value) {
            return String::from(value);
        }
        let (escaped, _) = escape_string(value);
        format!("'{escaped}'")
    }

    /// Replaces `{{table}}` and `[[column]]` markers with quoted names.
    ///
    /// A `%` inside a table marker is replaced by `table_prefix`.
    fn quote_sql(&self, sql: &str, table_prefix: &str) -> String {
        let mut out = String::with_capacity(sql.len());
        let mut rest = sql;
        loop {
            let table = rest.find("{{");
            let column = rest.find("[[");
            let (start, close, is_table) = match (table, column) {
                (Some(t), Some(c)) if c < t => (c, "]]", false),
                (Some(t), _) => (t, "}}", true),
                (None, Some(c)) => (c, "]]", false),
                (None, None) => break,
            };
            let Some(len) = rest[start + 2..].find(close) else {
                break;
            };
            let inner = &rest[start + 2..start + 2 + len];
            out.push_str(&rest[..start]);
            if is_table {
                let name = inner.replace('%', table_prefix);
                out.push_str(&self.quote_table_name(&name));
            } else {
                out.push_str(&self.quote_column_name(inner));
            }
            rest = &rest[start + 2 + len + 2..];
        }
        out.push_str(rest);
        out
    }

    /// Builds the LIMIT/OFFSET fragment. Either part may be absent.
    fn build_limit(&self, limit: Option<&str>, offset: Option<&str>) -> String {
        match (limit, offset) {
            (Some(l), Some(o)) => format!("LIMIT {l} OFFSET {o}"),
            (Some(l), None) => format!("LIMIT {l}"),
            (None, Some(o)) => format!("OFFSET {o}"),
            (None, None) => String::new(),
        }
    }

    /// Extra condition operators this dialect understands.
    fn condition_constructors(&self) -> Vec<(&'static str, ConditionConstructor)> {
        Vec::new()
    }

    /// Maps an abstract column type to the physical type.
    fn map_column_type(&self, column_type: &ColumnType) -> String {
        match column_type {
            ColumnType::Pk | ColumnType::UnsignedPk => {
                String::from("integer NOT NULL PRIMARY KEY")
            }
            ColumnType::BigPk | ColumnType::UnsignedBigPk => {
                String::from("bigint NOT NULL PRIMARY KEY")
            }
            ColumnType::Char => String::from("char(1)"),
            ColumnType::String => String::from("varchar(255)"),
            ColumnType::Text => String::from("text"),
            ColumnType::Smallint => String::from("smallint"),
            ColumnType::Integer => String::from("integer"),
            ColumnType::Bigint => String::from("bigint"),
            ColumnType::Float => String::from("float"),
            ColumnType::Double => String::from("double precision"),
            ColumnType::Decimal => String::from("decimal(10,0)"),
            ColumnType::Datetime | ColumnType::Timestamp => String::from("timestamp"),
            ColumnType::Time => String::from("time"),
            ColumnType::Date => String::from("date"),
            ColumnType::Binary => String::from("blob"),
            ColumnType::Boolean => String::from("boolean"),
            ColumnType::Money => String::from("decimal(19,4)"),
            ColumnType::Json => String::from("text"),
            ColumnType::Custom(name) => name.clone(),
        }
    }

    /// Keyword appended for unsigned numeric columns.
    fn unsigned_keyword(&self) -> &'static str {
        ""
    }

    /// Inline column comment fragment. Dialects without inline comments
    /// return an empty string.
    fn column_comment(&self, _comment: &str) -> String {
        String::new()
    }
}

/// Wraps `name` in `quote`, doubling embedded quote characters.
fn quote_identifier(name: &str, quote: char) -> String {
    if name.starts_with(quote) {
        return String::from(name);
    }
    let doubled = format!("{quote}{quote}");
    let escaped = name.replace(quote, &doubled);
    format!("{quote}{escaped}{quote}")
}

/// Escapes a string literal body. The flag reports whether any backslash
/// escape was emitted.
pub(crate) fn escape_string(value: &str) -> (String, bool) {
    let mut out = String::with_capacity(value.len());
    let mut backslashed = false;
    for c in value.chars() {
        match c {
            '\'' => out.push_str("''"),
            '\\' => {
                out.push_str("\\\\");
                backslashed = true;
            }
            '\0' => {
                out.push_str("\\0");
                backslashed = true;
            }
            '\n' => {
                out.push_str("\\n");
                backslashed = true;
            }
            '\r' => {
                out.push_str("\\r");
                backslashed = true;
            }
            c => out.push(c),
        }
    }
    (out, backslashed)
}

/// Whether `s` is a plain decimal number: optional sign, digits with an
/// optional fraction, optional exponent.
pub(crate) fn is_numeric(s: &str) -> bool {
    let bytes = s.as_bytes();
    let mut i = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        i += 1;
    }
    let mut digits = 0;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
        digits += 1;
    }
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
            digits += 1;
        }
    }
    if digits == 0 {
        return false;
    }
    if i < bytes.len() && matches!(bytes[i], b'e' | b'E') {
        i += 1;
        if matches!(bytes.get(i), Some(b'+' | b'-')) {
            i += 1;
        }
        let start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == start {
            return false;
        }
    }
    i == bytes.len()
}
