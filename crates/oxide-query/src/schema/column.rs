//! Fluent column definition builder.

use crate::dialect::{is_numeric, Dialect};
use crate::value::Value;

/// Format used by [`ColumnSchemaBuilder::build`].
pub const DEFAULT_FORMAT: &str = "{type}{length}{unsigned}{notnull}{unique}{default}{check}{comment}";

/// Abstract column type, mapped to a physical type by the dialect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnType {
    /// Auto-incrementing primary key.
    Pk,
    /// Unsigned auto-incrementing primary key.
    UnsignedPk,
    /// Auto-incrementing big primary key.
    BigPk,
    /// Unsigned auto-incrementing big primary key.
    UnsignedBigPk,
    /// Fixed-length character.
    Char,
    /// Variable-length string.
    String,
    /// Unbounded text.
    Text,
    /// Small integer.
    Smallint,
    /// Integer.
    Integer,
    /// Big integer.
    Bigint,
    /// Single-precision float.
    Float,
    /// Double-precision float.
    Double,
    /// Exact decimal.
    Decimal,
    /// Date and time.
    Datetime,
    /// Timestamp.
    Timestamp,
    /// Time of day.
    Time,
    /// Calendar date.
    Date,
    /// Binary data.
    Binary,
    /// Boolean.
    Boolean,
    /// Monetary amount.
    Money,
    /// JSON document.
    Json,
    /// A physical type passed through unchanged.
    Custom(String),
}

impl ColumnType {
    /// Whether this is one of the primary key types.
    #[must_use]
    pub const fn is_primary_key(&self) -> bool {
        matches!(
            self,
            Self::Pk | Self::UnsignedPk | Self::BigPk | Self::UnsignedBigPk
        )
    }
}

/// Length or precision of a column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnLength {
    /// A single size, e.g. `varchar(64)`.
    Size(u32),
    /// Precision and scale, e.g. `decimal(10,2)`.
    Precision(u32, u32),
}

impl ColumnLength {
    fn to_sql(self) -> String {
        match self {
            Self::Size(n) => format!("({n})"),
            Self::Precision(p, s) => format!("({p},{s})"),
        }
    }
}

/// Fluent builder for a column definition.
///
/// ```
/// use oxide_query::schema::{string, ColumnSchemaBuilder, ColumnType};
/// use oxide_query::PostgresDialect;
///
/// let column = string(64).not_null().unique().default_value("guest");
/// assert_eq!(
///     column.build(&PostgresDialect::new()),
///     "varchar(64) NOT NULL UNIQUE DEFAULT 'guest'"
/// );
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSchemaBuilder {
    column_type: ColumnType,
    length: Option<ColumnLength>,
    not_null: Option<bool>,
    unique: bool,
    unsigned: bool,
    default: Option<Value>,
    check: Option<String>,
    comment: Option<String>,
}

impl ColumnSchemaBuilder {
    /// Creates a builder for `column_type`.
    #[must_use]
    pub const fn new(column_type: ColumnType) -> Self {
        Self {
            column_type,
            length: None,
            not_null: None,
            unique: false,
            unsigned: false,
            default: None,
            check: None,
            comment: None,
        }
    }

    /// Sets the length or precision.
    #[must_use]
    pub const fn length(mut self, length: ColumnLength) -> Self {
        self.length = Some(length);
        self
    }

    /// Adds `NOT NULL`.
    #[must_use]
    pub const fn not_null(mut self) -> Self {
        self.not_null = Some(true);
        self
    }

    /// Adds an explicit `NULL`.
    #[must_use]
    pub const fn null(mut self) -> Self {
        self.not_null = Some(false);
        self
    }

    /// Adds `UNIQUE`.
    #[must_use]
    pub const fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Marks the column unsigned. Primary keys switch to their unsigned
    /// variant.
    #[must_use]
    pub fn unsigned(mut self) -> Self {
        self.column_type = match self.column_type {
            ColumnType::Pk => ColumnType::UnsignedPk,
            ColumnType::BigPk => ColumnType::UnsignedBigPk,
            other => other,
        };
        self.unsigned = true;
        self
    }

    /// Sets the default value. A null default also marks the column
    /// nullable.
    #[must_use]
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        let value = value.into();
        if matches!(value, Value::Null) {
            self.not_null = Some(false);
        }
        self.default = Some(value);
        self
    }

    /// Sets a raw SQL default, e.g. `CURRENT_TIMESTAMP`.
    #[must_use]
    pub fn default_expression(mut self, sql: impl Into<String>) -> Self {
        self.default = Some(Value::Expression(crate::Expression::new(sql)));
        self
    }

    /// Adds a CHECK constraint.
    #[must_use]
    pub fn check(mut self, sql: impl Into<String>) -> Self {
        self.check = Some(sql.into());
        self
    }

    /// Sets the column comment. Only dialects with inline comments render
    /// it.
    #[must_use]
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Returns the abstract type.
    #[must_use]
    pub const fn column_type(&self) -> &ColumnType {
        &self.column_type
    }

    /// Renders the definition with [`DEFAULT_FORMAT`].
    #[must_use]
    pub fn build(&self, dialect: &dyn Dialect) -> String {
        self.build_with_format(dialect, DEFAULT_FORMAT)
    }

    /// Renders the definition, substituting the fragments into `format`.
    ///
    /// Placeholders: `{type}`, `{length}`, `{unsigned}`, `{notnull}`,
    /// `{unique}`, `{default}`, `{check}`, `{comment}`.
    #[must_use]
    pub fn build_with_format(&self, dialect: &dyn Dialect, format: &str) -> String {
        let (column_type, length) = self.build_type(dialect);
        let unsigned = if self.unsigned && !self.column_type.is_primary_key() {
            dialect.unsigned_keyword()
        } else {
            ""
        };
        let not_null = match self.not_null {
            Some(true) => " NOT NULL",
            Some(false) => " NULL",
            None => "",
        };
        let unique = if self.unique { " UNIQUE" } else { "" };
        let check = self
            .check
            .as_ref()
            .map(|sql| format!(" CHECK ({sql})"))
            .unwrap_or_default();
        let comment = self
            .comment
            .as_deref()
            .map(|c| dialect.column_comment(c))
            .unwrap_or_default();

        let default = self.build_default(dialect);
        substitute(
            format,
            &[
                ("type", &column_type),
                ("length", &length),
                ("unsigned", unsigned),
                ("notnull", not_null),
                ("unique", unique),
                ("default", &default),
                ("check", &check),
                ("comment", &comment),
            ],
        )
    }

    /// Returns the physical type and the `{length}` fragment.
    ///
    /// A given length replaces the dialect's default one in place. Types
    /// without one take the length as a suffix unless their mapping has
    /// several words (primary keys).
    fn build_type(&self, dialect: &dyn Dialect) -> (String, String) {
        let mapped = dialect.map_column_type(&self.column_type);
        let Some(length) = self.length else {
            return (mapped, String::new());
        };
        if let Some(open) = mapped.find('(') {
            if let Some(close) = mapped[open..].find(')') {
                let replaced = format!(
                    "{}{}{}",
                    &mapped[..open],
                    length.to_sql(),
                    &mapped[open + close + 1..]
                );
                return (replaced, String::new());
            }
        }
        if mapped.contains(char::is_whitespace) {
            (mapped, String::new())
        } else {
            (mapped, length.to_sql())
        }
    }

    fn build_default(&self, dialect: &dyn Dialect) -> String {
        match &self.default {
            None => String::new(),
            Some(Value::Null) => String::from(" DEFAULT NULL"),
            Some(Value::Expression(e)) => format!(" DEFAULT {}", e.sql()),
            Some(value) => format!(" DEFAULT {}", quote_default(value, dialect)),
        }
    }
}

fn quote_default(value: &Value, dialect: &dyn Dialect) -> String {
    match value {
        // Numeric text would pass through quote_value unquoted.
        Value::Text(s) if is_numeric(s) => format!("'{s}'"),
        Value::Text(s) => dialect.quote_value(s),
        other => other.to_sql_inline(dialect),
    }
}

/// Replaces each `{name}` placeholder of `format` in one pass, so
/// substituted text is never scanned again. Unknown placeholders are kept.
fn substitute(format: &str, fields: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(format.len());
    let mut rest = format;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open..];
        let field = tail.find('}').and_then(|close| {
            let name = &tail[1..close];
            fields
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, close))
        });
        if let Some((value, close)) = field {
            out.push_str(value);
            rest = &tail[close + 1..];
        } else {
            out.push('{');
            rest = &tail[1..];
        }
    }
    out.push_str(rest);
    out
}

/// Creates a primary key column.
#[must_use]
pub const fn pk() -> ColumnSchemaBuilder {
    ColumnSchemaBuilder::new(ColumnType::Pk)
}

/// Creates a big primary key column.
#[must_use]
pub const fn big_pk() -> ColumnSchemaBuilder {
    ColumnSchemaBuilder::new(ColumnType::BigPk)
}

/// Creates a fixed-length character column.
#[must_use]
pub const fn character(length: u32) -> ColumnSchemaBuilder {
    ColumnSchemaBuilder::new(ColumnType::Char).length(ColumnLength::Size(length))
}

/// Creates a variable-length string column.
#[must_use]
pub const fn string(length: u32) -> ColumnSchemaBuilder {
    ColumnSchemaBuilder::new(ColumnType::String).length(ColumnLength::Size(length))
}

/// Creates a text column.
#[must_use]
pub const fn text() -> ColumnSchemaBuilder {
    ColumnSchemaBuilder::new(ColumnType::Text)
}

/// Creates a small integer column.
#[must_use]
pub const fn small_integer() -> ColumnSchemaBuilder {
    ColumnSchemaBuilder::new(ColumnType::Smallint)
}

/// Creates an integer column.
#[must_use]
pub const fn integer() -> ColumnSchemaBuilder {
    ColumnSchemaBuilder::new(ColumnType::Integer)
}

/// Creates a big integer column.
#[must_use]
pub const fn big_integer() -> ColumnSchemaBuilder {
    ColumnSchemaBuilder::new(ColumnType::Bigint)
}

/// Creates a float column.
#[must_use]
pub const fn float() -> ColumnSchemaBuilder {
    ColumnSchemaBuilder::new(ColumnType::Float)
}

/// Creates a double column.
#[must_use]
pub const fn double() -> ColumnSchemaBuilder {
    ColumnSchemaBuilder::new(ColumnType::Double)
}

/// Creates a decimal column with precision and scale.
#[must_use]
pub const fn decimal(precision: u32, scale: u32) -> ColumnSchemaBuilder {
    ColumnSchemaBuilder::new(ColumnType::Decimal).length(ColumnLength::Precision(precision, scale))
}

/// Creates a datetime column.
#[must_use]
pub const fn datetime() -> ColumnSchemaBuilder {
    ColumnSchemaBuilder::new(ColumnType::Datetime)
}

/// Creates a timestamp column.
#[must_use]
pub const fn timestamp() -> ColumnSchemaBuilder {
    ColumnSchemaBuilder::new(ColumnType::Timestamp)
}

/// Creates a time column.
#[must_use]
pub const fn time() -> ColumnSchemaBuilder {
    ColumnSchemaBuilder::new(ColumnType::Time)
}

/// Creates a date column.
#[must_use]
pub const fn date() -> ColumnSchemaBuilder {
    ColumnSchemaBuilder::new(ColumnType::Date)
}

/// Creates a binary column.
#[must_use]
pub const fn binary() -> ColumnSchemaBuilder {
    ColumnSchemaBuilder::new(ColumnType::Binary)
}

/// Creates a boolean column.
#[must_use]
pub const fn boolean() -> ColumnSchemaBuilder {
    ColumnSchemaBuilder::new(ColumnType::Boolean)
}

/// Creates a money column.
#[must_use]
pub const fn money() -> ColumnSchemaBuilder {
    ColumnSchemaBuilder::new(ColumnType::Money)
}

/// Creates a JSON column.
#[must_use]
pub const fn json() -> ColumnSchemaBuilder {
    ColumnSchemaBuilder::new(ColumnType::Json)
}
