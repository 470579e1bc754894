//! INSERT, UPDATE, DELETE and table DDL.

use indexmap::IndexMap;

use super::QueryBuilder;
use crate::error::Result;
use crate::schema::ColumnSchemaBuilder;
use crate::value::{Params, Value};

/// A column in a `CREATE TABLE` statement.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnDefinition {
    /// A physical type written out, e.g. `varchar(180) NOT NULL`.
    Raw(String),
    /// A definition rendered by the dialect.
    Schema(ColumnSchemaBuilder),
}

impl From<&str> for ColumnDefinition {
    fn from(value: &str) -> Self {
        Self::Raw(String::from(value))
    }
}

impl From<String> for ColumnDefinition {
    fn from(value: String) -> Self {
        Self::Raw(value)
    }
}

impl From<ColumnSchemaBuilder> for ColumnDefinition {
    fn from(value: ColumnSchemaBuilder) -> Self {
        Self::Schema(value)
    }
}

impl QueryBuilder<'_> {
    /// Builds `INSERT INTO table (columns) VALUES (...)`.
    ///
    /// Values are bound; expressions and sub-queries are inlined. Without
    /// columns the statement inserts `DEFAULT VALUES`.
    ///
    /// # Errors
    ///
    /// Returns an error if a sub-query value cannot be built.
    pub fn insert<I, K, V>(&self, table: &str, columns: I) -> Result<(String, Params)>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut params = Params::new();
        let mut names = Vec::new();
        let mut values = Vec::new();
        for (name, value) in columns {
            names.push(self.dialect.quote_column_name(&name.into()));
            values.push(self.build_operand(&value.into(), &mut params)?);
        }
        let table = self.dialect.quote_table_name(table);
        let sql = if names.is_empty() {
            format!("INSERT INTO {table} DEFAULT VALUES")
        } else {
            format!(
                "INSERT INTO {table} ({}) VALUES ({})",
                names.join(", "),
                values.join(", ")
            )
        };
        Ok((sql, params))
    }

    /// Builds `UPDATE table SET ... [WHERE condition]`.
    ///
    /// # Errors
    ///
    /// Returns an error if the condition is malformed.
    pub fn update<I, K, V>(
        &self,
        table: &str,
        columns: I,
        condition: impl Into<Value>,
    ) -> Result<(String, Params)>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut params = Params::new();
        let mut sets = Vec::new();
        for (name, value) in columns {
            let column = self.dialect.quote_column_name(&name.into());
            let operand = self.build_operand(&value.into(), &mut params)?;
            sets.push(format!("{column} = {operand}"));
        }
        let mut sql = format!(
            "UPDATE {} SET {}",
            self.dialect.quote_table_name(table),
            sets.join(", ")
        );
        let condition = condition.into();
        let clause = self.build_where(Some(&condition), &mut params)?;
        if !clause.is_empty() {
            sql.push(' ');
            sql.push_str(&clause);
        }
        Ok((sql, params))
    }

    /// Builds `DELETE FROM table [WHERE condition]`.
    ///
    /// # Errors
    ///
    /// Returns an error if the condition is malformed.
    pub fn delete(&self, table: &str, condition: impl Into<Value>) -> Result<(String, Params)> {
        let mut params = Params::new();
        let mut sql = format!("DELETE FROM {}", self.dialect.quote_table_name(table));
        let condition = condition.into();
        let clause = self.build_where(Some(&condition), &mut params)?;
        if !clause.is_empty() {
            sql.push(' ');
            sql.push_str(&clause);
        }
        Ok((sql, params))
    }

    /// Builds `CREATE TABLE`, one column per line, followed by `options`.
    #[must_use]
    pub fn create_table(
        &self,
        table: &str,
        columns: &IndexMap<String, ColumnDefinition>,
        options: Option<&str>,
    ) -> String {
        let definitions = columns
            .iter()
            .map(|(name, definition)| {
                let definition = match definition {
                    ColumnDefinition::Raw(sql) => sql.clone(),
                    ColumnDefinition::Schema(builder) => builder.build(self.dialect),
                };
                format!("    {} {definition}", self.dialect.quote_column_name(name))
            })
            .collect::<Vec<_>>()
            .join(",\n");
        let mut sql = format!(
            "CREATE TABLE {} (\n{definitions}\n)",
            self.dialect.quote_table_name(table)
        );
        if let Some(options) = options.filter(|o| !o.is_empty()) {
            sql.push(' ');
            sql.push_str(options);
        }
        sql
    }

    /// Builds `DROP TABLE`.
    #[must_use]
    pub fn drop_table(&self, table: &str) -> String {
        format!("DROP TABLE {}", self.dialect.quote_table_name(table))
    }
}
