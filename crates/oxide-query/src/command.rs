//! Finalized statements.
//!
//! A [`Command`] holds SQL with its bound parameters and turns it into the
//! raw SQL string handed to the [`Connection`]. Parameter values are inlined
//! as dialect-quoted literals; this is the only place where values enter SQL
//! text, so every literal goes through [`Value::to_sql_inline`].

use std::collections::HashMap;

use tracing::debug;

use crate::connection::{Connection, QueryResult, Row};
use crate::error::Result;
use crate::value::{Params, Value};

/// A SQL statement bound to a connection.
pub struct Command<'a, C: Connection> {
    db: &'a C,
    sql: String,
    params: Params,
}

impl<C: Connection> std::fmt::Debug for Command<'_, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command")
            .field("sql", &self.sql)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl<'a, C: Connection> Command<'a, C> {
    /// Creates a command. Table and column markers in `sql` are replaced
    /// right away.
    pub fn new(db: &'a C, sql: impl Into<String>, params: Params) -> Self {
        let sql = db.quote_sql(&sql.into());
        Self { db, sql, params }
    }

    /// Returns the SQL template with placeholders.
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Returns the bound parameters.
    #[must_use]
    pub const fn params(&self) -> &Params {
        &self.params
    }

    /// Binds one parameter. Names match `:name` with or without the
    /// leading colon; a numeric name binds the `?` at that index.
    #[must_use]
    pub fn bind_value(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Binds several parameters.
    #[must_use]
    pub fn bind_values<I, K, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        for (name, value) in values {
            self.params.insert(name.into(), value.into());
        }
        self
    }

    /// Returns the SQL with every parameter inlined as a literal.
    ///
    /// Named parameters replace `:name` tokens; a token only matches a
    /// parameter with exactly that name, and `::` casts are left alone.
    /// Parameters keyed by a number replace `?` placeholders in index
    /// order.
    ///
    /// **Warning**: the result is executable SQL. Only the dialect's
    /// literal quoting stands between parameter values and the statement,
    /// so use it with a dialect that matches the target database.
    #[must_use]
    pub fn raw_sql(&self) -> String {
        if self.params.is_empty() {
            return self.sql.clone();
        }
        let dialect = self.db.dialect();
        let mut named = HashMap::with_capacity(self.params.len());
        let mut positional = Vec::new();
        for (name, value) in &self.params {
            let literal = value.to_sql_inline(dialect);
            if let Ok(index) = name.parse::<u64>() {
                positional.push((index, literal));
            } else if name.starts_with(':') {
                named.insert(name.clone(), literal);
            } else {
                named.insert(format!(":{name}"), literal);
            }
        }
        positional.sort_by_key(|(index, _)| *index);
        inline_params(
            &self.sql,
            &named,
            positional.into_iter().map(|(_, literal)| literal),
        )
    }

    /// Executes the statement.
    ///
    /// # Errors
    ///
    /// Returns the connection's error if execution fails.
    pub async fn execute(&self) -> Result<QueryResult> {
        let sql = self.raw_sql();
        debug!(sql = %sql, "Executing SQL");
        self.db.execute(&sql).await
    }

    /// Returns all rows.
    ///
    /// # Errors
    ///
    /// Returns the connection's error if execution fails.
    pub async fn query_all(&self) -> Result<Vec<Row>> {
        Ok(self.execute().await?.rows)
    }

    /// Returns the first row.
    ///
    /// # Errors
    ///
    /// Returns the connection's error if execution fails.
    pub async fn query_one(&self) -> Result<Option<Row>> {
        Ok(self.execute().await?.rows.into_iter().next())
    }

    /// Returns the first column of the first row.
    ///
    /// # Errors
    ///
    /// Returns the connection's error if execution fails.
    pub async fn query_scalar(&self) -> Result<Option<Value>> {
        Ok(self
            .query_one()
            .await?
            .and_then(|row| row.into_values().next()))
    }

    /// Returns the first column of every row.
    ///
    /// # Errors
    ///
    /// Returns the connection's error if execution fails.
    pub async fn query_column(&self) -> Result<Vec<Value>> {
        Ok(self
            .query_all()
            .await?
            .into_iter()
            .filter_map(|row| row.into_values().next())
            .collect())
    }
}

/// Replaces `:name` tokens and `?` placeholders in a single pass.
fn inline_params(
    sql: &str,
    named: &HashMap<String, String>,
    positional: impl Iterator<Item = String>,
) -> String {
    let mut positional = positional.peekable();
    let mut out = String::with_capacity(sql.len());
    let mut chars = sql.char_indices().peekable();
    let mut quoted = false;
    while let Some((start, c)) = chars.next() {
        match c {
            '\'' => {
                quoted = !quoted;
                out.push(c);
            }
            ':' => {
                if chars.next_if(|&(_, next)| next == ':').is_some() {
                    out.push_str("::");
                    continue;
                }
                let mut end = start + 1;
                while let Some((i, next)) =
                    chars.next_if(|&(_, next)| next.is_ascii_alphanumeric() || next == '_')
                {
                    end = i + next.len_utf8();
                }
                let token = &sql[start..end];
                match named.get(token) {
                    Some(literal) if end > start + 1 => out.push_str(literal),
                    _ => out.push_str(token),
                }
            }
            '?' if !quoted && positional.peek().is_some() => {
                if let Some(literal) = positional.next() {
                    out.push_str(&literal);
                }
            }
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(entries: &[(&str, &str)]) -> HashMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| (String::from(*k), String::from(*v)))
            .collect()
    }

    #[test]
    fn test_inline_exact_token_match() {
        let params = named(&[(":id", "1"), (":id_2", "2")]);
        assert_eq!(
            inline_params("a = :id AND b = :id_2 AND c = :idx", &params, std::iter::empty()),
            "a = 1 AND b = 2 AND c = :idx"
        );
    }

    #[test]
    fn test_inline_skips_casts() {
        let params = named(&[(":v", "'5'")]);
        assert_eq!(
            inline_params("SELECT :v::int, '{}'::jsonb", &params, std::iter::empty()),
            "SELECT '5'::int, '{}'::jsonb"
        );
    }

    #[test]
    fn test_inline_positional() {
        let positional = vec![String::from("'a'"), String::from("2")];
        assert_eq!(
            inline_params("x = ? AND y = ? AND z = ?", &HashMap::new(), positional.into_iter()),
            "x = 'a' AND y = 2 AND z = ?"
        );
    }

    #[test]
    fn test_inline_positional_skips_string_literals() {
        let positional = vec![String::from("5")];
        assert_eq!(
            inline_params("SELECT 'why?', 'it''s ?', ?", &HashMap::new(), positional.into_iter()),
            "SELECT 'why?', 'it''s ?', 5"
        );
    }

    #[test]
    fn test_inline_lone_colon() {
        assert_eq!(
            inline_params("a : b", &named(&[(":", "x")]), std::iter::empty()),
            "a : b"
        );
    }
}
