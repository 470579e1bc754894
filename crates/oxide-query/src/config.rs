//! Connection configuration.
//!
//! The configuration names the driver, which selects the dialect, and the
//! table prefix used for `{{%table}}` markers. It is read from JSON with
//! camelCase keys; keys this crate does not use (host, credentials, pool
//! sizes) are ignored.

use serde::{Deserialize, Serialize};

use crate::dialect::{Dialect, GenericDialect, MysqlDialect, PostgresDialect};
use crate::error::Result;

/// Database driver, selecting the SQL dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Driver {
    /// ANSI quoting, no dialect extensions.
    #[default]
    Generic,
    /// PostgreSQL.
    #[serde(alias = "postgres", alias = "postgresql")]
    Pg,
    /// MySQL and MariaDB.
    #[serde(alias = "mariadb")]
    Mysql,
}

impl Driver {
    /// Returns the dialect for this driver.
    #[must_use]
    pub fn dialect(self) -> Box<dyn Dialect> {
        match self {
            Self::Generic => Box::new(GenericDialect::new()),
            Self::Pg => Box::new(PostgresDialect::new()),
            Self::Mysql => Box::new(MysqlDialect::new()),
        }
    }
}

/// Settings that affect SQL generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct ConnectionConfig {
    /// Database driver.
    pub driver: Driver,
    /// Prefix substituted for `%` in `{{%table}}` markers.
    pub table_prefix: String,
}

impl ConnectionConfig {
    /// Parses a configuration from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Config`](crate::error::QueryError::Config) if
    /// the JSON is invalid or names an unknown driver.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parses a configuration from an already decoded JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Config`](crate::error::QueryError::Config) if
    /// the value does not describe a configuration.
    pub fn from_json_value(value: serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Returns the dialect for the configured driver.
    #[must_use]
    pub fn dialect(&self) -> Box<dyn Dialect> {
        self.driver.dialect()
    }
}
