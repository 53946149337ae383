//! SQL dialects reachable through the `Any` driver

use crate::error::DbError;
use std::fmt;

/// The SQL flavour of a connected database.
///
/// Decides identifier quoting, parameter placeholders and whether
/// `INSERT ... RETURNING` is available.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Sqlite,
    Postgres,
    MySql,
}

impl Dialect {
    /// Derive the dialect from a database URL scheme.
    pub fn from_url(db_url: &str) -> Result<Self, DbError> {
        let scheme = db_url
            .split_once(':')
            .map(|(scheme, _)| scheme.to_ascii_lowercase())
            .ok_or_else(|| DbError::UrlError(format!("Missing scheme in '{}'", db_url)))?;

        match scheme.as_str() {
            "sqlite" => Ok(Dialect::Sqlite),
            "postgres" | "postgresql" => Ok(Dialect::Postgres),
            "mysql" | "mariadb" => Ok(Dialect::MySql),
            other => Err(DbError::UrlError(format!(
                "Unsupported database scheme '{}'",
                other
            ))),
        }
    }

    /// Quote an identifier. Embedded quote characters are doubled.
    pub fn quote(&self, ident: &str) -> String {
        match self {
            Dialect::MySql => format!("`{}`", ident.replace('`', "``")),
            Dialect::Sqlite | Dialect::Postgres => format!("\"{}\"", ident.replace('"', "\"\"")),
        }
    }

    /// Placeholder for the `index`-th bound parameter, counting from 1.
    pub fn placeholder(&self, index: usize) -> String {
        match self {
            Dialect::Postgres => format!("${}", index),
            Dialect::Sqlite | Dialect::MySql => "?".to_string(),
        }
    }

    pub fn supports_returning(&self) -> bool {
        !matches!(self, Dialect::MySql)
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::Sqlite => write!(f, "sqlite"),
            Dialect::Postgres => write!(f, "postgres"),
            Dialect::MySql => write!(f, "mysql"),
        }
    }
}
