//! SQL statement construction
//!
//! Builds statement text and its ordered parameters without touching a
//! database. Identifiers passed here are trusted; callers validate them
//! against the entity's columns first.

use crate::dialect::Dialect;
use crate::error::DbError;
use crate::value::FieldValue;
use sqlx::any::AnyArguments;
use sqlx::Arguments;

/// SQL text plus the values bound to its placeholders, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<FieldValue>,
}

impl Statement {
    /// Encode the parameters for the `Any` driver.
    ///
    /// # Errors
    ///
    /// [`DbError::QueryError`] if the driver refuses a value.
    pub fn arguments<'q>(&self) -> Result<AnyArguments<'q>, DbError> {
        let mut args = AnyArguments::default();
        for param in &self.params {
            let added = match param {
                FieldValue::Null => args.add(Option::<String>::None),
                FieldValue::Bool(b) => args.add(*b),
                FieldValue::Int(i) => args.add(*i),
                FieldValue::Float(x) => args.add(*x),
                FieldValue::Text(s) => args.add(s.clone()),
            };
            added.map_err(|e| DbError::QueryError(format!("Cannot bind {}: {}", param, e)))?;
        }
        Ok(args)
    }
}

struct StatementBuilder {
    dialect: Dialect,
    sql: String,
    params: Vec<FieldValue>,
}

impl StatementBuilder {
    fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push(&mut self, sql: &str) -> &mut Self {
        self.sql.push_str(sql);
        self
    }

    fn push_ident(&mut self, ident: &str) -> &mut Self {
        let quoted = self.dialect.quote(ident);
        self.push(&quoted)
    }

    fn push_idents(&mut self, idents: &[&str]) -> &mut Self {
        for (i, ident) in idents.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            self.push_ident(ident);
        }
        self
    }

    /// Writes a placeholder and records the value; `Null` is written inline.
    fn push_value(&mut self, value: &FieldValue) -> &mut Self {
        if value.is_null() {
            return self.push("NULL");
        }
        self.params.push(value.clone());
        let placeholder = self.dialect.placeholder(self.params.len());
        self.push(&placeholder)
    }

    /// `a = ? AND b IS NULL ...`
    fn push_conditions<'a>(
        &mut self,
        conditions: impl IntoIterator<Item = (&'a str, &'a FieldValue)>,
    ) -> &mut Self {
        for (i, (field, value)) in conditions.into_iter().enumerate() {
            if i > 0 {
                self.push(" AND ");
            }
            self.push_ident(field);
            if value.is_null() {
                self.push(" IS NULL");
            } else {
                self.push(" = ").push_value(value);
            }
        }
        self
    }

    fn build(self) -> Statement {
        Statement {
            sql: self.sql,
            params: self.params,
        }
    }
}

/// `SELECT <columns> FROM <table> [WHERE ...] ORDER BY <order_by> ASC`
pub fn select<'a>(
    dialect: Dialect,
    table: &str,
    columns: &[&str],
    conditions: impl IntoIterator<Item = (&'a str, &'a FieldValue)>,
    order_by: &str,
) -> Statement {
    let mut conditions = conditions.into_iter().peekable();
    let mut builder = StatementBuilder::new(dialect);
    builder
        .push("SELECT ")
        .push_idents(columns)
        .push(" FROM ")
        .push_ident(table);
    if conditions.peek().is_some() {
        builder.push(" WHERE ").push_conditions(conditions);
    }
    builder.push(" ORDER BY ").push_ident(order_by).push(" ASC");
    builder.build()
}

/// `INSERT INTO <table> (...) VALUES (...) [RETURNING <columns>]`
pub fn insert(
    dialect: Dialect,
    table: &str,
    values: &[(&str, FieldValue)],
    returning: Option<&[&str]>,
) -> Statement {
    let mut builder = StatementBuilder::new(dialect);
    builder.push("INSERT INTO ").push_ident(table);

    if values.is_empty() {
        match dialect {
            Dialect::MySql => builder.push(" () VALUES ()"),
            Dialect::Sqlite | Dialect::Postgres => builder.push(" DEFAULT VALUES"),
        };
    } else {
        let columns: Vec<&str> = values.iter().map(|(column, _)| *column).collect();
        builder.push(" (").push_idents(&columns).push(") VALUES (");
        for (i, (_, value)) in values.iter().enumerate() {
            if i > 0 {
                builder.push(", ");
            }
            builder.push_value(value);
        }
        builder.push(")");
    }

    if let Some(columns) = returning {
        builder.push(" RETURNING ").push_idents(columns);
    }
    builder.build()
}

/// `UPDATE <table> SET ... WHERE <key> = ?`
pub fn update(
    dialect: Dialect,
    table: &str,
    values: &[(&str, FieldValue)],
    key: &str,
    key_value: &FieldValue,
) -> Statement {
    let mut builder = StatementBuilder::new(dialect);
    builder.push("UPDATE ").push_ident(table).push(" SET ");
    for (i, (column, value)) in values.iter().enumerate() {
        if i > 0 {
            builder.push(", ");
        }
        builder.push_ident(column).push(" = ").push_value(value);
    }
    builder
        .push(" WHERE ")
        .push_conditions([(key, key_value)]);
    builder.build()
}

/// `DELETE FROM <table> WHERE <key> = ?`
pub fn delete(dialect: Dialect, table: &str, key: &str, key_value: &FieldValue) -> Statement {
    let mut builder = StatementBuilder::new(dialect);
    builder
        .push("DELETE FROM ")
        .push_ident(table)
        .push(" WHERE ")
        .push_conditions([(key, key_value)]);
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Filter;

    const COLUMNS: &[&str] = &["id", "name", "city"];

    #[test]
    fn test_select_without_conditions() {
        let stmt = select(Dialect::Sqlite, "contacts", COLUMNS, Filter::new().iter(), "id");
        assert_eq!(
            stmt.sql,
            r#"SELECT "id", "name", "city" FROM "contacts" ORDER BY "id" ASC"#
        );
        assert!(stmt.params.is_empty());
    }

    #[test]
    fn test_select_with_conditions_postgres() {
        let filter = Filter::new().eq("city", "Bern").eq("name", "Ada");
        let stmt = select(Dialect::Postgres, "contacts", COLUMNS, filter.iter(), "id");
        assert_eq!(
            stmt.sql,
            r#"SELECT "id", "name", "city" FROM "contacts" WHERE "city" = $1 AND "name" = $2 ORDER BY "id" ASC"#
        );
        assert_eq!(
            stmt.params,
            vec![FieldValue::Text("Bern".into()), FieldValue::Text("Ada".into())]
        );
    }

    #[test]
    fn test_null_condition_renders_is_null() {
        let filter = Filter::new().eq("city", None::<String>).eq("id", 3);
        let stmt = select(Dialect::Postgres, "contacts", COLUMNS, filter.iter(), "id");
        assert!(stmt.sql.contains(r#"WHERE "city" IS NULL AND "id" = $1"#));
        assert_eq!(stmt.params, vec![FieldValue::Int(3)]);
    }

    #[test]
    fn test_insert_with_returning() {
        let values = vec![
            ("name", FieldValue::Text("Ada".into())),
            ("city", FieldValue::Null),
        ];
        let stmt = insert(Dialect::Sqlite, "contacts", &values, Some(COLUMNS));
        assert_eq!(
            stmt.sql,
            r#"INSERT INTO "contacts" ("name", "city") VALUES (?, NULL) RETURNING "id", "name", "city""#
        );
        assert_eq!(stmt.params, vec![FieldValue::Text("Ada".into())]);
    }

    #[test]
    fn test_insert_defaults() {
        let stmt = insert(Dialect::Postgres, "counters", &[], None);
        assert_eq!(stmt.sql, r#"INSERT INTO "counters" DEFAULT VALUES"#);

        let stmt = insert(Dialect::MySql, "counters", &[], None);
        assert_eq!(stmt.sql, "INSERT INTO `counters` () VALUES ()");
    }

    #[test]
    fn test_update_numbers_key_last() {
        let values = vec![
            ("name", FieldValue::Text("Grace".into())),
            ("city", FieldValue::Text("Arlington".into())),
        ];
        let stmt = update(Dialect::Postgres, "contacts", &values, "id", &FieldValue::Int(9));
        assert_eq!(
            stmt.sql,
            r#"UPDATE "contacts" SET "name" = $1, "city" = $2 WHERE "id" = $3"#
        );
        assert_eq!(stmt.params.last(), Some(&FieldValue::Int(9)));
    }

    #[test]
    fn test_insert_mysql_without_returning() {
        let values = vec![
            ("name", FieldValue::Text("Ada".into())),
            ("city", FieldValue::Text("Bern".into())),
        ];
        let stmt = insert(Dialect::MySql, "contacts", &values, None);
        assert_eq!(
            stmt.sql,
            "INSERT INTO `contacts` (`name`, `city`) VALUES (?, ?)"
        );
        assert!(!stmt.sql.contains("RETURNING"));
        assert_eq!(stmt.params.len(), 2);
    }

    #[test]
    fn test_arguments_bind_every_param() {
        let filter = Filter::new().eq("name", "Ada").eq("id", 3).eq("city", None::<String>);
        let stmt = select(Dialect::Sqlite, "contacts", COLUMNS, filter.iter(), "id");
        assert_eq!(stmt.params.len(), 2);
        assert!(stmt.arguments().is_ok());
    }

    #[test]
    fn test_delete_mysql() {
        let stmt = delete(Dialect::MySql, "contacts", "id", &FieldValue::Int(1));
        assert_eq!(stmt.sql, "DELETE FROM `contacts` WHERE `id` = ?");
        assert_eq!(stmt.params, vec![FieldValue::Int(1)]);
    }
}
