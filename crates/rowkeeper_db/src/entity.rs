//! The entity contract implemented by caller-supplied record types

use crate::error::DbError;
use crate::value::FieldValue;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use sqlx::any::AnyRow;
use sqlx::FromRow;
use std::fmt::Debug;

/// A record type stored in one table.
///
/// Rows are decoded with `sqlx::FromRow`; column values for writes are
/// taken from the `serde` serialization, one field per column.
///
/// # Example
///
/// ```rust
/// use rowkeeper_db::Entity;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
/// struct Contact {
///     id: Option<i64>,
///     name: String,
///     email: String,
/// }
///
/// impl Entity for Contact {
///     const TABLE: &'static str = "contacts";
///
///     fn columns() -> &'static [&'static str] {
///         &["id", "name", "email"]
///     }
/// }
/// ```
pub trait Entity:
    for<'r> FromRow<'r, AnyRow> + Serialize + DeserializeOwned + Clone + Debug + Send + Sync + Unpin + 'static
{
    /// Table holding the rows.
    const TABLE: &'static str;

    /// Primary-key column.
    const PRIMARY_KEY: &'static str = "id";

    /// Every column, in the order used for selects and inserts.
    fn columns() -> &'static [&'static str];

    /// Whether `name` is one of [`Entity::columns`].
    fn has_column(name: &str) -> bool {
        Self::columns().contains(&name)
    }

    /// Primary-key value from its URL path form.
    ///
    /// Defaults to [`FieldValue::infer`]. Entities whose text keys can look
    /// numeric, such as `"007"`, return [`FieldValue::Text`] here instead.
    fn parse_key(raw: &str) -> FieldValue {
        FieldValue::infer(raw)
    }
}

/// Column values of `entity`, in [`Entity::columns`] order.
///
/// Columns missing from the serialized form are written as `NULL`.
pub fn column_values<E: Entity>(entity: &E) -> Result<Vec<(&'static str, FieldValue)>, DbError> {
    let mut fields = match serde_json::to_value(entity)? {
        Value::Object(map) => map,
        other => {
            return Err(DbError::Other(format!(
                "Entity for '{}' must serialize to an object, got {}",
                E::TABLE,
                other
            )))
        }
    };

    Ok(E::columns()
        .iter()
        .map(|column| {
            let value = fields.remove(*column).map(FieldValue::from).unwrap_or(FieldValue::Null);
            (*column, value)
        })
        .collect())
}
