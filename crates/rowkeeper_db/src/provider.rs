//! Generic entity provider
//!
//! `DatabaseProvider<E>` offers find, filter, upsert and delete for any type
//! implementing [`Entity`], building its SQL from the entity's declared
//! table, columns and primary key.

use crate::client::DbClient;
use crate::context::{ProviderContext, ProviderFactory};
use crate::entity::{column_values, Entity};
use crate::error::DbError;
use crate::filter::Filter;
use crate::query::{self, Statement};
use crate::value::FieldValue;
use axum::response::Response;
use rowkeeper_common::{json_list_response, log_error, log_result};
use sqlx::AnyConnection;
use std::marker::PhantomData;
use tracing::{debug, error, info};

/// Provider for one entity type, backed by a [`DbClient`].
#[derive(Debug)]
pub struct DatabaseProvider<E: Entity> {
    /// The database client
    client: DbClient,
    /// Primary-key column, fixed at construction
    primary_key: &'static str,
    _marker: PhantomData<fn() -> E>,
}

impl<E: Entity> Clone for DatabaseProvider<E> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            primary_key: self.primary_key,
            _marker: PhantomData,
        }
    }
}

impl<E: Entity> DatabaseProvider<E> {
    /// Create a provider for `E`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::ConfigError`] if `E::PRIMARY_KEY` is not one of
    /// `E::columns()`.
    pub fn new(client: DbClient) -> Result<Self, DbError> {
        let primary_key = E::PRIMARY_KEY;
        if !E::has_column(primary_key) {
            return Err(DbError::ConfigError(format!(
                "Primary key '{}' is not a column of '{}'",
                primary_key,
                E::TABLE
            )));
        }

        debug!("Provider for '{}' keyed by '{}'", E::TABLE, primary_key);
        Ok(Self {
            client,
            primary_key,
            _marker: PhantomData,
        })
    }

    /// The underlying database client
    pub fn client(&self) -> &DbClient {
        &self.client
    }

    /// Column that `find_by_id`, `delete_by_id` and upserts key on.
    ///
    /// Resolved from [`Entity::PRIMARY_KEY`] when the provider is built.
    pub fn primary_key(&self) -> &'static str {
        self.primary_key
    }

    /// Rows matching every condition of `filter`, ordered by primary key.
    ///
    /// An empty filter matches all rows.
    ///
    /// # Errors
    ///
    /// [`DbError::UnknownField`] if the filter names a column `E` does not
    /// declare, [`DbError::QueryError`] if the query fails.
    pub async fn list_by_and_filter(&self, filter: &Filter) -> Result<Vec<E>, DbError> {
        let statement = self.select_statement(filter)?;
        self.fetch_all(statement).await
    }

    /// The single row matching every condition of `filter`.
    ///
    /// # Errors
    ///
    /// [`DbError::NoResult`] when nothing matches and
    /// [`DbError::NonUniqueResult`] when more than one row matches.
    pub async fn obj_by_and_filter(&self, filter: &Filter) -> Result<E, DbError> {
        let mut rows = self.list_by_and_filter(filter).await?;
        match rows.len() {
            0 => Err(DbError::NoResult(format!(
                "No '{}' row matches {}",
                E::TABLE,
                describe(filter)
            ))),
            1 => Ok(rows.remove(0)),
            count => Err(DbError::NonUniqueResult {
                table: E::TABLE,
                count,
            }),
        }
    }

    /// Remove the row with the same primary key as `entity`.
    ///
    /// Returns `true` if a row was removed. Failures are logged and swallowed.
    pub async fn delete(&self, entity: &E) -> bool {
        let key = match column_values(entity) {
            Ok(values) => self.key_of(&values),
            Err(e) => {
                log_error(e, &format!("Cannot read key of '{}' entity", E::TABLE));
                return false;
            }
        };

        if key.is_null() {
            error!("Cannot delete '{}' entity without a primary key", E::TABLE);
            return false;
        }
        self.remove(key).await
    }

    fn check_field(&self, field: &str) -> Result<(), DbError> {
        if E::has_column(field) {
            Ok(())
        } else {
            Err(DbError::UnknownField {
                table: E::TABLE,
                field: field.to_string(),
            })
        }
    }

    fn select_statement(&self, filter: &Filter) -> Result<Statement, DbError> {
        for (field, _) in filter.iter() {
            self.check_field(field)?;
        }
        Ok(query::select(
            self.client.dialect(),
            E::TABLE,
            E::columns(),
            filter.iter(),
            self.primary_key,
        ))
    }

    fn key_of(&self, values: &[(&'static str, FieldValue)]) -> FieldValue {
        values
            .iter()
            .find(|(column, _)| *column == self.primary_key)
            .map(|(_, value)| value.clone())
            .unwrap_or(FieldValue::Null)
    }

    async fn fetch_all(&self, statement: Statement) -> Result<Vec<E>, DbError> {
        debug!("Running query: {}", statement.sql);

        sqlx::query_as_with::<sqlx::Any, E, _>(&statement.sql, statement.arguments()?)
            .fetch_all(self.client.pool())
            .await
            .map_err(|e| {
                error!("Failed to query '{}': {}", E::TABLE, e);
                DbError::QueryError(e.to_string())
            })
    }

    async fn remove(&self, key: FieldValue) -> bool {
        let statement = query::delete(self.client.dialect(), E::TABLE, self.primary_key, &key);
        debug!("Running delete: {}", statement.sql);

        let arguments = match statement.arguments() {
            Ok(arguments) => arguments,
            Err(e) => {
                log_error(e, &format!("Failed to delete '{}' row", E::TABLE));
                return false;
            }
        };
        let result = sqlx::query_with::<sqlx::Any, _>(&statement.sql, arguments)
            .execute(self.client.pool())
            .await;

        match result {
            Ok(done) if done.rows_affected() > 0 => {
                info!("Deleted '{}' row with {} = {}", E::TABLE, self.primary_key, key);
                true
            }
            Ok(_) => {
                error!("No '{}' row with {} = {} to delete", E::TABLE, self.primary_key, key);
                false
            }
            Err(e) => {
                log_error(e, &format!("Failed to delete '{}' row", E::TABLE));
                false
            }
        }
    }

    /// Update the row keyed by `key`, inserting it when absent.
    async fn upsert_keyed(
        &self,
        conn: &mut AnyConnection,
        values: Vec<(&'static str, FieldValue)>,
        key: FieldValue,
    ) -> Result<E, DbError> {
        let dialect = self.client.dialect();
        let changes: Vec<(&str, FieldValue)> = values
            .iter()
            .filter(|(column, _)| *column != self.primary_key)
            .map(|(column, value)| (*column, value.clone()))
            .collect();

        let existing = if changes.is_empty() {
            self.select_by_key(&mut *conn, &key).await?
        } else {
            let statement = query::update(dialect, E::TABLE, &changes, self.primary_key, &key);
            debug!("Running update: {}", statement.sql);
            let done = sqlx::query_with::<sqlx::Any, _>(&statement.sql, statement.arguments()?)
                .execute(&mut *conn)
                .await
                .map_err(|e| {
                    error!("Failed to update '{}' row: {}", E::TABLE, e);
                    DbError::QueryError(e.to_string())
                })?;
            if done.rows_affected() == 0 {
                None
            } else {
                self.select_by_key(&mut *conn, &key).await?
            }
        };

        match existing {
            Some(stored) => Ok(stored),
            None => self.insert(conn, values).await,
        }
    }

    async fn insert(
        &self,
        conn: &mut AnyConnection,
        values: Vec<(&'static str, FieldValue)>,
    ) -> Result<E, DbError> {
        let dialect = self.client.dialect();

        if dialect.supports_returning() {
            let statement = query::insert(dialect, E::TABLE, &values, Some(E::columns()));
            debug!("Running insert: {}", statement.sql);
            return sqlx::query_as_with::<sqlx::Any, E, _>(&statement.sql, statement.arguments()?)
                .fetch_one(&mut *conn)
                .await
                .map_err(|e| {
                    error!("Failed to insert '{}' row: {}", E::TABLE, e);
                    DbError::QueryError(e.to_string())
                });
        }

        let statement = query::insert(dialect, E::TABLE, &values, None);
        debug!("Running insert: {}", statement.sql);
        let done = sqlx::query_with::<sqlx::Any, _>(&statement.sql, statement.arguments()?)
            .execute(&mut *conn)
            .await
            .map_err(|e| {
                error!("Failed to insert '{}' row: {}", E::TABLE, e);
                DbError::QueryError(e.to_string())
            })?;

        let key = inserted_key(E::TABLE, self.primary_key, &values, done.last_insert_id())?;

        self.select_by_key(conn, &key).await?.ok_or_else(|| {
            DbError::NoResult(format!("Inserted '{}' row could not be read back", E::TABLE))
        })
    }

    /// Upsert `entity` inside one transaction.
    async fn store(&self, entity: E) -> Result<E, DbError> {
        let values = column_values(&entity)?;
        let key = self.key_of(&values);

        let mut tx = self.client.begin().await?;
        let stored = if key.is_null() {
            // The store assigns the key
            let values = values
                .into_iter()
                .filter(|(column, _)| *column != self.primary_key)
                .collect();
            self.insert(&mut *tx, values).await?
        } else {
            self.upsert_keyed(&mut *tx, values, key).await?
        };
        tx.commit()
            .await
            .map_err(|e| DbError::TransactionError(e.to_string()))?;
        Ok(stored)
    }

    async fn select_by_key(
        &self,
        conn: &mut AnyConnection,
        key: &FieldValue,
    ) -> Result<Option<E>, DbError> {
        let statement = query::select(
            self.client.dialect(),
            E::TABLE,
            E::columns(),
            [(self.primary_key, key)],
            self.primary_key,
        );

        sqlx::query_as_with::<sqlx::Any, E, _>(&statement.sql, statement.arguments()?)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| {
                error!("Failed to read back '{}' row: {}", E::TABLE, e);
                DbError::QueryError(e.to_string())
            })
    }
}

impl<E: Entity> ProviderContext<E> for DatabaseProvider<E> {
    async fn find_all(&self) -> Result<Vec<E>, DbError> {
        self.list_by_and_filter(&Filter::new()).await
    }

    async fn find_by_id(&self, id: FieldValue) -> Result<Option<E>, DbError> {
        let filter = Filter::new().eq(self.primary_key, id);
        let mut rows = self.list_by_and_filter(&filter).await?;
        match rows.len() {
            0 => {
                error!("No '{}' row matches {}", E::TABLE, describe(&filter));
                Ok(None)
            }
            1 => Ok(Some(rows.remove(0))),
            count => Err(DbError::NonUniqueResult {
                table: E::TABLE,
                count,
            }),
        }
    }

    async fn find_by_filter(&self, filter: &Filter) -> Result<Vec<E>, DbError> {
        self.list_by_and_filter(filter).await
    }

    async fn delete_by_id(&self, id: FieldValue) -> bool {
        self.remove(id).await
    }

    async fn put(&self, entity: E) -> Result<E, DbError> {
        log_result(
            self.store(entity).await,
            &format!("Stored '{}' row", E::TABLE),
            &format!("Failed to store '{}' row", E::TABLE),
        )
    }

    async fn post(&self, entity: E) -> Result<E, DbError> {
        self.put(entity).await
    }

    fn get_as_array(&self, results: Vec<E>) -> Box<[E]> {
        results.into_boxed_slice()
    }

    fn to_http_entity(&self, results: Vec<E>) -> Response {
        json_list_response(results)
    }
}

/// Creates [`DatabaseProvider`]s for any entity type.
#[derive(Debug, Clone, Default)]
pub struct DatabaseProviderFactory;

impl DatabaseProviderFactory {
    pub fn new() -> Self {
        Self
    }
}

impl<E: Entity> ProviderFactory<E> for DatabaseProviderFactory {
    type Provider = DatabaseProvider<E>;

    fn create_provider(&self, client: DbClient) -> Result<DatabaseProvider<E>, DbError> {
        DatabaseProvider::new(client)
    }
}

/// Key to read an inserted row back by when the backend has no `RETURNING`.
///
/// An explicit key in `values` wins over the driver's generated id.
fn inserted_key(
    table: &'static str,
    primary_key: &str,
    values: &[(&'static str, FieldValue)],
    last_insert_id: Option<i64>,
) -> Result<FieldValue, DbError> {
    let given = values
        .iter()
        .find(|(column, value)| *column == primary_key && !value.is_null())
        .map(|(_, value)| value.clone());

    match (given, last_insert_id) {
        (Some(key), _) => Ok(key),
        (None, Some(id)) => Ok(FieldValue::Int(id)),
        (None, None) => Err(DbError::QueryError(format!(
            "Insert into '{}' returned no generated key",
            table
        ))),
    }
}

fn describe(filter: &Filter) -> String {
    if filter.is_empty() {
        return "no conditions".to_string();
    }
    filter
        .iter()
        .map(|(field, value)| format!("{} = {}", field, value))
        .collect::<Vec<_>>()
        .join(" AND ")
}
