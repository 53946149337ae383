//! Result contract for entity providers
//!
//! This module declares what every concrete provider offers to an HTTP
//! layer, independent of how it talks to the database.

use crate::client::DbClient;
use crate::entity::Entity;
use crate::error::DbError;
use crate::filter::Filter;
use crate::value::FieldValue;
use axum::response::Response;

/// Capabilities of a provider for entity type `E`.
pub trait ProviderContext<E: Entity> {
    /// All rows, ordered ascending by primary key.
    fn find_all(&self) -> impl std::future::Future<Output = Result<Vec<E>, DbError>> + Send;

    /// The row whose primary key equals `id`, or `None` if there is none.
    fn find_by_id(
        &self,
        id: FieldValue,
    ) -> impl std::future::Future<Output = Result<Option<E>, DbError>> + Send;

    /// Rows matching every condition of `filter`, ordered by primary key.
    fn find_by_filter(
        &self,
        filter: &Filter,
    ) -> impl std::future::Future<Output = Result<Vec<E>, DbError>> + Send;

    /// Remove the row whose primary key equals `id`.
    ///
    /// Returns `true` if a row was removed. Failures are logged, not returned.
    fn delete_by_id(&self, id: FieldValue) -> impl std::future::Future<Output = bool> + Send;

    /// Insert or update `entity` and return the stored row.
    fn put(&self, entity: E) -> impl std::future::Future<Output = Result<E, DbError>> + Send;

    /// Same as [`ProviderContext::put`].
    fn post(&self, entity: E) -> impl std::future::Future<Output = Result<E, DbError>> + Send;

    /// The results as a plain array.
    fn get_as_array(&self, results: Vec<E>) -> Box<[E]>;

    /// The results as an HTTP payload.
    fn to_http_entity(&self, results: Vec<E>) -> Response;
}

/// A factory for creating providers from a database client.
pub trait ProviderFactory<E: Entity> {
    type Provider: ProviderContext<E>;

    fn create_provider(&self, client: DbClient) -> Result<Self::Provider, DbError>;
}
