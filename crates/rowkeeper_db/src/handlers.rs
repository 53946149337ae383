//! HTTP handlers exposing a [`DatabaseProvider`] over REST
//!
//! The handlers are generic over the entity type; [`crate::routes::routes`]
//! instantiates them for one entity.

use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rowkeeper_common::{handle_json_result, not_found, ApiError};
use std::sync::Arc;
use tracing::debug;

use crate::context::ProviderContext;
use crate::entity::Entity;
use crate::filter::Filter;
use crate::provider::DatabaseProvider;
use crate::value::FieldValue;

/// Shared state for entity handlers
pub type ProviderState<E> = Arc<DatabaseProvider<E>>;

/// `GET /`: every row, ordered by primary key.
pub async fn list_handler<E: Entity>(
    State(provider): State<ProviderState<E>>,
) -> Result<Response, ApiError> {
    debug!("Listing '{}' rows", E::TABLE);
    let rows = provider.find_all().await?;
    Ok(provider.to_http_entity(rows))
}

/// `GET /filter?field=value&...`: rows matching all query parameters.
///
/// Parameter values are typed with [`FieldValue::infer`].
pub async fn filter_handler<E: Entity>(
    State(provider): State<ProviderState<E>>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Response, ApiError> {
    let filter: Filter = params
        .into_iter()
        .map(|(field, raw)| (field, FieldValue::infer(&raw)))
        .collect();
    debug!("Filtering '{}' rows by {} conditions", E::TABLE, filter.len());

    let rows = provider.find_by_filter(&filter).await?;
    Ok(provider.to_http_entity(rows))
}

/// `GET /{id}`: one row, 404 when absent.
///
/// The path segment is typed with [`Entity::parse_key`].
pub async fn get_handler<E: Entity>(
    State(provider): State<ProviderState<E>>,
    Path(id): Path<String>,
) -> Result<Json<E>, ApiError> {
    provider
        .find_by_id(E::parse_key(&id))
        .await?
        .map(Json)
        .ok_or_else(|| {
            not_found(format!(
                "No '{}' row with {} = {}",
                E::TABLE,
                provider.primary_key(),
                id
            ))
        })
}

/// `POST /`: upsert the body and return the stored row.
pub async fn post_handler<E: Entity>(
    State(provider): State<ProviderState<E>>,
    Json(entity): Json<E>,
) -> Result<Json<E>, Response> {
    handle_json_result(provider.post(entity).await.map_err(ApiError::from))
}

/// `PUT /`: upsert the body and return the stored row.
pub async fn put_handler<E: Entity>(
    State(provider): State<ProviderState<E>>,
    Json(entity): Json<E>,
) -> Result<Json<E>, Response> {
    handle_json_result(provider.put(entity).await.map_err(ApiError::from))
}

/// `DELETE /{id}`: 204 when a row was removed, 404 otherwise.
pub async fn delete_handler<E: Entity>(
    State(provider): State<ProviderState<E>>,
    Path(id): Path<String>,
) -> Response {
    if provider.delete_by_id(E::parse_key(&id)).await {
        StatusCode::NO_CONTENT.into_response()
    } else {
        not_found(format!(
            "No '{}' row with {} = {}",
            E::TABLE,
            provider.primary_key(),
            id
        ))
        .into_response()
    }
}
