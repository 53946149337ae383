use axum::{routing::get, Router};
use std::sync::Arc;
use tracing::info;

use crate::entity::Entity;
use crate::handlers::{
    delete_handler, filter_handler, get_handler, list_handler, post_handler, put_handler,
};
use crate::provider::DatabaseProvider;

/// Create the REST routes for one entity type
///
/// | method & path | operation |
/// |---|---|
/// | `GET /` | all rows |
/// | `GET /filter?field=value` | rows matching every parameter |
/// | `GET /{id}` | one row by primary key |
/// | `POST /`, `PUT /` | upsert the JSON body |
/// | `DELETE /{id}` | remove one row |
///
/// Nest the returned router under a path of your choice.
pub fn routes<E: Entity>(provider: DatabaseProvider<E>) -> Router {
    info!("Routes for '{}' initialized", E::TABLE);

    Router::new()
        .route(
            "/",
            get(list_handler::<E>)
                .post(post_handler::<E>)
                .put(put_handler::<E>),
        )
        .route("/filter", get(filter_handler::<E>))
        .route(
            "/{id}",
            get(get_handler::<E>).delete(delete_handler::<E>),
        )
        .with_state(Arc::new(provider))
}
