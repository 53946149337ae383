// --- File: crates/services/rowkeeper_backend/src/lib.rs ---

pub mod models;

use axum::{extract::State, http::StatusCode, routing::get, Router};
use rowkeeper_db::{DatabaseProviderFactory, DbClient, DbError, ProviderFactory};
use tower_http::trace::TraceLayer;

use crate::models::Contact;

async fn health(State(client): State<DbClient>) -> (StatusCode, &'static str) {
    if client.is_healthy().await {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "database unavailable")
    }
}

/// Build the service router on top of a connected database client.
///
/// The contacts table is created when missing.
pub async fn build_app(client: DbClient) -> Result<Router, DbError> {
    models::init_schema(&client).await?;

    let contacts = ProviderFactory::<Contact>::create_provider(
        &DatabaseProviderFactory::new(),
        client.clone(),
    )?;

    let api_router = Router::new()
        .route("/", get(|| async { "Welcome to the Rowkeeper API!" }))
        .route("/health", get(health))
        .with_state(client)
        .nest("/contacts", rowkeeper_db::routes(contacts));

    Ok(Router::new()
        .nest("/api", api_router)
        .layer(TraceLayer::new_for_http()))
}
