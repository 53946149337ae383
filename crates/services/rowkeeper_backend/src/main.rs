// File: services/rowkeeper_backend/src/main.rs
use rowkeeper_backend::build_app;
use rowkeeper_common::{logging, parse_level, Context};
use rowkeeper_config::load_config;
use rowkeeper_db::DbClientFactory;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Arc::new(load_config()?);

    let level = config
        .logging
        .as_ref()
        .map(|logging| parse_level(&logging.level))
        .unwrap_or(tracing::Level::INFO);
    logging::init_with_level(level);

    let client = DbClientFactory::new().from_app_config(&config).await?;
    info!("Connected to {}", client);

    let app = build_app(client).await?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!("Starting server at http://{}", addr);
    info!("API endpoints available at http://{}/api", addr);

    axum::serve(listener, app.into_make_service())
        .await
        .context("serving HTTP")?;
    Ok(())
}
