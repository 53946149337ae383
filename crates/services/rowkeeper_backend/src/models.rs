// --- File: crates/services/rowkeeper_backend/src/models.rs ---

use rowkeeper_db::{DbClient, DbError, Dialect, Entity};
use serde::{Deserialize, Serialize};
use tracing::info;

/// A contact in the address book served by the demo backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Contact {
    /// Assigned by the database on first store
    pub id: Option<i64>,
    pub name: String,
    pub email: String,
    pub city: Option<String>,
}

impl Entity for Contact {
    const TABLE: &'static str = "contacts";

    fn columns() -> &'static [&'static str] {
        &["id", "name", "email", "city"]
    }
}

/// Create the contacts table if it does not exist yet.
pub async fn init_schema(client: &DbClient) -> Result<(), DbError> {
    let id_column = match client.dialect() {
        Dialect::Sqlite => "id INTEGER PRIMARY KEY AUTOINCREMENT",
        Dialect::Postgres => "id BIGSERIAL PRIMARY KEY",
        Dialect::MySql => "id BIGINT AUTO_INCREMENT PRIMARY KEY",
    };
    let query = format!(
        "CREATE TABLE IF NOT EXISTS contacts (
            {},
            name VARCHAR(255) NOT NULL,
            email VARCHAR(255) NOT NULL,
            city VARCHAR(255)
        )",
        id_column
    );

    client.execute(&query).await?;

    info!("Contacts schema initialized successfully");
    Ok(())
}
