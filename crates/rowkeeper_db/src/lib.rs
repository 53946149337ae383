//! Generic entity providers for Rowkeeper
//!
//! This crate turns any record type implementing [`Entity`] into a provider
//! with find, filter, upsert and delete operations, using SQLx's `Any`
//! driver so that SQLite, PostgreSQL and MySQL are reachable through feature
//! flags.
//!
//! # Features
//!
//! - Declared primary keys (defaulting to `id`) instead of runtime scanning
//! - AND-combined equality filters with column validation
//! - Upsert that lets the store assign identities
//! - A result contract that renders rows as a plain array or an HTTP payload
//! - Ready-made axum routes per entity
//!
//! # Usage
//!
//! ```toml
//! [dependencies]
//! rowkeeper-db = { version = "0.1.0", features = ["postgres"] }
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use rowkeeper_db::{DatabaseProvider, DbClient, Entity, FieldValue, Filter, ProviderContext};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
//! struct Contact {
//!     id: Option<i64>,
//!     name: String,
//!     city: Option<String>,
//! }
//!
//! impl Entity for Contact {
//!     const TABLE: &'static str = "contacts";
//!
//!     fn columns() -> &'static [&'static str] {
//!         &["id", "name", "city"]
//!     }
//! }
//!
//! async fn run() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = DbClient::from_url("sqlite:data/contacts.db").await?;
//!     let contacts = DatabaseProvider::<Contact>::new(client)?;
//!
//!     let ada = contacts
//!         .put(Contact { id: None, name: "Ada".into(), city: Some("London".into()) })
//!         .await?;
//!     let found = contacts.find_by_id(FieldValue::from(ada.id)).await?;
//!     let londoners = contacts
//!         .find_by_filter(&Filter::new().eq("city", "London"))
//!         .await?;
//!     assert!(found.is_some() && !londoners.is_empty());
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod context;
pub mod dialect;
pub mod entity;
pub mod error;
pub mod factory;
pub mod filter;
pub mod handlers;
pub mod provider;
pub mod query;
pub mod routes;
pub mod value;

// Re-export the main types for ease of use
pub use client::{DbClient, DbTransaction};
pub use context::{ProviderContext, ProviderFactory};
pub use dialect::Dialect;
pub use entity::Entity;
pub use error::DbError;
pub use factory::DbClientFactory;
pub use filter::Filter;
pub use provider::{DatabaseProvider, DatabaseProviderFactory};
pub use routes::routes;
pub use value::FieldValue;
