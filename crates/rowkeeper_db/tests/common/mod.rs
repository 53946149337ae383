//! Test fixtures for provider tests
//!
//! Two entity types: `Note` keeps the default `id` key, `Track` declares
//! `track_no` as its key.

#![allow(dead_code)]

use rowkeeper_config::DatabaseConfig;
use rowkeeper_db::{DatabaseProvider, DbClient, Entity};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Note {
    pub id: Option<i64>,
    pub title: String,
    pub tag: Option<String>,
}

impl Entity for Note {
    const TABLE: &'static str = "notes";

    fn columns() -> &'static [&'static str] {
        &["id", "title", "tag"]
    }
}

impl Note {
    pub fn new(title: &str, tag: Option<&str>) -> Self {
        Self {
            id: None,
            title: title.to_string(),
            tag: tag.map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Track {
    pub track_no: Option<i64>,
    pub title: String,
    pub artist: String,
    pub year: i64,
}

impl Entity for Track {
    const TABLE: &'static str = "tracks";
    const PRIMARY_KEY: &'static str = "track_no";

    fn columns() -> &'static [&'static str] {
        &["track_no", "title", "artist", "year"]
    }
}

pub fn track(track_no: i64, title: &str, artist: &str, year: i64) -> Track {
    Track {
        track_no: Some(track_no),
        title: title.to_string(),
        artist: artist.to_string(),
        year,
    }
}

/// A single-connection in-memory SQLite client with both fixture tables.
pub async fn memory_client() -> DbClient {
    let client = DbClient::from_config(&DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: Some(1),
        ..Default::default()
    })
    .await
    .expect("in-memory database should open");

    client
        .execute(
            "CREATE TABLE notes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                tag TEXT
            )",
        )
        .await
        .expect("notes table");
    client
        .execute(
            "CREATE TABLE tracks (
                track_no INTEGER PRIMARY KEY,
                title TEXT NOT NULL,
                artist TEXT NOT NULL,
                year INTEGER NOT NULL
            )",
        )
        .await
        .expect("tracks table");

    client
}

pub async fn note_provider() -> DatabaseProvider<Note> {
    DatabaseProvider::new(memory_client().await).expect("note provider")
}

pub async fn track_provider() -> DatabaseProvider<Track> {
    DatabaseProvider::new(memory_client().await).expect("track provider")
}
