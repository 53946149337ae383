mod common;

use common::{note_provider, track, track_provider, Note, Track};
use rowkeeper_db::{
    DatabaseProvider, DatabaseProviderFactory, DbError, Entity, FieldValue, Filter,
    ProviderContext, ProviderFactory,
};
use serde::{Deserialize, Serialize};

#[tokio::test]
async fn test_put_assigns_identity_to_unseen_entity() {
    let notes = note_provider().await;

    let stored = notes.put(Note::new("groceries", Some("home"))).await.unwrap();

    assert!(stored.id.is_some());
    assert_eq!(stored.title, "groceries");
    assert_eq!(stored.tag.as_deref(), Some("home"));

    let second = notes.post(Note::new("taxes", None)).await.unwrap();
    assert_ne!(second.id, stored.id);
    assert_eq!(second.tag, None);
}

#[tokio::test]
async fn test_put_with_existing_key_updates_in_place() {
    let notes = note_provider().await;
    let mut stored = notes.put(Note::new("draft", None)).await.unwrap();

    stored.title = "final".to_string();
    stored.tag = Some("work".to_string());
    let updated = notes.put(stored.clone()).await.unwrap();

    assert_eq!(updated, stored);
    let all = notes.find_all().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].title, "final");
}

#[tokio::test]
async fn test_put_with_unknown_key_inserts_with_that_key() {
    let tracks = track_provider().await;

    let stored = tracks
        .put(track(7, "So What", "Miles Davis", 1959))
        .await
        .unwrap();

    assert_eq!(stored.track_no, Some(7));
    let found = tracks.find_by_id(FieldValue::Int(7)).await.unwrap();
    assert_eq!(found, Some(stored));
}

#[tokio::test]
async fn test_find_all_is_ordered_by_primary_key() {
    let tracks = track_provider().await;
    for (no, title) in [(3, "Freddie Freeloader"), (1, "So What"), (2, "Blue in Green")] {
        tracks
            .put(track(no, title, "Miles Davis", 1959))
            .await
            .unwrap();
    }

    let keys: Vec<Option<i64>> = tracks
        .find_all()
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.track_no)
        .collect();

    assert_eq!(keys, vec![Some(1), Some(2), Some(3)]);
}

#[tokio::test]
async fn test_find_by_id_missing_returns_none() {
    let notes = note_provider().await;
    notes.put(Note::new("only one", None)).await.unwrap();

    let found = notes.find_by_id(FieldValue::Int(999)).await.unwrap();
    assert!(found.is_none());
}

#[tokio::test]
async fn test_empty_filter_returns_all_rows() {
    let notes = note_provider().await;
    notes.put(Note::new("a", Some("x"))).await.unwrap();
    notes.put(Note::new("b", None)).await.unwrap();

    let all = notes.find_by_filter(&Filter::new()).await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all, notes.find_all().await.unwrap());
}

#[tokio::test]
async fn test_filter_conjunction() {
    let tracks = track_provider().await;
    tracks.put(track(1, "So What", "Miles Davis", 1959)).await.unwrap();
    tracks.put(track(2, "Naima", "John Coltrane", 1959)).await.unwrap();
    tracks.put(track(3, "Milestones", "Miles Davis", 1958)).await.unwrap();

    let davis_1959 = tracks
        .list_by_and_filter(&Filter::new().eq("artist", "Miles Davis").eq("year", 1959))
        .await
        .unwrap();
    assert_eq!(davis_1959.len(), 1);
    assert_eq!(davis_1959[0].title, "So What");

    let from_1959 = tracks
        .find_by_filter(&Filter::new().eq("year", 1959))
        .await
        .unwrap();
    let keys: Vec<Option<i64>> = from_1959.iter().map(|t| t.track_no).collect();
    assert_eq!(keys, vec![Some(1), Some(2)]);
}

#[tokio::test]
async fn test_filter_on_null_value() {
    let notes = note_provider().await;
    notes.put(Note::new("tagged", Some("x"))).await.unwrap();
    notes.put(Note::new("untagged", None)).await.unwrap();

    let untagged = notes
        .find_by_filter(&Filter::new().eq("tag", None::<String>))
        .await
        .unwrap();
    assert_eq!(untagged.len(), 1);
    assert_eq!(untagged[0].title, "untagged");
}

#[tokio::test]
async fn test_unknown_filter_field_is_rejected() {
    let notes = note_provider().await;

    let err = notes
        .find_by_filter(&Filter::new().eq("title; DROP TABLE notes", "x"))
        .await
        .unwrap_err();

    assert!(matches!(err, DbError::UnknownField { table: "notes", .. }));
    assert!(notes.find_all().await.is_ok());
}

#[tokio::test]
async fn test_obj_by_and_filter_expects_exactly_one_row() {
    let tracks = track_provider().await;
    tracks.put(track(1, "So What", "Miles Davis", 1959)).await.unwrap();
    tracks.put(track(2, "Milestones", "Miles Davis", 1958)).await.unwrap();

    let one = tracks
        .obj_by_and_filter(&Filter::new().eq("year", 1958))
        .await
        .unwrap();
    assert_eq!(one.title, "Milestones");

    let none = tracks
        .obj_by_and_filter(&Filter::new().eq("year", 1970))
        .await;
    assert!(matches!(none, Err(DbError::NoResult(_))));

    let many = tracks
        .obj_by_and_filter(&Filter::new().eq("artist", "Miles Davis"))
        .await;
    assert!(matches!(
        many,
        Err(DbError::NonUniqueResult {
            table: "tracks",
            count: 2
        })
    ));
}

#[tokio::test]
async fn test_delete_removes_row() {
    let notes = note_provider().await;
    let keep = notes.put(Note::new("keep", None)).await.unwrap();
    let drop = notes.put(Note::new("drop", None)).await.unwrap();

    assert!(notes.delete(&drop).await);

    let remaining = notes.find_all().await.unwrap();
    assert_eq!(remaining, vec![keep]);
}

#[tokio::test]
async fn test_delete_failures_are_swallowed() {
    let notes = note_provider().await;

    // Missing row
    assert!(!notes.delete_by_id(FieldValue::Int(42)).await);
    // No key to delete by
    assert!(!notes.delete(&Note::new("never stored", None)).await);
}

#[tokio::test]
async fn test_result_contract_conversions() {
    let notes = note_provider().await;
    notes.put(Note::new("a", None)).await.unwrap();
    notes.put(Note::new("b", None)).await.unwrap();

    let rows = notes.find_all().await.unwrap();
    let array = notes.get_as_array(rows.clone());
    assert_eq!(array.len(), 2);
    assert_eq!(array[1].title, "b");

    let response = notes.to_http_entity(rows);
    assert_eq!(response.status(), axum::http::StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Vec<Note> = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body.len(), 2);
    assert_eq!(body[0].title, "a");
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
struct Misdeclared {
    uid: i64,
}

impl Entity for Misdeclared {
    const TABLE: &'static str = "misdeclared";

    fn columns() -> &'static [&'static str] {
        &["uid"]
    }
}

#[tokio::test]
async fn test_primary_key_must_be_a_column() {
    let notes = note_provider().await;
    let client = notes.client().clone();

    let result = DatabaseProvider::<Misdeclared>::new(client.clone());
    assert!(matches!(result, Err(DbError::ConfigError(_))));

    let factory = DatabaseProviderFactory::new();
    let tracks = ProviderFactory::<Track>::create_provider(&factory, client).unwrap();
    assert_eq!(tracks.primary_key(), "track_no");
}

#[tokio::test]
async fn test_null_columns_round_trip() {
    let notes = note_provider().await;

    let stored = notes.put(Note::new("untagged", None)).await.unwrap();
    assert_eq!(stored.tag, None);

    notes
        .client()
        .execute("INSERT INTO notes (title, tag) VALUES ('raw', NULL)")
        .await
        .unwrap();

    let all = notes.find_all().await.unwrap();
    assert_eq!(all.len(), 2);
    assert!(all.iter().all(|note| note.tag.is_none()));

    let raw = notes
        .obj_by_and_filter(&Filter::new().eq("title", "raw"))
        .await
        .unwrap();
    let found = notes
        .find_by_id(FieldValue::from(raw.id))
        .await
        .unwrap();
    assert_eq!(found, Some(raw));
}

/// Rows of a table without a key constraint, so ids can repeat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
struct Reading {
    id: i64,
    label: String,
}

impl Entity for Reading {
    const TABLE: &'static str = "readings";

    fn columns() -> &'static [&'static str] {
        &["id", "label"]
    }
}

#[tokio::test]
async fn test_find_by_id_with_repeated_key_is_non_unique() {
    let notes = note_provider().await;
    let client = notes.client().clone();
    client
        .execute("CREATE TABLE readings (id INTEGER NOT NULL, label TEXT NOT NULL)")
        .await
        .unwrap();
    client
        .execute("INSERT INTO readings (id, label) VALUES (1, 'morning'), (1, 'evening')")
        .await
        .unwrap();

    let readings = DatabaseProvider::<Reading>::new(client).unwrap();
    let result = readings.find_by_id(FieldValue::Int(1)).await;

    assert!(matches!(
        result,
        Err(DbError::NonUniqueResult {
            table: "readings",
            count: 2
        })
    ));
}
