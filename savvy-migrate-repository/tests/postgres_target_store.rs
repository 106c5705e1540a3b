//! Integration tests for the PostgreSQL target store.
//!
//! These tests require a real PostgreSQL database and use SQLx test macros
//! to ensure proper test isolation and cleanup.
//!
//! Run with: `DATABASE_URL=... cargo test --test postgres_target_store -- --ignored`

use chrono::{TimeZone, Utc};
use savvy_migrate_repository::{PostgresTargetStore, TargetStore, TargetStoreError};
use savvy_migrate_shared::types::{ColumnValue, NewRow};
use serde_json::json;
use sqlx::Row;

fn make_user_row(email: &str) -> NewRow {
    let mut row = NewRow::new();
    row.push("name", ColumnValue::Text(Some("Ada".to_string())));
    row.push("email", ColumnValue::Text(Some(email.to_string())));
    row.push(
        "created_at",
        ColumnValue::Timestamp(Some(Utc.with_ymd_and_hms(2023, 4, 5, 10, 11, 12).unwrap())),
    );
    row
}

// ============================================================================
// Insert Tests
// ============================================================================

#[sqlx::test(migrations = "src/postgres/migrations")]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn test_insert_returns_generated_id(pool: sqlx::PgPool) {
    let store = PostgresTargetStore::new(pool.clone());

    let id = store.insert("users", &make_user_row("a@b.com")).await.unwrap();

    let row = sqlx::query("SELECT id, email, created_at FROM users WHERE id = $1")
        .bind(&id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(row.get::<String, _>("email"), "a@b.com");
    assert_eq!(
        row.get::<chrono::DateTime<Utc>, _>("created_at"),
        Utc.with_ymd_and_hms(2023, 4, 5, 10, 11, 12).unwrap()
    );
}

#[sqlx::test(migrations = "src/postgres/migrations")]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn test_insert_binds_every_column_kind(pool: sqlx::PgPool) {
    let store = PostgresTargetStore::new(pool.clone());
    let user_id = store.insert("users", &make_user_row("a@b.com")).await.unwrap();

    let mut link = NewRow::new();
    link.push("user_id", ColumnValue::Text(Some(user_id.clone())));
    link.push("genre_id", ColumnValue::Text(None));
    link.push("platforms", ColumnValue::Json(Some(json!(["spotify", "deezer"]))));
    link.push("clicks", ColumnValue::Integer(Some(12)));
    link.push("visits", ColumnValue::Integer(None));
    let link_id = store.insert("links", &link).await.unwrap();

    let mut project = NewRow::new();
    project.push("user_id", ColumnValue::Text(Some(user_id)));
    project.push("budget", ColumnValue::Float(Some(250.5)));
    store.insert("projects", &project).await.unwrap();

    let row = sqlx::query("SELECT genre_id, platforms, clicks FROM links WHERE id = $1")
        .bind(&link_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(row.get::<Option<String>, _>("genre_id"), None);
    assert_eq!(
        row.get::<sqlx::types::Json<serde_json::Value>, _>("platforms").0,
        json!(["spotify", "deezer"])
    );
    assert_eq!(row.get::<i64, _>("clicks"), 12);
}

#[sqlx::test(migrations = "src/postgres/migrations")]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn test_insert_without_columns_uses_defaults(pool: sqlx::PgPool) {
    let store = PostgresTargetStore::new(pool.clone());
    let id = store.insert("roadmap_items", &NewRow::new()).await.unwrap();
    assert!(!id.is_empty());
    assert_eq!(store.count("roadmap_items").await.unwrap(), 1);
}

// ============================================================================
// Referential Integrity Tests
// ============================================================================

#[sqlx::test(migrations = "src/postgres/migrations")]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn test_dangling_reference_is_a_database_error(pool: sqlx::PgPool) {
    let store = PostgresTargetStore::new(pool.clone());

    let mut account = NewRow::new();
    account.push("user_id", ColumnValue::Text(Some("missing-user".to_string())));
    account.push("provider", ColumnValue::Text(Some("google".to_string())));

    let err = store.insert("accounts", &account).await.unwrap_err();
    assert!(matches!(err, TargetStoreError::DatabaseError(_)));
    assert_eq!(store.count("accounts").await.unwrap(), 0);
}

#[sqlx::test(migrations = "src/postgres/migrations")]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn test_invalid_table_name_is_rejected_before_sql(pool: sqlx::PgPool) {
    let store = PostgresTargetStore::new(pool);
    let err = store.count("users; DROP TABLE users").await.unwrap_err();
    assert!(matches!(err, TargetStoreError::InvalidIdentifier(_)));
}

// ============================================================================
// Schema Tests
// ============================================================================

#[sqlx::test(migrations = false)]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn test_ensure_schema_creates_tables(pool: sqlx::PgPool) {
    let store = PostgresTargetStore::new(pool.clone());
    store.ensure_schema().await.unwrap();
    // Applying twice is a no-op for the embedded migrator.
    store.ensure_schema().await.unwrap();

    for table in ["users", "links", "campaigns", "course_video_to_users"] {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM information_schema.tables WHERE table_name = $1)",
        )
        .bind(table)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert!(exists, "{table} should exist");
    }
}
