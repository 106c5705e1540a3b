//! PostgreSQL implementation of the target store.
//!
//! Rows are written one `INSERT ... RETURNING id` at a time; the relational id
//! is generated by the column default (`gen_random_uuid()`), so the store is
//! the only authority on new ids. The schema lives in `migrations/` and is
//! applied with the embedded sqlx migrator.
use async_trait::async_trait;
use savvy_migrate_shared::types::{ColumnValue, NewRow};
use sqlx::postgres::PgPoolOptions;
use sqlx::query_builder::Separated;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::debug;

use crate::{TargetStore, TargetStoreError};

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./src/postgres/migrations");

/// PostgreSQL-backed target store.
pub struct PostgresTargetStore {
    pool: PgPool,
}

impl PostgresTargetStore {
    /// Creates a store on top of an existing connection pool.
    ///
    /// # Arguments
    ///
    /// * `pool` - Configured PostgreSQL connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to PostgreSQL and returns a ready-to-use store.
    ///
    /// # Arguments
    ///
    /// * `database_url` - PostgreSQL connection string
    /// * `max_connections` - Pool size; the migration itself only needs one
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
    ) -> Result<Self, TargetStoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl TargetStore for PostgresTargetStore {
    async fn ensure_schema(&self) -> Result<(), TargetStoreError> {
        MIGRATOR.run(&self.pool).await?;
        Ok(())
    }

    async fn insert(&self, table: &str, row: &NewRow) -> Result<String, TargetStoreError> {
        let mut query_builder = build_insert(table, row)?;
        debug!(table, columns = row.values.len(), "Inserting row");

        let id = query_builder
            .build_query_scalar::<String>()
            .fetch_one(&self.pool)
            .await?;

        Ok(id)
    }

    async fn count(&self, table: &str) -> Result<i64, TargetStoreError> {
        let sql = format!("SELECT COUNT(*) FROM {}", quote_ident(table)?);
        let count = sqlx::query_scalar::<_, i64>(&sql)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

/// Builds `INSERT INTO "table" (...) VALUES (...) RETURNING id` for one row.
fn build_insert<'a>(
    table: &str,
    row: &'a NewRow,
) -> Result<QueryBuilder<'a, Postgres>, TargetStoreError> {
    let mut query_builder = QueryBuilder::new(format!("INSERT INTO {} ", quote_ident(table)?));

    if row.is_empty() {
        query_builder.push("DEFAULT VALUES");
    } else {
        let columns = row
            .values
            .iter()
            .map(|(column, _)| quote_ident(column))
            .collect::<Result<Vec<_>, _>>()?;
        query_builder.push(format!("({}) VALUES (", columns.join(", ")));

        let mut values = query_builder.separated(", ");
        for (_, value) in &row.values {
            push_value(&mut values, value);
        }
        values.push_unseparated(")");
    }

    query_builder.push(" RETURNING id");
    Ok(query_builder)
}

fn push_value<'qb, 'a>(values: &mut Separated<'qb, 'a, Postgres, &'static str>, value: &'a ColumnValue) {
    match value {
        ColumnValue::Text(v) => values.push_bind(v.as_deref()),
        ColumnValue::Integer(v) => values.push_bind(*v),
        ColumnValue::Float(v) => values.push_bind(*v),
        ColumnValue::Boolean(v) => values.push_bind(*v),
        ColumnValue::Timestamp(v) => values.push_bind(*v),
        ColumnValue::Json(v) => values.push_bind(v.as_ref().map(Json)),
    };
}

/// Quotes a table or column name after checking it is a plain lowercase
/// identifier. Names come from the static entity catalog, never from export data.
pub(crate) fn quote_ident(name: &str) -> Result<String, TargetStoreError> {
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_lowercase() || c == '_');
    let valid_rest = chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');

    if valid_start && valid_rest {
        Ok(format!("\"{name}\""))
    } else {
        Err(TargetStoreError::InvalidIdentifier(name.to_string()))
    }
}
