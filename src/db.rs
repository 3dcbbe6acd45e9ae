use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use std::str::FromStr;

pub const SCHEMA_VERSION: i32 = 1;

const SCHEMA: &str = include_str!("../schema.sql");

pub async fn init_db(database_url: &str, max_connections: u32) -> SqlitePool {
    let options = SqliteConnectOptions::from_str(database_url)
        .expect("DATABASE_URL is not a valid sqlite URL")
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
        .expect("Failed to connect to database");

    apply_schema(&pool)
        .await
        .expect("Failed to apply database schema");

    pool
}

/// Bootstraps the legacy schema and stamps it through PRAGMA user_version.
/// A database stamped by a different release refuses to start.
pub async fn apply_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let version: i32 = sqlx::query_scalar("PRAGMA user_version")
        .fetch_one(pool)
        .await?;

    if version == SCHEMA_VERSION {
        return Ok(());
    }
    if version != 0 {
        return Err(sqlx::Error::Configuration(
            format!("database is stamped with schema version {version}, expected {SCHEMA_VERSION}")
                .into(),
        ));
    }

    for statement in SCHEMA.split(';') {
        let statement = statement.trim();
        if statement.is_empty() {
            continue;
        }
        sqlx::query(statement).execute(pool).await?;
    }

    sqlx::query(&format!("PRAGMA user_version = {SCHEMA_VERSION}"))
        .execute(pool)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn blank_pool() -> SqlitePool {
        SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap()
    }

    #[actix_web::test]
    async fn schema_apply_is_idempotent() {
        let pool = blank_pool().await;

        apply_schema(&pool).await.unwrap();
        apply_schema(&pool).await.unwrap();

        let version: i32 = sqlx::query_scalar("PRAGMA user_version")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(version, SCHEMA_VERSION);
    }

    #[actix_web::test]
    async fn foreign_schema_stamp_is_rejected() {
        let pool = blank_pool().await;

        sqlx::query("PRAGMA user_version = 99")
            .execute(&pool)
            .await
            .unwrap();

        let err = apply_schema(&pool).await.unwrap_err();
        assert!(matches!(err, sqlx::Error::Configuration(_)));
    }
}
