use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use tracing::info;

use super::store::StoreError;
use crate::config::{redact_database_url, DatabaseConfig};

/// Table definitions. Every statement is idempotent so `migrate` can run on
/// each start.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id BIGSERIAL PRIMARY KEY,
        username TEXT NOT NULL UNIQUE,
        email TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS teas (
        id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL UNIQUE,
        in_stock BOOLEAN NOT NULL,
        rating INTEGER NOT NULL,
        user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS comments (
        id BIGSERIAL PRIMARY KEY,
        content TEXT NOT NULL,
        tea_id BIGINT NOT NULL REFERENCES teas(id) ON DELETE CASCADE
    )
    "#,
    "CREATE INDEX IF NOT EXISTS teas_user_id_idx ON teas (user_id)",
    "CREATE INDEX IF NOT EXISTS comments_tea_id_idx ON comments (tea_id)",
];

/// Serializes concurrent `migrate` calls; `CREATE ... IF NOT EXISTS` races otherwise.
const MIGRATION_LOCK_KEY: i64 = 0x7465_615f_6170_69;

/// Connection pool setup and schema management for PostgreSQL
pub struct DatabaseManager;

impl DatabaseManager {
    /// Open a pool for the configured `DATABASE_URL`
    pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, StoreError> {
        let url = config
            .url
            .as_deref()
            .ok_or_else(|| StoreError::Unavailable("DATABASE_URL is not set".to_string()))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await?;

        info!("Created database pool for: {}", redact_database_url(url));
        Ok(pool)
    }

    /// Create tables and indexes if they do not exist yet
    pub async fn migrate(pool: &PgPool) -> Result<(), StoreError> {
        let mut tx = pool.begin().await?;
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(MIGRATION_LOCK_KEY)
            .execute(&mut *tx)
            .await?;
        for statement in SCHEMA {
            sqlx::query(statement).execute(&mut *tx).await?;
        }
        tx.commit().await?;

        info!("Database schema is up to date");
        Ok(())
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(pool: &PgPool) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn connect_without_url_is_unavailable() {
        let config = DatabaseConfig {
            url: None,
            max_connections: 1,
            connection_timeout: 1,
        };
        let err = DatabaseManager::connect(&config).await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }

    #[test]
    fn schema_enforces_uniqueness_and_ownership() {
        let ddl = SCHEMA.join("\n");
        assert!(ddl.contains("username TEXT NOT NULL UNIQUE"));
        assert!(ddl.contains("email TEXT NOT NULL UNIQUE"));
        assert!(ddl.contains("name TEXT NOT NULL UNIQUE"));
        assert!(ddl.contains("user_id BIGINT NOT NULL REFERENCES users(id)"));
    }
}
