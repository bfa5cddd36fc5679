//! PostgreSQL access for the master-data mirror.
//!
//! Pool bootstrap, migrations, row models and one zero-sized repository per
//! table family.

use sqlx::postgres::PgPoolOptions;

pub mod models;
pub mod repositories;

pub type DbPool = sqlx::PgPool;

/// Default number of pooled connections.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections.max(1))
        .connect(database_url)
        .await
}

/// Verify the database answers a trivial query.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply pending migrations from `db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../db/migrations").run(pool).await
}

/// Best-effort trigram indexes on gacha and event names.
///
/// `pg_trgm` needs elevated privileges on some managed databases, so every
/// failure here is logged and skipped.
pub async fn ensure_trigram_indexes(pool: &DbPool) {
    if let Err(e) = sqlx::query("CREATE EXTENSION IF NOT EXISTS pg_trgm")
        .execute(pool)
        .await
    {
        tracing::warn!(error = %e, "pg_trgm unavailable, skipping trigram indexes");
        return;
    }

    let statements = [
        "CREATE INDEX IF NOT EXISTS idx_pjsk_gachas_name_trgm \
         ON pjsk_gachas USING GIN (name gin_trgm_ops)",
        "CREATE INDEX IF NOT EXISTS idx_pjsk_events_name_trgm \
         ON pjsk_events USING GIN (name gin_trgm_ops)",
    ];
    for statement in statements {
        if let Err(e) = sqlx::query(statement).execute(pool).await {
            tracing::warn!(error = %e, statement, "Failed to create trigram index");
        }
    }
}

/// Append `sslmode` to a URL-form DSN that does not set one.
///
/// Key/value DSNs, unparseable URLs and an empty `ssl_mode` are returned
/// unchanged.
pub fn ensure_ssl_mode(conn: &str, ssl_mode: &str) -> String {
    if ssl_mode.is_empty() {
        return conn.to_string();
    }
    if !(conn.starts_with("postgres://") || conn.starts_with("postgresql://")) {
        return conn.to_string();
    }
    let Ok(mut url) = url::Url::parse(conn) else {
        return conn.to_string();
    };
    if url.query_pairs().any(|(k, v)| k == "sslmode" && !v.is_empty()) {
        return conn.to_string();
    }
    url.query_pairs_mut().append_pair("sslmode", ssl_mode);
    url.to_string()
}
