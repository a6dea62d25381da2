//! PostgreSQL persistence for the carte catalog.
//!
//! Exposes pool construction, migrations, a liveness check, and
//! [`PgCatalogStore`], the durable implementation of
//! `carte_core::store::CatalogStore`.

pub mod models;
pub mod repositories;

pub use repositories::catalog_repo::PgCatalogStore;

/// Convenience alias for the shared connection pool.
pub type DbPool = sqlx::PgPool;

/// Create a connection pool against the given database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    sqlx::postgres::PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
}

/// Verify the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply pending migrations from `crates/db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
