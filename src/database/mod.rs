pub mod models;

use sqlx::{postgres::PgPoolOptions, PgPool};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::info;

use crate::config;

/// Errors from the persistence layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("database pool not initialized")]
    PoolUnavailable,

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

// Process-scoped pool, initialized once at startup. Data handlers degrade
// to 503 when the pool is absent instead of refusing to boot; this keeps
// auth-free local runs and handler tests working without a database.
static DB_POOL: OnceCell<Arc<PgPool>> = OnceCell::const_new();

/// Connect the global pool from DATABASE_URL and run migrations.
pub async fn init_pool() -> Result<Arc<PgPool>, DatabaseError> {
    let url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "postgresql://localhost/portfolio".to_string());
    let cfg = &config::config().database;

    let pool = PgPoolOptions::new()
        .max_connections(cfg.max_connections)
        .acquire_timeout(Duration::from_secs(cfg.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(cfg.idle_timeout_secs))
        .connect(&url)
        .await?;

    sqlx::query("SELECT 1").execute(&pool).await?;
    run_migrations(&pool).await?;

    let pool = Arc::new(pool);
    let _ = DB_POOL.set(pool.clone());

    info!("database pool initialized");
    Ok(pool)
}

pub fn get_pool() -> Option<Arc<PgPool>> {
    DB_POOL.get().cloned()
}

/// Pool accessor for handlers; absence maps to a 503 via ApiError.
pub fn pool() -> Result<Arc<PgPool>, DatabaseError> {
    get_pool().ok_or(DatabaseError::PoolUnavailable)
}

/// True when the error is a Postgres unique-constraint violation (23505).
/// Handlers map these to field-level validation errors.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|db| db.code())
        .map(|code| code == "23505")
        .unwrap_or(false)
}

/// Pings the pool to ensure connectivity
pub async fn health_check() -> Result<(), DatabaseError> {
    let pool = pool()?;
    sqlx::query("SELECT 1").execute(pool.as_ref()).await?;
    Ok(())
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), DatabaseError> {
    info!("running database migrations");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS admins (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            email TEXT UNIQUE NOT NULL,
            password_hash TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS projects (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            tags TEXT[] NOT NULL DEFAULT '{}',
            tech_stack TEXT[] NOT NULL DEFAULT '{}',
            status TEXT NOT NULL DEFAULT 'planned',
            link TEXT,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS skills (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            name TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS contact_messages (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            name TEXT NOT NULL,
            email TEXT NOT NULL,
            subject TEXT NOT NULL DEFAULT 'General Inquiry',
            message TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'new',
            created_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
    )
    .execute(pool)
    .await?;

    // The partial-unique `singleton` column closes the find-then-insert race:
    // concurrent upserts all target the same conflict key.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS contact_info (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            singleton BOOLEAN NOT NULL DEFAULT TRUE UNIQUE CHECK (singleton),
            data JSONB NOT NULL DEFAULT '{}'::jsonb,
            updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS writings (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            title TEXT NOT NULL,
            slug TEXT UNIQUE NOT NULL,
            content TEXT NOT NULL,
            published BOOLEAN NOT NULL DEFAULT FALSE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
    )
    .execute(pool)
    .await?;

    info!("database migrations complete");
    Ok(())
}
