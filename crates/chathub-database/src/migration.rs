//! Embedded schema for the `users` and `messages` tables.

use sqlx::PgPool;
use sqlx::migrate::Migrator;
use tracing::info;

use chathub_core::error::{AppError, ErrorKind};

static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Applies pending migrations. Returns the newest schema version this
/// binary knows about.
pub async fn run_migrations(pool: &PgPool) -> Result<i64, AppError> {
    let target = schema_version();
    info!(
        known = MIGRATOR.iter().count(),
        target, "Applying schema migrations"
    );

    MIGRATOR.run(pool).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Database,
            format!("Schema migration failed: {e}"),
            e,
        )
    })?;

    info!(version = target, "Schema up to date");
    Ok(target)
}

fn schema_version() -> i64 {
    MIGRATOR.iter().map(|m| m.version).max().unwrap_or(0)
}
