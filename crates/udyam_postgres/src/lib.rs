//! Postgres adapter for `udyam_core::ports::SubmissionStore`.
//!
//! All SQL is runtime-checked (`sqlx::query`, not `sqlx::query!`) so builds
//! never need a live database.

mod store;

pub use store::PgSubmissionStore;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

const MIGRATIONS: &[(&str, &str)] = &[(
    "0001_create_submissions",
    include_str!("../migrations/0001_create_submissions.sql"),
)];

/// Apply the bundled migrations. Each script is idempotent.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    for &(name, sql) in MIGRATIONS {
        sqlx::raw_sql(sql).execute(pool).await?;
        tracing::debug!(migration = name, "migration applied");
    }
    Ok(())
}

pub async fn connect(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}
