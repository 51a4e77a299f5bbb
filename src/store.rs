//! Submission store selection.

use std::sync::Arc;

use anyhow::Result;
use udyam_core::memory::InMemorySubmissionStore;
use udyam_core::ports::SubmissionStore;

use crate::config::ServerConfig;

/// Postgres when `DATABASE_URL` is set, otherwise an in-memory store.
pub async fn build_store(config: &ServerConfig) -> Result<Arc<dyn SubmissionStore>> {
    match config.database_url.as_deref() {
        #[cfg(feature = "database")]
        Some(url) => {
            use anyhow::Context;

            let pool = udyam_postgres::connect(url, config.db_max_connections)
                .await
                .context("failed to connect to database")?;
            tracing::info!("Connected to database");

            if config.run_migrations {
                udyam_postgres::run_migrations(&pool)
                    .await
                    .context("failed to apply migrations")?;
                tracing::info!("Migrations applied");
            }
            Ok(Arc::new(udyam_postgres::PgSubmissionStore::new(pool)))
        }
        #[cfg(not(feature = "database"))]
        Some(_) => anyhow::bail!("DATABASE_URL is set but the `database` feature is disabled"),
        None => {
            tracing::warn!("DATABASE_URL not set; submissions are kept in memory only");
            Ok(Arc::new(InMemorySubmissionStore::new()))
        }
    }
}
