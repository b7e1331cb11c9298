//! Database layer for PaperGraph
//!
//! Provides:
//! - SeaORM entity models
//! - Repository pattern for paper persistence
//! - Connection management and schema bootstrap

pub mod models;
mod repository;

pub use repository::{PaperStore, Repository};

use crate::config::DatabaseConfig;
use crate::errors::{AppError, Result};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};
use std::time::Duration;
use tracing::info;

const PAPERS_DDL: &str = r#"
CREATE TABLE IF NOT EXISTS papers (
    arxiv_id      TEXT PRIMARY KEY,
    title         TEXT NOT NULL,
    authors       JSONB NOT NULL,
    abstract_text TEXT NOT NULL,
    link          TEXT NOT NULL,
    categories    JSONB NOT NULL,
    created_at    TIMESTAMPTZ NOT NULL DEFAULT now()
)
"#;

/// Database connection wrapper
#[derive(Clone)]
pub struct Db {
    conn: DatabaseConnection,
}

impl Db {
    /// Connect using the configured pool options
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let mut opts = ConnectOptions::new(&config.url);
        opts.max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .sqlx_logging(false);

        let conn = Database::connect(opts)
            .await
            .map_err(|e| AppError::DatabaseConnection {
                message: format!("failed to connect: {e}"),
            })?;

        info!("database connection established");
        Ok(Self { conn })
    }

    pub fn conn(&self) -> &DatabaseConnection {
        &self.conn
    }

    /// Ping the database to check connectivity
    pub async fn ping(&self) -> Result<()> {
        self.conn
            .execute_unprepared("SELECT 1")
            .await
            .map_err(|e| AppError::DatabaseConnection {
                message: format!("ping failed: {e}"),
            })?;
        Ok(())
    }

    /// Create the papers table if it does not exist yet
    pub async fn ensure_schema(&self) -> Result<()> {
        self.conn.execute_unprepared(PAPERS_DDL).await?;
        info!("database schema ensured");
        Ok(())
    }
}
