use crate::common::error::{Result, ToolkitError};
use crate::config::DatabaseConfig;
use libsql::{Builder, Connection, Database};
use std::env;
use tracing::info;

pub struct DatabaseManager {
    db: Database,
}

impl DatabaseManager {
    /// Open the configured database: a remote Turso instance when LIBSQL_URL
    /// is set, otherwise the local file from the configuration.
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        let db = if let Ok(url) = env::var("LIBSQL_URL") {
            let auth_token = env::var("LIBSQL_AUTH_TOKEN").map_err(|_| ToolkitError::Database {
                message: "LIBSQL_AUTH_TOKEN environment variable not set".to_string(),
            })?;

            info!("Connecting to remote libSQL database at {}", url);

            Builder::new_remote(url, auth_token)
                .build()
                .await
                .map_err(|e| ToolkitError::Database {
                    message: format!("Failed to connect to database: {e}"),
                })?
        } else {
            info!("Opening local database at {}", config.path);

            Builder::new_local(&config.path)
                .build()
                .await
                .map_err(|e| ToolkitError::Database {
                    message: format!("Failed to open database '{}': {e}", config.path),
                })?
        };

        Ok(Self { db })
    }

    /// Get a connection to the database
    pub async fn get_connection(&self) -> Result<Connection> {
        self.db.connect().map_err(|e| ToolkitError::Database {
            message: format!("Failed to get database connection: {e}"),
        })
    }

    /// Run database migrations
    pub async fn run_migrations(&self) -> Result<()> {
        info!("Running database migrations...");

        let conn = self.get_connection().await?;

        let migration_sql = include_str!("../migrations/001_create_tables.sql");
        conn.execute_batch(migration_sql)
            .await
            .map_err(|e| ToolkitError::Database {
                message: format!("Failed to run migrations: {e}"),
            })?;

        info!("Database migrations completed successfully");
        Ok(())
    }
}
