use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::info;

use crate::Config;

/// Open the SQLite store and apply the schema file. Any failure here is
/// fatal to startup.
pub async fn init_database(config: &Config) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .filename(&config.db_path)
        .create_if_missing(true)
        .busy_timeout(Duration::from_secs(5))
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .map_err(|e| anyhow::anyhow!("failed to open database {}: {e}", config.db_path.display()))?;

    let schema = tokio::fs::read_to_string(&config.schema_path)
        .await
        .map_err(|e| {
            anyhow::anyhow!(
                "failed to read schema {}: {e}",
                config.schema_path.display()
            )
        })?;

    sqlx::raw_sql(&schema)
        .execute(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("failed to apply schema: {e}"))?;

    info!("Database ready at {}", config.db_path.display());
    Ok(pool)
}
