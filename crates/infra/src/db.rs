use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

pub type Db = PgPool;

/// Build the connection pool with the limits used by every deployment.
pub async fn connect(database_url: &str, max_connections: u32) -> sqlx::Result<Db> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(3))
        .idle_timeout(Some(Duration::from_secs(600))) // 10 minutes
        .max_lifetime(Some(Duration::from_secs(1800))) // 30 minutes
        .connect(database_url)
        .await?;

    tracing::info!(
        "Connected to Postgres with max {} connections",
        max_connections
    );

    Ok(pool)
}

/// Apply the workspace migrations.
pub async fn migrate(pool: &Db) -> Result<(), sqlx::migrate::MigrateError> {
    tracing::info!("Running database migrations...");
    sqlx::migrate!("../../migrations").run(pool).await?;
    tracing::info!("Database migrations completed successfully");
    Ok(())
}
