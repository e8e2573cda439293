use matchday::config::AppConfig;
use matchday::store::{PgStore, SessionStore};
use matchday::telemetry::init_tracing;

/// Prepares a database for the organizer: applies migrations and reports the
/// size of the team catalog.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::from_env()?;
    let pool = infra::db::connect(&config.database_url, config.database_max_connections).await?;

    if config.skip_migrations {
        tracing::info!("Skipping database migrations (SKIP_MIGRATIONS=true)");
    } else {
        infra::db::migrate(&pool).await?;
    }

    let store = PgStore::new(pool);
    let teams = store.get_teams(None).await?;
    if teams.is_empty() {
        tracing::warn!("Team catalog is empty; assignments will fail until teams are loaded");
    } else {
        tracing::info!("Team catalog holds {} teams", teams.len());
    }

    Ok(())
}
