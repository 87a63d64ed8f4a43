//! Questlog entry-point: loads settings, prepares storage, and serves the API.

mod server;

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use questlog::inbound::http::health::HealthState;
use questlog::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};

use server::{BuildMode, ServerConfig, ServerSettings, create_server, session_settings};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ServerSettings::load_from_iter(std::env::args_os())
        .map_err(|err| std::io::Error::other(format!("failed to load settings: {err}")))?;
    let session = session_settings(&settings, BuildMode::current()).map_err(std::io::Error::other)?;
    let bind_addr = settings.bind_addr().map_err(std::io::Error::other)?;

    let mut config = ServerConfig::new(session, bind_addr);
    if let Some(pool) = connect_database(&settings).await? {
        config = config.with_db_pool(pool);
    }

    #[cfg(feature = "metrics")]
    let config = config.with_metrics(Some(server::build_metrics()?));

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(web::Data::clone(&health_state), config)?;
    info!(%bind_addr, "questlog listening");
    let outcome = server.await;
    health_state.mark_unhealthy();
    outcome
}

/// Apply pending migrations and open the pool when a database is configured.
async fn connect_database(settings: &ServerSettings) -> std::io::Result<Option<DbPool>> {
    let Some(url) = settings.database_url.as_deref() else {
        return Ok(None);
    };

    let applied = run_pending_migrations(url)
        .await
        .map_err(std::io::Error::other)?;
    info!(count = applied.len(), "database schema up to date");

    let mut pool_config = PoolConfig::new(url);
    if let Some(max_size) = settings.db_max_connections {
        pool_config = pool_config.with_max_size(max_size);
    }
    let pool = DbPool::new(pool_config)
        .await
        .map_err(std::io::Error::other)?;
    Ok(Some(pool))
}
