//! Backend entry-point: loads settings, prepares storage and serves the REST API.

use std::sync::Arc;

use mockable::DefaultClock;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use rewards_backend::outbound::persistence::{
    DbPool, DieselTaskRepository, DieselUserRepository, PoolConfig, run_pending_migrations,
};
use rewards_backend::outbound::{Argon2CredentialHasher, HmacTokenIssuer};
use rewards_backend::server::{ServerConfig, StateDependencies, build_http_state, create_server};
use rewards_backend::settings::AppSettings;

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

    let settings = AppSettings::load()
        .map_err(|e| std::io::Error::other(format!("failed to load settings: {e}")))?;

    let bind_addr = settings.bind_addr().map_err(std::io::Error::other)?;
    let tokens = HmacTokenIssuer::new(settings.auth_secret().map_err(std::io::Error::other)?)
        .map_err(std::io::Error::other)?;
    let hasher = match settings.hash_cost() {
        Some((memory_kib, iterations)) => Argon2CredentialHasher::with_cost(memory_kib, iterations)
            .map_err(std::io::Error::other)?,
        None => Argon2CredentialHasher::new(),
    };

    if settings.run_migrations() {
        let applied = run_pending_migrations(&settings.database_url)
            .await
            .map_err(std::io::Error::other)?;
        info!(applied, "database schema ready");
    }

    let pool = DbPool::new(
        PoolConfig::new(settings.database_url.as_str()).with_max_size(settings.pool_max_size()),
    )
    .await
    .map_err(std::io::Error::other)?;

    let http_state = build_http_state(StateDependencies {
        users: Arc::new(DieselUserRepository::new(pool.clone())),
        tasks: Arc::new(DieselTaskRepository::new(pool)),
        hasher: Arc::new(hasher),
        tokens: Arc::new(tokens),
        clock: Arc::new(DefaultClock),
    });

    info!(%bind_addr, "starting HTTP server");
    create_server(http_state, &ServerConfig::new(bind_addr))?.await
}
