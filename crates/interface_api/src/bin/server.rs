//! HTTP API server for the land-claims backend.
//!
//! All configuration comes from the environment (a `.env` file is read
//! when present):
//!
//! * `API_HOST` / `API_PORT` - bind address (default 0.0.0.0:8080)
//! * `API_JWT_SECRET` - token signing secret, required in production
//! * `API_JWT_EXPIRATION_SECS` - token lifetime (default 3600)
//! * `DATABASE_URL` - Postgres connection string (or `API_DATABASE_URL`)
//! * `API_LOG_LEVEL` - trace, debug, info, warn, error (default info)
//! * `API_SLA_SWEEP_INTERVAL_SECS` - deadline sweep cadence, 0 disables
//!   (default 3600)
//! * `API_ASSET_SERVICE_URL` - remote land-cover analysis service;
//!   bundled heuristics when unset

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use domain_claims::adapters::{RemoteAssetAdapter, RemoteAssetConfig};
use domain_claims::notifications::TracingNotifier;
use domain_claims::{
    AssetAnalyzer, ClaimStore, ClaimsService, HeuristicAssetAnalyzer, KeywordExtractor, Notifier,
    SlaMonitor, UserDirectory,
};
use domain_schemes::SchemeCatalog;
use infra_db::{
    DatabasePool, PostgresClaimStore, PostgresSchemeCatalog, PostgresUserDirectory,
};
use interface_api::{config::ApiConfig, create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = load_config()?;
    init_tracing(&config.log_level);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        "Starting Land Rights Claims API Server"
    );

    // Schema is brought up to date before anything touches the pool
    let pool = infra_db::create_pool_from_url(&config.database_url).await?;
    infra_db::run_migrations(&pool).await?;

    let state = build_state(config.clone(), pool);
    let app = create_router(state);

    let addr: SocketAddr = config.server_addr().parse()?;
    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Reads [`ApiConfig`] from the environment.
fn load_config() -> anyhow::Result<ApiConfig> {
    let mut config = ApiConfig::from_env()?;

    // Plain DATABASE_URL wins over the prefixed form; hosted Postgres
    // providers set the unprefixed name
    if let Ok(url) = std::env::var("DATABASE_URL") {
        config.database_url = url;
    }

    Ok(config)
}

/// Sets up structured logging. `RUST_LOG` takes precedence over the
/// configured level.
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

/// Wires the Postgres adapters and domain services into application state.
///
/// The background deadline monitor is spawned here as well, sharing the
/// same store and notifier as the request path.
fn build_state(config: ApiConfig, pool: DatabasePool) -> AppState {
    let store: Arc<dyn ClaimStore> = Arc::new(PostgresClaimStore::new(pool.clone()));
    let users: Arc<dyn UserDirectory> = Arc::new(PostgresUserDirectory::new(pool.clone()));
    let catalog: Arc<dyn SchemeCatalog> = Arc::new(PostgresSchemeCatalog::new(pool));
    let notifier: Arc<dyn Notifier> = Arc::new(TracingNotifier::new());

    let assets: Arc<dyn AssetAnalyzer> = match &config.asset_service_url {
        Some(url) => {
            tracing::info!(%url, "Using remote asset analysis service");
            Arc::new(RemoteAssetAdapter::new(RemoteAssetConfig {
                base_url: url.clone(),
                api_key: config.asset_service_api_key.clone().unwrap_or_default(),
                ..RemoteAssetConfig::default()
            }))
        }
        None => {
            tracing::info!("Using bundled heuristic asset analysis");
            Arc::new(HeuristicAssetAnalyzer::new())
        }
    };

    let service = ClaimsService::new(
        store.clone(),
        users.clone(),
        notifier.clone(),
        assets,
        Arc::new(KeywordExtractor::new()),
    )
    .with_collaborator_timeout(Duration::from_secs(config.collaborator_timeout_secs));

    spawn_sla_monitor(
        SlaMonitor::new(store.clone(), users.clone(), notifier),
        config.sla_sweep_interval_secs,
    );

    AppState {
        service: Arc::new(service),
        store,
        users,
        catalog,
        config,
    }
}

/// Spawns the periodic deadline sweep.
///
/// An interval of zero disables the monitor; sweeps that fail are logged
/// and retried on the next tick.
fn spawn_sla_monitor(monitor: SlaMonitor, interval_secs: u64) {
    if interval_secs == 0 {
        tracing::info!("Deadline monitor disabled");
        return;
    }

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            match monitor.run_sweep().await {
                Ok(outcome) => tracing::info!(
                    checked = outcome.checked,
                    at_risk = outcome.at_risk,
                    breached = outcome.breached,
                    notifications = outcome.notifications_sent,
                    "Deadline sweep complete"
                ),
                Err(error) => tracing::warn!(%error, "Deadline sweep failed"),
            }
        }
    });
}

/// Resolves when the process is asked to stop, so the server can drain
/// in-flight requests before exiting.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let sigterm = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    let signal = tokio::select! {
        _ = ctrl_c => "ctrl-c",
        _ = sigterm => "SIGTERM",
    };

    tracing::info!(signal, "Shutdown requested, draining in-flight requests");
}
