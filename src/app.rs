/*
 * Responsibility
 * - Config → policy/engine/session cache → Router
 * - Middleware (authorize, transport layers)
 * - axum::serve() and the background session sweep
 */
use std::{panic, process, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use axum::Router;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::config::Config;
use crate::middleware;
use crate::services::authz::{
    AuthorizationEngine, ClaimMapper, InMemorySessionCache, LoginService, PolicyError,
    SessionAuthorityCache, policy,
};
use crate::state::AppState;

fn init_tracing() {
    // RUST_LOG wins; e.g. RUST_LOG=info,oidc_authz=debug
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // Development: crash loudly. Production: default hook, keep serving.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }));
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env().context("failed to load configuration")?;
    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let sessions = Arc::new(build_session_cache(&config));
    let state = build_state(&config, sessions.clone())
        .context("failed to build authorization policy")?;

    if config.session_ttl.is_some() {
        spawn_session_sweeper(sessions, config.session_purge_interval);
    }

    let app = build_router(state, &config);
    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("shut down");
    Ok(())
}

pub fn build_session_cache(config: &Config) -> InMemorySessionCache {
    match config.session_ttl {
        Some(ttl) => InMemorySessionCache::with_ttl(ttl),
        None => InMemorySessionCache::new(),
    }
}

/// Builds the process-wide services. The policy is loaded here, once; a bad
/// policy stops startup.
pub fn build_state(
    config: &Config,
    sessions: Arc<dyn SessionAuthorityCache>,
) -> Result<AppState, PolicyError> {
    let policy = policy::load_policy(config.policy_file.as_deref())?;
    let engine = AuthorizationEngine::new(policy);

    let mapper = ClaimMapper::with_defaults(config.default_authorities.clone());
    let login = LoginService::new(mapper, sessions);

    Ok(AppState::new(engine, login, config))
}

pub fn build_router(state: AppState, config: &Config) -> Router {
    let router =
        middleware::authorize::apply(api::v1::routes(), state.clone()).with_state(state);
    middleware::http::apply(router, config)
}

fn spawn_session_sweeper(sessions: Arc<InMemorySessionCache>, every: Duration) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            let removed = sessions.purge_expired();
            if removed > 0 {
                tracing::debug!(removed, remaining = sessions.len(), "expired sessions purged");
            }
        }
    });
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
