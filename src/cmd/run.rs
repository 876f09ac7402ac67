//! `grafana-proxy run`: start the proxy server.
//!
//! Loads the configuration and trust store once, builds the immutable
//! [`AppState`], and serves until SIGINT / SIGTERM. Any startup failure
//! is returned to `main`, which exits non-zero.

use std::net::SocketAddr;
use std::sync::Arc;

use crate::cli::RunArgs;
use crate::config::{self, env};
use crate::error::GrafanaProxyError;
use crate::logging;
use crate::proxy::ProxyTarget;
use crate::server::{self, AppState};
use crate::tls;

pub async fn execute(args: RunArgs) -> Result<(), GrafanaProxyError> {
    let loaded = config::load(args.config.as_deref()).await?;
    let config = &loaded.config;

    logging::init(
        config.log.level(),
        logging::resolve_format(args.pretty, args.json),
    );

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        build = super::build_id(),
        "grafana-proxy starting"
    );
    tracing::info!(file = %loaded.path.display(), "loaded config");
    for key in &loaded.env_overrides {
        tracing::debug!(key = %key, var = %env::env_key(key), "config value set from environment");
    }
    if config.grafana.key.is_empty() {
        tracing::warn!("grafana.key is empty, upstream requests will carry an empty bearer token");
    }

    let target = ProxyTarget::from_config(&config.grafana)?;
    tracing::info!(upstream = %target, "proxying to upstream");

    let trust = tls::load_trust_store(&config.grafana.cacerts)?;
    let state = Arc::new(AppState::new(target, &trust, config.grafana.timeout));
    let router = server::build_router(state);

    let listener = tokio::net::TcpListener::bind(config.server.bind_address()).await?;
    let addr = listener.local_addr()?;

    tracing::info!(
        addr = %addr,
        datasource = config.grafana.datasource,
        timeout_ms = config.grafana.timeout,
        "grafana-proxy started"
    );

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(server::shutdown_signal())
    .await?;

    tracing::info!("grafana-proxy stopped");
    Ok(())
}
