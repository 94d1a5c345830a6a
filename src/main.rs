//! BitBadger - Pull-request metric badges for Bitbucket repositories
//!
//! Binary entry point: configuration, logging, and the HTTP server.

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use axum::Router;
use axum_server::tls_rustls::RustlsConfig;
use clap::Parser;
use tokio::signal;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bitbadger::{create_router, AppState, Config, ListenMode};

/// Grace period for in-flight TLS connections at shutdown
const TLS_SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

/// Main entry point for the BitBadger server.
///
/// # Startup Sequence
/// 1. Parse flags, falling back to environment variables
/// 2. Initialize tracing subscriber for logging
/// 3. Build the badge service (upstream client, renderer, result cache)
/// 4. Start the HTTP or HTTPS server on configured port
/// 5. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Defaults to "info" level (or "debug" with DEBUG=true),
    // can be overridden with RUST_LOG env var
    let default_filter = if config.debug {
        "bitbadger=debug,tower_http=debug"
    } else {
        "bitbadger=info,tower_http=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting BitBadger v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration loaded: cache_validity={}s, max_cached_results={}, port={}, upstream={}",
        config.cache_validity, config.max_cached_results, config.server_port, config.upstream_api_url
    );

    if config.username.is_empty() {
        warn!("No upstream credentials configured, querying anonymously");
    } else {
        info!("Serving badges as '{}'", config.username);
    }
    if config.cache_policy().is_disabled() {
        info!("Result cache disabled");
    }

    let mode = config.listen_mode()?;
    let state = AppState::from_config(&config).context("failed to build badge service")?;
    let app = create_router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));

    match mode {
        ListenMode::Http => {
            if config.insecure {
                info!("Running in HTTP-mode");
            } else {
                warn!("No TLS certificate configured, running in HTTP-mode");
            }
            serve_http(addr, app).await?;
        }
        ListenMode::Https { cert, key } => serve_https(addr, app, &cert, &key).await?,
    }

    info!("Server shutdown complete");
    Ok(())
}

async fn serve_http(addr: SocketAddr, app: Router) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")
}

async fn serve_https(addr: SocketAddr, app: Router, cert: &Path, key: &Path) -> anyhow::Result<()> {
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        debug!("TLS crypto provider already installed");
    }

    let tls = RustlsConfig::from_pem_file(cert, key).await.with_context(|| {
        format!(
            "failed to load TLS certificate {} and key {}",
            cert.display(),
            key.display()
        )
    })?;

    let handle = axum_server::Handle::new();
    let shutdown = handle.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown.graceful_shutdown(Some(TLS_SHUTDOWN_GRACE));
    });

    info!("Server listening on https://{}", addr);
    axum_server::bind_rustls(addr, tls)
        .handle(handle)
        .serve(app.into_make_service())
        .await
        .with_context(|| format!("server error on {}", addr))
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
