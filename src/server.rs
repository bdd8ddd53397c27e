//! HTTP server initialization and runtime setup.
//!
//! Wires the AliExpress client, bundle cache, resolver and evictor together
//! and runs the Axum server until a shutdown signal arrives.

use crate::application::services::{BundleAggregator, DealService};
use crate::config::Config;
use crate::infrastructure::aliexpress::AliExpressClient;
use crate::infrastructure::cache::{BundleCache, Evictable, Evictor, ResolvedUrlCache};
use crate::infrastructure::resolver::HttpShortLinkResolver;
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Builds the service graph from configuration.
///
/// Shared by the HTTP server and the `lookup` CLI.
///
/// # Errors
///
/// Returns an error if the variant list is invalid or an HTTP client
/// cannot be built.
pub fn build_state(config: &Config) -> Result<AppState> {
    let upstream = AliExpressClient::new(config.aliexpress_settings())
        .context("Failed to build AliExpress client")?;
    let aggregator = BundleAggregator::new(Arc::new(upstream), config.upstream_timeout());
    let cache = BundleCache::new(Arc::new(aggregator), config.cache_ttl());

    let resolved_urls = Arc::new(ResolvedUrlCache::new(config.cache_ttl()));
    let resolver = HttpShortLinkResolver::new(resolved_urls.clone(), config.query_country.clone())
        .context("Failed to build short-link resolver")?;

    let deal_service = DealService::new(cache, Arc::new(resolver), config.link_variants()?);

    Ok(AppState::new(Arc::new(deal_service), resolved_urls))
}

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - AliExpress client, aggregator and bundle cache
/// - Short-link resolver and its cache
/// - Background evictor
/// - Axum HTTP server with graceful shutdown
///
/// On shutdown the evictor is cancelled and the caches are flushed.
///
/// # Errors
///
/// Returns an error if:
/// - Service construction fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let state = build_state(&config)?;

    let shutdown = CancellationToken::new();
    let evictor = Evictor::new(
        vec![
            Arc::new(state.cache().clone()) as Arc<dyn Evictable>,
            state.resolved_urls.clone(),
        ],
        config.eviction_interval(),
    );
    let evictor_handle = tokio::spawn(evictor.run(shutdown.clone()));
    tracing::info!("Evictor started");

    let app = app_router(state.clone());

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    shutdown.cancel();
    if let Err(e) = evictor_handle.await {
        tracing::warn!(error = %e, "Evictor task ended abnormally");
    }

    let flushed = state.cache().flush();
    let resolved = state.resolved_urls.clear();
    tracing::info!(flushed, resolved, "Shutdown complete");

    Ok(())
}

/// Resolves on Ctrl-C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
