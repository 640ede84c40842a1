//! HTTP layer: axum router, route handlers, and error mapping.
//!
//! Routes:
//! - GET  /price?code=<code>                 raw upstream payload for one code
//! - GET  /prices?codes=<csv>[&raw=true]     normalized batch with the managed token
//! - POST /price {codes, token[, raw]}       normalized batch with a caller-supplied token
//! - GET  /health                            liveness and token cache state

mod error;
mod routes;

pub use error::ApiError;

// crates.io
use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
// self
use crate::{_prelude::*, service::QuoteService};

/// Shared application state passed to all route handlers.
#[derive(Debug)]
pub struct AppState {
	/// Quote service shared by every request.
	pub service: QuoteService,
}
impl AppState {
	/// Creates a new shared application state wrapped in an `Arc`.
	pub fn new(service: QuoteService) -> Arc<Self> {
		Arc::new(Self { service })
	}
}

/// Builds the full axum router.
pub fn make_router(state: Arc<AppState>) -> Router {
	Router::new()
		.route("/price", get(routes::price).post(routes::prices_with_token))
		.route("/prices", get(routes::prices))
		.route("/health", get(routes::health))
		.with_state(state)
		.layer(TraceLayer::new_for_http())
}

/// Serves the router on `listener` until Ctrl-C is received.
pub async fn serve(listener: TcpListener, state: Arc<AppState>) -> std::io::Result<()> {
	let addr = listener.local_addr()?;

	tracing::info!(%addr, "quote proxy listening");

	axum::serve(listener, make_router(state)).with_graceful_shutdown(shutdown_signal()).await
}

/// Installs the global `tracing` subscriber, filtered by `RUST_LOG` (default `info`).
pub fn init_tracing() {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

	// A subscriber may already be installed (e.g. by tests).
	let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

async fn shutdown_signal() {
	if let Err(e) = tokio::signal::ctrl_c().await {
		tracing::warn!(error = %e, "failed to listen for shutdown signal");

		std::future::pending::<()>().await;
	}

	tracing::info!("shutdown signal received");
}
