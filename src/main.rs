//! KIS quote proxy binary.
//!
//! Reads configuration from the environment (a `.env` file is loaded first when present), binds
//! the listen address, and serves until Ctrl-C. See [`kis_quote_proxy::config`] for variables.

// crates.io
use color_eyre::eyre::WrapErr;
use kis_quote_proxy::{
	config::ProxyConfig,
	server::{self, AppState},
};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let _ = dotenvy::dotenv();

	server::init_tracing();

	let config = ProxyConfig::from_env().wrap_err("failed to load proxy configuration")?;
	let service = config.build_service().wrap_err("failed to build quote service")?;
	let listener = TcpListener::bind(config.listen_addr)
		.await
		.wrap_err_with(|| format!("failed to bind {}", config.listen_addr))?;

	tracing::info!(
		base_url = %config.base_url,
		safety_margin_secs = config.safety_margin.whole_seconds(),
		max_concurrency = config.max_concurrency,
		"quote proxy configured"
	);

	server::serve(listener, AppState::new(service)).await.wrap_err("server terminated")?;

	Ok(())
}
