//! Proxy configuration loaded from environment variables.
//!
//! Required:
//! - `KIS_APP_KEY`, `KIS_APP_SECRET`: application credentials issued by the upstream.
//!
//! Optional:
//! - `KIS_BASE_URL` (default: the production open API host)
//! - `KIS_MARKET_DIV_CODE` (default: `J`)
//! - `KIS_PRICE_TR_ID` (default: `FHKST01010100`)
//! - `QUOTE_PROXY_ADDR` (default: `0.0.0.0:3000`)
//! - `QUOTE_PROXY_SAFETY_MARGIN_SECS` (default: 60)
//! - `QUOTE_PROXY_TIMEOUT_SECS` (default: 10)
//! - `QUOTE_PROXY_MAX_CONCURRENCY` (default: 8)

// std
use std::{
	net::{IpAddr, Ipv4Addr, SocketAddr},
	time::Duration as StdDuration,
};
// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	error::ConfigError,
	http::{DEFAULT_TIMEOUT, ReqwestHttpClient},
	provider::{
		DEFAULT_BASE_URL, DEFAULT_MARKET_DIV_CODE, DEFAULT_PRICE_TR_ID, DefaultUpstreamStrategy,
		UpstreamDescriptor, UpstreamStrategy,
	},
	quote::{DEFAULT_MAX_CONCURRENCY, QuoteFetcher},
	service::QuoteService,
	store::MemoryStore,
	token::{TokenManager, TokenPolicy},
};

const APP_KEY: &str = "KIS_APP_KEY";
const APP_SECRET: &str = "KIS_APP_SECRET";
const BASE_URL: &str = "KIS_BASE_URL";
const MARKET_DIV_CODE: &str = "KIS_MARKET_DIV_CODE";
const PRICE_TR_ID: &str = "KIS_PRICE_TR_ID";
const LISTEN_ADDR: &str = "QUOTE_PROXY_ADDR";
const SAFETY_MARGIN_SECS: &str = "QUOTE_PROXY_SAFETY_MARGIN_SECS";
const TIMEOUT_SECS: &str = "QUOTE_PROXY_TIMEOUT_SECS";
const MAX_CONCURRENCY: &str = "QUOTE_PROXY_MAX_CONCURRENCY";

/// Default listen address.
pub const DEFAULT_LISTEN_ADDR: SocketAddr =
	SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 3000);

/// Complete proxy configuration.
#[derive(Clone, Debug)]
pub struct ProxyConfig {
	/// Application key.
	pub app_key: String,
	/// Application secret.
	pub app_secret: TokenSecret,
	/// Upstream base URL.
	pub base_url: Url,
	/// Market division selector for quote requests.
	pub market_div_code: String,
	/// Transaction id for quote requests.
	pub price_tr_id: String,
	/// Address the HTTP server binds to.
	pub listen_addr: SocketAddr,
	/// Buffer before expiry during which the cached token is reissued.
	pub safety_margin: Duration,
	/// Per-request upstream timeout.
	pub request_timeout: StdDuration,
	/// Concurrent upstream calls per batch.
	pub max_concurrency: usize,
}
impl ProxyConfig {
	/// Loads configuration from the process environment.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|name| std::env::var(name).ok())
	}

	/// Loads configuration through an arbitrary variable lookup.
	pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let app_key = required(&lookup, APP_KEY)?;
		let app_secret = TokenSecret::new(required(&lookup, APP_SECRET)?);
		let base_url = optional(&lookup, BASE_URL)
			.as_deref()
			.unwrap_or(DEFAULT_BASE_URL)
			.parse::<Url>()
			.map_err(|source| ConfigError::InvalidUrl { source })?;
		let market_div_code =
			optional(&lookup, MARKET_DIV_CODE).unwrap_or_else(|| DEFAULT_MARKET_DIV_CODE.into());
		let price_tr_id =
			optional(&lookup, PRICE_TR_ID).unwrap_or_else(|| DEFAULT_PRICE_TR_ID.into());
		let listen_addr = parsed(&lookup, LISTEN_ADDR)?.unwrap_or(DEFAULT_LISTEN_ADDR);
		let safety_margin = match parsed::<i64, _>(&lookup, SAFETY_MARGIN_SECS)? {
			Some(secs) if secs < 0 =>
				return Err(ConfigError::InvalidValue {
					name: SAFETY_MARGIN_SECS,
					value: secs.to_string(),
				}),
			Some(secs) => Duration::seconds(secs),
			None => TokenPolicy::DEFAULT_SAFETY_MARGIN,
		};
		let request_timeout = match parsed::<u64, _>(&lookup, TIMEOUT_SECS)? {
			Some(0) =>
				return Err(ConfigError::InvalidValue { name: TIMEOUT_SECS, value: "0".into() }),
			Some(secs) => StdDuration::from_secs(secs),
			None => DEFAULT_TIMEOUT,
		};
		let max_concurrency = match parsed::<usize, _>(&lookup, MAX_CONCURRENCY)? {
			Some(0) =>
				return Err(ConfigError::InvalidValue { name: MAX_CONCURRENCY, value: "0".into() }),
			Some(limit) => limit,
			None => DEFAULT_MAX_CONCURRENCY,
		};

		Ok(Self {
			app_key,
			app_secret,
			base_url,
			market_div_code,
			price_tr_id,
			listen_addr,
			safety_margin,
			request_timeout,
			max_concurrency,
		})
	}

	/// Builds the upstream descriptor from the configured base URL and selectors.
	pub fn descriptor(&self) -> Result<UpstreamDescriptor, ConfigError> {
		UpstreamDescriptor::builder(self.base_url.clone())
			.market_div_code(self.market_div_code.clone())
			.price_tr_id(self.price_tr_id.clone())
			.build()
			.map_err(ConfigError::from)
	}

	/// Wires a [`QuoteService`] with an empty in-memory credential slot.
	pub fn build_service(&self) -> Result<QuoteService, ConfigError> {
		let descriptor = self.descriptor()?;
		let http_client = ReqwestHttpClient::with_timeout(self.request_timeout)?;
		let strategy: Arc<dyn UpstreamStrategy> = Arc::new(DefaultUpstreamStrategy);
		let tokens = TokenManager::new(
			Arc::new(MemoryStore::default()),
			descriptor.clone(),
			strategy.clone(),
			self.app_key.clone(),
			self.app_secret.expose(),
			http_client.clone(),
		)
		.with_policy(TokenPolicy::default().with_safety_margin(self.safety_margin));
		let fetcher = QuoteFetcher::new(
			descriptor,
			strategy,
			self.app_key.clone(),
			self.app_secret.expose(),
			http_client,
		)
		.with_max_concurrency(self.max_concurrency);

		Ok(QuoteService::new(tokens, fetcher))
	}
}

fn optional<F>(lookup: &F, name: &'static str) -> Option<String>
where
	F: Fn(&str) -> Option<String>,
{
	lookup(name).map(|value| value.trim().to_owned()).filter(|value| !value.is_empty())
}

fn required<F>(lookup: &F, name: &'static str) -> Result<String, ConfigError>
where
	F: Fn(&str) -> Option<String>,
{
	let value = lookup(name).ok_or(ConfigError::MissingEnvVar { name })?;
	let value = value.trim();

	if value.is_empty() {
		return Err(ConfigError::EmptyValue { name });
	}

	Ok(value.to_owned())
}

fn parsed<T, F>(lookup: &F, name: &'static str) -> Result<Option<T>, ConfigError>
where
	T: FromStr,
	F: Fn(&str) -> Option<String>,
{
	optional(lookup, name)
		.map(|value| value.parse().map_err(|_| ConfigError::InvalidValue { name, value }))
		.transpose()
}

#[cfg(test)]
mod tests {
	// std
	use std::collections::HashMap;
	// self
	use super::*;

	fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
		let vars = vars
			.iter()
			.map(|(name, value)| (name.to_string(), value.to_string()))
			.collect::<HashMap<_, _>>();

		move |name: &str| vars.get(name).cloned()
	}

	#[test]
	fn defaults_apply_when_only_credentials_are_set() {
		let config = ProxyConfig::from_lookup(lookup(&[(APP_KEY, "key"), (APP_SECRET, "secret")]))
			.expect("Credentials alone should be enough.");

		assert_eq!(config.app_key, "key");
		assert_eq!(config.app_secret.expose(), "secret");
		assert_eq!(config.base_url.as_str(), "https://openapi.koreainvestment.com:9443/");
		assert_eq!(config.market_div_code, "J");
		assert_eq!(config.price_tr_id, "FHKST01010100");
		assert_eq!(config.listen_addr.to_string(), "0.0.0.0:3000");
		assert_eq!(config.safety_margin, Duration::seconds(60));
		assert_eq!(config.request_timeout, StdDuration::from_secs(10));
		assert_eq!(config.max_concurrency, 8);
		assert!(!format!("{config:?}").contains("secret\""));
	}

	#[test]
	fn overrides_are_parsed() {
		let config = ProxyConfig::from_lookup(lookup(&[
			(APP_KEY, "key"),
			(APP_SECRET, "secret"),
			(BASE_URL, "https://openapivts.koreainvestment.com:29443"),
			(LISTEN_ADDR, "127.0.0.1:8080"),
			(SAFETY_MARGIN_SECS, "0"),
			(TIMEOUT_SECS, "3"),
			(MAX_CONCURRENCY, "2"),
		]))
		.expect("Overrides should parse.");

		assert_eq!(config.base_url.port(), Some(29443));
		assert_eq!(config.listen_addr.port(), 8080);
		assert_eq!(config.safety_margin, Duration::ZERO);
		assert_eq!(config.request_timeout, StdDuration::from_secs(3));
		assert_eq!(config.max_concurrency, 2);

		let service = config.build_service().expect("Service should build from valid config.");

		assert_eq!(service.fetcher().max_concurrency, 2);
		assert_eq!(service.tokens().policy.safety_margin, Duration::ZERO);
		assert_eq!(
			service.tokens().descriptor.endpoints.token.as_str(),
			"https://openapivts.koreainvestment.com:29443/oauth2/tokenP"
		);
	}

	#[test]
	fn missing_or_blank_credentials_fail() {
		assert!(matches!(
			ProxyConfig::from_lookup(lookup(&[(APP_SECRET, "secret")])),
			Err(ConfigError::MissingEnvVar { name: APP_KEY })
		));
		assert!(matches!(
			ProxyConfig::from_lookup(lookup(&[(APP_KEY, "key"), (APP_SECRET, "  ")])),
			Err(ConfigError::EmptyValue { name: APP_SECRET })
		));
	}

	#[test]
	fn invalid_values_fail() {
		for (name, value) in [
			(LISTEN_ADDR, "nowhere"),
			(SAFETY_MARGIN_SECS, "-1"),
			(TIMEOUT_SECS, "0"),
			(TIMEOUT_SECS, "ten"),
			(MAX_CONCURRENCY, "0"),
		] {
			let result =
				ProxyConfig::from_lookup(lookup(&[(APP_KEY, "key"), (APP_SECRET, "s"), (name, value)]));

			assert!(
				matches!(result, Err(ConfigError::InvalidValue { name: n, .. }) if n == name),
				"{name}={value} should be rejected."
			);
		}
		assert!(matches!(
			ProxyConfig::from_lookup(lookup(&[
				(APP_KEY, "key"),
				(APP_SECRET, "s"),
				(BASE_URL, "not a url"),
			])),
			Err(ConfigError::InvalidUrl { .. })
		));
	}
}
