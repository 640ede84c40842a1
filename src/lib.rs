//! Token-caching HTTP proxy for the Korea Investment & Securities quotation API: cached
//! client-credential tokens, concurrent batch lookups, and one-shot expiry recovery.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod obs;
pub mod provider;
pub mod quote;
#[cfg(feature = "server")] pub mod server;
pub mod service;
pub mod store;
pub mod token;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for unit tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		http::ReqwestHttpClient,
		provider::{DefaultUpstreamStrategy, UpstreamDescriptor, UpstreamStrategy},
		quote::QuoteFetcher,
		service::QuoteService,
		store::{CredentialStore, MemoryStore},
		token::TokenManager,
	};

	/// Application key shared by unit tests.
	pub const TEST_APP_KEY: &str = "test-app-key";
	/// Application secret shared by unit tests.
	pub const TEST_APP_SECRET: &str = "test-app-secret";

	/// Builds a descriptor whose endpoints point at a mock upstream base URL.
	pub fn test_descriptor(base_url: &str) -> UpstreamDescriptor {
		UpstreamDescriptor::builder(
			Url::parse(base_url).expect("Mock upstream base URL should parse successfully."),
		)
		.build()
		.expect("Mock upstream descriptor should build successfully.")
	}

	/// Builds a reqwest HTTP client with a short timeout suitable for tests.
	pub fn test_http_client() -> ReqwestHttpClient {
		ReqwestHttpClient::with_timeout(std::time::Duration::from_secs(2))
			.expect("Failed to build Reqwest client for tests.")
	}

	/// Constructs a [`TokenManager`] backed by an in-memory store and the shared test
	/// credentials.
	pub fn build_test_token_manager(base_url: &str) -> (TokenManager, Arc<MemoryStore>) {
		let store_backend = Arc::new(MemoryStore::default());
		let store: Arc<dyn CredentialStore> = store_backend.clone();
		let strategy: Arc<dyn UpstreamStrategy> = Arc::new(DefaultUpstreamStrategy);
		let manager = TokenManager::new(
			store,
			test_descriptor(base_url),
			strategy,
			TEST_APP_KEY,
			TEST_APP_SECRET,
			test_http_client(),
		);

		(manager, store_backend)
	}

	/// Constructs a [`QuoteFetcher`] that talks to the mock upstream.
	pub fn build_test_fetcher(base_url: &str) -> QuoteFetcher {
		QuoteFetcher::new(
			test_descriptor(base_url),
			Arc::new(DefaultUpstreamStrategy),
			TEST_APP_KEY,
			TEST_APP_SECRET,
			test_http_client(),
		)
	}

	/// Constructs a [`QuoteService`] plus a handle to its credential store.
	pub fn build_test_service(base_url: &str) -> (QuoteService, Arc<MemoryStore>) {
		let (tokens, store) = build_test_token_manager(base_url);
		let service = QuoteService::new(tokens, build_test_fetcher(base_url));

		(service, store)
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashSet},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::RwLock;
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::{Map as JsonMap, Value as JsonValue};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use reqwest;
pub use url;
#[cfg(feature = "server")] use {color_eyre as _, dotenvy as _};
#[cfg(test)] use {http_body_util as _, httpmock as _, tokio as _, tower as _};
