#![allow(dead_code)]

// std
use std::{sync::Arc, time::Duration as StdDuration};
// crates.io
use httpmock::{Mock, prelude::*};
use serde_json::{Value, json};
use time::{Duration, OffsetDateTime};
// self
use kis_quote_proxy::{
	auth::Credential,
	http::ReqwestHttpClient,
	provider::{DefaultUpstreamStrategy, UpstreamDescriptor},
	quote::QuoteFetcher,
	service::QuoteService,
	store::{CredentialStore, MemoryStore},
	token::TokenManager,
	url::Url,
};

pub const APP_KEY: &str = "it-app-key";
pub const APP_SECRET: &str = "it-app-secret";
pub const TOKEN_PATH: &str = "/oauth2/tokenP";
pub const QUOTE_PATH: &str = "/uapi/domestic-stock/v1/quotations/inquire-price";

pub fn descriptor(server: &MockServer) -> UpstreamDescriptor {
	UpstreamDescriptor::builder(
		Url::parse(&server.base_url()).expect("Mock upstream base URL should parse successfully."),
	)
	.build()
	.expect("Mock upstream descriptor should build successfully.")
}

pub fn http_client() -> ReqwestHttpClient {
	http_client_with_timeout(StdDuration::from_secs(2))
}

pub fn http_client_with_timeout(timeout: StdDuration) -> ReqwestHttpClient {
	ReqwestHttpClient::with_timeout(timeout).expect("Failed to build Reqwest client for tests.")
}

pub fn token_manager(server: &MockServer) -> (TokenManager, Arc<MemoryStore>) {
	let store = Arc::new(MemoryStore::default());
	let manager = TokenManager::new(
		store.clone(),
		descriptor(server),
		Arc::new(DefaultUpstreamStrategy),
		APP_KEY,
		APP_SECRET,
		http_client(),
	);

	(manager, store)
}

pub fn fetcher(server: &MockServer) -> QuoteFetcher {
	fetcher_with_client(server, http_client())
}

pub fn fetcher_with_client(server: &MockServer, client: ReqwestHttpClient) -> QuoteFetcher {
	QuoteFetcher::new(
		descriptor(server),
		Arc::new(DefaultUpstreamStrategy),
		APP_KEY,
		APP_SECRET,
		client,
	)
}

pub fn service(server: &MockServer) -> (QuoteService, Arc<MemoryStore>) {
	let (tokens, store) = token_manager(server);

	(QuoteService::new(tokens, fetcher(server)), store)
}

/// Seeds `store` with a credential that expires `remaining` from now.
pub fn seed(store: &MemoryStore, token: &str, remaining: Duration) -> Credential {
	let now = OffsetDateTime::now_utc();
	let credential = Credential::builder()
		.access_token(token)
		.issued_at(now - Duration::minutes(5))
		.expires_at(now + remaining)
		.build()
		.expect("Seed credential should build successfully.");

	store.save(credential.clone());

	credential
}

pub async fn mock_token<'a>(server: &'a MockServer, token: &str, expires_in: u64) -> Mock<'a> {
	let body = json!({
		"access_token": token,
		"access_token_token_expired": "2025-01-02 00:00:00",
		"token_type": "Bearer",
		"expires_in": expires_in,
	});

	server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200).json_body(body);
		})
		.await
}

pub fn quote_body(name: &str, price: &str) -> Value {
	json!({
		"rt_cd": "0",
		"msg_cd": "MCA00000",
		"msg1": "정상처리 되었습니다.",
		"output": { "hts_kor_isnm": name, "stck_prpr": price, "prdy_vrss": "500" },
	})
}

pub fn expired_body() -> Value {
	json!({ "rt_cd": "1", "msg_cd": "EGW00123", "msg1": "기간이 만료된 token 입니다." })
}

pub async fn mock_quote<'a>(
	server: &'a MockServer,
	code: &str,
	token: &str,
	status: u16,
	body: Value,
) -> Mock<'a> {
	let bearer = format!("Bearer {token}");

	server
		.mock_async(|when, then| {
			when.method(GET)
				.path(QUOTE_PATH)
				.query_param("FID_INPUT_ISCD", code)
				.header("authorization", bearer);
			then.status(status).json_body(body);
		})
		.await
}
