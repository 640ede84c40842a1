mod common;

// crates.io
use httpmock::prelude::*;
use serde_json::json;
use time::Duration;
// self
use common::*;
use kis_quote_proxy::{
	error::{AuthError, Error, TransportError},
	store::CredentialStore,
	token::TokenPolicy,
};

#[tokio::test]
async fn acquire_sends_credentials_and_caches_the_token() {
	let server = MockServer::start_async().await;
	let (manager, store) = token_manager(&server);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path(TOKEN_PATH)
				.header("content-type", "application/json")
				.json_body(json!({
					"grant_type": "client_credentials",
					"appkey": APP_KEY,
					"appsecret": APP_SECRET,
				}));
			then.status(200).json_body(json!({
				"access_token": "cached-token",
				"token_type": "Bearer",
				"expires_in": 86400,
			}));
		})
		.await;
	let first = manager.acquire_token().await.expect("Initial issuance should succeed.");
	let second = manager.acquire_token().await.expect("Cached acquisition should succeed.");

	assert_eq!(first.access_token.expose(), "cached-token");
	assert_eq!(second, first);
	assert_eq!(first.expires_at - first.issued_at, Duration::seconds(86400));

	mock.assert_calls_async(1).await;

	let stored = store.load().expect("Issued credential should be stored.");

	assert_eq!(stored, first);
	assert_eq!(manager.issuance_metrics.attempts(), 1);
	assert_eq!(manager.issuance_metrics.successes(), 1);
}

#[tokio::test]
async fn concurrent_callers_share_one_issuance() {
	let server = MockServer::start_async().await;
	let (manager, _store) = token_manager(&server);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200)
				.delay(std::time::Duration::from_millis(200))
				.json_body(json!({ "access_token": "guard-token", "expires_in": 3600 }));
		})
		.await;
	let (first, second, third) =
		tokio::join!(manager.acquire_token(), manager.acquire_token(), manager.acquire_token());

	for credential in [first, second, third] {
		assert_eq!(
			credential.expect("Concurrent acquisition should succeed.").access_token.expose(),
			"guard-token"
		);
	}

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn missing_lifetime_defaults_to_one_hour() {
	let server = MockServer::start_async().await;
	let (manager, _store) = token_manager(&server);

	server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200).json_body(json!({ "access_token": "no-expiry" }));
		})
		.await;

	let credential = manager.acquire_token().await.expect("Issuance should succeed.");

	assert_eq!(credential.expires_at - credential.issued_at, TokenPolicy::DEFAULT_LIFETIME);
	assert_eq!(TokenPolicy::DEFAULT_LIFETIME, Duration::seconds(3600));
}

#[tokio::test]
async fn credential_inside_safety_margin_is_reissued() {
	let server = MockServer::start_async().await;
	let (manager, store) = token_manager(&server);
	let mock = mock_token(&server, "replacement", 3600).await;

	seed(&store, "almost-expired", Duration::seconds(30));

	let credential = manager.acquire_token().await.expect("Reissue should succeed.");

	assert_eq!(credential.access_token.expose(), "replacement");

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn fresh_seeded_credential_skips_the_network() {
	let server = MockServer::start_async().await;
	let (manager, store) = token_manager(&server);
	let mock = mock_token(&server, "unused", 3600).await;
	let seeded = seed(&store, "still-fresh", Duration::minutes(30));
	let credential = manager.acquire_token().await.expect("Cached credential should be reused.");

	assert_eq!(credential, seeded);

	mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn custom_safety_margin_is_honored() {
	let server = MockServer::start_async().await;
	let (manager, store) = token_manager(&server);
	let manager =
		manager.with_policy(TokenPolicy::default().with_safety_margin(Duration::minutes(10)));
	let mock = mock_token(&server, "early", 3600).await;

	seed(&store, "five-minutes-left", Duration::minutes(5));

	let credential = manager.acquire_token().await.expect("Reissue should succeed.");

	assert_eq!(credential.access_token.expose(), "early");

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn rejection_leaves_cached_credential_untouched() {
	let server = MockServer::start_async().await;
	let (manager, store) = token_manager(&server);
	let seeded = seed(&store, "stale-but-kept", Duration::seconds(10));
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(403).json_body(json!({
				"error_code": "EGW00133",
				"error_description": "접근토큰 발급 잠시 후 다시 시도하세요(1분당 1회)",
			}));
		})
		.await;
	let err = manager.acquire_token().await.expect_err("Rejected issuance should fail.");

	match err {
		Error::UpstreamAuth(AuthError::Rejected { status, code, .. }) => {
			assert_eq!(status, 403);
			assert_eq!(code.as_deref(), Some("EGW00133"));
		},
		other => panic!("Unexpected error: {other:?}."),
	}

	mock.assert_calls_async(1).await;

	assert_eq!(store.load(), Some(seeded));
	assert_eq!(manager.issuance_metrics.failures(), 1);
}

#[tokio::test]
async fn malformed_payloads_map_to_auth_errors() {
	for (body, expected) in [
		(json!({ "access_token": 42 }), "malformed"),
		(json!({ "token_type": "Bearer", "expires_in": 3600 }), "missing"),
		(json!({ "access_token": "   ", "expires_in": 3600 }), "missing"),
		(json!({ "access_token": "t", "expires_in": 0 }), "non_positive"),
		(json!({ "access_token": "t", "expires_in": i64::MAX }), "out_of_range"),
	] {
		let server = MockServer::start_async().await;
		let (manager, store) = token_manager(&server);

		server
			.mock_async(|when, then| {
				when.method(POST).path(TOKEN_PATH);
				then.status(200).json_body(body);
			})
			.await;

		let err = manager.acquire_token().await.expect_err("Invalid payload should fail.");
		let matched = match (&err, expected) {
			(Error::UpstreamAuth(AuthError::MalformedResponse { status, .. }), "malformed") =>
				*status == 200,
			(Error::UpstreamAuth(AuthError::MissingAccessToken), "missing") => true,
			(Error::UpstreamAuth(AuthError::NonPositiveExpiresIn), "non_positive") => true,
			(Error::UpstreamAuth(AuthError::ExpiresInOutOfRange), "out_of_range") => true,
			_ => false,
		};

		assert!(matched, "Expected {expected}, got {err:?}.");
		assert!(store.load().is_none());
	}
}

#[tokio::test]
async fn timeouts_surface_as_transport_failures() {
	let server = MockServer::start_async().await;
	let (mut manager, _store) = token_manager(&server);

	manager.http_client = http_client_with_timeout(std::time::Duration::from_millis(100));

	server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200)
				.delay(std::time::Duration::from_millis(500))
				.json_body(json!({ "access_token": "late" }));
		})
		.await;

	let err = manager.acquire_token().await.expect_err("Slow issuance should time out.");

	assert!(
		matches!(
			err,
			Error::UpstreamAuth(AuthError::Transport(TransportError::Timeout { endpoint: "token" }))
		),
		"Unexpected error: {err:?}."
	);
}
