//! Transport primitives for upstream calls.
//!
//! [`ReqwestHttpClient`] is the proxy's only dependency on an HTTP stack. It executes a
//! prepared request, buffers the body, and captures [`ResponseMetadata`] (status and
//! `Retry-After`) so the token manager and quote fetcher can classify failures consistently.
//! Every request is bounded by the timeout the client was built with.

// std
use std::{ops::Deref, time::Duration as StdDuration};
// crates.io
use reqwest::{
	RequestBuilder,
	header::{HeaderMap, RETRY_AFTER},
};
use time::format_description::well_known::Rfc2822;
// self
use crate::{
	_prelude::*,
	error::{ConfigError, TransportError},
};

/// Default per-request timeout applied to upstream calls.
pub const DEFAULT_TIMEOUT: StdDuration = StdDuration::from_secs(10);

/// Captures metadata from an HTTP response for downstream error mapping.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResponseMetadata {
	/// HTTP status code returned by the upstream.
	pub status: Option<u16>,
	/// Retry-After hint expressed as a relative duration.
	pub retry_after: Option<Duration>,
}

/// Buffered upstream response.
#[derive(Clone, Debug)]
pub struct UpstreamResponse {
	/// Status and retry hints.
	pub meta: ResponseMetadata,
	/// Raw response body.
	pub body: Vec<u8>,
}
impl UpstreamResponse {
	/// HTTP status code (always populated for a received response).
	pub fn status(&self) -> u16 {
		self.meta.status.unwrap_or_default()
	}

	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status())
	}

	/// Lossy UTF-8 view of the body for previews.
	pub fn body_text(&self) -> String {
		String::from_utf8_lossy(&self.body).into_owned()
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// Upstream endpoints return results directly, so any custom [`ReqwestClient`] passed to
/// [`ReqwestHttpClient::with_client`] should carry its own timeout; the default constructor
/// applies [`DEFAULT_TIMEOUT`].
#[derive(Clone, Debug)]
pub struct ReqwestHttpClient(pub ReqwestClient);
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a client whose requests time out after `timeout`.
	pub fn with_timeout(timeout: StdDuration) -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder().timeout(timeout).build()?;

		Ok(Self(client))
	}

	/// Sends `request` and buffers the response, labeling failures with `endpoint`.
	pub async fn execute(
		&self,
		endpoint: &'static str,
		request: RequestBuilder,
	) -> Result<UpstreamResponse, TransportError> {
		let response =
			request.send().await.map_err(|e| TransportError::from_reqwest(endpoint, e))?;
		let status = response.status();
		let retry_after = parse_retry_after(response.headers());
		let body = response
			.bytes()
			.await
			.map_err(|e| TransportError::from_reqwest(endpoint, e))?
			.to_vec();

		Ok(UpstreamResponse {
			meta: ResponseMetadata { status: Some(status.as_u16()), retry_after },
			body,
		})
	}
}
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
	let value = headers.get(RETRY_AFTER)?;
	let raw = value.to_str().ok()?.trim();

	if let Ok(secs) = raw.parse::<u32>() {
		return Some(Duration::seconds(i64::from(secs)));
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		let delta = moment - OffsetDateTime::now_utc();

		if delta.is_positive() {
			return Some(delta);
		}
	}

	None
}
