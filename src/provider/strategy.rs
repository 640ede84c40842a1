//! Upstream strategy hooks that customize identity requests and classify quote failures.
//!
//! Implementations work on crate-owned data types so the token manager and quote fetcher stay
//! decoupled from any particular HTTP client.

// self
use crate::_prelude::*;

/// Upstream message codes that mean the bearer token is expired or no longer valid.
pub const EXPIRED_TOKEN_CODES: [&str; 2] = ["EGW00123", "EGW00121"];

/// Strategy hook that allows upstreams to decorate requests and classify errors.
///
/// Implementors are required to be `Send + Sync`. Override only what you need;
/// `augment_token_request` has a default no-op implementation.
pub trait UpstreamStrategy: Send + Sync {
	/// Maps a failed quote response into the proxy's recovery taxonomy.
	fn classify_quote_error(&self, ctx: &QuoteErrorContext) -> QuoteErrorKind;

	/// Gives upstreams a chance to add fields to the identity request body before dispatching.
	fn augment_token_request(&self, _body: &mut BTreeMap<String, String>) {}
}

/// Canonical quote failure categories used by strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuoteErrorKind {
	/// Token is expired or invalid; reissuing may succeed.
	TokenExpired,
	/// Upstream rejected the request for any other reason.
	Rejected,
}

/// Context passed to strategies when classifying quote failures.
///
/// Builders on the fetcher side populate the context before invoking
/// [`UpstreamStrategy::classify_quote_error`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QuoteErrorContext {
	/// HTTP status code returned by the quote endpoint.
	pub http_status: Option<u16>,
	/// Upstream result code (`rt_cd`).
	pub result_code: Option<String>,
	/// Upstream message code (`msg_cd`).
	pub message_code: Option<String>,
	/// Upstream message (`msg1`).
	pub message: Option<String>,
	/// Preview of the response body for non-JSON payloads.
	pub body_preview: Option<String>,
}
impl QuoteErrorContext {
	const BODY_PREVIEW_LIMIT: usize = 256;

	/// Adds an HTTP status code.
	pub fn with_http_status(mut self, status: u16) -> Self {
		self.http_status = Some(status);

		self
	}

	/// Adds the upstream result code.
	pub fn with_result_code(mut self, code: impl Into<String>) -> Self {
		self.result_code = Some(code.into());

		self
	}

	/// Adds the upstream message code.
	pub fn with_message_code(mut self, code: impl Into<String>) -> Self {
		self.message_code = Some(code.into());

		self
	}

	/// Adds the upstream message.
	pub fn with_message(mut self, message: impl Into<String>) -> Self {
		self.message = Some(message.into());

		self
	}

	/// Adds a body preview for responses that were not valid JSON.
	pub fn with_body_preview(mut self, body: impl Into<String>) -> Self {
		self.body_preview = Some(truncate_preview(body.into()));

		self
	}
}

/// Default strategy for the KIS open API.
///
/// It prioritizes the structured `msg_cd` field, then falls back to body text hints, and
/// finally treats HTTP 401 as an invalid token.
#[derive(Debug, Default)]
pub struct DefaultUpstreamStrategy;
impl Display for DefaultUpstreamStrategy {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("default-upstream-strategy")
	}
}
impl UpstreamStrategy for DefaultUpstreamStrategy {
	fn classify_quote_error(&self, ctx: &QuoteErrorContext) -> QuoteErrorKind {
		if ctx.message_code.as_deref().is_some_and(is_expired_token_code) {
			return QuoteErrorKind::TokenExpired;
		}
		if ctx
			.body_preview
			.as_deref()
			.is_some_and(|body| EXPIRED_TOKEN_CODES.iter().any(|code| body.contains(code)))
		{
			return QuoteErrorKind::TokenExpired;
		}
		if ctx.http_status == Some(401) {
			return QuoteErrorKind::TokenExpired;
		}

		QuoteErrorKind::Rejected
	}
}

/// Returns `true` for upstream message codes that signal an expired or invalid token.
pub fn is_expired_token_code(code: &str) -> bool {
	EXPIRED_TOKEN_CODES.iter().any(|known| known.eq_ignore_ascii_case(code.trim()))
}

pub(crate) fn truncate_preview(body: String) -> String {
	if body.chars().count() <= QuoteErrorContext::BODY_PREVIEW_LIMIT {
		return body;
	}

	let mut buf = String::new();

	for (idx, ch) in body.chars().enumerate() {
		if idx >= QuoteErrorContext::BODY_PREVIEW_LIMIT {
			buf.push('…');

			break;
		}
		buf.push(ch);
	}

	buf
}
