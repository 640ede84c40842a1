//! Quote fetcher that calls the quotation endpoint and normalizes its payload.
//!
//! [`QuoteFetcher::fetch_one`] performs a single lookup with a caller-supplied bearer token and
//! classifies failures through the [`UpstreamStrategy`], so expired tokens surface as
//! [`Error::TokenExpired`] while every other upstream failure carries its payload.
//! [`QuoteFetcher::fetch_many`] fans a batch out with bounded concurrency, keeps results in input
//! order, and converts per-code failures into error entries instead of aborting.

pub mod model;
pub mod wire;

pub use model::*;
pub use wire::*;

// crates.io
use futures::stream::{self, StreamExt};
use reqwest::header::AUTHORIZATION;
// self
use crate::{
	_prelude::*,
	auth::{SecurityCode, TokenSecret},
	error::{InputError, QuoteError},
	http::{ReqwestHttpClient, UpstreamResponse},
	obs::{self, OperationKind, OperationOutcome, OperationSpan},
	provider::{QuoteErrorContext, QuoteErrorKind, UpstreamDescriptor, UpstreamStrategy},
};

/// Default number of in-flight upstream calls per batch.
pub const DEFAULT_MAX_CONCURRENCY: usize = 8;

/// Issues quote lookups against the upstream quotation endpoint.
#[derive(Clone)]
pub struct QuoteFetcher {
	/// HTTP client used for quote requests.
	pub http_client: ReqwestHttpClient,
	/// Upstream descriptor that defines the quotation endpoint and selectors.
	pub descriptor: UpstreamDescriptor,
	/// Strategy that classifies failed responses.
	pub strategy: Arc<dyn UpstreamStrategy>,
	/// Application key sent with every quote request.
	pub app_key: String,
	/// Application secret sent with every quote request (when the upstream expects it).
	pub app_secret: TokenSecret,
	/// Upper bound on concurrent upstream calls within one batch.
	pub max_concurrency: usize,
}
impl QuoteFetcher {
	/// Creates a fetcher with [`DEFAULT_MAX_CONCURRENCY`].
	pub fn new(
		descriptor: UpstreamDescriptor,
		strategy: Arc<dyn UpstreamStrategy>,
		app_key: impl Into<String>,
		app_secret: impl Into<String>,
		http_client: ReqwestHttpClient,
	) -> Self {
		Self {
			http_client,
			descriptor,
			strategy,
			app_key: app_key.into(),
			app_secret: TokenSecret::new(app_secret),
			max_concurrency: DEFAULT_MAX_CONCURRENCY,
		}
	}

	/// Overrides the batch concurrency bound; zero is treated as one.
	pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
		self.max_concurrency = max_concurrency.max(1);

		self
	}

	/// Looks up a single code with `token`.
	pub async fn fetch_one(&self, code: &str, token: &str) -> Result<QuoteSnapshot> {
		const KIND: OperationKind = OperationKind::QuoteFetch;

		let code = SecurityCode::new(code.trim())
			.map_err(|source| InputError::InvalidCode { code: code.to_owned(), source })?;
		let span = OperationSpan::new(KIND, "fetch_one");

		obs::record_operation_outcome(KIND, OperationOutcome::Attempt);

		let result = span.instrument(self.request(code, token)).await;

		match &result {
			Ok(_) => obs::record_operation_outcome(KIND, OperationOutcome::Success),
			Err(_) => obs::record_operation_outcome(KIND, OperationOutcome::Failure),
		}

		result
	}

	/// Looks up every code concurrently and returns one outcome per code, in input order.
	pub async fn fetch_all(&self, codes: &[String], token: &str) -> Vec<Result<QuoteSnapshot>> {
		stream::iter(codes.iter().cloned())
			.map(|code| async move { self.fetch_one(&code, token).await })
			.buffered(self.max_concurrency.max(1))
			.collect()
			.await
	}

	/// Looks up a normalized code list and shapes the outcomes into a batch.
	///
	/// Per-code failures become error entries; only an empty list fails the whole call.
	pub async fn fetch_many(
		&self,
		codes: &[String],
		token: &str,
		include_raw: bool,
	) -> Result<QuoteBatch> {
		const KIND: OperationKind = OperationKind::QuoteBatch;

		if codes.is_empty() {
			return Err(InputError::MissingCodes.into());
		}

		let span = OperationSpan::new(KIND, "fetch_many");

		obs::record_operation_outcome(KIND, OperationOutcome::Attempt);

		let outcomes = span.instrument(self.fetch_all(codes, token)).await;
		let batch = codes
			.iter()
			.cloned()
			.zip(outcomes)
			.map(|(code, outcome)| QuoteResult::from_outcome(code, outcome, include_raw))
			.collect();

		obs::record_operation_outcome(KIND, OperationOutcome::Success);

		Ok(batch)
	}

	async fn request(&self, code: SecurityCode, token: &str) -> Result<QuoteSnapshot> {
		let descriptor = &self.descriptor;
		let mut request = self
			.http_client
			.get(descriptor.endpoints.quote.clone())
			.query(&[
				("FID_COND_MRKT_DIV_CODE", descriptor.market_div_code.as_str()),
				("FID_INPUT_ISCD", &*code),
			])
			.header(AUTHORIZATION, format!("Bearer {token}"))
			.header("appkey", self.app_key.as_str())
			.header("tr_id", descriptor.price_tr_id.as_str())
			.header("custtype", descriptor.quirks.customer_type.as_str());

		if descriptor.quirks.send_app_secret {
			request = request.header("appsecret", self.app_secret.expose());
		}

		let response = self.http_client.execute("quote", request).await?;
		let Ok(payload) = serde_json::from_slice::<JsonValue>(&response.body) else {
			return Err(self.non_json_failure(code, &response));
		};
		let envelope = QuoteEnvelope::from_payload(&payload);

		if response.is_success() && envelope.is_success() {
			let shape = QuoteShape::detect(&payload);
			let (name, price) = (shape.name(), shape.price());

			return Ok(QuoteSnapshot { code, name, price, payload });
		}

		let mut ctx = QuoteErrorContext::default().with_http_status(response.status());

		if let Some(result_code) = envelope.result_code {
			ctx = ctx.with_result_code(result_code);
		}
		if let Some(message_code) = envelope.message_code {
			ctx = ctx.with_message_code(message_code);
		}
		if let Some(message) = envelope.message {
			ctx = ctx.with_message(message);
		}

		Err(self.classify(code, ctx, Some(payload)))
	}

	fn non_json_failure(&self, code: SecurityCode, response: &UpstreamResponse) -> Error {
		if response.is_success() {
			return QuoteError {
				code: code.into(),
				status: Some(response.status()),
				message_code: None,
				message: "Quote endpoint returned malformed JSON".into(),
				payload: None,
			}
			.into();
		}

		let ctx = QuoteErrorContext::default()
			.with_http_status(response.status())
			.with_body_preview(response.body_text());

		self.classify(code, ctx, None)
	}

	fn classify(
		&self,
		code: SecurityCode,
		ctx: QuoteErrorContext,
		payload: Option<JsonValue>,
	) -> Error {
		let kind = self.strategy.classify_quote_error(&ctx);
		let status = ctx.http_status.unwrap_or_default();

		match kind {
			QuoteErrorKind::TokenExpired => Error::TokenExpired {
				code: code.into(),
				message_code: ctx.message_code.unwrap_or_else(|| format!("HTTP {status}")),
				message: ctx.message.or(ctx.body_preview).unwrap_or_default(),
			},
			QuoteErrorKind::Rejected => QuoteError {
				code: code.into(),
				status: ctx.http_status,
				message_code: ctx.message_code,
				message: ctx
					.message
					.or(ctx.body_preview)
					.unwrap_or_else(|| format!("Quote endpoint returned status {status}")),
				payload,
			}
			.into(),
		}
	}
}
impl Debug for QuoteFetcher {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("QuoteFetcher")
			.field("descriptor", &self.descriptor)
			.field("app_key", &self.app_key)
			.field("app_secret", &self.app_secret)
			.field("max_concurrency", &self.max_concurrency)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::_preludet::*;

	#[tokio::test]
	async fn invalid_code_fails_before_any_network_call() {
		let fetcher = build_test_fetcher("http://127.0.0.1:9");
		let err = fetcher
			.fetch_one("00 59", "token")
			.await
			.expect_err("Codes with spaces must be rejected.");

		assert!(matches!(err, Error::InvalidInput(InputError::InvalidCode { .. })));
	}

	#[tokio::test]
	async fn empty_batch_is_rejected() {
		let fetcher = build_test_fetcher("http://127.0.0.1:9");
		let err = fetcher
			.fetch_many(&[], "token", false)
			.await
			.expect_err("An empty batch must be rejected.");

		assert!(matches!(err, Error::InvalidInput(InputError::MissingCodes)));
	}

	#[test]
	fn concurrency_bound_is_at_least_one() {
		let fetcher = build_test_fetcher("http://127.0.0.1:9").with_max_concurrency(0);

		assert_eq!(fetcher.max_concurrency, 1);
		assert!(!format!("{fetcher:?}").contains(TEST_APP_SECRET));
	}

	#[test]
	fn expired_token_classification_falls_back_to_status() {
		let fetcher = build_test_fetcher("http://127.0.0.1:9");
		let code = SecurityCode::new("005930").expect("Fixture code should be valid.");
		let err = fetcher.classify(code, QuoteErrorContext::default().with_http_status(401), None);

		match err {
			Error::TokenExpired { code, message_code, .. } => {
				assert_eq!(code, "005930");
				assert_eq!(message_code, "HTTP 401");
			},
			other => panic!("Unexpected error: {other:?}."),
		}
	}
}
