//! Quote service that pairs the token manager with the quote fetcher.
//!
//! Every inbound request gets at most one recovery cycle: when the upstream rejects the cached
//! token, the service drops exactly that token, acquires a fresh one, and repeats only the
//! lookups that failed because of it. A second rejection is returned as-is.

// self
use crate::{
	_prelude::*,
	auth::{Credential, SecurityCode, split_code_list},
	error::InputError,
	obs::{self, OperationKind, OperationOutcome, OperationSpan},
	quote::{QuoteBatch, QuoteFetcher, QuoteResult, QuoteSnapshot},
	token::TokenManager,
};

/// Entry point used by the HTTP layer.
#[derive(Clone, Debug)]
pub struct QuoteService {
	tokens: TokenManager,
	fetcher: QuoteFetcher,
}
impl QuoteService {
	/// Composes a token manager and a quote fetcher.
	pub fn new(tokens: TokenManager, fetcher: QuoteFetcher) -> Self {
		Self { tokens, fetcher }
	}

	/// Token manager backing this service.
	pub fn tokens(&self) -> &TokenManager {
		&self.tokens
	}

	/// Quote fetcher backing this service.
	pub fn fetcher(&self) -> &QuoteFetcher {
		&self.fetcher
	}

	/// Looks up a single code with the managed token.
	pub async fn price(&self, code: &str) -> Result<QuoteSnapshot> {
		let code = code.trim();

		if code.is_empty() {
			return Err(InputError::MissingCode.into());
		}

		SecurityCode::new(code)
			.map_err(|source| InputError::InvalidCode { code: code.to_owned(), source })?;

		let credential = self.tokens.acquire_token().await?;

		match self.fetcher.fetch_one(code, credential.access_token.expose()).await {
			Err(e) if e.is_token_expired() => {
				obs::record_token_retry(OperationKind::QuoteFetch, 1);

				let fresh = self.reacquire(&credential).await?;

				self.fetcher.fetch_one(code, fresh.access_token.expose()).await
			},
			outcome => outcome,
		}
	}

	/// Looks up a comma-delimited code list with one shared managed token.
	///
	/// Lookups rejected for an expired token are retried once with a fresh token; other
	/// per-code failures stay in the batch as error entries.
	pub async fn prices(&self, raw_codes: &str, include_raw: bool) -> Result<QuoteBatch> {
		const KIND: OperationKind = OperationKind::QuoteBatch;

		let codes = split_code_list(raw_codes);

		if codes.is_empty() {
			return Err(InputError::MissingCodes.into());
		}

		let span = OperationSpan::new(KIND, "prices");

		obs::record_operation_outcome(KIND, OperationOutcome::Attempt);

		let result = span
			.instrument(async {
				let credential = self.tokens.acquire_token().await?;
				let mut outcomes =
					self.fetcher.fetch_all(&codes, credential.access_token.expose()).await;
				let stale = outcomes
					.iter()
					.enumerate()
					.filter(|(_, outcome)| outcome.as_ref().is_err_and(Error::is_token_expired))
					.map(|(idx, _)| idx)
					.collect::<Vec<_>>();

				if !stale.is_empty() {
					obs::record_token_retry(KIND, stale.len());

					let fresh = self.reacquire(&credential).await?;
					let retry_codes = stale.iter().map(|&idx| codes[idx].clone()).collect::<Vec<_>>();
					let retried =
						self.fetcher.fetch_all(&retry_codes, fresh.access_token.expose()).await;

					for (idx, outcome) in stale.into_iter().zip(retried) {
						outcomes[idx] = outcome;
					}
				}

				Ok::<_, Error>(
					codes
						.iter()
						.cloned()
						.zip(outcomes)
						.map(|(code, outcome)| QuoteResult::from_outcome(code, outcome, include_raw))
						.collect::<QuoteBatch>(),
				)
			})
			.await;

		match &result {
			Ok(_) => obs::record_operation_outcome(KIND, OperationOutcome::Success),
			Err(_) => obs::record_operation_outcome(KIND, OperationOutcome::Failure),
		}

		result
	}

	/// Looks up a comma-delimited code list with a caller-supplied token.
	///
	/// The proxy cannot reissue a token it does not own, so expired-token failures are reported
	/// per code without a retry.
	pub async fn prices_with_token(
		&self,
		raw_codes: &str,
		token: &str,
		include_raw: bool,
	) -> Result<QuoteBatch> {
		let codes = split_code_list(raw_codes);

		if codes.is_empty() {
			return Err(InputError::MissingCodes.into());
		}

		let token = token.trim();

		if token.is_empty() {
			return Err(InputError::MissingToken.into());
		}

		self.fetcher.fetch_many(&codes, token, include_raw).await
	}

	async fn reacquire(&self, stale: &Credential) -> Result<Credential> {
		self.tokens.invalidate(stale.access_token.expose());

		self.tokens.acquire_token().await
	}
}
