//! Client-credential issuance against the identity endpoint.

// self
use crate::{
	_prelude::*,
	auth::{Credential, CredentialBuilderError},
	error::AuthError,
	http::UpstreamResponse,
	obs::{self, OperationKind, OperationOutcome, OperationSpan},
	provider::strategy,
	token::TokenManager,
};

const GRANT_TYPE: &str = "client_credentials";

#[derive(Debug, Deserialize)]
struct TokenResponse {
	#[serde(default)]
	access_token: Option<String>,
	#[serde(default)]
	expires_in: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
struct TokenErrorBody {
	#[serde(default)]
	error_code: Option<String>,
	#[serde(default)]
	error_description: Option<String>,
	#[serde(default)]
	msg_cd: Option<String>,
	#[serde(default)]
	msg1: Option<String>,
}

impl TokenManager {
	/// Returns a currently valid credential, issuing a new one when the cached credential is
	/// missing or inside the safety margin.
	///
	/// A failed issuance leaves the cached credential untouched.
	pub async fn acquire_token(&self) -> Result<Credential> {
		const KIND: OperationKind = OperationKind::TokenIssue;

		if let Some(current) = self.fresh_credential(OffsetDateTime::now_utc()) {
			return Ok(current);
		}

		let span = OperationSpan::new(KIND, "acquire_token");

		span.instrument(async move {
			let _singleflight = self.issue_guard.lock().await;

			// Another caller may have finished issuing while this one waited.
			if let Some(current) = self.fresh_credential(OffsetDateTime::now_utc()) {
				return Ok(current);
			}

			obs::record_operation_outcome(KIND, OperationOutcome::Attempt);
			self.issuance_metrics.record_attempt();

			match self.issue().await {
				Ok(credential) => {
					self.store.save(credential.clone());
					self.issuance_metrics.record_success();
					obs::record_operation_outcome(KIND, OperationOutcome::Success);

					Ok(credential)
				},
				Err(e) => {
					self.issuance_metrics.record_failure();
					obs::record_operation_outcome(KIND, OperationOutcome::Failure);

					Err(Error::from(e))
				},
			}
		})
		.await
	}

	async fn issue(&self) -> Result<Credential, AuthError> {
		let mut body = BTreeMap::new();

		body.insert("grant_type".to_owned(), GRANT_TYPE.to_owned());
		body.insert("appkey".to_owned(), self.app_key.clone());
		body.insert("appsecret".to_owned(), self.app_secret.expose().to_owned());

		self.strategy.augment_token_request(&mut body);

		let request = self.http_client.post(self.descriptor.endpoints.token.clone()).json(&body);
		let response = self.http_client.execute("token", request).await?;

		if !response.is_success() {
			return Err(rejected(&response));
		}

		let issued_at = OffsetDateTime::now_utc();
		let mut de = serde_json::Deserializer::from_slice(&response.body);
		let payload: TokenResponse = serde_path_to_error::deserialize(&mut de)
			.map_err(|source| AuthError::MalformedResponse { source, status: response.status() })?;
		let access_token = payload
			.access_token
			.filter(|token| !token.trim().is_empty())
			.ok_or(AuthError::MissingAccessToken)?;
		let lifetime = match payload.expires_in {
			Some(secs) if secs <= 0 => return Err(AuthError::NonPositiveExpiresIn),
			Some(secs) => Duration::seconds(secs),
			None => self.policy.default_lifetime,
		};
		let expires_at = issued_at.checked_add(lifetime).ok_or(AuthError::ExpiresInOutOfRange)?;

		Credential::builder()
			.access_token(access_token)
			.issued_at(issued_at)
			.expires_at(expires_at)
			.build()
			.map_err(|e| match e {
				CredentialBuilderError::MissingAccessToken => AuthError::MissingAccessToken,
				CredentialBuilderError::MissingExpiry => AuthError::ExpiresInOutOfRange,
			})
	}
}

fn rejected(response: &UpstreamResponse) -> AuthError {
	let parsed = serde_json::from_slice::<TokenErrorBody>(&response.body).unwrap_or_default();
	let code = parsed.error_code.or(parsed.msg_cd).filter(|code| !code.is_empty());
	let message = parsed
		.error_description
		.or(parsed.msg1)
		.filter(|message| !message.is_empty())
		.unwrap_or_else(|| strategy::truncate_preview(response.body_text()));

	AuthError::Rejected {
		status: response.status(),
		code,
		message,
		retry_after: response.meta.retry_after,
	}
}
