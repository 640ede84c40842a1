//! Token manager that owns the cached credential and issues replacements on demand.
//!
//! The manager holds the HTTP client, credential store, upstream descriptor, and strategy so the
//! issuance path can focus on the identity request itself. Callers only ever ask for "a currently
//! valid token"; the manager decides whether the cached credential is still fresh (see
//! [`TokenPolicy`]) and, if not, issues a new one behind a single-flight guard so concurrent
//! callers piggy-back on one identity call instead of stampeding the endpoint.

pub mod policy;

mod issue;
mod metrics;

pub use metrics::*;
pub use policy::*;

// self
use crate::{
	_prelude::*,
	auth::{Credential, TokenSecret},
	http::ReqwestHttpClient,
	provider::{UpstreamDescriptor, UpstreamStrategy},
	store::{ClearOutcome, CredentialStore},
};

/// Owns the single credential slot for one set of application credentials.
#[derive(Clone)]
pub struct TokenManager {
	/// HTTP client used for identity requests.
	pub http_client: ReqwestHttpClient,
	/// Credential slot; holds at most one live credential.
	pub store: Arc<dyn CredentialStore>,
	/// Upstream descriptor that defines the identity endpoint.
	pub descriptor: UpstreamDescriptor,
	/// Strategy allowed to decorate the identity request body.
	pub strategy: Arc<dyn UpstreamStrategy>,
	/// Application key sent with every identity request.
	pub app_key: String,
	/// Application secret sent with every identity request.
	pub app_secret: TokenSecret,
	/// Freshness rules for the cached credential.
	pub policy: TokenPolicy,
	/// Shared counters for issuance outcomes.
	pub issuance_metrics: Arc<IssuanceMetrics>,
	issue_guard: Arc<AsyncMutex<()>>,
}
impl TokenManager {
	/// Creates a manager with the default [`TokenPolicy`].
	pub fn new(
		store: Arc<dyn CredentialStore>,
		descriptor: UpstreamDescriptor,
		strategy: Arc<dyn UpstreamStrategy>,
		app_key: impl Into<String>,
		app_secret: impl Into<String>,
		http_client: ReqwestHttpClient,
	) -> Self {
		Self {
			http_client,
			store,
			descriptor,
			strategy,
			app_key: app_key.into(),
			app_secret: TokenSecret::new(app_secret),
			policy: TokenPolicy::default(),
			issuance_metrics: Default::default(),
			issue_guard: Default::default(),
		}
	}

	/// Replaces the freshness policy.
	pub fn with_policy(mut self, policy: TokenPolicy) -> Self {
		self.policy = policy;

		self
	}

	/// Returns the cached credential if it is still fresh at `now`.
	pub fn fresh_credential(&self, now: OffsetDateTime) -> Option<Credential> {
		self.store.load().filter(|credential| !self.policy.should_reissue(credential, now))
	}

	/// Returns `true` when a credential is cached, fresh or not.
	pub fn has_credential(&self) -> bool {
		self.store.load().is_some()
	}

	/// Drops the cached credential if it still carries `stale_token`.
	///
	/// A credential reissued by a concurrent caller is never discarded.
	pub fn invalidate(&self, stale_token: &str) -> ClearOutcome {
		self.store.clear_if_holds(stale_token)
	}
}
impl Debug for TokenManager {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenManager")
			.field("descriptor", &self.descriptor)
			.field("app_key", &self.app_key)
			.field("app_secret", &self.app_secret)
			.field("policy", &self.policy)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::_preludet::*;

	#[test]
	fn debug_redacts_app_secret() {
		let (manager, _) = build_test_token_manager("http://127.0.0.1:9");
		let rendered = format!("{manager:?}");

		assert!(rendered.contains(TEST_APP_KEY));
		assert!(!rendered.contains(TEST_APP_SECRET));
	}

	#[test]
	fn invalidate_only_clears_matching_token() {
		let (manager, store) = build_test_token_manager("http://127.0.0.1:9");

		assert_eq!(manager.invalidate("anything"), ClearOutcome::Empty);

		store.save(
			Credential::builder()
				.access_token("current")
				.expires_in(Duration::hours(1))
				.build()
				.expect("Credential fixture should build successfully."),
		);

		assert_eq!(manager.invalidate("stale"), ClearOutcome::Mismatch);
		assert!(manager.has_credential());
		assert!(manager.fresh_credential(OffsetDateTime::now_utc()).is_some());
		assert_eq!(manager.invalidate("current"), ClearOutcome::Cleared);
		assert!(!manager.has_credential());
	}
}
