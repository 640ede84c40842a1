//! Freshness rules applied to the cached credential before it is handed out.

// self
use crate::{_prelude::*, auth::Credential};

/// Decides when the cached credential must be replaced and how long an issued token lives when
/// the identity endpoint omits `expires_in`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TokenPolicy {
	/// Buffer before the real expiry during which the credential is treated as stale.
	pub safety_margin: Duration,
	/// Lifetime assumed when the identity endpoint does not declare one.
	pub default_lifetime: Duration,
}
impl TokenPolicy {
	/// Default safety margin (60 seconds).
	pub const DEFAULT_SAFETY_MARGIN: Duration = Duration::seconds(60);
	/// Default token lifetime (3600 seconds).
	pub const DEFAULT_LIFETIME: Duration = Duration::seconds(3600);

	/// Overrides the safety margin; negative values clamp to zero.
	pub fn with_safety_margin(mut self, margin: Duration) -> Self {
		self.safety_margin = if margin.is_negative() { Duration::ZERO } else { margin };

		self
	}

	/// Overrides the fallback lifetime; non-positive values keep the current setting.
	pub fn with_default_lifetime(mut self, lifetime: Duration) -> Self {
		if lifetime.is_positive() {
			self.default_lifetime = lifetime;
		}

		self
	}

	/// Determines whether the credential must be reissued at `now`.
	pub fn should_reissue(&self, credential: &Credential, now: OffsetDateTime) -> bool {
		if credential.is_expired_at(now) {
			return true;
		}

		credential.remaining_at(now) <= self.safety_margin
	}
}
impl Default for TokenPolicy {
	fn default() -> Self {
		Self {
			safety_margin: Self::DEFAULT_SAFETY_MARGIN,
			default_lifetime: Self::DEFAULT_LIFETIME,
		}
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	fn credential() -> Credential {
		Credential::builder()
			.access_token("cached")
			.issued_at(macros::datetime!(2025-01-01 00:00 UTC))
			.expires_in(Duration::hours(1))
			.build()
			.expect("Credential fixture should build successfully.")
	}

	#[test]
	fn fresh_credential_is_reused() {
		let policy = TokenPolicy::default();

		assert!(!policy.should_reissue(&credential(), macros::datetime!(2025-01-01 00:30 UTC)));
		assert!(!policy.should_reissue(&credential(), macros::datetime!(2025-01-01 00:58:59 UTC)));
	}

	#[test]
	fn credential_inside_margin_is_reissued() {
		let policy = TokenPolicy::default();

		assert!(policy.should_reissue(&credential(), macros::datetime!(2025-01-01 00:59 UTC)));
		assert!(policy.should_reissue(&credential(), macros::datetime!(2025-01-01 00:59:30 UTC)));
		assert!(policy.should_reissue(&credential(), macros::datetime!(2025-01-01 02:00 UTC)));
	}

	#[test]
	fn zero_margin_only_reissues_after_expiry() {
		let policy = TokenPolicy::default().with_safety_margin(Duration::seconds(-5));

		assert_eq!(policy.safety_margin, Duration::ZERO);
		assert!(!policy.should_reissue(&credential(), macros::datetime!(2025-01-01 00:59:59 UTC)));
		assert!(policy.should_reissue(&credential(), macros::datetime!(2025-01-01 01:00 UTC)));
	}

	#[test]
	fn non_positive_default_lifetime_is_ignored() {
		let policy = TokenPolicy::default().with_default_lifetime(Duration::ZERO);

		assert_eq!(policy.default_lifetime, TokenPolicy::DEFAULT_LIFETIME);

		let policy = policy.with_default_lifetime(Duration::minutes(5));

		assert_eq!(policy.default_lifetime, Duration::minutes(5));
	}
}
