//! Thread-safe in-memory [`CredentialStore`] implementation.

// self
use crate::{
	_prelude::*,
	auth::Credential,
	store::{ClearOutcome, CredentialStore},
};

/// Process-local credential slot.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(Arc<RwLock<Option<Credential>>>);
impl MemoryStore {
	/// Creates a store pre-seeded with `credential`.
	pub fn with_credential(credential: Credential) -> Self {
		Self(Arc::new(RwLock::new(Some(credential))))
	}
}
impl CredentialStore for MemoryStore {
	fn load(&self) -> Option<Credential> {
		self.0.read().clone()
	}

	fn save(&self, credential: Credential) {
		*self.0.write() = Some(credential);
	}

	fn clear_if_holds(&self, expected_token: &str) -> ClearOutcome {
		let mut guard = self.0.write();

		let outcome = match guard.as_ref() {
			Some(current) if current.holds(expected_token) => ClearOutcome::Cleared,
			Some(_) => ClearOutcome::Mismatch,
			None => ClearOutcome::Empty,
		};

		if matches!(outcome, ClearOutcome::Cleared) {
			*guard = None;
		}

		outcome
	}
}
