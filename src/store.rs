//! Credential slot contract and the built-in in-memory implementation.
//!
//! A store holds at most one [`Credential`]. Replacement is a whole-value swap, so readers
//! observe either the previous credential or the new one and never a partial write. Nothing is
//! persisted; a restarted process always starts with an empty slot.

pub mod memory;

pub use memory::MemoryStore;

// self
use crate::auth::Credential;

/// Single-slot storage backend owned by a [`TokenManager`](crate::token::TokenManager).
pub trait CredentialStore
where
	Self: Send + Sync,
{
	/// Returns a clone of the live credential, if any.
	fn load(&self) -> Option<Credential>;

	/// Replaces the live credential.
	fn save(&self, credential: Credential);

	/// Clears the slot only if it still holds `expected_token`.
	fn clear_if_holds(&self, expected_token: &str) -> ClearOutcome;
}

/// Result of a compare-and-clear attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClearOutcome {
	/// The slot held the expected token and is now empty.
	Cleared,
	/// The slot holds a different token (another caller already reissued).
	Mismatch,
	/// The slot was already empty.
	Empty,
}
