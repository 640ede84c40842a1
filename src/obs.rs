//! Optional observability helpers for proxy operations.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `kis_quote_proxy.operation` with the
//!   `operation` and `stage` (call site) fields, plus a `warn` event per token retry cycle.
//! - Enable `metrics` to increment the `kis_quote_proxy_operation_total` counter for every
//!   attempt/success/failure, labeled by `operation` + `outcome`, and the
//!   `kis_quote_proxy_token_retry_total` counter per retry cycle.

mod metrics;
mod tracing;

pub use self::{metrics::*, tracing::*};

// self
use crate::_prelude::*;

/// Operation kinds observed by the proxy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationKind {
	/// Token issuance against the identity endpoint.
	TokenIssue,
	/// Single quote lookup.
	QuoteFetch,
	/// Batch quote lookup.
	QuoteBatch,
}
impl OperationKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OperationKind::TokenIssue => "token_issue",
			OperationKind::QuoteFetch => "quote_fetch",
			OperationKind::QuoteBatch => "quote_batch",
		}
	}
}
impl Display for OperationKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationOutcome {
	/// Entry to an operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl OperationOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OperationOutcome::Attempt => "attempt",
			OperationOutcome::Success => "success",
			OperationOutcome::Failure => "failure",
		}
	}
}
impl Display for OperationOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Records the start of a token retry cycle through every enabled backend.
pub fn record_token_retry(kind: OperationKind, stale_codes: usize) {
	self::metrics::record_token_retry(kind);
	self::tracing::trace_token_retry(kind, stale_codes);
}
