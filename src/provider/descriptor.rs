//! Upstream descriptor data structures shared by the token manager and the quote fetcher.
//!
//! The module exposes validated endpoint metadata, supporting builder utilities, and
//! upstream quirk toggles so both halves of the proxy agree on where and how to call.

/// Builder API for assembling upstream descriptors.
pub mod builder;
/// Upstream-specific quirk toggles.
pub mod quirks;

pub use builder::*;
pub use quirks::*;

// self
use crate::_prelude::*;

/// Production base URL of the KIS open API.
pub const DEFAULT_BASE_URL: &str = "https://openapi.koreainvestment.com:9443";
/// Identity endpoint path issuing client-credential access tokens.
pub const DEFAULT_TOKEN_PATH: &str = "/oauth2/tokenP";
/// Current-price quotation endpoint path.
pub const DEFAULT_QUOTE_PATH: &str = "/uapi/domestic-stock/v1/quotations/inquire-price";
/// Market division selector for listed stocks.
pub const DEFAULT_MARKET_DIV_CODE: &str = "J";
/// Transaction id of the current-price inquiry.
pub const DEFAULT_PRICE_TR_ID: &str = "FHKST01010100";

/// Endpoint set declared by an upstream descriptor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpstreamEndpoints {
	/// Identity endpoint used for token issuance.
	pub token: Url,
	/// Quotation endpoint used for price lookups.
	pub quote: Url,
}

/// Immutable upstream descriptor consumed by the token manager and the quote fetcher.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpstreamDescriptor {
	/// Endpoint definitions exposed by the upstream.
	pub endpoints: UpstreamEndpoints,
	/// `FID_COND_MRKT_DIV_CODE` value sent with every quote request.
	pub market_div_code: String,
	/// `tr_id` header value sent with every quote request.
	pub price_tr_id: String,
	/// Upstream-specific quirks.
	pub quirks: UpstreamQuirks,
}
impl UpstreamDescriptor {
	/// Creates a new builder rooted at the provided base URL.
	pub fn builder(base: Url) -> UpstreamDescriptorBuilder {
		UpstreamDescriptorBuilder::new(base)
	}
}
