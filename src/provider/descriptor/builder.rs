// self
use crate::{
	_prelude::*,
	provider::{
		DEFAULT_MARKET_DIV_CODE, DEFAULT_PRICE_TR_ID, DEFAULT_QUOTE_PATH, DEFAULT_TOKEN_PATH,
		UpstreamDescriptor, UpstreamEndpoints, UpstreamQuirks,
	},
};

/// Errors raised while constructing or validating descriptors.
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum UpstreamDescriptorError {
	/// Endpoints must use HTTP(S).
	#[error("The {endpoint} endpoint must use http or https: {url}.")]
	UnsupportedScheme {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// Endpoint path could not be joined onto the base URL.
	#[error("The {endpoint} endpoint path `{path}` cannot be joined onto the base URL.")]
	InvalidPath {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Path that failed to join.
		path: String,
	},
	/// Request selectors must not be blank.
	#[error("The {field} selector cannot be blank.")]
	BlankSelector {
		/// Which selector was blank.
		field: &'static str,
	},
}

/// Builder for [`UpstreamDescriptor`] values.
#[derive(Debug)]
pub struct UpstreamDescriptorBuilder {
	/// Base URL every endpoint path is joined onto.
	pub base: Url,
	/// Identity endpoint path.
	pub token_path: String,
	/// Quotation endpoint path.
	pub quote_path: String,
	/// Market division selector.
	pub market_div_code: String,
	/// Price inquiry transaction id.
	pub price_tr_id: String,
	/// Upstream-specific quirks.
	pub quirks: UpstreamQuirks,
}
impl UpstreamDescriptorBuilder {
	/// Creates a new builder seeded with the production paths and selectors.
	pub fn new(base: Url) -> Self {
		Self {
			base,
			token_path: DEFAULT_TOKEN_PATH.into(),
			quote_path: DEFAULT_QUOTE_PATH.into(),
			market_div_code: DEFAULT_MARKET_DIV_CODE.into(),
			price_tr_id: DEFAULT_PRICE_TR_ID.into(),
			quirks: UpstreamQuirks::default(),
		}
	}

	/// Overrides the identity endpoint path.
	pub fn token_path(mut self, path: impl Into<String>) -> Self {
		self.token_path = path.into();

		self
	}

	/// Overrides the quotation endpoint path.
	pub fn quote_path(mut self, path: impl Into<String>) -> Self {
		self.quote_path = path.into();

		self
	}

	/// Overrides the market division selector.
	pub fn market_div_code(mut self, code: impl Into<String>) -> Self {
		self.market_div_code = code.into();

		self
	}

	/// Overrides the price inquiry transaction id.
	pub fn price_tr_id(mut self, tr_id: impl Into<String>) -> Self {
		self.price_tr_id = tr_id.into();

		self
	}

	/// Overrides the upstream quirks.
	pub fn quirks(mut self, quirks: UpstreamQuirks) -> Self {
		self.quirks = quirks;

		self
	}

	/// Consumes the builder and validates the resulting descriptor.
	pub fn build(self) -> Result<UpstreamDescriptor, UpstreamDescriptorError> {
		let token = join_endpoint("token", &self.base, &self.token_path)?;
		let quote = join_endpoint("quote", &self.base, &self.quote_path)?;
		let descriptor = UpstreamDescriptor {
			endpoints: UpstreamEndpoints { token, quote },
			market_div_code: self.market_div_code,
			price_tr_id: self.price_tr_id,
			quirks: self.quirks,
		};

		descriptor.validate()?;

		Ok(descriptor)
	}
}

impl UpstreamDescriptor {
	/// Validates invariants for the descriptor.
	fn validate(&self) -> Result<(), UpstreamDescriptorError> {
		validate_endpoint("token", &self.endpoints.token)?;
		validate_endpoint("quote", &self.endpoints.quote)?;
		validate_selector("market_div_code", &self.market_div_code)?;
		validate_selector("price_tr_id", &self.price_tr_id)?;
		validate_selector("customer_type", &self.quirks.customer_type)?;

		Ok(())
	}
}

fn join_endpoint(
	name: &'static str,
	base: &Url,
	path: &str,
) -> Result<Url, UpstreamDescriptorError> {
	base.join(path)
		.map_err(|_| UpstreamDescriptorError::InvalidPath { endpoint: name, path: path.into() })
}

fn validate_endpoint(name: &'static str, url: &Url) -> Result<(), UpstreamDescriptorError> {
	match url.scheme() {
		"https" | "http" => Ok(()),
		_ => Err(UpstreamDescriptorError::UnsupportedScheme { endpoint: name, url: url.to_string() }),
	}
}

fn validate_selector(field: &'static str, value: &str) -> Result<(), UpstreamDescriptorError> {
	if value.trim().is_empty() {
		Err(UpstreamDescriptorError::BlankSelector { field })
	} else {
		Ok(())
	}
}
