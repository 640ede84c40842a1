//! Proxy-level error types shared across the token manager, quote fetcher, and server.

// self
use crate::_prelude::*;

/// Proxy-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical proxy error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Caller supplied a missing or malformed code list or token.
	#[error(transparent)]
	InvalidInput(#[from] InputError),
	/// Token issuance failed; the cached credential is left intact.
	#[error(transparent)]
	UpstreamAuth(#[from] AuthError),
	/// Quote endpoint reported a failure other than an expired token.
	#[error(transparent)]
	UpstreamQuote(#[from] QuoteError),
	/// Transport failure (DNS, TCP, TLS, timeout) while calling the quote endpoint.
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// Quote endpoint rejected the bearer token as expired or invalid.
	#[error("Upstream rejected the access token for `{code}` ({message_code}): {message}.")]
	TokenExpired {
		/// Security code whose lookup was rejected.
		code: String,
		/// Upstream message code (e.g. `EGW00123`).
		message_code: String,
		/// Upstream human-readable message.
		message: String,
	},
}
impl Error {
	/// Returns `true` when the failure is recoverable by reissuing the access token.
	pub fn is_token_expired(&self) -> bool {
		matches!(self, Self::TokenExpired { .. })
	}
}

/// Configuration and validation failures raised while wiring the proxy.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Required environment variable is not set.
	#[error("Environment variable `{name}` is required.")]
	MissingEnvVar {
		/// Variable name.
		name: &'static str,
	},
	/// Environment variable is present but blank.
	#[error("Environment variable `{name}` cannot be blank.")]
	EmptyValue {
		/// Variable name.
		name: &'static str,
	},
	/// Environment variable could not be parsed.
	#[error("Environment variable `{name}` has an invalid value `{value}`.")]
	InvalidValue {
		/// Variable name.
		name: &'static str,
		/// Raw value that failed to parse.
		value: String,
	},
	/// Upstream base URL or endpoint path cannot be parsed.
	#[error("Upstream URL is invalid.")]
	InvalidUrl {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Upstream descriptor failed validation.
	#[error(transparent)]
	Descriptor(#[from] crate::provider::UpstreamDescriptorError),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Caller input failures, each carrying a short machine-readable reason.
#[derive(Debug, ThisError)]
pub enum InputError {
	/// Single-code request without a code.
	#[error("A security code is required.")]
	MissingCode,
	/// Batch request without any usable code.
	#[error("At least one security code is required.")]
	MissingCodes,
	/// Caller-token batch request without a token.
	#[error("An access token is required.")]
	MissingToken,
	/// Code failed validation.
	#[error("Security code `{code}` is invalid.")]
	InvalidCode {
		/// Raw code as supplied by the caller.
		code: String,
		/// Validation failure.
		#[source]
		source: crate::auth::CodeError,
	},
}
impl InputError {
	/// Returns the machine-readable reason surfaced to HTTP clients.
	pub const fn reason(&self) -> &'static str {
		match self {
			Self::MissingCode => "NO_CODE",
			Self::MissingCodes => "NO_CODES",
			Self::MissingToken => "NO_TOKEN",
			Self::InvalidCode { .. } => "INVALID_CODE",
		}
	}
}

/// Token issuance failures.
#[derive(Debug, ThisError)]
pub enum AuthError {
	/// Identity endpoint could not be reached.
	#[error("Token endpoint could not be reached.")]
	Transport(#[source] TransportError),
	/// Identity endpoint answered with a non-success status.
	#[error("Token endpoint rejected the request with status {status}: {message}.")]
	Rejected {
		/// HTTP status code.
		status: u16,
		/// Upstream error code, when supplied.
		code: Option<String>,
		/// Upstream error description or body preview.
		message: String,
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<Duration>,
	},
	/// Identity endpoint responded with JSON that could not be parsed.
	#[error("Token endpoint returned malformed JSON.")]
	MalformedResponse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code.
		status: u16,
	},
	/// Identity endpoint omitted the access token or returned a blank one.
	#[error("Token endpoint response is missing access_token.")]
	MissingAccessToken,
	/// Identity endpoint returned a non-positive lifetime.
	#[error("The expires_in value must be positive.")]
	NonPositiveExpiresIn,
	/// Identity endpoint returned an excessively large lifetime.
	#[error("The expires_in value exceeds the supported range.")]
	ExpiresInOutOfRange,
}
impl From<TransportError> for AuthError {
	fn from(e: TransportError) -> Self {
		Self::Transport(e)
	}
}

/// Quote endpoint failure with the upstream payload attached for diagnostics.
#[derive(Debug, ThisError)]
#[error("Quote endpoint failed for `{code}`: {message}.")]
pub struct QuoteError {
	/// Security code that was requested.
	pub code: String,
	/// HTTP status code returned by the quote endpoint.
	pub status: Option<u16>,
	/// Upstream message code (`msg_cd`), when supplied.
	pub message_code: Option<String>,
	/// Upstream message (`msg1`) or a local description.
	pub message: String,
	/// Full upstream payload, when it was valid JSON.
	pub payload: Option<JsonValue>,
}

/// Transport-level failures (network, IO, timeouts).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the {endpoint} endpoint.")]
	Network {
		/// Logical endpoint label (`token` or `quote`).
		endpoint: &'static str,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// The request exceeded the configured timeout.
	#[error("Request to the {endpoint} endpoint timed out.")]
	Timeout {
		/// Logical endpoint label (`token` or `quote`).
		endpoint: &'static str,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(
		endpoint: &'static str,
		src: impl 'static + Send + Sync + std::error::Error,
	) -> Self {
		Self::Network { endpoint, source: Box::new(src) }
	}

	/// Classifies a reqwest failure as a timeout or a generic network error.
	pub fn from_reqwest(endpoint: &'static str, e: ReqwestError) -> Self {
		if e.is_timeout() { Self::Timeout { endpoint } } else { Self::network(endpoint, e) }
	}
}
