//! API error type that maps proxy errors to JSON bodies and HTTP status codes.

// crates.io
use axum::{
	Json,
	extract::rejection::{JsonRejection, QueryRejection},
	http::StatusCode,
	response::{IntoResponse, Response},
};
use serde_json::json;
// self
use crate::_prelude::*;

/// Request failure returned by route handlers.
#[derive(Debug)]
pub enum ApiError {
	/// Proxy operation failed.
	Proxy(Error),
	/// Request body was not valid JSON for the route.
	Body(JsonRejection),
	/// Query string could not be deserialized for the route.
	Query(QueryRejection),
}
impl ApiError {
	/// Returns `(status, error_code)` for the wrapped error.
	fn classify(&self) -> (StatusCode, &'static str) {
		match self {
			Self::Proxy(Error::InvalidInput(e)) => (StatusCode::BAD_REQUEST, e.reason()),
			Self::Proxy(Error::UpstreamAuth(_)) =>
				(StatusCode::INTERNAL_SERVER_ERROR, "TOKEN_API_ERROR"),
			Self::Proxy(
				Error::UpstreamQuote(_) | Error::TokenExpired { .. } | Error::Transport(_),
			) => (StatusCode::INTERNAL_SERVER_ERROR, "PRICE_API_ERROR"),
			Self::Proxy(Error::Config(_)) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
			Self::Body(_) => (StatusCode::BAD_REQUEST, "INVALID_BODY"),
			Self::Query(_) => (StatusCode::BAD_REQUEST, "INVALID_QUERY"),
		}
	}

	fn detail(&self) -> String {
		match self {
			Self::Proxy(e) => match StdError::source(e) {
				Some(source) if matches!(e, Error::UpstreamAuth(_)) => format!("{e} {source}"),
				_ => e.to_string(),
			},
			Self::Body(rejection) => rejection.body_text(),
			Self::Query(rejection) => rejection.body_text(),
		}
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let (status, code) = self.classify();
		let mut body = json!({ "error": code, "detail": self.detail() });

		if let Self::Proxy(Error::UpstreamQuote(quote)) = &self
			&& let Some(payload) = &quote.payload
		{
			body["upstream"] = payload.clone();
		}

		(status, Json(body)).into_response()
	}
}
impl From<Error> for ApiError {
	fn from(e: Error) -> Self {
		Self::Proxy(e)
	}
}
impl From<JsonRejection> for ApiError {
	fn from(rejection: JsonRejection) -> Self {
		Self::Body(rejection)
	}
}
impl From<QueryRejection> for ApiError {
	fn from(rejection: QueryRejection) -> Self {
		Self::Query(rejection)
	}
}
