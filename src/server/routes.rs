//! Route handlers.

// crates.io
use axum::{
	Json,
	extract::{
		Query, State,
		rejection::{JsonRejection, QueryRejection},
	},
};
// self
use crate::{_prelude::*, quote::QuoteBatch, server::AppState, server::error::ApiError};

#[derive(Debug, Deserialize)]
pub(crate) struct PriceQuery {
	code: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PricesQuery {
	codes: Option<String>,
	raw: Option<String>,
}

/// Code list accepted in JSON bodies, either comma-delimited or as an array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum CodeList {
	Csv(String),
	List(Vec<String>),
}
impl CodeList {
	fn joined(self) -> String {
		match self {
			Self::Csv(raw) => raw,
			Self::List(codes) => codes.join(","),
		}
	}
}

#[derive(Debug, Deserialize)]
pub(crate) struct PriceBody {
	codes: Option<CodeList>,
	token: Option<String>,
	#[serde(default)]
	raw: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct Health {
	status: &'static str,
	token_cached: bool,
}

/// `GET /price?code=`: raw upstream payload for one code.
pub(crate) async fn price(
	State(state): State<Arc<AppState>>,
	query: Result<Query<PriceQuery>, QueryRejection>,
) -> Result<Json<JsonValue>, ApiError> {
	let Query(query) = query?;
	let snapshot = state.service.price(query.code.as_deref().unwrap_or_default()).await?;

	Ok(Json(snapshot.payload))
}

/// `GET /prices?codes=&raw=`: normalized batch with the managed token.
pub(crate) async fn prices(
	State(state): State<Arc<AppState>>,
	query: Result<Query<PricesQuery>, QueryRejection>,
) -> Result<Json<QuoteBatch>, ApiError> {
	let Query(query) = query?;
	let include_raw = query.raw.as_deref().is_some_and(is_truthy);
	let batch =
		state.service.prices(query.codes.as_deref().unwrap_or_default(), include_raw).await?;

	Ok(Json(batch))
}

/// `POST /price`: normalized batch with a caller-supplied token.
pub(crate) async fn prices_with_token(
	State(state): State<Arc<AppState>>,
	body: Result<Json<PriceBody>, JsonRejection>,
) -> Result<Json<QuoteBatch>, ApiError> {
	let Json(body) = body?;
	let codes = body.codes.map(CodeList::joined).unwrap_or_default();
	let batch = state
		.service
		.prices_with_token(&codes, body.token.as_deref().unwrap_or_default(), body.raw)
		.await?;

	Ok(Json(batch))
}

/// `GET /health`: liveness plus whether a token is cached.
pub(crate) async fn health(State(state): State<Arc<AppState>>) -> Json<Health> {
	Json(Health { status: "ok", token_cached: state.service.tokens().has_credential() })
}

fn is_truthy(value: &str) -> bool {
	matches!(value.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes")
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn raw_flag_accepts_common_truthy_values() {
		assert!(is_truthy("true"));
		assert!(is_truthy(" TRUE "));
		assert!(is_truthy("1"));
		assert!(!is_truthy("false"));
		assert!(!is_truthy(""));
	}

	#[test]
	fn code_lists_accept_strings_and_arrays() {
		let csv: PriceBody = serde_json::from_str(r#"{"codes":"005930,000660","token":"t"}"#)
			.expect("CSV body should parse.");
		let list: PriceBody = serde_json::from_str(r#"{"codes":["005930","000660"],"raw":true}"#)
			.expect("Array body should parse.");

		assert_eq!(csv.codes.map(CodeList::joined).as_deref(), Some("005930,000660"));
		assert_eq!(list.codes.map(CodeList::joined).as_deref(), Some("005930,000660"));
		assert!(list.raw);
		assert_eq!(list.token, None);
	}
}
