//! Normalized quote values returned to proxy clients.

// crates.io
use rust_decimal::{Decimal, prelude::ToPrimitive};
use serde::Serializer;
// self
use crate::{_prelude::*, auth::SecurityCode, quote::QuoteShape};

/// Error reported for a batch entry whose payload has no recognizable output container.
pub const UNRECOGNIZED_SHAPE: &str = "Unrecognized quote payload shape.";

/// Exact decimal price parsed from the upstream payload.
///
/// Serialized as a JSON number: integral values become integers (`70000`), anything else a float.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price(Decimal);
impl Price {
	/// Wraps an already parsed decimal.
	pub const fn new(value: Decimal) -> Self {
		Self(value)
	}

	/// Returns the underlying decimal.
	pub const fn value(self) -> Decimal {
		self.0
	}

	/// Reads a price from a JSON string or number; anything else yields `None`.
	pub fn from_json(value: &JsonValue) -> Option<Self> {
		match value {
			JsonValue::String(raw) => raw.parse().ok(),
			JsonValue::Number(number) => number.to_string().parse().ok(),
			_ => None,
		}
	}
}
impl FromStr for Price {
	type Err = rust_decimal::Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let trimmed = s.trim();

		Decimal::from_str(trimmed)
			.or_else(|_| Decimal::from_scientific(trimmed))
			.map(|value| Self(value.normalize()))
	}
}
impl Display for Price {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		Display::fmt(&self.0, f)
	}
}
impl Serialize for Price {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		if self.0.fract().is_zero()
			&& let Some(whole) = self.0.to_i64()
		{
			return serializer.serialize_i64(whole);
		}

		match self.0.to_f64() {
			Some(float) => serializer.serialize_f64(float),
			None => serializer.serialize_str(&self.0.to_string()),
		}
	}
}

/// Successful single-code lookup.
#[derive(Clone, Debug, PartialEq)]
pub struct QuoteSnapshot {
	/// Code that was looked up.
	pub code: SecurityCode,
	/// Display name, when the upstream supplied one.
	pub name: Option<String>,
	/// Current price, when present and numeric.
	pub price: Option<Price>,
	/// Full upstream payload.
	pub payload: JsonValue,
}

/// Per-code lookup outcome inside a batch response.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct QuoteResult {
	/// Code as supplied by the caller.
	pub code: String,
	/// Display name.
	pub name: Option<String>,
	/// Current price.
	pub price: Option<Price>,
	/// Full upstream payload, included on request.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub raw_response: Option<JsonValue>,
	/// Failure description; name and price are null whenever this is set.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
}
impl QuoteResult {
	/// Builds a result from a successful lookup.
	///
	/// A payload without an output container carries no quote at all, so it becomes an error
	/// entry rather than a silent pair of nulls.
	pub fn from_snapshot(snapshot: QuoteSnapshot, include_raw: bool) -> Self {
		let error = matches!(QuoteShape::detect(&snapshot.payload), QuoteShape::Unknown)
			.then(|| UNRECOGNIZED_SHAPE.to_owned());

		Self {
			code: snapshot.code.into(),
			name: snapshot.name,
			price: snapshot.price,
			raw_response: include_raw.then_some(snapshot.payload),
			error,
		}
	}

	/// Builds a result that carries only the code and a failure description.
	pub fn from_error(code: impl Into<String>, error: &Error) -> Self {
		Self {
			code: code.into(),
			name: None,
			price: None,
			raw_response: None,
			error: Some(error.to_string()),
		}
	}

	/// Converts a lookup outcome into a result.
	pub fn from_outcome(code: String, outcome: Result<QuoteSnapshot>, include_raw: bool) -> Self {
		match outcome {
			Ok(snapshot) => Self::from_snapshot(snapshot, include_raw),
			Err(e) => Self::from_error(code, &e),
		}
	}

	/// Returns `true` if the lookup failed.
	pub fn is_error(&self) -> bool {
		self.error.is_some()
	}
}

/// Ordered batch response.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct QuoteBatch {
	/// Number of entries in `results`.
	pub count: usize,
	/// One result per requested code, in request order.
	pub results: Vec<QuoteResult>,
}
impl From<Vec<QuoteResult>> for QuoteBatch {
	fn from(results: Vec<QuoteResult>) -> Self {
		Self { count: results.len(), results }
	}
}
impl FromIterator<QuoteResult> for QuoteBatch {
	fn from_iter<I>(iter: I) -> Self
	where
		I: IntoIterator<Item = QuoteResult>,
	{
		Self::from(iter.into_iter().collect::<Vec<_>>())
	}
}
