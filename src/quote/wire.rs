//! Upstream quote envelope and the field mapping table used to normalize it.
//!
//! The quote endpoint wraps its data as `{rt_cd, msg_cd, msg1, output | output1}`. Which container
//! key is present, and whether it holds an object or an array, depends on the transaction id, so
//! normalization walks fixed priority lists instead of a typed struct.

// self
use crate::{_prelude::*, quote::Price};

/// Container keys, in priority order.
pub const OUTPUT_KEYS: [&str; 2] = ["output", "output1"];
/// Display-name keys, in priority order.
pub const NAME_KEYS: [&str; 2] = ["hts_kor_isnm", "prdt_abrv_name"];
/// Current-price keys, in priority order.
pub const PRICE_KEYS: [&str; 1] = ["stck_prpr"];

/// Result code reported by successful calls.
pub const SUCCESS_RESULT_CODE: &str = "0";

/// Status fields shared by every quote response.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QuoteEnvelope {
	/// `rt_cd`; `"0"` on success.
	pub result_code: Option<String>,
	/// `msg_cd`.
	pub message_code: Option<String>,
	/// `msg1`.
	pub message: Option<String>,
}
impl QuoteEnvelope {
	/// Reads the status fields from a decoded payload.
	pub fn from_payload(payload: &JsonValue) -> Self {
		let text = |key: &str| {
			payload
				.get(key)
				.and_then(JsonValue::as_str)
				.map(|value| value.trim().to_owned())
				.filter(|value| !value.is_empty())
		};

		Self { result_code: text("rt_cd"), message_code: text("msg_cd"), message: text("msg1") }
	}

	/// Returns `true` unless the upstream reported a non-zero result code.
	///
	/// Payloads without `rt_cd` are treated as successful.
	pub fn is_success(&self) -> bool {
		self.result_code.as_deref().is_none_or(|code| code == SUCCESS_RESULT_CODE)
	}
}

/// Shape of the data container inside a quote payload.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum QuoteShape<'a> {
	/// Object container found under one of [`OUTPUT_KEYS`].
	Record(&'a JsonMap<String, JsonValue>),
	/// No recognizable container.
	Unknown,
}
impl<'a> QuoteShape<'a> {
	/// Detects the container shape; an array container resolves to its first element.
	pub fn detect(payload: &'a JsonValue) -> Self {
		OUTPUT_KEYS
			.iter()
			.filter_map(|key| payload.get(*key))
			.find_map(|container| match container {
				JsonValue::Object(record) => Some(record),
				JsonValue::Array(items) => items.first().and_then(JsonValue::as_object),
				_ => None,
			})
			.map_or(Self::Unknown, Self::Record)
	}

	/// First non-blank display name.
	pub fn name(&self) -> Option<String> {
		let Self::Record(record) = self else { return None };

		NAME_KEYS
			.iter()
			.filter_map(|key| record.get(*key).and_then(JsonValue::as_str))
			.map(str::trim)
			.find(|name| !name.is_empty())
			.map(str::to_owned)
	}

	/// First parseable price.
	pub fn price(&self) -> Option<Price> {
		let Self::Record(record) = self else { return None };

		PRICE_KEYS.iter().filter_map(|key| record.get(*key)).find_map(Price::from_json)
	}
}
