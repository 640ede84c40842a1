//! Strongly typed security codes accepted by the quote endpoint.

// std
use std::{borrow::Borrow, ops::Deref};
// self
use crate::_prelude::*;

const CODE_MAX_LEN: usize = 12;

/// Error returned when security code validation fails.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum CodeError {
	/// The code was empty.
	#[error("Security code cannot be empty.")]
	Empty,
	/// The code contains a character outside `[0-9A-Za-z]`.
	#[error("Security code contains a non-alphanumeric character: {found:?}.")]
	NonAlphanumeric {
		/// First offending character.
		found: char,
	},
	/// The code exceeded the allowed character count.
	#[error("Security code exceeds {max} characters.")]
	TooLong {
		/// Maximum permitted character count.
		max: usize,
	},
}

/// Short alphanumeric security identifier (e.g. `005930`).
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SecurityCode(String);
impl SecurityCode {
	/// Creates a new code after validation.
	pub fn new(value: impl AsRef<str>) -> Result<Self, CodeError> {
		let view = value.as_ref();

		validate_view(view)?;

		Ok(Self(view.to_owned()))
	}
}
impl Deref for SecurityCode {
	type Target = str;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl AsRef<str> for SecurityCode {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl From<SecurityCode> for String {
	fn from(value: SecurityCode) -> Self {
		value.0
	}
}
impl TryFrom<String> for SecurityCode {
	type Error = CodeError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		validate_view(&value)?;

		Ok(Self(value))
	}
}
impl Borrow<str> for SecurityCode {
	fn borrow(&self) -> &str {
		&self.0
	}
}
impl Debug for SecurityCode {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "SecurityCode({})", self.0)
	}
}
impl Display for SecurityCode {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}
impl FromStr for SecurityCode {
	type Err = CodeError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s)
	}
}

/// Splits a comma-delimited code list, trimming entries and dropping empty or repeated ones.
///
/// Entries are returned in first-seen order and are not validated; validation happens per
/// lookup so one malformed entry only fails its own slot in a batch.
pub fn split_code_list(raw: &str) -> Vec<String> {
	let mut seen = HashSet::new();

	raw.split(',')
		.map(str::trim)
		.filter(|entry| !entry.is_empty())
		.filter(|entry| seen.insert(*entry))
		.map(str::to_owned)
		.collect()
}

fn validate_view(view: &str) -> Result<(), CodeError> {
	if view.is_empty() {
		return Err(CodeError::Empty);
	}
	if let Some(found) = view.chars().find(|c| !c.is_ascii_alphanumeric()) {
		return Err(CodeError::NonAlphanumeric { found });
	}
	if view.len() > CODE_MAX_LEN {
		return Err(CodeError::TooLong { max: CODE_MAX_LEN });
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn codes_validate_alphanumerics() {
		assert_eq!(SecurityCode::new("005930").map(String::from), Ok("005930".into()));
		assert_eq!(SecurityCode::new("Q500001").map(String::from), Ok("Q500001".into()));
		assert_eq!(SecurityCode::new(""), Err(CodeError::Empty));
		assert_eq!(SecurityCode::new(" 005930"), Err(CodeError::NonAlphanumeric { found: ' ' }));
		assert_eq!(SecurityCode::new("00-59"), Err(CodeError::NonAlphanumeric { found: '-' }));
		assert_eq!(
			SecurityCode::new("0".repeat(CODE_MAX_LEN + 1)),
			Err(CodeError::TooLong { max: CODE_MAX_LEN })
		);
	}

	#[test]
	fn serde_round_trip_enforces_validation() {
		let code: SecurityCode =
			serde_json::from_str("\"000660\"").expect("Code should deserialize successfully.");

		assert_eq!(code.as_ref(), "000660");
		assert!(serde_json::from_str::<SecurityCode>("\"with space\"").is_err());
	}

	#[test]
	fn code_lists_trim_and_drop_empty_entries() {
		assert_eq!(split_code_list("005930, 000660 ,"), vec!["005930", "000660"]);
		assert!(split_code_list("").is_empty());
		assert!(split_code_list(",").is_empty());
		assert!(split_code_list(" , ,, ").is_empty());
	}

	#[test]
	fn code_lists_collapse_duplicates_in_first_seen_order() {
		assert_eq!(split_code_list("B,A, B,A,C"), vec!["B", "A", "C"]);
	}
}
