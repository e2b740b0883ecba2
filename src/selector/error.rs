//! Error types for selector parsing
//!
//! Selector construction is the only fallible selector operation; matching
//! an already-built selector never fails.

use thiserror::Error;

/// Errors raised while parsing selector text
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectorSyntaxError {
	/// Selector text is empty
	#[error("Selector cannot be empty")]
	Empty,

	/// Selector starts with a character reserved for other selector kinds
	#[error("Selector '{selector}' starts with reserved character '{prefix}'")]
	ReservedPrefix {
		/// The rejected selector text
		selector: String,
		/// The reserved leading character
		prefix: char,
	},

	/// Embedded regular expression failed to compile
	#[error("Invalid pattern '{pattern}' in selector: {details}")]
	InvalidPattern {
		/// The pattern body that failed to compile
		pattern: String,
		/// Regex compiler failure description
		details: String,
	},
}

impl SelectorSyntaxError {
	/// Creates a new ReservedPrefix error
	pub fn reserved_prefix(selector: impl Into<String>, prefix: char) -> Self {
		Self::ReservedPrefix {
			selector: selector.into(),
			prefix,
		}
	}

	/// Creates a new InvalidPattern error from a failed regex compilation
	pub fn invalid_pattern(
		pattern: impl Into<String>,
		source: &regex::Error,
	) -> Self {
		Self::InvalidPattern {
			pattern: pattern.into(),
			details: source.to_string(),
		}
	}

	/// Returns the error type for categorization
	pub fn error_type(&self) -> &'static str {
		match self {
			| SelectorSyntaxError::Empty => "empty_selector",
			| SelectorSyntaxError::ReservedPrefix { .. } => "reserved_prefix",
			| SelectorSyntaxError::InvalidPattern { .. } => "invalid_pattern",
		}
	}
}

/// Convenient Result type for selector parsing
pub type SelectorResult<T> = Result<T, SelectorSyntaxError>;
