//! Error types for topic value updates and delta decoding

use thiserror::Error;

/// Errors raised while decoding or applying a delta instruction stream
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MalformedDeltaError {
	/// Instruction stream is truncated or not decodable at the given offset
	#[error("Delta stream undecodable at byte {offset}: {details}")]
	Decode {
		/// Byte offset of the undecodable item
		offset: usize,
		/// Decoder failure description
		details: String,
	},

	/// Decoded item is neither a byte string nor an integer
	#[error("Delta item at byte {offset} is not a byte string or integer")]
	UnsupportedItem {
		/// Byte offset of the offending item
		offset: usize,
	},

	/// Stream ended (or emitted data) with a match offset lacking a length
	#[error("Delta stream left a match offset without a match length")]
	DanglingMatchOffset,

	/// Match coordinate is negative or does not fit the address space
	#[error("Delta match coordinate {value} is out of range")]
	InvalidCoordinate {
		/// The rejected coordinate as decoded
		value: i128,
	},

	/// Match slice reaches past the end of the base value
	#[error(
		"Delta match {offset}+{length} exceeds base value length {base_len}"
	)]
	MatchOutOfRange {
		/// Start offset into the base value
		offset: usize,
		/// Number of bytes requested from the base value
		length: usize,
		/// Length of the base value the match was applied to
		base_len: usize,
	},
}

impl MalformedDeltaError {
	/// Creates a new Decode error
	pub fn decode(offset: usize, details: impl Into<String>) -> Self {
		Self::Decode {
			offset,
			details: details.into(),
		}
	}

	/// Creates a new InvalidCoordinate error
	pub fn invalid_coordinate(value: i128) -> Self {
		Self::InvalidCoordinate { value }
	}

	/// Creates a new MatchOutOfRange error
	pub fn match_out_of_range(
		offset: usize,
		length: usize,
		base_len: usize,
	) -> Self {
		Self::MatchOutOfRange {
			offset,
			length,
			base_len,
		}
	}

	/// Returns the error type for categorization
	pub fn error_type(&self) -> &'static str {
		match self {
			| MalformedDeltaError::Decode { .. } => "decode",
			| MalformedDeltaError::UnsupportedItem { .. } => {
				"unsupported_item"
			}
			| MalformedDeltaError::DanglingMatchOffset => {
				"dangling_match_offset"
			}
			| MalformedDeltaError::InvalidCoordinate { .. } => {
				"invalid_coordinate"
			}
			| MalformedDeltaError::MatchOutOfRange { .. } => {
				"match_out_of_range"
			}
		}
	}
}

/// Errors raised by [`TopicValueCache::apply_update`]
///
/// [`TopicValueCache::apply_update`]: super::value_cache::TopicValueCache::apply_update
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeltaError {
	/// Delta update arrived for a topic that has no current value
	#[error("Delta update received for a topic with no current value")]
	DeltaWithoutBase,

	/// Delta instruction stream could not be decoded or applied
	#[error("Malformed delta: {0}")]
	Malformed(#[from] MalformedDeltaError),
}

impl DeltaError {
	/// Returns the error type for categorization
	pub fn error_type(&self) -> &'static str {
		match self {
			| DeltaError::DeltaWithoutBase => "delta_without_base",
			| DeltaError::Malformed(err) => err.error_type(),
		}
	}
}

/// Convenient Result type for delta operations
pub type DeltaResult<T> = Result<T, DeltaError>;
