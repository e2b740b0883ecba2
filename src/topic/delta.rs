//! Binary delta instruction stream decoding and application
//!
//! A delta is a sequence of CBOR items. A byte string inserts its bytes
//! into the output verbatim; a pair of integers copies
//! `base[offset .. offset + length]` from the pre-update value. The single
//! CBOR null byte is a reserved sentinel meaning "value unchanged".

use std::io::Cursor;

use ciborium::Value;

use super::error::MalformedDeltaError;

/// Reserved single-byte stream meaning "keep the original value" (CBOR null)
pub const NO_CHANGE_SENTINEL: [u8; 1] = [0xF6];

/// Returns true if the stream is the reserved no-change sentinel.
pub fn is_no_change(delta: &[u8]) -> bool {
	delta == NO_CHANGE_SENTINEL
}

/// Applies a delta instruction stream against a base value.
///
/// The output is built in full before being returned, so a failure leaves
/// no partial result behind. The sentinel shortcut is handled by the
/// caller via [`is_no_change`]; a sentinel passed here decodes as an
/// unsupported item.
pub fn apply_delta(
	base: &[u8],
	delta: &[u8],
) -> Result<Vec<u8>, MalformedDeltaError> {
	let mut cursor = Cursor::new(delta);
	let mut output = Vec::new();
	let mut pending_offset: Option<usize> = None;

	while (cursor.position() as usize) < delta.len() {
		let item_start = cursor.position() as usize;
		let item: Value = ciborium::de::from_reader(&mut cursor)
			.map_err(|err| {
				MalformedDeltaError::decode(item_start, err.to_string())
			})?;
		match item {
			| Value::Bytes(chunk) => {
				if pending_offset.is_some() {
					return Err(MalformedDeltaError::DanglingMatchOffset);
				}
				output.extend_from_slice(&chunk);
			}
			| Value::Integer(coordinate) => {
				let coordinate = i128::from(coordinate);
				let coordinate =
					usize::try_from(coordinate).map_err(|_| {
						MalformedDeltaError::invalid_coordinate(coordinate)
					})?;
				match pending_offset.take() {
					| None => pending_offset = Some(coordinate),
					| Some(offset) => {
						let length = coordinate;
						let end = offset.checked_add(length).ok_or_else(
							|| {
								MalformedDeltaError::match_out_of_range(
									offset,
									length,
									base.len(),
								)
							},
						)?;
						if end > base.len() {
							return Err(
								MalformedDeltaError::match_out_of_range(
									offset,
									length,
									base.len(),
								),
							);
						}
						output.extend_from_slice(&base[offset .. end]);
					}
				}
			}
			| _ => {
				return Err(MalformedDeltaError::UnsupportedItem {
					offset: item_start,
				});
			}
		}
	}
	if pending_offset.is_some() {
		return Err(MalformedDeltaError::DanglingMatchOffset);
	}
	Ok(output)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn bytes_item(stream: &mut Vec<u8>, chunk: &[u8]) {
		ciborium::ser::into_writer(&Value::Bytes(chunk.to_vec()), stream)
			.unwrap();
	}

	fn int_item(stream: &mut Vec<u8>, value: i64) {
		ciborium::ser::into_writer(&Value::from(value), stream).unwrap();
	}

	#[test]
	fn literal_chunks_concatenate() {
		let mut delta = Vec::new();
		bytes_item(&mut delta, b"hello ");
		bytes_item(&mut delta, b"world");
		assert_eq!(apply_delta(b"base", &delta).unwrap(), b"hello world");
	}

	#[test]
	fn match_pair_copies_base_slice() {
		let mut delta = Vec::new();
		int_item(&mut delta, 2);
		int_item(&mut delta, 3);
		assert_eq!(apply_delta(b"abcdef", &delta).unwrap(), b"cde");
	}

	#[test]
	fn literals_and_matches_interleave_in_order() {
		let mut delta = Vec::new();
		bytes_item(&mut delta, b"<<");
		int_item(&mut delta, 0);
		int_item(&mut delta, 4);
		bytes_item(&mut delta, b">>");
		int_item(&mut delta, 4);
		int_item(&mut delta, 2);
		assert_eq!(apply_delta(b"abcdef", &delta).unwrap(), b"<<abcd>>ef");
	}

	#[test]
	fn empty_stream_yields_empty_value() {
		assert_eq!(apply_delta(b"abc", &[]).unwrap(), b"");
	}

	#[test]
	fn zero_length_match_emits_nothing() {
		let mut delta = Vec::new();
		int_item(&mut delta, 1);
		int_item(&mut delta, 0);
		assert_eq!(apply_delta(b"abc", &delta).unwrap(), b"");
	}

	#[test]
	fn sentinel_is_single_null_byte() {
		assert!(is_no_change(&[0xF6]));
		assert!(!is_no_change(&[0xF6, 0xF6]));
		assert!(!is_no_change(b""));
	}

	#[test]
	fn truncated_stream_rejected() {
		let mut delta = Vec::new();
		bytes_item(&mut delta, b"hello world");
		delta.truncate(delta.len() - 3);
		let err = apply_delta(b"base", &delta).unwrap_err();
		assert!(matches!(err, MalformedDeltaError::Decode { .. }));
	}

	#[test]
	fn match_past_end_of_base_rejected() {
		let mut delta = Vec::new();
		int_item(&mut delta, 2);
		int_item(&mut delta, 10);
		let err = apply_delta(b"abcdef", &delta).unwrap_err();
		assert_eq!(
			err,
			MalformedDeltaError::match_out_of_range(2, 10, 6)
		);
	}

	#[test]
	fn negative_coordinate_rejected() {
		let mut delta = Vec::new();
		int_item(&mut delta, -1);
		int_item(&mut delta, 3);
		let err = apply_delta(b"abcdef", &delta).unwrap_err();
		assert_eq!(err, MalformedDeltaError::invalid_coordinate(-1));
	}

	#[test]
	fn dangling_offset_at_end_rejected() {
		let mut delta = Vec::new();
		int_item(&mut delta, 2);
		let err = apply_delta(b"abcdef", &delta).unwrap_err();
		assert_eq!(err, MalformedDeltaError::DanglingMatchOffset);
	}

	#[test]
	fn bytes_between_offset_and_length_rejected() {
		let mut delta = Vec::new();
		int_item(&mut delta, 2);
		bytes_item(&mut delta, b"x");
		let err = apply_delta(b"abcdef", &delta).unwrap_err();
		assert_eq!(err, MalformedDeltaError::DanglingMatchOffset);
	}

	#[test]
	fn non_item_values_rejected() {
		let mut delta = Vec::new();
		ciborium::ser::into_writer(
			&Value::Text("nope".to_string()),
			&mut delta,
		)
		.unwrap();
		let err = apply_delta(b"abcdef", &delta).unwrap_err();
		assert_eq!(err, MalformedDeltaError::UnsupportedItem { offset: 0 });
	}
}
