//! Current-value cache for a single topic

use std::sync::Arc;

use super::delta;
use super::error::{DeltaError, DeltaResult};

/// Holds the current binary value of one topic.
///
/// The value is `None` until the first update arrives. `apply_update` is
/// the only mutator and is all-or-nothing: a failed delta leaves the
/// previous value untouched.
#[derive(Debug, Clone, Default)]
pub struct TopicValueCache {
	value: Option<Arc<[u8]>>,
}

impl TopicValueCache {
	/// Creates an empty cache with no value.
	pub fn new() -> Self {
		Self::default()
	}

	/// The current value, if any update has been applied yet.
	pub fn value(&self) -> Option<Arc<[u8]>> {
		self.value.clone()
	}

	/// Returns true once a value has been applied.
	pub fn has_value(&self) -> bool {
		self.value.is_some()
	}

	/// Applies an incoming update and returns the new current value.
	///
	/// A full-replace update (`is_delta == false`) overwrites the value
	/// unconditionally. A delta update requires a prior value to patch
	/// against and fails with [`DeltaError::DeltaWithoutBase`] otherwise.
	pub fn apply_update(
		&mut self,
		payload: &[u8],
		is_delta: bool,
	) -> DeltaResult<Arc<[u8]>> {
		let next: Arc<[u8]> = if is_delta {
			let base = self
				.value
				.as_ref()
				.ok_or(DeltaError::DeltaWithoutBase)?;
			if delta::is_no_change(payload) {
				Arc::clone(base)
			} else {
				Arc::from(delta::apply_delta(base, payload)?)
			}
		} else {
			Arc::from(payload)
		};
		self.value = Some(Arc::clone(&next));
		Ok(next)
	}
}

#[cfg(test)]
mod tests {
	use ciborium::Value;

	use super::*;
	use crate::topic::delta::NO_CHANGE_SENTINEL;
	use crate::topic::error::MalformedDeltaError;

	#[test]
	fn full_replace_round_trips() {
		let mut cache = TopicValueCache::new();
		assert!(!cache.has_value());
		cache.apply_update(b"21.5", false).unwrap();
		assert_eq!(cache.value().unwrap().as_ref(), b"21.5");
	}

	#[test]
	fn full_replace_needs_no_prior_value() {
		let mut cache = TopicValueCache::new();
		cache.apply_update(b"first", false).unwrap();
		cache.apply_update(b"second", false).unwrap();
		assert_eq!(cache.value().unwrap().as_ref(), b"second");
	}

	#[test]
	fn sentinel_delta_keeps_value() {
		let mut cache = TopicValueCache::new();
		cache.apply_update(b"21.5", false).unwrap();
		cache.apply_update(&NO_CHANGE_SENTINEL, true).unwrap();
		assert_eq!(cache.value().unwrap().as_ref(), b"21.5");
	}

	#[test]
	fn delta_without_base_rejected_and_value_stays_none() {
		let mut cache = TopicValueCache::new();
		let err = cache.apply_update(&NO_CHANGE_SENTINEL, true).unwrap_err();
		assert_eq!(err, DeltaError::DeltaWithoutBase);
		assert!(cache.value().is_none());
	}

	#[test]
	fn delta_patches_against_current_value() {
		let mut delta_stream = Vec::new();
		ciborium::ser::into_writer(
			&Value::Bytes(b"new ".to_vec()),
			&mut delta_stream,
		)
		.unwrap();
		ciborium::ser::into_writer(&Value::from(4i64), &mut delta_stream)
			.unwrap();
		ciborium::ser::into_writer(&Value::from(5i64), &mut delta_stream)
			.unwrap();

		let mut cache = TopicValueCache::new();
		cache.apply_update(b"old value", false).unwrap();
		cache.apply_update(&delta_stream, true).unwrap();
		assert_eq!(cache.value().unwrap().as_ref(), b"new value");
	}

	#[test]
	fn failed_delta_leaves_prior_value_untouched() {
		let mut bad_delta = Vec::new();
		ciborium::ser::into_writer(&Value::from(0i64), &mut bad_delta)
			.unwrap();
		ciborium::ser::into_writer(&Value::from(100i64), &mut bad_delta)
			.unwrap();

		let mut cache = TopicValueCache::new();
		cache.apply_update(b"keep me", false).unwrap();
		let err = cache.apply_update(&bad_delta, true).unwrap_err();
		assert!(matches!(
			err,
			DeltaError::Malformed(MalformedDeltaError::MatchOutOfRange { .. })
		));
		assert_eq!(cache.value().unwrap().as_ref(), b"keep me");
	}
}
