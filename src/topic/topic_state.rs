//! A named, typed topic and its cached value

use std::sync::Arc;

use arcstr::ArcStr;

use super::error::DeltaResult;
use super::specification::{TopicSpecification, TopicType};
use super::value_cache::TopicValueCache;

/// A named, typed addressable value with a mutable current value.
///
/// Path and specification are fixed at creation; only the cached value
/// changes, and only through [`Topic::apply_update`].
#[derive(Debug, Clone)]
pub struct Topic {
	path: ArcStr,
	specification: TopicSpecification,
	cache: TopicValueCache,
}

impl Topic {
	/// Creates a topic with no value yet.
	pub fn new(path: ArcStr, specification: TopicSpecification) -> Self {
		Self {
			path,
			specification,
			cache: TopicValueCache::new(),
		}
	}

	/// The topic's slash-separated path.
	pub fn path(&self) -> &ArcStr {
		&self.path
	}

	/// The topic's creation-time specification.
	pub fn specification(&self) -> &TopicSpecification {
		&self.specification
	}

	/// The topic's declared value type.
	pub fn topic_type(&self) -> TopicType {
		self.specification.topic_type()
	}

	/// The topic's current value, if any update has arrived.
	pub fn value(&self) -> Option<Arc<[u8]>> {
		self.cache.value()
	}

	/// Applies an update to the topic's value cache.
	pub fn apply_update(
		&mut self,
		payload: &[u8],
		is_delta: bool,
	) -> DeltaResult<Arc<[u8]>> {
		self.cache.apply_update(payload, is_delta)
	}
}
