//! Resolution of topic paths to interested handlers

use std::collections::HashSet;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use arcstr::ArcStr;
use lru::LruCache;
use tracing::trace;

use super::handler::TopicHandler;
use super::registry::{HandlerId, HandlerRegistry};
use crate::topic::TopicType;

/// Handler set resolved for one topic, stamped with the registry
/// generation it was computed from.
#[derive(Clone)]
pub struct ResolvedHandlers {
	/// Registry generation this resolution reflects
	pub generation: u64,
	/// Deduplicated handlers to invoke, in registration order
	pub handlers: Vec<(HandlerId, Arc<dyn TopicHandler>)>,
}

impl ResolvedHandlers {
	/// Returns true if no handler is interested in the topic.
	pub fn is_empty(&self) -> bool {
		self.handlers.is_empty()
	}

	/// Number of handlers to invoke.
	pub fn len(&self) -> usize {
		self.handlers.len()
	}
}

/// Maps topics to the handlers that should be notified about them.
///
/// Resolution recomputes from the full registry whenever the cached result
/// is missing or was computed under an older registry generation, so the
/// cache stays observably equivalent to recomputing on every call.
pub struct SubscriptionIndex {
	registry: Arc<HandlerRegistry>,
	resolution_cache:
		Mutex<LruCache<(ArcStr, TopicType), Arc<ResolvedHandlers>>>,
}

impl SubscriptionIndex {
	/// Creates an index over the given registry.
	pub fn new(registry: Arc<HandlerRegistry>, cache_size: NonZeroUsize) -> Self {
		Self {
			registry,
			resolution_cache: Mutex::new(LruCache::new(cache_size)),
		}
	}

	/// The registry this index resolves against.
	pub fn registry(&self) -> &Arc<HandlerRegistry> {
		&self.registry
	}

	/// Resolves the handlers interested in a topic path of a given type.
	///
	/// Selector-filtered handlers whose declared type equals the topic's
	/// type and whose selector matches the path come first; if none match,
	/// type-only catch-all handlers are used instead.
	pub fn resolve(
		&self,
		path: &ArcStr,
		topic_type: TopicType,
	) -> Arc<ResolvedHandlers> {
		let generation = self.registry.generation();
		let cache_key = (path.clone(), topic_type);
		{
			let mut cache =
				self.resolution_cache.lock().expect("cache lock poisoned");
			if let Some(cached) = cache.get(&cache_key) {
				if cached.generation == generation {
					return Arc::clone(cached);
				}
			}
		}

		let resolved =
			Arc::new(self.resolve_uncached(path, topic_type, generation));
		trace!(
			topic = %path,
			topic_type = %topic_type,
			handlers = resolved.len(),
			generation,
			"Resolved topic handler set"
		);
		{
			let mut cache =
				self.resolution_cache.lock().expect("cache lock poisoned");
			cache.put(cache_key, Arc::clone(&resolved));
		}
		resolved
	}

	fn resolve_uncached(
		&self,
		path: &ArcStr,
		topic_type: TopicType,
		generation: u64,
	) -> ResolvedHandlers {
		let snapshot = self.registry.snapshot();
		let mut handlers: Vec<(HandlerId, Arc<dyn TopicHandler>)> = Vec::new();
		// Dedup by handler identity: the same handler registered under
		// several selectors is invoked once per event
		let mut seen: HashSet<*const ()> = HashSet::new();

		for entry in &snapshot {
			if entry.topic_type != topic_type {
				continue;
			}
			let Some(selector) = &entry.selector else {
				continue;
			};
			if selector.matches(path)
				&& seen.insert(Arc::as_ptr(&entry.handler) as *const ())
			{
				handlers.push((entry.id, Arc::clone(&entry.handler)));
			}
		}

		if handlers.is_empty() {
			// Fall back to type-only catch-all registrations
			for entry in &snapshot {
				if entry.topic_type != topic_type || entry.selector.is_some() {
					continue;
				}
				if seen.insert(Arc::as_ptr(&entry.handler) as *const ()) {
					handlers.push((entry.id, Arc::clone(&entry.handler)));
				}
			}
		}

		ResolvedHandlers {
			generation,
			handlers,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::routing::handler::FnHandler;
	use crate::selector::Selector;

	fn noop_handler() -> Arc<dyn TopicHandler> {
		FnHandler::arc(|_event| async { Ok(()) })
	}

	fn index_with(registry: Arc<HandlerRegistry>) -> SubscriptionIndex {
		SubscriptionIndex::new(registry, NonZeroUsize::new(16).unwrap())
	}

	fn selector(text: &str) -> Option<Selector> {
		Some(Selector::parse(text).unwrap())
	}

	#[test]
	fn selector_and_type_must_both_match() {
		let registry = Arc::new(HandlerRegistry::new());
		registry.add_handler(
			TopicType::Double,
			selector("?sensors/.*"),
			noop_handler(),
		);
		let index = index_with(Arc::clone(&registry));

		let path = ArcStr::from("sensors/1");
		assert_eq!(index.resolve(&path, TopicType::Double).len(), 1);
		// Same path, wrong type
		assert_eq!(index.resolve(&path, TopicType::Json).len(), 0);
		// Right type, non-matching path
		let other = ArcStr::from("alarms/1");
		assert_eq!(index.resolve(&other, TopicType::Double).len(), 0);
	}

	#[test]
	fn falls_back_to_type_catch_all_when_no_selector_matches() {
		let registry = Arc::new(HandlerRegistry::new());
		registry.add_handler(
			TopicType::Double,
			selector("?sensors/.*"),
			noop_handler(),
		);
		let catch_all =
			registry.add_handler(TopicType::Double, None, noop_handler());
		let index = index_with(Arc::clone(&registry));

		// Selector matches: the catch-all stays out of the result
		let covered = ArcStr::from("sensors/1");
		let resolved = index.resolve(&covered, TopicType::Double);
		assert_eq!(resolved.len(), 1);

		// No selector matches: catch-all tier kicks in
		let uncovered = ArcStr::from("alarms/1");
		let resolved = index.resolve(&uncovered, TopicType::Double);
		assert_eq!(resolved.len(), 1);
		assert_eq!(resolved.handlers[0].0, catch_all);
	}

	#[test]
	fn same_handler_under_multiple_selectors_resolves_once() {
		let registry = Arc::new(HandlerRegistry::new());
		let shared = noop_handler();
		registry.add_handler(
			TopicType::Double,
			selector("sensors/1"),
			Arc::clone(&shared),
		);
		registry.add_handler(
			TopicType::Double,
			selector("?sensors/.*"),
			shared,
		);
		let index = index_with(Arc::clone(&registry));

		let path = ArcStr::from("sensors/1");
		assert_eq!(index.resolve(&path, TopicType::Double).len(), 1);
	}

	#[test]
	fn cached_resolution_invalidated_by_registry_change() {
		let registry = Arc::new(HandlerRegistry::new());
		let index = index_with(Arc::clone(&registry));

		let path = ArcStr::from("sensors/1");
		assert!(index.resolve(&path, TopicType::Double).is_empty());

		registry.add_handler(
			TopicType::Double,
			selector("sensors/1"),
			noop_handler(),
		);
		// Stale cache entry must be recomputed after the registry changed
		assert_eq!(index.resolve(&path, TopicType::Double).len(), 1);
	}
}
