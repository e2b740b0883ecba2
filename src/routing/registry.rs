//! Registry of handler registrations
//!
//! The registry is an explicit context object passed into the dispatch
//! machinery, never process-wide state, so tests and embedders can build
//! isolated registries. Every mutation bumps a generation counter that
//! resolution caches use to detect staleness.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use super::error::RegistryError;
use super::handler::TopicHandler;
use crate::selector::Selector;
use crate::topic::TopicType;

/// A handler registration identifier.
#[derive(Debug, Eq, PartialEq, Hash, Copy, Clone)]
pub struct HandlerId(usize);

/// One registered (selector, handler) association.
///
/// A registration without a selector is a type-only catch-all, reached
/// when no selector-filtered handler matches a topic.
#[derive(Clone)]
pub struct HandlerRegistration {
	/// Identifier assigned at registration
	pub id: HandlerId,
	/// Value type the handler accepts
	pub topic_type: TopicType,
	/// Path filter; `None` marks a type-only catch-all
	pub selector: Option<Selector>,
	/// The handler capability itself
	pub handler: Arc<dyn TopicHandler>,
}

impl fmt::Debug for HandlerRegistration {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("HandlerRegistration")
			.field("id", &self.id)
			.field("topic_type", &self.topic_type)
			.field("selector", &self.selector)
			.finish_non_exhaustive()
	}
}

#[derive(Default)]
struct RegistryInner {
	entries: Vec<HandlerRegistration>,
	next_id: usize,
}

/// Mutable collection of handler registrations.
#[derive(Default)]
pub struct HandlerRegistry {
	inner: RwLock<RegistryInner>,
	generation: AtomicU64,
}

impl HandlerRegistry {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a handler for a value type, optionally path-filtered.
	pub fn add_handler(
		&self,
		topic_type: TopicType,
		selector: Option<Selector>,
		handler: Arc<dyn TopicHandler>,
	) -> HandlerId {
		let mut inner = self.inner.write().expect("registry lock poisoned");
		let id = HandlerId(inner.next_id);
		inner.next_id = inner.next_id.wrapping_add(1);
		inner.entries.push(HandlerRegistration {
			id,
			topic_type,
			selector,
			handler,
		});
		drop(inner);
		self.bump_generation();
		id
	}

	/// Removes a registration by its identifier.
	pub fn remove_handler(&self, id: HandlerId) -> Result<(), RegistryError> {
		let mut inner = self.inner.write().expect("registry lock poisoned");
		let position = inner
			.entries
			.iter()
			.position(|entry| entry.id == id)
			.ok_or(RegistryError::handler_not_found(id))?;
		inner.entries.remove(position);
		drop(inner);
		self.bump_generation();
		Ok(())
	}

	/// Current registry generation; changes on every mutation.
	pub fn generation(&self) -> u64 {
		self.generation.load(Ordering::Acquire)
	}

	/// Number of registrations.
	pub fn len(&self) -> usize {
		self.inner.read().expect("registry lock poisoned").entries.len()
	}

	/// Returns true if no handlers are registered.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Clones the current registrations for resolution.
	pub(crate) fn snapshot(&self) -> Vec<HandlerRegistration> {
		self.inner
			.read()
			.expect("registry lock poisoned")
			.entries
			.clone()
	}

	fn bump_generation(&self) {
		self.generation.fetch_add(1, Ordering::Release);
	}
}

impl fmt::Debug for HandlerRegistry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("HandlerRegistry")
			.field("len", &self.len())
			.field("generation", &self.generation())
			.finish()
	}
}
