//! Handler capabilities invoked on topic events

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use arcstr::ArcStr;
use futures::future::BoxFuture;

use crate::topic::TopicType;

/// Failure reported by an individual handler invocation.
///
/// A handler failure is confined to that handler's task; it is logged by
/// the dispatcher and never affects sibling handlers or the cache.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// What happened to the topic this event describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
	/// The topic's value changed
	Update,
	/// The topic became available to this session
	Subscribe,
	/// The topic was removed from this session
	Unsubscribe,
}

impl EventKind {
	/// Returns the event kind name used in logs and diagnostics.
	pub fn as_str(&self) -> &'static str {
		match self {
			| EventKind::Update => "update",
			| EventKind::Subscribe => "subscribe",
			| EventKind::Unsubscribe => "unsubscribe",
		}
	}
}

impl fmt::Display for EventKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.as_str())
	}
}

/// The named arguments every handler invocation receives.
///
/// Cloning is cheap: the value and properties are shared behind `Arc`.
#[derive(Debug, Clone)]
pub struct TopicEvent {
	/// What happened to the topic
	pub kind: EventKind,
	/// The topic's slash-separated path
	pub path: ArcStr,
	/// The topic's current value; `None` until the first update arrives
	pub value: Option<Arc<[u8]>>,
	/// The topic's declared value type
	pub topic_type: TopicType,
	/// The topic's creation-time properties
	pub properties: Arc<HashMap<String, String>>,
}

/// A callable capability subscribed to topic events.
///
/// Implementations must be cheap to share; the dispatcher clones the
/// `Arc<dyn TopicHandler>` once per invocation and runs each invocation on
/// its own task.
pub trait TopicHandler: Send + Sync + 'static {
	/// Handles one topic event.
	fn handle(
		&self,
		event: TopicEvent,
	) -> BoxFuture<'static, Result<(), HandlerError>>;
}

/// Adapter turning an async closure into a [`TopicHandler`].
pub struct FnHandler<F> {
	callback: F,
}

impl<F, Fut> FnHandler<F>
where
	F: Fn(TopicEvent) -> Fut + Send + Sync + 'static,
	Fut: std::future::Future<Output = Result<(), HandlerError>>
		+ Send
		+ 'static,
{
	/// Wraps a closure as a handler.
	pub fn new(callback: F) -> Self {
		Self { callback }
	}

	/// Wraps a closure as a shareable handler.
	pub fn arc(callback: F) -> Arc<dyn TopicHandler> {
		Arc::new(Self::new(callback))
	}
}

impl<F, Fut> TopicHandler for FnHandler<F>
where
	F: Fn(TopicEvent) -> Fut + Send + Sync + 'static,
	Fut: std::future::Future<Output = Result<(), HandlerError>>
		+ Send
		+ 'static,
{
	fn handle(
		&self,
		event: TopicEvent,
	) -> BoxFuture<'static, Result<(), HandlerError>> {
		Box::pin((self.callback)(event))
	}
}
