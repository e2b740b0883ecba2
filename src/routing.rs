//! Handler registration, resolution and event dispatch module
//!
//! This module provides the registry of (selector, handler) associations,
//! the index resolving topics to interested handlers, and the dispatch
//! loop applying updates and fanning events out to handlers.

/// Event dispatch loop and actor wrapper
pub mod dispatcher;
/// Routing and dispatch error types
pub mod error;
/// Handler trait and event types
pub mod handler;
pub mod registry;
pub mod subscription_index;

// Re-export commonly used types for convenience
pub use dispatcher::{
	DispatchLoopActor, DispatchLoopController, DispatchLoopHandle,
	DispatcherSettings, EventDispatcher, TopicNotification,
};
pub use error::{DispatchError, RegistryError};
pub use handler::{
	EventKind, FnHandler, HandlerError, TopicEvent, TopicHandler,
};
pub use registry::{HandlerId, HandlerRegistration, HandlerRegistry};
pub use subscription_index::{ResolvedHandlers, SubscriptionIndex};
