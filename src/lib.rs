//! # Topic Delta Client
//!
//! A topic-value cache with selector-based subscriber dispatch and binary
//! delta-patch application, for real-time data distribution clients.
//!
//! ## Features
//!
//! - **Selector DSL**: exact paths, full-path and per-segment regex
//!   patterns, and unions of selectors, parsed once into an enum matcher
//! - **Delta Patching**: incremental binary updates decoded from a CBOR
//!   instruction stream and applied atomically against the cached value
//! - **Two-tier Handler Resolution**: selector-filtered handlers first,
//!   type-only catch-alls as fallback, deduplicated per event
//! - **Fan-out/Fan-in Dispatch**: all matched handlers run concurrently
//!   on their own tasks and the event completes only when all finished
//! - **Async/Await Support**: built on top of `tokio`
//! - **Error Handling**: construction-time selector errors, atomic delta
//!   failures, per-handler failure confinement
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use topic_delta_client::{
//!     DispatcherSettings, EventDispatcher, FnHandler, HandlerRegistry,
//!     Selector, TopicNotification, TopicSpecification, TopicType,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Register a handler for double-typed topics under sensors/
//!     let registry = Arc::new(HandlerRegistry::new());
//!     registry.add_handler(
//!         TopicType::Double,
//!         Some(Selector::parse("?sensors/.*")?),
//!         FnHandler::arc(|event| async move {
//!             println!("{}: {:?}", event.path, event.value);
//!             Ok(())
//!         }),
//!     );
//!
//!     // Drive the dispatcher with transport notifications
//!     let mut dispatcher = EventDispatcher::new(
//!         Arc::clone(&registry),
//!         &DispatcherSettings::default(),
//!     );
//!     dispatcher
//!         .process(TopicNotification::Subscribed {
//!             path: "sensors/1".into(),
//!             specification: TopicSpecification::new(TopicType::Double),
//!         })
//!         .await?;
//!     dispatcher
//!         .process(TopicNotification::Update {
//!             path: "sensors/1".into(),
//!             payload: b"21.5".to_vec(),
//!             is_delta: false,
//!         })
//!         .await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Selector Syntax
//!
//! - `a/b/c` - exact path (optional leading `>` marker)
//! - `*a/b.*` - single regex matched against the whole path
//! - `?a/[0-9]+/c` - one regex per path segment
//! - `#a/b////?x/.*` - union of selectors joined by `////`
//! - a trailing `/` on a pattern body selects only descendants, a
//!   trailing `//` selects the path itself and its descendants

#![warn(missing_docs)]

// Core modules
pub mod routing;
pub mod selector;
pub mod topic;

// === Core Public API ===
// Dispatch loop and handler registration
pub use routing::{
	DispatchError, DispatchLoopActor, DispatchLoopController,
	DispatchLoopHandle, DispatcherSettings, EventDispatcher, EventKind,
	FnHandler, HandlerError, HandlerId, HandlerRegistry, TopicEvent,
	TopicHandler, TopicNotification,
};
// Selector parsing and matching
pub use selector::{Selector, SelectorSyntaxError};
// Topic state and delta errors
pub use topic::{
	DeltaError, MalformedDeltaError, Topic, TopicSpecification, TopicType,
	TopicValueCache,
};

/// Result type alias for operations that may fail with DispatchError
pub type Result<T> = std::result::Result<T, DispatchError>;

/// Prelude module for convenient imports
///
/// This module provides the most commonly used types for typical
/// applications. Use this when you want to import everything you need
/// with a single line:
///
/// ```rust
/// use topic_delta_client::prelude::*;
/// ```
pub mod prelude {
	//! Essential types for most applications

	pub use crate::{
		DispatcherSettings, EventDispatcher, EventKind, FnHandler,
		HandlerRegistry, Result, Selector, TopicEvent, TopicHandler,
		TopicNotification, TopicSpecification, TopicType,
	};
}

/// Advanced types and utilities for complex use cases
///
/// This module contains types that are useful for advanced scenarios:
/// - Manual handler resolution
/// - Direct value cache and delta manipulation
/// - Actor lifecycle management
///
/// ```rust
/// use topic_delta_client::advanced::*;
/// ```
pub mod advanced {
	//! Advanced types for complex use cases

	pub use crate::routing::{
		HandlerRegistration, ResolvedHandlers, SubscriptionIndex,
	};
	pub use crate::selector::{DescendantScope, SelectorKind, SET_SEPARATOR};
	pub use crate::topic::{delta, NO_CHANGE_SENTINEL};
	pub use crate::{
		DispatchLoopActor, DispatchLoopController, DispatchLoopHandle,
		HandlerId, Topic, TopicValueCache,
	};
}

/// Error types used throughout the library
///
/// Re-exports all error types in one convenient location for error
/// handling.
///
/// ```rust
/// use topic_delta_client::errors::*;
/// ```
pub mod errors {
	//! All error types used in the library

	pub use crate::routing::{DispatchError, RegistryError};
	pub use crate::selector::SelectorSyntaxError;
	pub use crate::topic::{DeltaError, MalformedDeltaError};
}
