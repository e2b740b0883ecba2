//! Error types for handler registration and event dispatch

use thiserror::Error;

use super::registry::HandlerId;
use crate::topic::DeltaError;

/// Errors raised while processing one incoming topic event
#[derive(Error, Debug)]
pub enum DispatchError {
	/// Update or removal arrived for a topic this session does not know
	#[error("Unknown topic '{path}'")]
	UnknownTopic {
		/// Path the notification referred to
		path: String,
	},

	/// Update could not be applied to the topic's value cache
	#[error("Failed to apply update to topic '{path}': {source}")]
	Apply {
		/// Path of the topic the update targeted
		path: String,
		/// The underlying value cache failure
		#[source]
		source: DeltaError,
	},

	/// Dispatch loop command channel is closed
	#[error("Dispatch loop command channel closed")]
	ChannelClosed,

	/// Dispatch loop dropped the response for a delivered event
	#[error("Dispatch loop response lost")]
	ResponseLost,
}

impl DispatchError {
	/// Creates a new UnknownTopic error
	pub fn unknown_topic(path: impl Into<String>) -> Self {
		Self::UnknownTopic { path: path.into() }
	}

	/// Creates a new Apply error
	pub fn apply(path: impl Into<String>, source: DeltaError) -> Self {
		Self::Apply {
			path: path.into(),
			source,
		}
	}

	/// Returns true if the event was aborted before any handler ran
	pub fn is_event_abort(&self) -> bool {
		match self {
			| DispatchError::UnknownTopic { .. } => true,
			| DispatchError::Apply { .. } => true,
			| DispatchError::ChannelClosed => false,
			| DispatchError::ResponseLost => false,
		}
	}

	/// Returns the error type for categorization
	pub fn error_type(&self) -> &'static str {
		match self {
			| DispatchError::UnknownTopic { .. } => "unknown_topic",
			| DispatchError::Apply { .. } => "apply_failed",
			| DispatchError::ChannelClosed => "channel_closed",
			| DispatchError::ResponseLost => "response_lost",
		}
	}
}

/// Errors raised by handler registry mutations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
	/// Handler with the given ID is not registered
	#[error("Handler {id:?} not found")]
	HandlerNotFound {
		/// The identifier no registration carries
		id: HandlerId,
	},
}

impl RegistryError {
	/// Creates a new HandlerNotFound error
	pub fn handler_not_found(id: HandlerId) -> Self {
		Self::HandlerNotFound { id }
	}
}
