//! Topic state and value handling module
//!
//! This module provides the per-topic value cache, the binary delta
//! instruction stream decoder, and the immutable topic metadata attached
//! at creation time.

/// Binary delta decoding and application
pub mod delta;
pub mod error;
pub mod specification;
pub mod topic_state;
pub mod value_cache;

// Re-export commonly used types for convenience
pub use delta::NO_CHANGE_SENTINEL;
pub use error::{DeltaError, DeltaResult, MalformedDeltaError};
pub use specification::{TopicSpecification, TopicType};
pub use topic_state::Topic;
pub use value_cache::TopicValueCache;
