//! Topic selector parsing and matching
//!
//! This module provides the selector DSL used to filter topic
//! subscriptions: exact paths, full-path regex patterns, split-path
//! per-segment patterns and unions of selectors.

pub mod error;
/// Selector parsing and path matching
pub mod path_selector;


// Re-export commonly used types for convenience
pub use error::{SelectorResult, SelectorSyntaxError};
pub use path_selector::{
	DescendantScope, Selector, SelectorKind, SET_SEPARATOR,
};
