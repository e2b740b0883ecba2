//! Topic type tags and creation-time topic metadata

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Value type declared for a topic when it is created.
///
/// Handlers declare the type they accept; dispatch only considers handlers
/// whose declared type equals the topic's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TopicType {
	/// Opaque binary value
	Binary,
	/// UTF-8 string value
	String,
	/// JSON document value
	Json,
	/// 64-bit signed integer value
	Int64,
	/// Double-precision floating point value
	Double,
}

impl TopicType {
	/// Returns the type name used in logs and diagnostics.
	pub fn as_str(&self) -> &'static str {
		match self {
			| TopicType::Binary => "binary",
			| TopicType::String => "string",
			| TopicType::Json => "json",
			| TopicType::Int64 => "int64",
			| TopicType::Double => "double",
		}
	}
}

impl fmt::Display for TopicType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.as_str())
	}
}

/// Immutable metadata attached to a topic at creation.
#[derive(Debug, Clone)]
pub struct TopicSpecification {
	topic_type: TopicType,
	properties: Arc<HashMap<String, String>>,
}

impl TopicSpecification {
	/// Creates a specification with no properties.
	pub fn new(topic_type: TopicType) -> Self {
		Self {
			topic_type,
			properties: Arc::new(HashMap::new()),
		}
	}

	/// Creates a specification carrying string-keyed properties.
	pub fn with_properties(
		topic_type: TopicType,
		properties: HashMap<String, String>,
	) -> Self {
		Self {
			topic_type,
			properties: Arc::new(properties),
		}
	}

	/// The topic's declared value type.
	pub fn topic_type(&self) -> TopicType {
		self.topic_type
	}

	/// The topic's creation-time properties.
	pub fn properties(&self) -> &Arc<HashMap<String, String>> {
		&self.properties
	}
}
