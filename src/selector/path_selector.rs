use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use arcstr::{ArcStr, Substr};
use regex::Regex;
use smallvec::SmallVec;

use super::error::SelectorSyntaxError;

/// Marker character introducing a split-path pattern selector
pub const SPLIT_PATTERN_PREFIX: char = '?';
/// Marker character introducing a full-path pattern selector
pub const FULL_PATTERN_PREFIX: char = '*';
/// Marker character introducing a selector set
pub const SET_PREFIX: char = '#';
/// Optional marker allowed in front of an exact path selector
pub const EXACT_PATH_PREFIX: char = '>';
/// Separator between member selectors inside a selector set
pub const SET_SEPARATOR: &str = "////";

/// Prefix characters rejected at parse time
const RESERVED_PREFIXES: [char; 3] = ['$', '&', '<'];

/// How a pattern selector treats paths with more segments than the pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescendantScope {
	/// Path must have exactly as many segments as the pattern
	ExactLength,
	/// Path must be a strict descendant (more segments than the pattern)
	DescendantsOnly,
	/// Path may be the pattern itself or any descendant
	WithDescendants,
}

impl DescendantScope {
	/// Splits the trailing descendant qualifier off a pattern body.
	///
	/// A trailing `//` selects the path and its descendants, a trailing
	/// single `/` selects only strict descendants.
	fn strip(body: &str) -> (&str, Self) {
		if let Some(stripped) = body.strip_suffix("//") {
			(stripped, DescendantScope::WithDescendants)
		} else if let Some(stripped) = body.strip_suffix('/') {
			(stripped, DescendantScope::DescendantsOnly)
		} else {
			(body, DescendantScope::ExactLength)
		}
	}

	/// Checks the segment-count rule for a path with `found` segments
	/// against a pattern with `expected` segments.
	fn allows_length(&self, expected: usize, found: usize) -> bool {
		match self {
			| DescendantScope::ExactLength => found == expected,
			| DescendantScope::DescendantsOnly => found > expected,
			| DescendantScope::WithDescendants => found >= expected,
		}
	}
}

/// Parsed selector variant.
///
/// Dispatch is a plain enum match so the compiler checks exhaustiveness;
/// all variants share equality and hashing through the selector's raw text.
#[derive(Debug, Clone)]
pub enum SelectorKind {
	/// Literal path, compared for case-sensitive equality
	ExactPath { path: Substr },
	/// Single anchored regex matched against the whole path
	FullPathPattern { pattern: Regex },
	/// Per-segment anchored regexes matched positionally
	SplitPathPattern {
		segments: Vec<Regex>,
		scope: DescendantScope,
	},
	/// Union of member selectors
	SelectorSet { members: Vec<Selector> },
}

/// A pattern over topic paths used to filter subscriptions.
///
/// A selector is parsed once and is immutable afterwards. Its textual form
/// is kept verbatim (canonicalized for selector sets) and is the sole input
/// to equality, ordering and hashing, so two selectors with the same raw
/// text are interchangeable in any set or map.
#[derive(Debug, Clone)]
pub struct Selector {
	raw: ArcStr,
	kind: SelectorKind,
}

impl Selector {
	/// Parses selector text into a matcher.
	///
	/// The first character picks the variant: `?` split-path pattern, `*`
	/// full-path pattern, `#` selector set, anything else an exact path
	/// (with an optional leading `>` marker). Text starting with `$`, `&`
	/// or `<` is rejected.
	pub fn parse(
		text: impl Into<ArcStr>,
	) -> Result<Self, SelectorSyntaxError> {
		let raw: ArcStr = text.into();
		let first = raw
			.chars()
			.next()
			.ok_or(SelectorSyntaxError::Empty)?;
		if RESERVED_PREFIXES.contains(&first) {
			return Err(SelectorSyntaxError::reserved_prefix(
				raw.as_str(),
				first,
			));
		}
		let kind = match first {
			| SPLIT_PATTERN_PREFIX => Self::parse_split_pattern(&raw[1 ..])?,
			| FULL_PATTERN_PREFIX => Self::parse_full_pattern(&raw[1 ..])?,
			| SET_PREFIX => {
				let members: Result<Vec<_>, _> = raw[1 ..]
					.split(SET_SEPARATOR)
					.map(Selector::parse)
					.collect();
				// Set raw text is canonical, not the text we were given
				return Ok(Selector::set(members?));
			}
			| _ => Self::parse_exact_path(&raw),
		};
		Ok(Self { raw, kind })
	}

	/// Builds a selector set from member selectors.
	///
	/// Members are deduplicated and ordered by raw text, so sets built from
	/// the same members in any order share one canonical form.
	pub fn set(members: impl IntoIterator<Item = Selector>) -> Self {
		let unique: BTreeMap<ArcStr, Selector> = members
			.into_iter()
			.map(|member| (member.raw.clone(), member))
			.collect();
		let mut raw = String::from(SET_PREFIX);
		for (i, member_raw) in unique.keys().enumerate() {
			if i > 0 {
				raw.push_str(SET_SEPARATOR);
			}
			raw.push_str(member_raw);
		}
		Self {
			raw: ArcStr::from(raw),
			kind: SelectorKind::SelectorSet {
				members: unique.into_values().collect(),
			},
		}
	}

	fn parse_exact_path(raw: &ArcStr) -> SelectorKind {
		let trimmed = raw
			.strip_prefix(EXACT_PATH_PREFIX)
			.unwrap_or(raw.as_str())
			.trim_matches('/');
		SelectorKind::ExactPath {
			path: raw.substr_from(trimmed),
		}
	}

	fn parse_full_pattern(
		body: &str,
	) -> Result<SelectorKind, SelectorSyntaxError> {
		let pattern = if let Some(stripped) = body.strip_suffix("//") {
			// Matches the prefix itself or any descendant
			format!("{stripped}/?.*")
		} else if let Some(stripped) = body.strip_suffix('/') {
			// Matches only strict descendants
			format!("{stripped}/.*")
		} else {
			body.to_string()
		};
		Ok(SelectorKind::FullPathPattern {
			pattern: compile_anchored(&pattern)?,
		})
	}

	fn parse_split_pattern(
		body: &str,
	) -> Result<SelectorKind, SelectorSyntaxError> {
		let (body, scope) = DescendantScope::strip(body);
		let segments: Result<Vec<_>, _> =
			body.split('/').map(compile_anchored).collect();
		Ok(SelectorKind::SplitPathPattern {
			segments: segments?,
			scope,
		})
	}

	/// Returns true if the selector selects the given topic path.
	pub fn matches(&self, path: &str) -> bool {
		match &self.kind {
			| SelectorKind::ExactPath { path: exact } => {
				exact.as_str() == path
			}
			| SelectorKind::FullPathPattern { pattern } => {
				pattern.is_match(path)
			}
			| SelectorKind::SplitPathPattern { segments, scope } => {
				let found: SmallVec<[&str; 8]> = path.split('/').collect();
				if !scope.allows_length(segments.len(), found.len()) {
					return false;
				}
				// Trailing descendant segments are not pattern-checked
				segments
					.iter()
					.zip(found.iter())
					.all(|(pattern, segment)| pattern.is_match(segment))
			}
			| SelectorKind::SelectorSet { members } => {
				members.iter().any(|member| member.matches(path))
			}
		}
	}

	/// The selector's textual form, canonical for selector sets.
	pub fn raw(&self) -> &ArcStr {
		&self.raw
	}

	/// The parsed variant backing this selector.
	pub fn kind(&self) -> &SelectorKind {
		&self.kind
	}
}

/// Compiles a pattern body as a whole-string match, not a search.
fn compile_anchored(body: &str) -> Result<Regex, SelectorSyntaxError> {
	Regex::new(&format!("^(?:{body})$"))
		.map_err(|err| SelectorSyntaxError::invalid_pattern(body, &err))
}

impl PartialEq for Selector {
	fn eq(&self, other: &Self) -> bool {
		self.raw == other.raw
	}
}

impl Eq for Selector {}

impl Hash for Selector {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.raw.hash(state);
	}
}

impl PartialOrd for Selector {
	fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
		Some(self.cmp(other))
	}
}

impl Ord for Selector {
	fn cmp(&self, other: &Self) -> std::cmp::Ordering {
		self.raw.cmp(&other.raw)
	}
}

impl fmt::Display for Selector {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.raw)
	}
}

impl std::str::FromStr for Selector {
	type Err = SelectorSyntaxError;

	fn from_str(text: &str) -> Result<Self, Self::Err> {
		Selector::parse(text)
	}
}
