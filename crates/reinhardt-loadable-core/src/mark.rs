//! Marker sets and the overlap predicate.
//!
//! A [`Mark`] is the ordered list of tokens that identifies one lazily-loadable
//! unit. Two properties matter:
//!
//! - **Identity is order-sensitive**: the registry key is the JSON form of the
//!   token list, so `["a","b"]` and `["b","a"]` are different registrations.
//! - **Matching is order-insensitive**: selection only asks whether any token of
//!   the mark appears among the requested names.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An ordered sequence of opaque marker tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Mark(Vec<String>);

impl Mark {
	/// Creates a mark from its tokens, preserving their order.
	pub fn new<I, S>(tokens: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self(tokens.into_iter().map(Into::into).collect())
	}

	/// Returns the tokens of this mark.
	pub fn tokens(&self) -> &[String] {
		&self.0
	}

	/// Returns the number of tokens.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Checks if the mark has no tokens.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Returns the canonical registry key of this mark.
	pub fn key(&self) -> MarkKey {
		MarkKey::from_mark(self)
	}

	/// Returns `true` if at least one token of this mark appears in `names`.
	pub fn overlaps<S: AsRef<str>>(&self, names: &[S]) -> bool {
		mark_overlap(&self.0, names)
	}
}

impl<S: Into<String>> FromIterator<S> for Mark {
	fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
		Self::new(iter)
	}
}

impl From<Vec<String>> for Mark {
	fn from(tokens: Vec<String>) -> Self {
		Self(tokens)
	}
}

impl From<&[&str]> for Mark {
	fn from(tokens: &[&str]) -> Self {
		Self::new(tokens.iter().copied())
	}
}

impl<const N: usize> From<[&str; N]> for Mark {
	fn from(tokens: [&str; N]) -> Self {
		Self::new(tokens)
	}
}

/// Canonical identity of a [`Mark`]: its JSON serialization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkKey(String);

impl MarkKey {
	fn from_mark(mark: &Mark) -> Self {
		// A list of strings always serializes; the join is never reached in practice.
		let json = serde_json::to_string(&mark.0).unwrap_or_else(|_| mark.0.join(","));
		Self(json)
	}

	/// Returns the key as a string slice.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for MarkKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// Returns `true` iff any token in `mark` also appears in `names`.
pub fn mark_overlap<M, S>(mark: &[M], names: &[S]) -> bool
where
	M: AsRef<str>,
	S: AsRef<str>,
{
	mark.iter()
		.any(|token| names.iter().any(|name| name.as_ref() == token.as_ref()))
}
