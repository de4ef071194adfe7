//! Hydration payload
//!
//! The payload is the only thing that crosses from server to client: a JSON
//! array of the mark names used while rendering, embedded in the page as an
//! inline script that assigns a well-known global:
//!
//! ```text
//! <script>window.__REINHARDT_LOADABLE_MARKS__=["header","comments"];</script>
//! ```
//!
//! The global is a serialization convention only. Client code decodes it into a
//! [`HydrationPayload`] (or receives the marks some other way) and passes the
//! marks to the resolver explicitly.

use crate::error::PayloadError;
use serde::{Deserialize, Serialize};

/// The default global variable name carrying the used marks.
pub const MARKS_GLOBAL_VAR: &str = "__REINHARDT_LOADABLE_MARKS__";

/// Marks used during one server render.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HydrationPayload {
	marks: Vec<String>,
}

impl HydrationPayload {
	/// Creates a payload from mark names.
	pub fn new<I, S>(marks: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			marks: marks.into_iter().map(Into::into).collect(),
		}
	}

	/// Returns the mark names.
	pub fn marks(&self) -> &[String] {
		&self.marks
	}

	/// Consumes the payload, returning the mark names.
	pub fn into_marks(self) -> Vec<String> {
		self.marks
	}

	/// Returns the number of marks.
	pub fn len(&self) -> usize {
		self.marks.len()
	}

	/// Checks if the payload carries no marks.
	pub fn is_empty(&self) -> bool {
		self.marks.is_empty()
	}

	/// Serializes the payload to a JSON array.
	pub fn to_json(&self) -> Result<String, PayloadError> {
		Ok(serde_json::to_string(&self.marks)?)
	}

	/// Deserializes a payload from a JSON array.
	pub fn from_json(json: &str) -> Result<Self, PayloadError> {
		Ok(serde_json::from_str(json)?)
	}

	/// Generates the inline `<script>` tag assigning the payload to `window.<var>`.
	///
	/// Characters that could close the script element or break a JavaScript
	/// string literal are emitted as `\uXXXX` escapes.
	pub fn to_script_tag(&self, var: &str) -> String {
		// A list of strings always serializes; the fallback is never reached in practice.
		let json = serde_json::to_string(&self.marks).unwrap_or_else(|_| "[]".to_string());
		format!(
			"<script>window.{}={};</script>",
			var,
			escape_script_json(&json)
		)
	}

	/// Extracts the payload assigned to `window.<var>` from a served page.
	///
	/// Reads of the variable (`if (window.<var>)`) are skipped and the first
	/// assignment that decodes wins. Returns `Ok(None)` when the page never
	/// mentions the variable.
	pub fn from_html(html: &str, var: &str) -> Result<Option<Self>, PayloadError> {
		let needle = format!("window.{}", var);
		let mut decode_error = None;
		let mut unassigned = false;

		for (start, _) in html.match_indices(&needle) {
			let rest = &html[start + needle.len()..];
			// `window.FOO` must not match `window.FOO_BAR`
			if rest.starts_with(is_identifier_char) {
				continue;
			}

			let Some(value) = rest.trim_start().strip_prefix('=') else {
				unassigned = true;
				continue;
			};

			let mut values =
				serde_json::Deserializer::from_str(value.trim_start()).into_iter::<Vec<String>>();
			match values.next() {
				Some(Ok(marks)) => return Ok(Some(Self { marks })),
				Some(Err(e)) => {
					decode_error.get_or_insert(PayloadError::Json(e));
				}
				None => {
					decode_error.get_or_insert(PayloadError::Malformed(format!(
						"window.{} is assigned no value",
						var
					)));
				}
			}
		}

		match decode_error {
			Some(e) => Err(e),
			None if unassigned => Err(PayloadError::Malformed(format!(
				"window.{} is read but never assigned",
				var
			))),
			None => Ok(None),
		}
	}
}

impl From<Vec<String>> for HydrationPayload {
	fn from(marks: Vec<String>) -> Self {
		Self { marks }
	}
}

fn is_identifier_char(c: char) -> bool {
	c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

fn escape_script_json(json: &str) -> String {
	let mut escaped = String::with_capacity(json.len());
	for c in json.chars() {
		match c {
			'<' => escaped.push_str("\\u003c"),
			'>' => escaped.push_str("\\u003e"),
			'&' => escaped.push_str("\\u0026"),
			'\u{2028}' => escaped.push_str("\\u2028"),
			'\u{2029}' => escaped.push_str("\\u2029"),
			other => escaped.push(other),
		}
	}
	escaped
}
