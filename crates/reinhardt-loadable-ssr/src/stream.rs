//! Request-scoped mark stream.
//!
//! One [`MarkStream`] lives for one server render. Lazy components record
//! their marks into it while rendering, and the response writer drains it
//! exactly once to produce the hydration payload.

use indexmap::IndexSet;
use parking_lot::Mutex;
use reinhardt_loadable_core::{HydrationPayload, LoadableSettings};

/// Insertion-ordered set of the marks used during one render.
#[derive(Debug, Default)]
pub struct MarkStream {
	marks: Mutex<IndexSet<String>>,
}

impl MarkStream {
	/// Creates an empty stream.
	pub fn new() -> Self {
		Self::default()
	}

	/// Records each of `names` as used.
	pub fn record<I, S>(&self, names: I)
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let mut marks = self.marks.lock();
		for name in names {
			marks.insert(name.into());
		}
	}

	/// Returns the recorded marks in first-use order.
	pub fn used_marks(&self) -> Vec<String> {
		self.marks.lock().iter().cloned().collect()
	}

	/// Checks if `name` was recorded.
	pub fn contains(&self, name: &str) -> bool {
		self.marks.lock().contains(name)
	}

	/// Returns the number of recorded marks.
	pub fn len(&self) -> usize {
		self.marks.lock().len()
	}

	/// Checks if nothing was recorded.
	pub fn is_empty(&self) -> bool {
		self.marks.lock().is_empty()
	}

	/// Returns the recorded marks and clears the stream.
	///
	/// Call once per render, before the stream is reused or dropped.
	pub fn drain(&self) -> Vec<String> {
		let drained: Vec<String> = std::mem::take(&mut *self.marks.lock()).into_iter().collect();
		tracing::debug!(marks = drained.len(), "drained hydration marks");
		drained
	}

	/// Drains the stream into a hydration payload.
	pub fn drain_payload(&self) -> HydrationPayload {
		HydrationPayload::new(self.drain())
	}

	/// Drains the stream into the inline `<script>` tag carrying the payload.
	pub fn drain_script_tag(&self, settings: &LoadableSettings) -> String {
		self.drain_payload().to_script_tag(&settings.global_var)
	}
}
