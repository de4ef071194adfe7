//! Mark registry
//!
//! The registry is an append-only, insertion-ordered log of
//! `(Mark, Loadable)` pairs keyed by [`MarkKey`]. Lazy component declarations
//! register into it, and the resolver walks it with a cursor: everything at or
//! after the cursor has not been scanned by the current session yet.
//!
//! ## Concurrency
//!
//! The registry is shared as `Arc<MarkRegistry>`. Registration typically
//! happens while a loader runs (a freshly-loaded component declares its own
//! nested lazy children), so the lock is never held across an `.await` and
//! readers always receive cloned snapshots.
//!
//! Entries are never removed or reordered. Re-registering an existing key
//! replaces its unit in place without moving the entry, which keeps every
//! outstanding cursor valid.

use crate::mark::{Mark, MarkKey};
use crate::unit::{LazyUnit, LoadError, Loadable};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// A registered `(mark, unit)` pair.
#[derive(Clone)]
pub struct RegistryEntry {
	mark: Mark,
	unit: Arc<dyn Loadable>,
}

impl RegistryEntry {
	/// Returns the mark of this entry.
	pub fn mark(&self) -> &Mark {
		&self.mark
	}

	/// Returns the loadable unit of this entry.
	pub fn unit(&self) -> &Arc<dyn Loadable> {
		&self.unit
	}

	/// Returns the canonical key of this entry.
	pub fn key(&self) -> MarkKey {
		self.mark.key()
	}
}

impl fmt::Debug for RegistryEntry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RegistryEntry")
			.field("mark", &self.mark)
			.finish_non_exhaustive()
	}
}

#[derive(Default)]
struct RegistryLog {
	entries: Vec<RegistryEntry>,
	index: HashMap<MarkKey, usize>,
}

/// Append-only registry of lazily-loadable units.
#[derive(Default)]
pub struct MarkRegistry {
	log: RwLock<RegistryLog>,
}

impl MarkRegistry {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates an empty registry ready to be shared.
	pub fn shared() -> Arc<Self> {
		Arc::new(Self::new())
	}

	/// Registers `unit` under `mark`.
	///
	/// Returns `true` if the mark's key was not registered before. An existing
	/// key keeps its position in the log and only has its unit replaced.
	pub fn register(&self, mark: impl Into<Mark>, unit: Arc<dyn Loadable>) -> bool {
		let mark = mark.into();
		let key = mark.key();
		let mut log = self.log.write();

		if let Some(&position) = log.index.get(&key) {
			tracing::trace!(mark = %key, position, "replacing registered loadable");
			log.entries[position] = RegistryEntry { mark, unit };
			return false;
		}

		let position = log.entries.len();
		log.entries.push(RegistryEntry { mark, unit });
		log.index.insert(key.clone(), position);
		tracing::debug!(mark = %key, position, "registered loadable mark");
		true
	}

	/// Declares a lazy unit backed by `loader` and registers it under `mark`.
	///
	/// This is the hook a component-declaration layer calls once per lazy
	/// component. The returned handle shares its load with the registry entry.
	pub fn declare<F, Fut>(&self, mark: impl Into<Mark>, loader: F) -> LazyUnit
	where
		F: Fn() -> Fut + Send + Sync + 'static,
		Fut: Future<Output = Result<(), LoadError>> + Send + 'static,
	{
		let unit = LazyUnit::new(loader);
		self.register(mark, Arc::new(unit.clone()));
		unit
	}

	/// Returns all entries in insertion order.
	pub fn entries(&self) -> Vec<RegistryEntry> {
		self.log.read().entries.clone()
	}

	/// Returns the entries at or after `cursor`, together with the cursor that
	/// follows them.
	///
	/// A cursor past the end yields no entries and is clamped to the log length.
	pub fn entries_since(&self, cursor: usize) -> (Vec<RegistryEntry>, usize) {
		let log = self.log.read();
		let end = log.entries.len();
		let start = cursor.min(end);
		(log.entries[start..].to_vec(), end)
	}

	/// Looks up the entry registered under `mark`'s key.
	pub fn get(&self, mark: &Mark) -> Option<RegistryEntry> {
		let log = self.log.read();
		log.index
			.get(&mark.key())
			.map(|&position| log.entries[position].clone())
	}

	/// Checks if `mark`'s key is registered.
	pub fn contains(&self, mark: &Mark) -> bool {
		self.log.read().index.contains_key(&mark.key())
	}

	/// Returns the registered keys in insertion order.
	pub fn keys(&self) -> Vec<MarkKey> {
		self.log
			.read()
			.entries
			.iter()
			.map(RegistryEntry::key)
			.collect()
	}

	/// Returns the number of registered entries.
	pub fn len(&self) -> usize {
		self.log.read().entries.len()
	}

	/// Checks if nothing is registered.
	pub fn is_empty(&self) -> bool {
		self.log.read().entries.is_empty()
	}
}

impl fmt::Debug for MarkRegistry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("MarkRegistry")
			.field("keys", &self.keys())
			.finish()
	}
}
