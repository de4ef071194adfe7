//! Mark resolution engine
//!
//! [`MarkResolver::rehydrate`] loads every registered unit whose mark overlaps
//! the requested names, then keeps going until the registry stops growing.
//!
//! ## Architecture
//!
//! ```text
//! requested marks
//!       │
//!       ▼
//! scan log[cursor..] ──► trigger load() for overlapping entries (fan-out)
//!       ▲                               │
//!       │                               ▼
//! new entries? ◄──── await the whole wave (fan-in, first error aborts)
//!       │
//!       ▼ none
//! every requested mark covered? ──► Ok(report) / UnknownMark
//! ```
//!
//! A lazy component may declare further lazy components once its own code has
//! loaded, so a single pass is not enough. The cursor walks the registry's
//! append-only log; entries appended while a wave was in flight are exactly
//! the ones past the cursor.
//!
//! The engine does not de-duplicate loads between concurrent sessions. It
//! relies on [`Loadable::load`](crate::Loadable::load) being idempotent.

use crate::error::MarkError;
use crate::payload::HydrationPayload;
use crate::registry::{MarkRegistry, RegistryEntry};
use crate::settings::LoadableSettings;
use futures::future::{self, FutureExt, TryFutureExt};
use std::collections::HashSet;
use std::sync::Arc;

/// Summary of one resolution session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RehydrationReport {
	/// Number of load waves awaited.
	pub waves: usize,
	/// Number of load triggers issued.
	pub triggered: usize,
	/// Number of entries registered while the session ran.
	pub discovered: usize,
	/// Requested marks no load covered (lenient mode only).
	pub unknown: Vec<String>,
}

/// Resolves hydration marks against a [`MarkRegistry`].
#[derive(Debug, Clone)]
pub struct MarkResolver {
	registry: Arc<MarkRegistry>,
	settings: LoadableSettings,
}

impl MarkResolver {
	/// Creates a resolver with default settings.
	pub fn new(registry: Arc<MarkRegistry>) -> Self {
		Self::with_settings(registry, LoadableSettings::default())
	}

	/// Creates a resolver with the given settings.
	pub fn with_settings(registry: Arc<MarkRegistry>, settings: LoadableSettings) -> Self {
		Self { registry, settings }
	}

	/// Returns the registry this resolver reads.
	pub fn registry(&self) -> &Arc<MarkRegistry> {
		&self.registry
	}

	/// Returns the resolver settings.
	pub fn settings(&self) -> &LoadableSettings {
		&self.settings
	}

	/// Loads every unit covering `marks`, transitively, until the registry is stable.
	///
	/// # Errors
	///
	/// - [`MarkError::LoadFailed`] if any triggered load fails
	/// - [`MarkError::UnknownMark`] in strict mode, for the first requested mark
	///   no load covered
	/// - [`MarkError::WaveLimitExceeded`] if the registry keeps growing
	/// - [`MarkError::Timeout`] if a session timeout is configured and exceeded
	pub async fn rehydrate<S: AsRef<str>>(
		&self,
		marks: &[S],
	) -> Result<RehydrationReport, MarkError> {
		let requested: Vec<String> = marks.iter().map(|m| m.as_ref().to_string()).collect();

		match self.settings.session_timeout() {
			Some(limit) => tokio::time::timeout(limit, self.resolve(&requested))
				.await
				.map_err(|_| MarkError::Timeout(limit))?,
			None => self.resolve(&requested).await,
		}
	}

	/// Rehydrates the marks carried by a decoded payload.
	pub async fn rehydrate_payload(
		&self,
		payload: &HydrationPayload,
	) -> Result<RehydrationReport, MarkError> {
		self.rehydrate(payload.marks()).await
	}

	/// Rehydrates the marks embedded in a served page.
	///
	/// A page without a payload requests nothing.
	pub async fn rehydrate_html(&self, html: &str) -> Result<RehydrationReport, MarkError> {
		let payload = HydrationPayload::from_html(html, &self.settings.global_var)?
			.unwrap_or_default();
		self.rehydrate_payload(&payload).await
	}

	/// Waits for the units covering `marks` to finish loading, without
	/// triggering any load.
	///
	/// Nested marks are not followed and unknown marks are not reported.
	/// Returns the number of units waited on.
	pub async fn wait_for_marks<S: AsRef<str>>(&self, marks: &[S]) -> Result<usize, MarkError> {
		let waits: Vec<_> = self
			.registry
			.entries()
			.into_iter()
			.filter(|entry| entry.mark().overlaps(marks))
			.map(|entry| {
				let key = entry.key().to_string();
				entry
					.unit()
					.resolution()
					.map_err(move |source| MarkError::LoadFailed { mark: key, source })
			})
			.collect();

		let count = waits.len();
		future::try_join_all(waits).await?;
		Ok(count)
	}

	async fn resolve(&self, requested: &[String]) -> Result<RehydrationReport, MarkError> {
		let mut report = RehydrationReport::default();
		let mut used: HashSet<String> = HashSet::new();
		let (mut scan, mut cursor) = self.registry.entries_since(0);

		tracing::debug!(
			requested = requested.len(),
			registered = cursor,
			"rehydrating marks"
		);

		loop {
			if let Some(limit) = self.settings.max_waves {
				if report.waves >= limit {
					return Err(MarkError::WaveLimitExceeded(limit));
				}
			}

			let tasks: Vec<_> = scan
				.iter()
				.filter(|entry| entry.mark().overlaps(requested))
				.map(|entry| {
					used.extend(entry.mark().tokens().iter().cloned());
					trigger(entry)
				})
				.collect();

			report.waves += 1;
			report.triggered += tasks.len();
			tracing::debug!(wave = report.waves, loads = tasks.len(), "awaiting load wave");
			future::try_join_all(tasks).await?;

			let (fresh, next_cursor) = self.registry.entries_since(cursor);
			if fresh.is_empty() {
				break;
			}
			tracing::debug!(
				wave = report.waves,
				discovered = fresh.len(),
				"nested marks registered"
			);
			report.discovered += fresh.len();
			scan = fresh;
			cursor = next_cursor;
		}

		for mark in requested.iter().filter(|m| !used.contains(m.as_str())) {
			if self.settings.strict {
				return Err(MarkError::UnknownMark(mark.clone()));
			}
			tracing::warn!(mark = %mark, "unknown mark has been used");
			report.unknown.push(mark.clone());
		}

		tracing::debug!(
			waves = report.waves,
			triggered = report.triggered,
			discovered = report.discovered,
			"marks rehydrated"
		);
		Ok(report)
	}
}

fn trigger(
	entry: &RegistryEntry,
) -> impl std::future::Future<Output = Result<(), MarkError>> + Send + 'static {
	let key = entry.key().to_string();
	tracing::trace!(mark = %key, "triggering load");
	entry
		.unit()
		.load()
		.map_err(move |source| MarkError::LoadFailed { mark: key, source })
		.boxed()
}
