//! Loadable units.
//!
//! A loadable unit is the capability the registry pairs with a [`Mark`](crate::Mark).
//! The resolution engine only ever calls two operations on it:
//!
//! - [`Loadable::load`] triggers the fetch of the unit's code. It **must be
//!   idempotent**: calling it any number of times, from any number of
//!   concurrent resolution sessions, performs the underlying fetch at most once
//!   and every returned future settles with the same outcome.
//! - [`Loadable::resolution`] settles once a load that was (or will be)
//!   triggered by someone else settles. It never triggers a load itself.
//!
//! [`LazyUnit`] is the stock implementation backed by an async loader closure.

use futures::future::{BoxFuture, FutureExt, Shared};
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use tokio::sync::Notify;

/// Future returned by [`Loadable`] operations.
pub type LoadFuture = BoxFuture<'static, Result<(), LoadError>>;

/// Error reported by a loader.
///
/// Cloneable so that one failed load can be observed by every waiter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct LoadError {
	message: String,
}

impl LoadError {
	/// Creates a load error with the given message.
	pub fn new(message: impl Into<String>) -> Self {
		Self {
			message: message.into(),
		}
	}

	/// Returns the error message.
	pub fn message(&self) -> &str {
		&self.message
	}
}

/// A lazily-loadable unit of code.
pub trait Loadable: Send + Sync {
	/// Triggers loading. Must be idempotent.
	fn load(&self) -> LoadFuture;

	/// Waits for a load triggered elsewhere to settle, without triggering one.
	fn resolution(&self) -> LoadFuture;
}

/// Observable state of a [`LazyUnit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
	/// `load` was never called.
	Idle,
	/// `load` was called and has not settled yet.
	Pending,
	/// The load completed successfully.
	Ready,
	/// The load failed; retries observe the same error.
	Failed(LoadError),
}

type SharedLoad = Shared<LoadFuture>;
type LoaderFn = dyn Fn() -> LoadFuture + Send + Sync;

struct LazyInner {
	loader: Box<LoaderFn>,
	started: OnceLock<SharedLoad>,
	started_notify: Notify,
	load_count: AtomicUsize,
}

/// A [`Loadable`] that runs its loader at most once.
///
/// Cloning is cheap; clones share the same load.
#[derive(Clone)]
pub struct LazyUnit {
	inner: Arc<LazyInner>,
}

impl LazyUnit {
	/// Creates a unit from an async loader.
	///
	/// The loader is invoked on the first call to [`Loadable::load`] only.
	pub fn new<F, Fut>(loader: F) -> Self
	where
		F: Fn() -> Fut + Send + Sync + 'static,
		Fut: Future<Output = Result<(), LoadError>> + Send + 'static,
	{
		Self {
			inner: Arc::new(LazyInner {
				loader: Box::new(move || loader().boxed()),
				started: OnceLock::new(),
				started_notify: Notify::new(),
				load_count: AtomicUsize::new(0),
			}),
		}
	}

	/// Creates a unit whose load succeeds immediately.
	pub fn ready() -> Self {
		Self::new(|| async { Ok(()) })
	}

	/// Returns the current load state.
	pub fn state(&self) -> LoadState {
		match self.inner.started.get() {
			None => LoadState::Idle,
			Some(shared) => match shared.peek() {
				None => LoadState::Pending,
				Some(Ok(())) => LoadState::Ready,
				Some(Err(e)) => LoadState::Failed(e.clone()),
			},
		}
	}

	/// Returns how many times the underlying loader has run (0 or 1).
	pub fn load_count(&self) -> usize {
		self.inner.load_count.load(Ordering::SeqCst)
	}

	fn shared_load(&self) -> SharedLoad {
		let inner = &self.inner;
		let shared = inner
			.started
			.get_or_init(|| {
				inner.load_count.fetch_add(1, Ordering::SeqCst);
				(inner.loader)().shared()
			})
			.clone();
		inner.started_notify.notify_waiters();
		shared
	}
}

impl Loadable for LazyUnit {
	fn load(&self) -> LoadFuture {
		self.shared_load().boxed()
	}

	fn resolution(&self) -> LoadFuture {
		let inner = Arc::clone(&self.inner);
		async move {
			loop {
				let notified = inner.started_notify.notified();
				tokio::pin!(notified);
				// Register interest before checking so a concurrent `load` cannot slip in between.
				notified.as_mut().enable();
				if let Some(shared) = inner.started.get() {
					return shared.clone().await;
				}
				notified.await;
			}
		}
		.boxed()
	}
}

impl fmt::Debug for LazyUnit {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("LazyUnit")
			.field("state", &self.state())
			.finish()
	}
}
