//! Task-local render scope
//!
//! Components deep inside a render tree record their marks without having the
//! stream threaded through every call: the render future runs inside a
//! [`with_mark_stream`] scope and [`use_marks`] writes into that scope's stream.
//!
//! The scope is task-local, so it follows the render across thread migrations
//! in a work-stealing runtime and two concurrent requests never share a stream.

use crate::stream::MarkStream;
use reinhardt_loadable_core::HydrationPayload;
use std::future::Future;
use std::sync::Arc;

tokio::task_local! {
	/// Stream of the render currently running on this task.
	static MARK_STREAM: Arc<MarkStream>;
}

/// Errors raised by the render scope.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
	/// Marks were recorded outside of a render scope
	#[error("marks recorded outside of a render scope. Use `with_mark_stream` to open one.")]
	NoScope,
}

/// Runs `f` with `stream` as the current mark stream.
pub async fn with_mark_stream<F, T>(stream: Arc<MarkStream>, f: F) -> T
where
	F: Future<Output = T>,
{
	MARK_STREAM.scope(stream, f).await
}

/// Returns the stream of the enclosing render scope, if any.
pub fn current_stream() -> Option<Arc<MarkStream>> {
	MARK_STREAM.try_with(Arc::clone).ok()
}

/// Records `names` into the enclosing render scope's stream.
pub fn use_marks<I, S>(names: I) -> Result<(), StreamError>
where
	I: IntoIterator<Item = S>,
	S: Into<String>,
{
	MARK_STREAM
		.try_with(|stream| stream.record(names))
		.map_err(|_| StreamError::NoScope)
}

/// Runs a render in a fresh scope and drains the marks it used.
pub async fn render_with_marks<F, T>(f: F) -> (T, HydrationPayload)
where
	F: Future<Output = T>,
{
	let stream = Arc::new(MarkStream::new());
	let output = with_mark_stream(Arc::clone(&stream), f).await;
	(output, stream.drain_payload())
}
