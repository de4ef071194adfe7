//! Integration test utilities for reinhardt-loadable
//!
//! A small page with lazy components, rendered on the server, and the client
//! build that hydrates it. Test files under `integration/tests/` share these.

use reinhardt_loadable::prelude::*;
use reinhardt_loadable::ssr::StreamError;
use std::sync::Arc;

/// Client-side module graph: `comments` declares `comment-avatar` once its
/// code has loaded, mirroring a lazy component rendering another lazy component.
pub fn client_registry() -> Arc<MarkRegistry> {
	let registry = MarkRegistry::shared();
	let nested = Arc::clone(&registry);
	registry.declare(["comments"], move || {
		let registry = Arc::clone(&nested);
		async move {
			registry.declare(["comment-avatar"], || async { Ok(()) });
			Ok(())
		}
	});
	registry.declare(["header"], || async { Ok(()) });
	registry.declare(["admin-panel"], || async { Ok(()) });
	registry
}

async fn render_comment(author: &str) -> Result<String, StreamError> {
	use_marks(["comment-avatar"])?;
	Ok(format!("<li><img alt=\"{}\"></li>", author))
}

/// Renders the page body, recording the marks of every lazy component on it.
pub async fn render_page(authors: &[&str]) -> Result<String, StreamError> {
	use_marks(["header"])?;
	let mut body = String::from("<header></header><ul>");
	use_marks(["comments"])?;
	for author in authors {
		body.push_str(&render_comment(author).await?);
	}
	body.push_str("</ul>");
	Ok(body)
}

/// Serves the full document with the hydration payload embedded.
pub async fn serve(authors: &[&str]) -> Result<String, StreamError> {
	let (body, payload) = render_with_marks(render_page(authors)).await;
	Ok(format!(
		"<html><body><div id=\"app\">{}</div>{}</body></html>",
		body?,
		payload.to_script_tag(MARKS_GLOBAL_VAR)
	))
}
