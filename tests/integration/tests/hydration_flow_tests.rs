//! Integration tests for the server-to-client hydration mark flow
//!
//! These tests verify the full round trip:
//! 1. Lazy components record marks while a page renders on the server
//! 2. The marks are embedded in the page as an inline script
//! 3. A separate client registry decodes the page and loads exactly the used units
//! 4. Units declared by freshly-loaded code are discovered and loaded too

use reinhardt_loadable::prelude::*;
use reinhardt_loadable::ssr::StreamError;
use reinhardt_loadable::{LoadState, MarkKey};
use reinhardt_loadable_integration_tests::{client_registry, render_page, serve};
use rstest::rstest;
use std::sync::Arc;

#[rstest]
#[tokio::test]
async fn test_server_marks_are_embedded_once_each() {
	// Act
	let html = serve(&["ann", "bob"]).await.unwrap();

	// Assert
	let payload = HydrationPayload::from_html(&html, MARKS_GLOBAL_VAR)
		.unwrap()
		.unwrap();
	assert_eq!(
		payload.marks(),
		&["header", "comments", "comment-avatar"].map(String::from)
	);
}

#[rstest]
#[tokio::test]
async fn test_client_loads_used_and_nested_units() {
	// Arrange
	let html = serve(&["ann"]).await.unwrap();
	let registry = client_registry();
	let resolver = MarkResolver::new(Arc::clone(&registry));

	// Act
	let report = resolver.rehydrate_html(&html).await.unwrap();

	// Assert
	assert_eq!(report.waves, 2);
	assert_eq!(report.discovered, 1);
	assert!(report.unknown.is_empty());
	let keys: Vec<MarkKey> = registry.keys();
	assert_eq!(keys.len(), 4);
	let admin = registry.get(&Mark::from(["admin-panel"])).unwrap();
	let admin_loaded = tokio::time::timeout(
		std::time::Duration::from_millis(20),
		admin.unit().resolution(),
	)
	.await;
	assert!(admin_loaded.is_err(), "unused units must stay unloaded");
}

#[rstest]
#[tokio::test]
async fn test_client_wait_for_marks_after_rehydrate() {
	// Arrange
	let html = serve(&[]).await.unwrap();
	let registry = client_registry();
	let resolver = MarkResolver::new(Arc::clone(&registry));
	resolver.rehydrate_html(&html).await.unwrap();

	// Act
	let waited = resolver
		.wait_for_marks(&["header", "comments"])
		.await
		.unwrap();

	// Assert
	assert_eq!(waited, 2);
}

#[rstest]
#[tokio::test]
async fn test_build_mismatch_is_reported() {
	// Arrange: the server rendered a unit the client build does not know about
	let (_, payload) = render_with_marks(async {
		use_marks(["header", "poll"]).unwrap();
	})
	.await;
	let resolver = MarkResolver::new(client_registry());

	// Act
	let result = resolver.rehydrate_payload(&payload).await;

	// Assert
	match result {
		Err(MarkError::UnknownMark(mark)) => assert_eq!(mark, "poll"),
		other => panic!("expected UnknownMark, got {:?}", other),
	}
}

#[rstest]
#[tokio::test]
async fn test_lazy_unit_state_after_rehydrate() {
	// Arrange
	let registry = MarkRegistry::shared();
	let unit = registry.declare(["chart"], || async { Ok(()) });
	let resolver = MarkResolver::new(Arc::clone(&registry));

	// Act
	resolver
		.rehydrate_payload(&HydrationPayload::new(["chart"]))
		.await
		.unwrap();

	// Assert
	assert_eq!(unit.state(), LoadState::Ready);
}

#[rstest]
#[tokio::test]
async fn test_failed_chunk_surfaces_load_error() {
	// Arrange
	let registry = MarkRegistry::shared();
	registry.declare(["chart"], || async { Err(LoadError::new("chunk 404")) });
	let resolver = MarkResolver::new(Arc::clone(&registry));

	// Act
	let err = resolver.rehydrate(&["chart"]).await.unwrap_err();

	// Assert
	assert!(matches!(err, MarkError::LoadFailed { .. }));
	assert!(err.to_string().contains("chunk 404"));
}

#[rstest]
#[tokio::test]
async fn test_render_outside_scope_is_rejected() {
	// Act: no render scope is open, so the page cannot record its marks
	let result = render_page(&["ann"]).await;

	// Assert
	assert!(matches!(result, Err(StreamError::NoScope)));
}
