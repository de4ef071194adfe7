//! # Reinhardt Loadable
//!
//! Hydration marks for code-split Reinhardt pages.
//!
//! While a page renders on the server, every lazily-loaded unit records its
//! marks. The marks travel to the client in an inline script, and the client
//! loads exactly those units (plus any nested units they declare) before
//! hydration begins.
//!
//! ## Feature Flags
//!
//! - `ssr` (default) - request-scoped mark recording via [`ssr`]
//!
//! ## Example
//!
//! ```rust,ignore
//! use reinhardt_loadable::prelude::*;
//! use std::sync::Arc;
//!
//! // Shared by server and client builds
//! let registry = MarkRegistry::shared();
//! registry.declare(["comments"], || async { load_comments_chunk().await });
//!
//! // Server
//! let (body, payload) = render_with_marks(render_page()).await;
//! let html = format!("{}{}", body, payload.to_script_tag(MARKS_GLOBAL_VAR));
//!
//! // Client
//! MarkResolver::new(Arc::clone(&registry)).rehydrate_html(&html).await?;
//! ```

pub use reinhardt_loadable_core::*;

#[cfg(feature = "ssr")]
pub mod ssr;

/// Commonly used types.
pub mod prelude {
	pub use reinhardt_loadable_core::{
		HydrationPayload, LazyUnit, LoadError, Loadable, LoadableSettings, MARKS_GLOBAL_VAR, Mark,
		MarkError, MarkRegistry, MarkResolver, RehydrationReport,
	};

	#[cfg(feature = "ssr")]
	pub use reinhardt_loadable_ssr::{MarkStream, render_with_marks, use_marks, with_mark_stream};
}
