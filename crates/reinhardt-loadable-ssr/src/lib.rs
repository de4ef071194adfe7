//! Reinhardt Loadable SSR
//!
//! Server-side half of code-split hydration: lazy components record the marks
//! they render into a request-scoped [`MarkStream`], and the response writer
//! drains the stream into the inline script the client bootstraps from.
//!
//! ## Example
//!
//! ```ignore
//! use reinhardt_loadable_ssr::{render_with_marks, use_marks};
//! use reinhardt_loadable_core::LoadableSettings;
//!
//! let (body, payload) = render_with_marks(async {
//!     use_marks(["comments"])?;
//!     Ok::<_, StreamError>(render_comments().await)
//! })
//! .await;
//!
//! let settings = LoadableSettings::default();
//! let html = format!("{}{}", body?, payload.to_script_tag(&settings.global_var));
//! ```

pub mod scope;
pub mod stream;

pub use scope::{StreamError, current_stream, render_with_marks, use_marks, with_mark_stream};
pub use stream::MarkStream;
