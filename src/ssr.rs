//! Server-side mark recording
//!
//! This module provides access to reinhardt-loadable-ssr: the request-scoped
//! [`MarkStream`] and the task-local render scope lazy components record into.
//!
//! ## Example
//!
//! ```rust,ignore
//! use reinhardt_loadable::ssr::{render_with_marks, use_marks};
//!
//! let (html, payload) = render_with_marks(async {
//!     use_marks(["sidebar"]).ok();
//!     render_sidebar().await
//! })
//! .await;
//! ```

// Re-export all reinhardt-loadable-ssr functionality
pub use reinhardt_loadable_ssr::*;
