//! Reinhardt Loadable Core
//!
//! Hydration marks for code-split components: the server records which lazy
//! units a render used, and the client loads exactly those units (and any
//! nested units they declare) before hydration starts.
//!
//! ## Architecture
//!
//! - [`mark`]: marker sets, their canonical key and the overlap predicate
//! - [`unit`]: the [`Loadable`] contract and the idempotent [`LazyUnit`]
//! - [`registry`]: append-only log of `(Mark, Loadable)` pairs
//! - [`resolver`]: fixed-point loader and the non-loading usage query
//! - [`payload`]: the JSON payload embedded in served pages
//! - [`settings`]: resolver and payload configuration
//!
//! ## Example
//!
//! ```ignore
//! use reinhardt_loadable_core::{MarkRegistry, MarkResolver};
//! use std::sync::Arc;
//!
//! let registry = MarkRegistry::shared();
//! registry.declare(["comments"], || async { fetch_chunk("comments").await });
//!
//! let resolver = MarkResolver::new(Arc::clone(&registry));
//! resolver.rehydrate(&["comments"]).await?;
//! ```

pub mod error;
pub mod mark;
pub mod payload;
pub mod registry;
pub mod resolver;
pub mod settings;
pub mod unit;

pub use error::{MarkError, PayloadError, SettingsError};
pub use mark::{Mark, MarkKey, mark_overlap};
pub use payload::{HydrationPayload, MARKS_GLOBAL_VAR};
pub use registry::{MarkRegistry, RegistryEntry};
pub use resolver::{MarkResolver, RehydrationReport};
pub use settings::LoadableSettings;
pub use unit::{LazyUnit, LoadError, LoadFuture, LoadState, Loadable};
