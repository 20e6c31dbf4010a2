//! Storefront Platform Abstraction Layer
//!
//! Host-agnostic traits and types the page controllers are written against.
//!
//! # Architecture
//!
//! A page backend implements [`Host`], which bundles:
//!
//! - [`Document`] - element lookup, attributes, focus
//! - [`DocumentMetrics`] - document/viewport height and scroll offset
//! - [`FrameScheduler`] - animation-frame requests
//! - [`EventReporter`] - fire-and-forget analytics transport
//! - [`Navigator`] - current path and user agent
//!
//! The backend translates native events into [`PageEvent`]s, hands them to
//! the controllers, and applies the returned [`Response`].
//!
//! # Backends
//!
//! - `storefront_platform_web` - browsers, via `web-sys` (wasm32 only)
//! - [`headless`] - in-memory tree for tests and tooling

mod error;
mod event;
mod host;
mod input;
mod report;

#[cfg(feature = "headless")]
pub mod headless;

// Re-export all public types
pub use error::{PlatformError, Result};
pub use event::{Command, DefaultAction, PageEvent, Response};
pub use host::{Document, DocumentMetrics, EventReporter, FrameScheduler, Host, Navigator};
pub use input::{Key, KeyboardEvent};
pub use report::{ParamValue, TrackedEvent};
