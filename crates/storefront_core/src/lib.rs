//! Storefront Core
//!
//! Page controllers for the storefront site, written against the
//! `storefront_platform` host traits so they run the same in a browser and
//! in tests:
//!
//! - **Dropdowns**: keyboard and ARIA behaviour for CSS-only dropdown menus
//! - **Scroll depth**: throttled, once-per-threshold engagement events
//! - **Analytics**: CTA and lead click events
//! - **Routing**: language switcher destinations
//! - **Location**: SMS deep link or clipboard message with the visitor's position
//! - **Layout shift**: reserved dimensions for the header logo
//!
//! # Example
//!
//! ```rust
//! use storefront_core::Site;
//! use storefront_platform::headless::HeadlessHost;
//! use storefront_platform::PageEvent;
//!
//! let mut host = HeadlessHost::new();
//! host.set_metrics(2000.0, 1000.0);
//!
//! let mut site = Site::default();
//! site.dispatch(&mut host, PageEvent::Ready);
//!
//! host.scroll_to(300.0);
//! site.dispatch(&mut host, PageEvent::Scroll);
//! while host.take_frame_request() {
//!     site.dispatch(&mut host, PageEvent::AnimationFrame);
//! }
//!
//! assert_eq!(host.reported()[0].label, "25%");
//! ```

pub mod analytics;
pub mod config;
pub mod dropdown;
pub mod error;
pub mod layout_shift;
pub mod location;
pub mod routing;
pub mod scroll_depth;
pub mod site;

pub use config::{ContactConfig, LanguagePage, LocationPage, LogoSize, RoutingConfig, SiteConfig};
pub use dropdown::{DropdownController, DropdownId, DropdownSelectors, DropdownState};
pub use error::{CoreError, Result};
pub use layout_shift::LogoDimensions;
pub use location::{Coordinates, Delivery, GeolocationOptions, LocationShare};
pub use routing::LanguageRouter;
pub use scroll_depth::{ScrollDepthReporter, ScrollProgress};
pub use site::Site;
