//! Storefront Web Platform
//!
//! Browser backend for the storefront page controllers. On `wasm32` this
//! crate implements the `storefront_platform` host traits with `web-sys`,
//! installs the DOM listeners, and applies each [`Response`] the site
//! returns (default-action suppression, navigation, location sharing).
//!
//! Analytics go to the page's global `gtag` function when it exists. Log
//! output goes to the browser console; `<body data-log="debug">` raises the
//! level (see [`logging`]).
//!
//! Pages can override [`SiteConfig`] defaults with a JSON script element:
//!
//! ```html
//! <script type="application/json" id="storefront-config">
//!   { "scroll_step": 20 }
//! </script>
//! ```
//!
//! [`Response`]: storefront_platform::Response
//! [`SiteConfig`]: storefront_core::SiteConfig

pub mod input;
pub mod logging;

#[cfg(target_arch = "wasm32")]
mod app;
#[cfg(target_arch = "wasm32")]
mod host;
#[cfg(target_arch = "wasm32")]
mod share;

pub use input::convert_key;

#[cfg(target_arch = "wasm32")]
pub use app::CONFIG_ELEMENT_ID;
#[cfg(target_arch = "wasm32")]
pub use host::WebHost;

/// Entry point invoked when the module is instantiated
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() -> Result<(), wasm_bindgen::JsValue> {
    app::start().map_err(|e| wasm_bindgen::JsValue::from_str(&e.to_string()))
}
