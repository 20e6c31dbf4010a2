//! Header logo dimension guard
//!
//! An `<img>` without `width`/`height` attributes reserves no space until it
//! loads, shifting the layout under the visitor. The first header logo gets
//! its intrinsic size when already loaded, or a conservative fallback.

use storefront_platform::Document;
use tracing::debug;

use crate::config::LogoSize;

/// What was done to the header logo
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogoDimensions {
    /// Both attributes were already present
    Present,
    /// Set from the loaded image's natural size
    Natural { width: u32, height: u32 },
    /// Set from the configured fallback
    Fallback { width: u32, height: u32 },
}

impl LogoDimensions {
    /// Dimensions written by the guard, if it wrote any
    pub fn size(&self) -> Option<(u32, u32)> {
        match *self {
            LogoDimensions::Present => None,
            LogoDimensions::Natural { width, height }
            | LogoDimensions::Fallback { width, height } => Some((width, height)),
        }
    }
}

/// Ensure the first element matching `selector` has explicit dimensions.
///
/// Returns `None` when the page has no matching image.
pub fn reserve_logo_dimensions<D: Document + ?Sized>(
    doc: &mut D,
    selector: &str,
    fallback: LogoSize,
) -> Option<LogoDimensions> {
    let logo = doc.query_first(selector)?;

    if doc.has_attribute(&logo, "width") && doc.has_attribute(&logo, "height") {
        return Some(LogoDimensions::Present);
    }

    let result = match doc.natural_size(&logo) {
        Some((width, height)) if width > 0 && height > 0 => {
            LogoDimensions::Natural { width, height }
        }
        _ => LogoDimensions::Fallback {
            width: fallback.width,
            height: fallback.height,
        },
    };
    if let Some((width, height)) = result.size() {
        doc.set_attribute(&logo, "width", &width.to_string());
        doc.set_attribute(&logo, "height", &height.to_string());
        debug!(?result, "reserved header logo dimensions");
    }
    Some(result)
}
