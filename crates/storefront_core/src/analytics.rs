//! Analytics events emitted by the page controllers

use storefront_platform::TrackedEvent;

pub const SCROLL_DEPTH: &str = "scroll_depth";
pub const CTA_CLICK: &str = "cta_click";
pub const GENERATE_LEAD: &str = "generate_lead";

/// Scroll milestone, labelled `"<n>%"`
pub fn scroll_depth(threshold: u32) -> TrackedEvent {
    TrackedEvent::new(SCROLL_DEPTH, "Engagement", format!("{threshold}%"))
}

/// Click on a call-to-action; the label is the element's trimmed text
pub fn cta_click(text: &str) -> TrackedEvent {
    TrackedEvent::new(CTA_CLICK, "engagement", text.trim())
}

/// The visitor asked to send their location (a lead worth 1)
pub fn location_lead() -> TrackedEvent {
    TrackedEvent::new(GENERATE_LEAD, "Contact", "Location Sent").with_value(1)
}
