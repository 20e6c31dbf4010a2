//! Location sharing
//!
//! Turns a resolved device position into something the visitor can send:
//! an `sms:` deep link on phones and tablets, or a clipboard message on
//! desktop. Resolving the position and touching the clipboard are left to
//! the host; this module only decides what to send and what to show.

use std::sync::OnceLock;
use std::time::Duration;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use regex::Regex;

use crate::config::ContactConfig;

/// Characters `encodeURIComponent` escapes
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// A resolved device position
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Google Maps link pointing at this position
    pub fn maps_link(&self) -> String {
        format!(
            "https://maps.google.com/?q={},{}",
            self.latitude, self.longitude
        )
    }
}

/// Options passed to the host's geolocation request
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GeolocationOptions {
    pub enable_high_accuracy: bool,
    pub timeout: Duration,
    /// Zero forces a fresh fix
    pub maximum_age: Duration,
}

impl Default for GeolocationOptions {
    fn default() -> Self {
        Self {
            enable_high_accuracy: true,
            timeout: Duration::from_secs(10),
            maximum_age: Duration::ZERO,
        }
    }
}

/// How the message reaches the business
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Delivery {
    /// Navigate to this `sms:` URL
    Sms { url: String },
    /// Copy `message`; show `confirmation` on success, or the message itself
    /// if the clipboard refuses
    Clipboard {
        message: String,
        confirmation: String,
    },
}

/// Whether the user agent belongs to a phone or tablet
pub fn is_mobile(user_agent: &str) -> bool {
    static MOBILE: OnceLock<Option<Regex>> = OnceLock::new();
    MOBILE
        .get_or_init(|| Regex::new(r"(?i)Android|iPhone|iPad|iPod").ok())
        .as_ref()
        .is_some_and(|re| re.is_match(user_agent))
}

/// Percent-encode like `encodeURIComponent`
pub fn encode_uri_component(input: &str) -> String {
    utf8_percent_encode(input, URI_COMPONENT).to_string()
}

/// Builds location messages for the configured contact
#[derive(Clone, Debug)]
pub struct LocationShare {
    contact: ContactConfig,
}

impl Default for LocationShare {
    fn default() -> Self {
        Self::new(ContactConfig::default())
    }
}

impl LocationShare {
    pub fn new(contact: ContactConfig) -> Self {
        Self { contact }
    }

    pub fn options(&self) -> GeolocationOptions {
        GeolocationOptions::default()
    }

    /// Shown when geolocation is missing, denied or times out
    pub fn fallback_message(&self) -> &str {
        &self.contact.fallback_message
    }

    pub fn phone(&self) -> &str {
        &self.contact.phone
    }

    /// Message text for a position; `location_name` comes from the page's
    /// `data-location`
    pub fn compose_message(&self, location_name: Option<&str>, coords: Coordinates) -> String {
        let location = location_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(self.contact.default_location_name.as_str());
        self.contact
            .message_template
            .replace("{location}", location)
            .replace("{maps}", &coords.maps_link())
    }

    /// `sms:` deep link carrying `message`
    pub fn sms_link(&self, message: &str) -> String {
        format!(
            "sms:{}?body={}",
            self.contact.phone,
            encode_uri_component(message)
        )
    }

    /// Text shown after a successful clipboard copy
    pub fn copied_notice(&self) -> String {
        format!("{}{}", self.contact.copied_message, self.contact.phone)
    }

    /// Decide how to deliver a resolved position
    pub fn plan(
        &self,
        location_name: Option<&str>,
        coords: Coordinates,
        user_agent: &str,
    ) -> Delivery {
        let message = self.compose_message(location_name, coords);
        if is_mobile(user_agent) {
            Delivery::Sms {
                url: self.sms_link(&message),
            }
        } else {
            Delivery::Clipboard {
                message,
                confirmation: self.copied_notice(),
            }
        }
    }
}
