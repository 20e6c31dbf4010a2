//! Site configuration
//!
//! Every field has a default matching the production site, so an empty TOML
//! or JSON document yields [`SiteConfig::default()`].

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Top-level configuration for the page controllers
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SiteConfig {
    pub selectors: Selectors,
    /// Scroll-depth reporting granularity, in percentage points
    pub scroll_step: u32,
    pub contact: ContactConfig,
    pub routing: RoutingConfig,
    /// Size reserved for the header logo when it has not loaded yet
    pub fallback_logo: LogoSize,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            selectors: Selectors::default(),
            scroll_step: 25,
            contact: ContactConfig::default(),
            routing: RoutingConfig::default(),
            fallback_logo: LogoSize::default(),
        }
    }
}

impl SiteConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: SiteConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON document
    pub fn from_json_str(source: &str) -> Result<Self> {
        let config: SiteConfig = serde_json::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the controllers cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.scroll_step == 0 || self.scroll_step > 100 {
            return Err(CoreError::Config(format!(
                "scroll_step must be within 1..=100, got {}",
                self.scroll_step
            )));
        }
        if self.selectors.dropdown_trigger.trim().is_empty() {
            return Err(CoreError::Config(
                "selectors.dropdown_trigger must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Set the scroll-depth step
    pub fn with_scroll_step(mut self, step: u32) -> Self {
        self.scroll_step = step;
        self
    }

    /// Set the contact phone number
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.contact.phone = phone.into();
        self
    }
}

/// CSS selectors for the elements the controllers attach to
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Selectors {
    pub dropdown_trigger: String,
    pub dropdown_container: String,
    pub dropdown_panel: String,
    /// Call-to-action elements reported as `cta_click`
    pub cta: String,
    /// Buttons that send the visitor's location
    pub location_lead: String,
    /// Language switch buttons carrying `data-lang`
    pub language_button: String,
    pub header_logo: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            dropdown_trigger: ".dropbtn".to_string(),
            dropdown_container: ".dropdown".to_string(),
            dropdown_panel: ".dropdown-content".to_string(),
            cta: "a[href^=\"tel:\"], .btn-primary, .header-cta".to_string(),
            location_lead: ".btn-location, .btn-location-sticky".to_string(),
            language_button: ".lang-btn".to_string(),
            header_logo: "header img, .header-container img".to_string(),
        }
    }
}

/// Contact details and the texts shown by the location sender
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ContactConfig {
    /// Number the SMS is addressed to (international format)
    pub phone: String,
    /// Shown when the location cannot be determined
    pub fallback_message: String,
    /// Shown after the message was copied; the phone number is appended
    pub copied_message: String,
    /// Used when the page carries no `data-location`
    pub default_location_name: String,
    /// Body of the location message; `{location}` and `{maps}` are replaced
    pub message_template: String,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            phone: "+359877845569".to_string(),
            fallback_message: "Unable to determine your location. Call us: 0877 845 569"
                .to_string(),
            copied_message: "The message was copied to the clipboard. Send it to: ".to_string(),
            default_location_name: "unspecified location".to_string(),
            message_template: "I need roadside assistance ({location}).\n\nMy location:\n{maps}"
                .to_string(),
        }
    }
}

/// One language and its landing page
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct LanguagePage {
    pub code: String,
    pub page: String,
}

/// A home-language location page, chosen when the current path contains
/// `keyword`
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct LocationPage {
    pub keyword: String,
    pub page: String,
}

/// Language switcher routing table
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Language whose pages are per-location
    pub home_language: String,
    /// Home-language page when no location keyword matches
    pub home_page: String,
    /// Other languages, each with a single page
    pub languages: Vec<LanguagePage>,
    /// Checked in order; the first keyword found in the path wins
    pub location_pages: Vec<LocationPage>,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        let languages = [
            ("en", "/english.html"),
            ("de", "/german.html"),
            ("tr", "/turk.html"),
            ("ro", "/rom.html"),
        ]
        .into_iter()
        .map(|(code, page)| LanguagePage {
            code: code.to_string(),
            page: page.to_string(),
        })
        .collect();

        let location_pages = [
            "kalotina",
            "petrohan",
            "dragoman",
            "magistralaevropa",
            "ginci",
            "voluiak",
            "slivnica",
            "kostinbrod",
        ]
        .into_iter()
        .map(|keyword| LocationPage {
            keyword: keyword.to_string(),
            page: format!("/{keyword}.html"),
        })
        .collect();

        Self {
            home_language: "bg".to_string(),
            home_page: "/".to_string(),
            languages,
            location_pages,
        }
    }
}

/// Width and height in CSS pixels
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct LogoSize {
    pub width: u32,
    pub height: u32,
}

impl Default for LogoSize {
    fn default() -> Self {
        Self {
            width: 180,
            height: 60,
        }
    }
}
