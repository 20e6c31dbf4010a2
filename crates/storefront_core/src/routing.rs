//! Language switcher routing
//!
//! Maps a language code from a `.lang-btn[data-lang]` to the page to load.
//! The home language has one page per served location, picked by looking
//! for the location keyword in the current path; every other language has a
//! single page.

use tracing::debug;

use crate::config::RoutingConfig;

/// Resolves language codes to destination pages
#[derive(Clone, Debug)]
pub struct LanguageRouter {
    config: RoutingConfig,
}

impl Default for LanguageRouter {
    fn default() -> Self {
        Self::new(RoutingConfig::default())
    }
}

impl LanguageRouter {
    pub fn new(config: RoutingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RoutingConfig {
        &self.config
    }

    /// All known language codes, home language first
    pub fn languages(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.config.home_language.as_str())
            .chain(self.config.languages.iter().map(|l| l.code.as_str()))
    }

    /// Destination for `language` when the visitor is on `current_path`.
    ///
    /// Returns `None` for unknown codes, which leaves the page untouched.
    pub fn resolve(&self, language: &str, current_path: &str) -> Option<&str> {
        let language = language.trim();
        if language.is_empty() {
            return None;
        }

        if language == self.config.home_language {
            return Some(self.home_page_for(current_path));
        }

        let page = self
            .config
            .languages
            .iter()
            .find(|l| l.code == language)
            .map(|l| l.page.as_str());
        if page.is_none() {
            debug!(language, "no page for language");
        }
        page
    }

    /// Home-language page matching the location named in `current_path`
    pub fn home_page_for(&self, current_path: &str) -> &str {
        let path = current_path.to_lowercase();
        self.config
            .location_pages
            .iter()
            .find(|location| path.contains(location.keyword.as_str()))
            .map(|location| location.page.as_str())
            .unwrap_or(self.config.home_page.as_str())
    }
}
