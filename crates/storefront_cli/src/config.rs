//! `storefront.toml` handling
//!
//! The file holds a [`SiteConfig`]; every table is optional.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use storefront_core::SiteConfig;
use tracing::debug;

/// Default configuration file name
pub const CONFIG_FILE: &str = "storefront.toml";

/// Load the site configuration
///
/// An explicit path must exist. Without one, `storefront.toml` in `dir` is
/// used when present and defaults otherwise.
pub fn load_site_config(explicit: Option<&Path>, dir: &Path) -> Result<SiteConfig> {
    let path: PathBuf = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let candidate = dir.join(CONFIG_FILE);
            if !candidate.exists() {
                debug!("no {} in {}, using defaults", CONFIG_FILE, dir.display());
                return Ok(SiteConfig::default());
            }
            candidate
        }
    };

    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    SiteConfig::from_toml_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_site_config(None, dir.path()).unwrap();
        assert_eq!(config, SiteConfig::default());
    }

    #[test]
    fn test_loads_overrides() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            "scroll_step = 10\n\n[contact]\nphone = \"+10000000\"\n",
        )
        .unwrap();

        let config = load_site_config(None, dir.path()).unwrap();
        assert_eq!(config.scroll_step, 10);
        assert_eq!(config.contact.phone, "+10000000");
        assert_eq!(config.selectors, SiteConfig::default().selectors);
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(load_site_config(Some(&missing), dir.path()).is_err());
    }

    #[test]
    fn test_invalid_step_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("site.toml");
        fs::write(&path, "scroll_step = 0\n").unwrap();
        let err = load_site_config(Some(&path), dir.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("scroll_step"));
    }
}
