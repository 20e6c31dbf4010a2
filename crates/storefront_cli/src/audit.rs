//! HTML metadata extraction
//!
//! Pulls the SEO-relevant head elements out of one static page: title,
//! descriptions, canonical and `hreflang` links, Open Graph and Twitter tags,
//! and JSON-LD blocks.

use anyhow::{Context, Result};
use chardetng::EncodingDetector;
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// Directories never descended into
const SKIPPED_DIRS: &[&str] = &[".git", "node_modules"];

/// An alternate-language link
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Hreflang {
    pub hreflang: String,
    pub href: String,
}

/// One `<script type="application/ld+json">` block
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct JsonLdBlock {
    pub raw: String,
    pub json: Option<Value>,
}

impl JsonLdBlock {
    /// Parse the block, retrying with newlines flattened
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim().to_string();
        let json = serde_json::from_str(&raw)
            .or_else(|_| serde_json::from_str(&raw.replace('\n', " ")))
            .ok();
        Self { raw, json }
    }

    /// Short type label: the `@type`, `graph`, `object`, `list` or `raw`
    pub fn summary(&self) -> String {
        match &self.json {
            Some(Value::Object(map)) => match map.get("@type") {
                Some(Value::String(t)) if !t.is_empty() => t.clone(),
                Some(Value::Array(types)) if !types.is_empty() => types
                    .iter()
                    .map(|t| t.as_str().map(str::to_string).unwrap_or_else(|| t.to_string()))
                    .collect::<Vec<_>>()
                    .join(","),
                _ if matches!(map.get("@graph"), Some(Value::Array(_))) => "graph".to_string(),
                _ => "object".to_string(),
            },
            Some(Value::Array(_)) => "list".to_string(),
            _ => "raw".to_string(),
        }
    }
}

/// Metadata found in one page
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PageMeta {
    pub title: String,
    /// `meta[name=description]`, else `og:description`
    pub description: String,
    pub keywords: String,
    pub ai_summary: String,
    pub canonical: String,
    pub hreflangs: Vec<Hreflang>,
    pub og_title: String,
    pub og_description: String,
    pub og_image: String,
    pub twitter_card: String,
    pub json_ld: Vec<JsonLdBlock>,
}

/// Extract metadata from an HTML document
pub fn extract_meta(html: &str) -> PageMeta {
    let doc = Html::parse_document(html);

    let title = first(&doc, "title")
        .map(|el| el.text().collect::<String>().trim().to_string())
        .unwrap_or_default();

    let og_description = meta_content(&doc, "property", "og:description");
    let description = Some(meta_content(&doc, "name", "description"))
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| og_description.clone());

    let canonical = first(&doc, r#"link[rel~="canonical"]"#)
        .and_then(|el| el.value().attr("href"))
        .map(|href| href.trim().to_string())
        .unwrap_or_default();

    let hreflangs = all(&doc, r#"link[rel~="alternate"]"#)
        .into_iter()
        .filter_map(|el| {
            let hreflang = el.value().attr("hreflang").filter(|v| !v.is_empty())?;
            let href = el.value().attr("href").filter(|v| !v.is_empty())?;
            Some(Hreflang {
                hreflang: hreflang.to_string(),
                href: href.to_string(),
            })
        })
        .collect();

    let json_ld = all(&doc, r#"script[type="application/ld+json"]"#)
        .into_iter()
        .map(|el| el.text().collect::<String>())
        .filter(|text| !text.trim().is_empty())
        .map(|text| JsonLdBlock::parse(&text))
        .collect();

    PageMeta {
        title,
        description,
        keywords: meta_content(&doc, "name", "keywords"),
        ai_summary: meta_content(&doc, "name", "ai-summary"),
        canonical,
        hreflangs,
        og_title: meta_content(&doc, "property", "og:title"),
        og_description,
        og_image: meta_content(&doc, "property", "og:image"),
        twitter_card: meta_content(&doc, "name", "twitter:card"),
        json_ld,
    }
}

fn selector(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(selector) => Some(selector),
        Err(e) => {
            warn!("bad selector {:?}: {:?}", css, e);
            None
        }
    }
}

fn first<'a>(doc: &'a Html, css: &str) -> Option<ElementRef<'a>> {
    let selector = selector(css)?;
    doc.select(&selector).next()
}

fn all<'a>(doc: &'a Html, css: &str) -> Vec<ElementRef<'a>> {
    match selector(css) {
        Some(selector) => doc.select(&selector).collect(),
        None => Vec::new(),
    }
}

/// Trimmed `content` of the first `<meta {attr}="{value}">`
fn meta_content(doc: &Html, attr: &str, value: &str) -> String {
    first(doc, &format!(r#"meta[{}="{}"]"#, attr, value))
        .and_then(|el| el.value().attr("content"))
        .map(|content| content.trim().to_string())
        .unwrap_or_default()
}

/// Decode page bytes: UTF-8, then the detected encoding
pub fn decode_html(bytes: &[u8]) -> String {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return text.to_string();
    }
    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let encoding = detector.guess(None, true);
    debug!("decoding as {}", encoding.name());
    // Malformed sequences become U+FFFD either way
    let (text, _, _) = encoding.decode(bytes);
    text.into_owned()
}

/// Read and decode one page
pub fn read_page(path: &Path) -> Result<String> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(decode_html(&bytes))
}

fn is_skipped(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .map(|name| SKIPPED_DIRS.contains(&name))
            .unwrap_or(false)
}

fn is_html(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| matches!(ext.to_ascii_lowercase().as_str(), "html" | "htm"))
        .unwrap_or(false)
}

/// All `.html`/`.htm` files under `root`, sorted
pub fn find_html_files(root: &Path) -> Vec<PathBuf> {
    let mut pages: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_entry(|entry| !is_skipped(entry))
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() && is_html(entry.path()))
        .map(DirEntry::into_path)
        .collect();
    pages.sort();
    pages
}
