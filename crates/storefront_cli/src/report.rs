//! Audit aggregation and report output

use anyhow::{Context, Result};
use clap::ValueEnum;
use indexmap::IndexMap;
use serde::Serialize;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::audit::{self, JsonLdBlock, PageMeta};

/// Output formats selectable with `--formats`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ValueEnum)]
pub enum ReportFormat {
    Csv,
    Json,
}

/// One CSV row
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PageRecord {
    pub path: String,
    pub title: String,
    pub meta_description: String,
    pub meta_keywords: String,
    pub meta_ai_summary: String,
    pub canonical: String,
    /// `lang|href` pairs joined by `;`
    pub hreflangs: String,
    pub og_title: String,
    pub og_description: String,
    pub og_image: String,
    pub twitter_card: String,
    pub json_ld_count: usize,
    pub json_ld_summaries: String,
}

impl PageRecord {
    fn new(path: String, meta: &PageMeta) -> Self {
        Self {
            path,
            title: meta.title.clone(),
            meta_description: meta.description.clone(),
            meta_keywords: meta.keywords.clone(),
            meta_ai_summary: meta.ai_summary.clone(),
            canonical: meta.canonical.clone(),
            hreflangs: meta
                .hreflangs
                .iter()
                .map(|h| format!("{}|{}", h.hreflang, h.href))
                .collect::<Vec<_>>()
                .join(";"),
            og_title: meta.og_title.clone(),
            og_description: meta.og_description.clone(),
            og_image: meta.og_image.clone(),
            twitter_card: meta.twitter_card.clone(),
            json_ld_count: meta.json_ld.len(),
            json_ld_summaries: meta
                .json_ld
                .iter()
                .map(JsonLdBlock::summary)
                .collect::<Vec<_>>()
                .join(";"),
        }
    }
}

/// A page in the JSON report
#[derive(Clone, Debug, Serialize)]
pub struct PageResult {
    pub meta: PageRecord,
    pub json_ld_blocks: Vec<JsonLdBlock>,
}

/// Values shared by more than one page, with the pages sharing them.
/// Keys keep the order in which they were first seen.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Duplicates {
    pub titles: IndexMap<String, Vec<String>>,
    pub descriptions: IndexMap<String, Vec<String>>,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    pages: &'a [PageResult],
}

/// Result of auditing a site tree
#[derive(Debug, Default)]
pub struct AuditReport {
    pub pages: Vec<PageResult>,
    pub duplicates: Duplicates,
    pub no_canonical: Vec<String>,
}

impl AuditReport {
    /// Scan every page under `root`; unreadable pages are logged and skipped
    pub fn scan(root: &Path) -> Self {
        let files = audit::find_html_files(root);
        info!("Scanning {} pages under {}", files.len(), root.display());

        let pages = files.into_iter().filter_map(|path| match audit::read_page(&path) {
            Ok(html) => Some((path.display().to_string(), audit::extract_meta(&html))),
            Err(e) => {
                error!("Error parsing {}: {:#}", path.display(), e);
                None
            }
        });
        Self::from_pages(pages)
    }

    /// Aggregate already-extracted pages, in the given order
    pub fn from_pages(pages: impl IntoIterator<Item = (String, PageMeta)>) -> Self {
        let mut titles: IndexMap<String, Vec<String>> = IndexMap::new();
        let mut descriptions: IndexMap<String, Vec<String>> = IndexMap::new();
        let mut report = Self::default();

        for (path, meta) in pages {
            let record = PageRecord::new(path.clone(), &meta);
            if !record.title.is_empty() {
                titles.entry(record.title.clone()).or_default().push(path.clone());
            }
            if !record.meta_description.is_empty() {
                descriptions
                    .entry(record.meta_description.clone())
                    .or_default()
                    .push(path.clone());
            }
            if record.canonical.is_empty() {
                report.no_canonical.push(path);
            }
            report.pages.push(PageResult {
                meta: record,
                json_ld_blocks: meta.json_ld,
            });
        }

        titles.retain(|_, paths| paths.len() > 1);
        descriptions.retain(|_, paths| paths.len() > 1);
        report.duplicates = Duplicates {
            titles,
            descriptions,
        };
        report
    }

    pub fn json_ld_total(&self) -> usize {
        self.pages.iter().map(|p| p.meta.json_ld_count).sum()
    }

    /// Most duplicated titles first; ties keep first-seen order
    pub fn top_duplicate_titles(&self, limit: usize) -> Vec<(&str, usize)> {
        let mut top: Vec<(&str, usize)> = self
            .duplicates
            .titles
            .iter()
            .map(|(title, paths)| (title.as_str(), paths.len()))
            .collect();
        top.sort_by(|a, b| b.1.cmp(&a.1));
        top.truncate(limit);
        top
    }

    /// Write the requested reports next to `base`; returns the written paths
    pub fn write(&self, base: &Path, formats: &[ReportFormat]) -> Result<Vec<PathBuf>> {
        if let Some(dir) = base.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }

        let mut written = Vec::new();
        if formats.contains(&ReportFormat::Csv) {
            let path = with_suffix(base, ".csv");
            self.write_csv(&path)?;
            written.push(path);
        }
        if formats.contains(&ReportFormat::Json) {
            let path = with_suffix(base, ".json");
            write_json(&path, &JsonReport { pages: &self.pages })?;
            written.push(path);
        }
        let path = with_suffix(base, ".duplicates.json");
        write_json(&path, &self.duplicates)?;
        written.push(path);

        Ok(written)
    }

    fn write_csv(&self, path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        for page in &self.pages {
            writer.serialize(&page.meta)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Human-readable summary printed after an audit
    pub fn summary(&self, written: &[PathBuf]) -> String {
        let mut out = String::new();
        out.push_str("--- SEO AUDIT SUMMARY ---\n");
        out.push_str(&format!("Total HTML files scanned: {}\n", self.pages.len()));
        out.push_str(&format!("Pages without canonical: {}\n", self.no_canonical.len()));
        out.push_str(&format!("Total JSON-LD blocks found: {}\n", self.json_ld_total()));
        out.push_str("Top duplicated titles (exact matches):\n");
        for (title, count) in self.top_duplicate_titles(10) {
            out.push_str(&format!("  \"{}\" -> {} pages\n", title, count));
        }
        out.push_str("\nReports generated:\n");
        for path in written {
            out.push_str(&format!("  - {}\n", path.display()));
        }
        out
    }
}

fn with_suffix(base: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = base.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    writer.flush()?;
    Ok(())
}
