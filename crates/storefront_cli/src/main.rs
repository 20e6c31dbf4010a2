//! Storefront CLI
//!
//! Offline tooling for the storefront site: SEO metadata audits and the
//! language routing table.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod audit;
mod config;
mod report;

use report::{AuditReport, ReportFormat};
use storefront_core::LanguageRouter;

#[derive(Parser)]
#[command(name = "storefront")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Storefront site tooling", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Site configuration file (defaults to ./storefront.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Audit SEO and AI metadata of the static HTML pages
    Audit {
        /// Root directory to scan
        #[arg(short, long, default_value = ".")]
        root: PathBuf,

        /// Output base path (without extension)
        #[arg(short, long)]
        output: PathBuf,

        /// Comma separated report formats
        #[arg(short, long, value_enum, value_delimiter = ',', default_value = "csv,json")]
        formats: Vec<ReportFormat>,
    },

    /// Print where each language button leads from a page
    Routes {
        /// Current page path
        #[arg(short, long, default_value = "/")]
        path: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Audit {
            root,
            output,
            formats,
        } => cmd_audit(&root, &output, &formats),

        Commands::Routes { path } => cmd_routes(cli.config.as_deref(), &path),
    }
}

fn cmd_audit(root: &Path, output: &Path, formats: &[ReportFormat]) -> Result<()> {
    if !root.is_dir() {
        anyhow::bail!("Root '{}' is not a directory", root.display());
    }

    let report = AuditReport::scan(root);
    let written = report.write(output, formats)?;
    info!("Audit finished: {} pages", report.pages.len());

    print!("{}", report.summary(&written));
    Ok(())
}

fn cmd_routes(config_path: Option<&Path>, current_path: &str) -> Result<()> {
    let config = config::load_site_config(config_path, Path::new("."))?;
    let router = LanguageRouter::new(config.routing);

    println!("Language routes from {}:", current_path);
    for language in router.languages() {
        match router.resolve(language, current_path) {
            Some(page) => println!("  {:<4} -> {}", language, page),
            None => println!("  {:<4} -> (unresolved)", language),
        }
    }
    Ok(())
}
