//! avis-crawler - Amazon.fr category, product, and review crawler
//!
//! Drives a headless browser through a category listing, every product
//! detail page, and every review page, then exports CSV.

use anyhow::{Context, Result};
use avis_crawler::config::{Config, FailurePolicy};
use avis_crawler::crawl::{crawl_category, CrawlOptions};
use avis_crawler::export;
use avis_crawler::fetch::BrowserFetcher;
use avis_crawler::site::SiteParser;
use clap::Parser;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn, Level};
use tracing_subscriber::EnvFilter;
use url::Url;

#[derive(Parser)]
#[command(
    name = "avis-crawler",
    version,
    about = "Amazon.fr category, product, and review crawler",
    long_about = "Walks a category listing, visits each product page, pages through \
                  its reviews, and exports products and reviews as CSV."
)]
struct Cli {
    /// Category/search listing URL to start from
    #[arg(long)]
    category_url: Option<String>,

    /// Destination CSV for product records
    #[arg(long)]
    output_products: Option<PathBuf>,

    /// Destination CSV for review records
    #[arg(long)]
    output_reviews: Option<PathBuf>,

    /// Limit traversal to the first product/review of each page (smoke test)
    #[arg(long = "quite", alias = "quiet")]
    quite: bool,

    /// Enable verbose logging
    #[arg(long)]
    debug: bool,

    /// Path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Site root used to resolve relative links
    #[arg(long, env = "AVIS_BASE_URL")]
    base_url: Option<String>,

    /// Seconds to wait for the ready selector on each page
    #[arg(long)]
    timeout: Option<u64>,

    /// Delay between page fetches in milliseconds
    #[arg(long, env = "AVIS_DELAY")]
    delay: Option<u64>,

    /// What to do when a product traversal fails
    #[arg(long)]
    on_error: Option<FailurePolicy>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };

    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    // Load config with layered overrides
    let mut config = Config::load(cli.config.as_deref())?.with_env();

    // Apply CLI overrides
    if let Some(category_url) = cli.category_url {
        config.category_url = category_url;
    }
    if let Some(output_products) = cli.output_products {
        config.output_products = output_products;
    }
    if let Some(output_reviews) = cli.output_reviews {
        config.output_reviews = output_reviews;
    }
    if cli.quite {
        config.quiet = true;
    }
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    if let Some(timeout) = cli.timeout {
        config.timeout_secs = timeout;
    }
    if let Some(delay) = cli.delay {
        config.delay_ms = delay;
    }
    if let Some(on_error) = cli.on_error {
        config.on_error = on_error;
    }

    let start = Url::parse(&config.category_url)
        .with_context(|| format!("Invalid category URL: {}", config.category_url))?;
    let base = Url::parse(&config.base_url)
        .with_context(|| format!("Invalid base URL: {}", config.base_url))?;

    // Ctrl-C flips the flag; the category loop notices it between
    // products and returns whatever was accumulated so far.
    let cancel = Arc::new(AtomicBool::new(false));
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("interrupt received, finishing the product in progress");
                cancel.store(true, Ordering::Relaxed);
            }
        });
    }

    let fetcher = BrowserFetcher::new(&config).context("Failed to start the page fetcher")?;
    let parser = SiteParser::new(base);
    let options = CrawlOptions { quiet: config.quiet, policy: config.on_error };

    info!("starting category traversal at {}", start);

    let harvest = crawl_category(&fetcher, &parser, &start, &options, &cancel).await?;

    info!(
        "harvested {} products and {} reviews",
        harvest.products.len(),
        harvest.reviews.len()
    );

    if harvest.products.is_empty() {
        warn!("no products harvested, no output written");
    }

    export::write_products(&config.output_products, &harvest.products)?;
    export::write_reviews(&config.output_reviews, &harvest.reviews)?;

    Ok(())
}
