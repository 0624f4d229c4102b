//! Rendered-page retrieval through a headless browser.

use anyhow::{Context, Result};
use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions, Tab};
use rand::RngExt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace};
use url::Url;

use crate::config::Config;
use crate::error::CrawlError;

/// Trait for fetching fully rendered pages - enables fixture-backed fakes
/// in tests.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Navigates to `url`, blocks until an element matching
    /// `wait_selector` is in the DOM or the timeout elapses, then returns
    /// the rendered page source.
    async fn fetch(&self, url: &Url, wait_selector: &str) -> Result<String, CrawlError>;
}

/// Fetcher driving one headless Chrome tab, sequentially.
pub struct BrowserFetcher {
    // Dropping the browser handle closes the tab with it.
    _browser: Browser,
    tab: Arc<Tab>,
    timeout: Duration,
    delay_ms: u64,
    delay_jitter_ms: u64,
}

impl BrowserFetcher {
    /// Launches the browser and opens the single tab every fetch reuses.
    pub fn new(config: &Config) -> Result<Self> {
        let browser = Browser::new(LaunchOptions {
            headless: true,
            ..Default::default()
        })
        .context("Failed to launch headless browser")?;

        let tab = browser.new_tab().context("Failed to open browser tab")?;

        Ok(Self {
            _browser: browser,
            tab,
            timeout: Duration::from_secs(config.timeout_secs),
            delay_ms: config.delay_ms,
            delay_jitter_ms: config.delay_jitter_ms,
        })
    }

    /// Adds a random delay between fetches to mimic human pacing.
    async fn delay(&self) {
        if self.delay_ms == 0 {
            return;
        }

        let jitter = if self.delay_jitter_ms > 0 {
            rand::rng().random_range(0..=self.delay_jitter_ms)
        } else {
            0
        };

        let total_delay = self.delay_ms + jitter;
        trace!("delaying {}ms", total_delay);
        tokio::time::sleep(Duration::from_millis(total_delay)).await;
    }
}

#[async_trait]
impl PageFetcher for BrowserFetcher {
    async fn fetch(&self, url: &Url, wait_selector: &str) -> Result<String, CrawlError> {
        self.delay().await;

        debug!("GET {}", url);

        self.tab
            .navigate_to(url.as_str())
            .map_err(|e| CrawlError::browser(url, e))?;

        // The wait IS the readiness signal; its failure means the page
        // never rendered what we need.
        if self
            .tab
            .wait_for_element_with_custom_timeout(wait_selector, self.timeout)
            .is_err()
        {
            return Err(CrawlError::FetchTimeout {
                url: url.to_string(),
                selector: wait_selector.to_string(),
                timeout_secs: self.timeout.as_secs(),
            });
        }

        self.tab.get_content().map_err(|e| CrawlError::browser(url, e))
    }
}
