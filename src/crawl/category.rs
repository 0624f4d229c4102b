//! Category traversal: the loop that drives everything else.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::FailurePolicy;
use crate::crawl::product::crawl_product;
use crate::error::CrawlError;
use crate::fetch::PageFetcher;
use crate::site::models::{Harvest, Product, Review};
use crate::site::selectors;
use crate::site::SiteParser;

/// Retry policy bounds.
const RETRY_ATTEMPTS: u32 = 3;
const RETRY_BASE_BACKOFF_MS: u64 = 500;

/// Traversal knobs threaded down from the CLI/config.
#[derive(Debug, Clone, Copy)]
pub struct CrawlOptions {
    /// First element per page, first page per level
    pub quiet: bool,
    /// What a failed product traversal means for the run
    pub policy: FailurePolicy,
}

/// Walks listing pages, traverses every product found, and accumulates
/// products and reviews.
///
/// The cancellation flag is honored at the listing-page boundary and
/// between products; an in-progress product traversal always runs to
/// completion first. A raised flag returns the partial accumulation as
/// `Ok` — that is the single deliberate partial-failure affordance here.
/// Everything else propagates per the failure policy.
pub async fn crawl_category<F>(
    fetcher: &F,
    parser: &SiteParser,
    start: &Url,
    options: &CrawlOptions,
    cancel: &AtomicBool,
) -> Result<Harvest, CrawlError>
where
    F: PageFetcher + ?Sized,
{
    let mut harvest = Harvest::default();
    // Guards against a listing pagination loop pointing back at itself.
    let mut visited: HashSet<String> = HashSet::new();
    let mut page_url = start.clone();

    'pages: loop {
        if cancel.load(Ordering::Relaxed) {
            info!("interrupted, returning partial results");
            break;
        }

        if !visited.insert(page_url.to_string()) {
            warn!("listing pagination cycle at {}, stopping", page_url);
            break;
        }

        let html = fetcher.fetch(&page_url, selectors::listing::READY).await?;

        let mut links = parser.product_links(&html);
        if options.quiet {
            links.truncate(1);
        }

        for link in &links {
            if cancel.load(Ordering::Relaxed) {
                info!("interrupted, returning partial results");
                break 'pages;
            }

            if let Some((product, reviews)) =
                traverse_product(fetcher, parser, link, options).await?
            {
                harvest.products.push(product);
                harvest.reviews.extend(reviews);
            }
        }

        if options.quiet {
            break;
        }

        match parser.next_page(&html) {
            Some(next) => page_url = next,
            None => break,
        }
    }

    debug!(
        "category traversal done: {} products, {} reviews",
        harvest.products.len(),
        harvest.reviews.len()
    );
    Ok(harvest)
}

/// Runs one product traversal under the configured failure policy.
/// `Ok(None)` means the product was skipped.
async fn traverse_product<F>(
    fetcher: &F,
    parser: &SiteParser,
    url: &Url,
    options: &CrawlOptions,
) -> Result<Option<(Product, Vec<Review>)>, CrawlError>
where
    F: PageFetcher + ?Sized,
{
    match options.policy {
        FailurePolicy::Abort => crawl_product(fetcher, parser, url, options.quiet).await.map(Some),

        FailurePolicy::Skip => match crawl_product(fetcher, parser, url, options.quiet).await {
            Ok(outcome) => Ok(Some(outcome)),
            Err(e) => {
                warn!("skipping {}: {}", url, e);
                Ok(None)
            }
        },

        FailurePolicy::Retry => {
            let mut backoff = Duration::from_millis(RETRY_BASE_BACKOFF_MS);
            let mut attempt = 1;
            loop {
                match crawl_product(fetcher, parser, url, options.quiet).await {
                    Ok(outcome) => return Ok(Some(outcome)),
                    Err(e) if attempt < RETRY_ATTEMPTS => {
                        warn!(
                            "attempt {}/{} failed for {}: {}, retrying in {:?}",
                            attempt, RETRY_ATTEMPTS, url, e, backoff
                        );
                        tokio::time::sleep(backoff).await;
                        backoff *= 2;
                        attempt += 1;
                    }
                    Err(e) => return Err(e),
                }
            }
        }
    }
}
