//! Single-product traversal: detail page plus its paginated reviews.

use std::collections::HashSet;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::CrawlError;
use crate::fetch::PageFetcher;
use crate::site::models::{Product, Review};
use crate::site::selectors;
use crate::site::SiteParser;

/// Fetches one product page, extracts its fields, then walks the review
/// list pages and collects every review tagged with the product's id.
///
/// Extraction failures propagate; there is no catch at this level. The
/// category loop decides what a failure means.
pub async fn crawl_product<F>(
    fetcher: &F,
    parser: &SiteParser,
    url: &Url,
    quiet: bool,
) -> Result<(Product, Vec<Review>), CrawlError>
where
    F: PageFetcher + ?Sized,
{
    let html = fetcher.fetch(url, selectors::product::READY).await?;
    let product = parser.parse_product(&html, url)?;

    info!("product {} ({})", product.id, product.name);

    let mut reviews = Vec::new();

    let Some(first_page) = parser.all_reviews_url(&html) else {
        debug!("no review link on {}", url);
        return Ok((product, reviews));
    };

    let mut page_url = first_page;
    // Guards against a review pagination loop pointing back at itself.
    let mut visited: HashSet<String> = HashSet::new();

    loop {
        if !visited.insert(page_url.to_string()) {
            warn!("review pagination cycle at {}, stopping", page_url);
            break;
        }

        let html = fetcher.fetch(&page_url, selectors::review::READY).await?;
        let mut page_reviews = parser.parse_reviews(&html, &product.id)?;

        if quiet {
            page_reviews.truncate(1);
        }
        reviews.extend(page_reviews);

        if quiet {
            break;
        }

        match parser.next_page(&html) {
            Some(next) => page_url = next,
            None => break,
        }
    }

    debug!("collected {} reviews for {}", reviews.len(), product.id);
    Ok((product, reviews))
}
