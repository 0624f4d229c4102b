//! Shared fixtures for traversal tests: a fixture-backed fetcher and
//! small page builders.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use url::Url;

use crate::error::CrawlError;
use crate::fetch::PageFetcher;

/// Fetcher serving canned HTML by exact URL.
pub struct MockFetcher {
    pages: HashMap<String, String>,
    fetches: AtomicU32,
    cancel_on: Option<(String, Arc<AtomicBool>)>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self { pages: HashMap::new(), fetches: AtomicU32::new(0), cancel_on: None }
    }

    pub fn insert(&mut self, url: &str, html: String) {
        self.pages.insert(url.to_string(), html);
    }

    /// Raises `flag` once `url` has been served, simulating an interrupt
    /// that lands mid-run.
    pub fn cancel_after(&mut self, url: &str, flag: Arc<AtomicBool>) {
        self.cancel_on = Some((url.to_string(), flag));
    }

    pub fn fetch_count(&self) -> u32 {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageFetcher for MockFetcher {
    async fn fetch(&self, url: &Url, _wait_selector: &str) -> Result<String, CrawlError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        let html = self.pages.get(url.as_str()).cloned().ok_or_else(|| CrawlError::Browser {
            url: url.to_string(),
            message: "no fixture for url".to_string(),
        })?;

        if let Some((trigger, flag)) = &self.cancel_on {
            if trigger == url.as_str() {
                flag.store(true, Ordering::Relaxed);
            }
        }

        Ok(html)
    }
}

fn pagination_strip(next: Option<&str>) -> String {
    match next {
        Some(href) => format!(
            r#"<ul class="a-pagination"><li class="a-last"><a href="{}">Suivant</a></li></ul>"#,
            href
        ),
        None => {
            r#"<ul class="a-pagination"><li class="a-disabled a-last">Suivant</li></ul>"#.to_string()
        }
    }
}

/// Builds a listing page with one result card per href.
pub fn listing_page(hrefs: &[&str], next: Option<&str>) -> String {
    let mut html = String::from(r#"<html><body><div class="s-main-slot">"#);
    for href in hrefs {
        html.push_str(&format!(
            r#"<div data-component-type="s-search-result">
                <h2><a class="a-link-normal" href="{}"><span>Produit</span></a></h2>
            </div>"#,
            href
        ));
    }
    html.push_str("</div>");
    html.push_str(&pagination_strip(next));
    html.push_str("</body></html>");
    html
}

/// Builds a product detail page. The catalog id lands in the spec table.
pub fn product_page(
    title: &str,
    asin: &str,
    price: Option<&str>,
    with_reviews_link: bool,
) -> String {
    let price_block = price
        .map(|p| {
            format!(
                r#"<div id="corePrice_feature_div">
                    <span class="a-price"><span class="a-offscreen">{}</span></span>
                </div>"#,
                p
            )
        })
        .unwrap_or_default();

    let reviews_link = if with_reviews_link {
        format!(
            r#"<a data-hook="see-all-reviews-link-foot" href="/product-reviews/{}/">Voir tous les avis</a>"#,
            asin
        )
    } else {
        String::new()
    };

    format!(
        r#"<html><body>
            <span id="productTitle">{}</span>
            {}
            <span id="acrPopover"><span class="a-icon-alt">4,2 sur 5 étoiles</span></span>
            <span id="acrCustomerReviewText">57 évaluations</span>
            <table id="productDetails_techSpec_section_1">
                <tr><th>ASIN</th><td>{}</td></tr>
            </table>
            {}
        </body></html>"#,
        title, price_block, asin, reviews_link
    )
}

/// Builds a review-list page with one review per reviewer name.
pub fn review_page(reviewers: &[&str], next: Option<&str>) -> String {
    let mut html = String::from(r#"<html><body><div id="cm_cr-review_list">"#);
    for reviewer in reviewers {
        html.push_str(&format!(
            r#"<div data-hook="review">
                <span class="a-profile-name">{}</span>
                <a data-hook="review-title">
                    <i data-hook="review-star-rating"><span class="a-icon-alt">4,0 sur 5 étoiles</span></i>
                    <span>Avis de {}</span>
                </a>
                <span data-hook="review-date">Évalué en France le 1 février 2023</span>
                <span data-hook="review-body">Texte de l'avis de {}.</span>
            </div>"#,
            reviewer, reviewer, reviewer
        ));
    }
    html.push_str("</div>");
    html.push_str(&pagination_strip(next));
    html.push_str("</body></html>");
    html
}
