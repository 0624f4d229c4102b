//! Field extraction from listing, product, and review pages.

use regex::Regex;
use scraper::{ElementRef, Html};
use std::sync::LazyLock;
use tracing::{debug, trace, warn};
use url::Url;

use crate::error::CrawlError;
use crate::site::identity::CatalogIdResolver;
use crate::site::models::{Product, Review};
use crate::site::selectors::{listing, pagination, product, review};

/// Localized rating phrase, e.g. "4,5 sur 5 étoiles" or "4 sur 5".
static RATING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:,\d+)?)\s*sur\s*5").unwrap());

/// Query string that switches the review list to the full view.
const ALL_REVIEWS_QUERY: &str = "ie=UTF8&reviewerType=all_reviews";

/// Extracts structured records from rendered page source.
///
/// All methods take the raw HTML and parse it internally, so callers can
/// hold results across await points.
pub struct SiteParser {
    base: Url,
    ids: CatalogIdResolver,
}

impl SiteParser {
    /// Creates a parser resolving relative links against `base`.
    pub fn new(base: Url) -> Self {
        Self { base, ids: CatalogIdResolver::new() }
    }

    /// Creates a parser with a custom identifier resolver chain.
    pub fn with_resolver(base: Url, ids: CatalogIdResolver) -> Self {
        Self { base, ids }
    }

    /// Collects the product detail links of a listing page, absolutized.
    /// Cards without a link are skipped.
    pub fn product_links(&self, html: &str) -> Vec<Url> {
        let document = Html::parse_document(html);
        let mut links = Vec::new();

        for card in document.select(&listing::RESULT) {
            let Some(href) = card
                .select(&listing::LINK)
                .next()
                .and_then(|a| a.value().attr("href"))
            else {
                trace!("skipping result card without detail link");
                continue;
            };

            match self.base.join(href) {
                Ok(url) => links.push(url),
                Err(e) => warn!("unresolvable product link `{}`: {}", href, e),
            }
        }

        debug!("listing page yielded {} product links", links.len());
        links
    }

    /// Locates the "last/next" pagination control and returns the absolute
    /// URL of the following page.
    ///
    /// Returns `None` when the control is absent, marked disabled (already
    /// on the last page), or its href cannot be resolved — callers cannot
    /// tell these apart, they all mean "stop here".
    pub fn next_page(&self, html: &str) -> Option<Url> {
        let document = Html::parse_document(html);
        let control = document.select(&pagination::LAST).next()?;

        let classes = control.value().attr("class").unwrap_or_default();
        if classes.split_whitespace().any(|c| c == pagination::DISABLED_CLASS) {
            trace!("pagination control disabled, last page reached");
            return None;
        }

        let href = control
            .select(&pagination::LINK)
            .next()
            .and_then(|a| a.value().attr("href"))?;

        match self.base.join(href) {
            Ok(url) => Some(url),
            Err(e) => {
                warn!("unresolvable pagination link `{}`: {}", href, e);
                None
            }
        }
    }

    /// Extracts the product fields of a detail page.
    ///
    /// Title, rating, review count, and catalog id are required; the price
    /// degrades to `None` when the page shows none.
    pub fn parse_product(&self, html: &str, url: &Url) -> Result<Product, CrawlError> {
        let document = Html::parse_document(html);

        let name = document
            .select(&product::TITLE)
            .next()
            .map(|e| e.text().collect::<String>().trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or(CrawlError::MissingField { field: "product title" })?;

        let price = document
            .select(&product::PRICE)
            .next()
            .map(|e| e.text().collect::<String>().trim().to_string())
            .filter(|p| !p.is_empty());

        let average_rating = document
            .select(&product::RATING)
            .next()
            .map(|e| e.text().collect::<String>())
            .and_then(|text| rating_from_phrase(&text))
            .ok_or(CrawlError::MissingField { field: "product rating" })?;

        let review_count = document
            .select(&product::REVIEW_COUNT)
            .next()
            .map(|e| digits_of(&e.text().collect::<String>()))
            .filter(|n| !n.is_empty())
            .ok_or(CrawlError::MissingField { field: "review count" })?;

        let id = self
            .ids
            .resolve(&document, url)
            .ok_or(CrawlError::MissingField { field: "catalog id" })?;

        trace!("parsed product {} ({})", id, name);

        Ok(Product { name, id, price, average_rating, review_count })
    }

    /// Reads the "see all reviews" call-to-action of a detail page and
    /// rewrites its query string to request the full review list view.
    /// `None` means the product has no reviews to walk.
    pub fn all_reviews_url(&self, html: &str) -> Option<Url> {
        let document = Html::parse_document(html);
        let href = document
            .select(&product::ALL_REVIEWS_LINK)
            .next()
            .and_then(|a| a.value().attr("href"))?;

        match self.base.join(href) {
            Ok(mut url) => {
                url.set_query(Some(ALL_REVIEWS_QUERY));
                Some(url)
            }
            Err(e) => {
                warn!("unresolvable review link `{}`: {}", href, e);
                None
            }
        }
    }

    /// Extracts every review container of a review-list page, tagged with
    /// the owning product's identifier.
    pub fn parse_reviews(&self, html: &str, product_id: &str) -> Result<Vec<Review>, CrawlError> {
        let document = Html::parse_document(html);
        let mut reviews = Vec::new();

        for container in document.select(&review::CONTAINER) {
            reviews.push(self.parse_review(container, product_id)?);
        }

        debug!("review page yielded {} reviews for {}", reviews.len(), product_id);
        Ok(reviews)
    }

    /// Extracts one review. The rating phrase is required; the remaining
    /// fields degrade to empty strings when their markup is absent.
    fn parse_review(
        &self,
        container: ElementRef,
        product_id: &str,
    ) -> Result<Review, CrawlError> {
        let rating = container
            .select(&review::RATING)
            .next()
            .map(|e| e.text().collect::<String>())
            .and_then(|text| rating_from_phrase(&text))
            .ok_or(CrawlError::MissingField { field: "review rating" })?;

        let reviewer_name = first_text(container, &review::AUTHOR);
        let date = first_text(container, &review::DATE);
        let short_title = first_text(container, &review::TITLE);
        let full_text = first_text(container, &review::BODY);

        Ok(Review {
            product_id: product_id.to_string(),
            reviewer_name,
            rating,
            date,
            short_title,
            full_text,
        })
    }
}

/// Trimmed text of the first match, or empty.
fn first_text(scope: ElementRef, selector: &scraper::Selector) -> String {
    scope
        .select(selector)
        .next()
        .map(|e| e.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

/// Pulls the decimal out of a localized "x sur 5" phrase, comma intact.
fn rating_from_phrase(text: &str) -> Option<String> {
    RATING_RE.captures(text).map(|caps| caps[1].to_string())
}

/// Keeps only the digits of a localized count ("1 234 évaluations" -> "1234").
fn digits_of(text: &str) -> String {
    text.chars().filter(|c| c.is_ascii_digit()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_parser() -> SiteParser {
        SiteParser::new(Url::parse("https://www.amazon.fr").unwrap())
    }

    fn detail_url() -> Url {
        Url::parse("https://www.amazon.fr/Arlo-Pro/dp/B0777TMW1Y/ref=sr_1_1").unwrap()
    }

    fn product_html(price_block: &str) -> String {
        format!(
            r#"<html><body>
                <span id="productTitle"> Arlo Pro VMS4330P </span>
                {}
                <span id="acrPopover"><span class="a-icon-alt">4,5 sur 5 étoiles</span></span>
                <span id="acrCustomerReviewText">1 234 évaluations</span>
            </body></html>"#,
            price_block
        )
    }

    // Rating phrase parsing

    #[test]
    fn test_rating_from_phrase() {
        assert_eq!(rating_from_phrase("4,5 sur 5 étoiles"), Some("4,5".to_string()));
        assert_eq!(rating_from_phrase("3 sur 5 étoiles"), Some("3".to_string()));
        assert_eq!(rating_from_phrase("5,0 sur 5"), Some("5,0".to_string()));
        assert_eq!(rating_from_phrase("quatre étoiles"), None);
        assert_eq!(rating_from_phrase(""), None);
    }

    #[test]
    fn test_digits_of() {
        assert_eq!(digits_of("1 234 évaluations"), "1234");
        assert_eq!(digits_of("57 évaluations"), "57");
        assert_eq!(digits_of("évaluations"), "");
    }

    // Pagination walker

    #[test]
    fn test_next_page_enabled() {
        let parser = make_parser();
        let html = r#"<ul class="a-pagination">
            <li class="a-last"><a href="/s?k=arlo&page=2">Suivant</a></li>
        </ul>"#;

        let next = parser.next_page(html).unwrap();
        assert_eq!(next.as_str(), "https://www.amazon.fr/s?k=arlo&page=2");
    }

    #[test]
    fn test_next_page_disabled() {
        let parser = make_parser();
        let html = r#"<ul class="a-pagination">
            <li class="a-disabled a-last"><a href="/s?k=arlo&page=3">Suivant</a></li>
        </ul>"#;

        assert!(parser.next_page(html).is_none());
    }

    #[test]
    fn test_next_page_absent() {
        let parser = make_parser();
        assert!(parser.next_page("<html><body></body></html>").is_none());
    }

    #[test]
    fn test_next_page_control_without_anchor() {
        // Control present, anchor missing: indistinguishable from absence.
        let parser = make_parser();
        let html = r#"<ul class="a-pagination"><li class="a-last">Suivant</li></ul>"#;
        assert!(parser.next_page(html).is_none());
    }

    #[test]
    fn test_next_page_unresolvable_href() {
        // Href present but not resolvable: also "no next page".
        let parser = make_parser();
        let html = r##"<ul class="a-pagination">
            <li class="a-last"><a href="http://[broken">Suivant</a></li>
        </ul>"##;
        assert!(parser.next_page(html).is_none());
    }

    // Product extraction

    #[test]
    fn test_parse_product_full() {
        let parser = make_parser();
        let html = product_html(
            r#"<div id="corePrice_feature_div">
                <span class="a-price"><span class="a-offscreen">449,99 €</span></span>
            </div>"#,
        );

        let product = parser.parse_product(&html, &detail_url()).unwrap();
        assert_eq!(product.name, "Arlo Pro VMS4330P");
        assert_eq!(product.id, "B0777TMW1Y");
        assert_eq!(product.price, Some("449,99 €".to_string()));
        assert_eq!(product.average_rating, "4,5");
        assert_eq!(product.review_count, "1234");
    }

    #[test]
    fn test_parse_product_without_price() {
        let parser = make_parser();
        let html = product_html("");

        let product = parser.parse_product(&html, &detail_url()).unwrap();
        assert!(product.price.is_none());
    }

    #[test]
    fn test_parse_product_missing_title() {
        let parser = make_parser();
        let html = r#"<html><body><div id="dp"></div></body></html>"#;

        let err = parser.parse_product(html, &detail_url()).unwrap_err();
        assert!(matches!(err, CrawlError::MissingField { field: "product title" }));
    }

    #[test]
    fn test_parse_product_malformed_rating() {
        let parser = make_parser();
        let html = r#"<html><body>
            <span id="productTitle">Arlo Pro</span>
            <span id="acrPopover"><span class="a-icon-alt">pas encore noté</span></span>
            <span id="acrCustomerReviewText">12 évaluations</span>
        </body></html>"#;

        let err = parser.parse_product(html, &detail_url()).unwrap_err();
        assert!(matches!(err, CrawlError::MissingField { field: "product rating" }));
    }

    #[test]
    fn test_parse_product_with_custom_resolver_chain() {
        use crate::site::identity::PathSegmentResolver;

        // A chain with only the URL rule ignores the spec table entirely.
        let ids = CatalogIdResolver::with_strategies(vec![Box::new(PathSegmentResolver::default())]);
        let parser =
            SiteParser::with_resolver(Url::parse("https://www.amazon.fr").unwrap(), ids);

        let html = format!(
            "{}{}",
            product_html(""),
            r#"<table id="productDetails_techSpec_section_1">
                <tr><th>ASIN</th><td>B0TABLE111</td></tr>
            </table>"#
        );

        let product = parser.parse_product(&html, &detail_url()).unwrap();
        assert_eq!(product.id, "B0777TMW1Y");
    }

    #[test]
    fn test_parse_product_id_prefers_spec_table() {
        let parser = make_parser();
        let html = format!(
            "{}{}",
            product_html(""),
            r#"<table id="productDetails_techSpec_section_1">
                <tr><th>ASIN</th><td>B0TABLE111</td></tr>
            </table>"#
        );

        let product = parser.parse_product(&html, &detail_url()).unwrap();
        assert_eq!(product.id, "B0TABLE111");
    }

    // Listing links

    #[test]
    fn test_product_links_absolutized() {
        let parser = make_parser();
        let html = r#"
            <div data-component-type="s-search-result">
                <h2><a class="a-link-normal" href="/Arlo-Pro/dp/B0777TMW1Y/"><span>Arlo</span></a></h2>
            </div>
            <div data-component-type="s-search-result">
                <h2><a class="a-link-normal" href="https://www.amazon.fr/Ring/dp/B01HSIIFQ2/"><span>Ring</span></a></h2>
            </div>
            <div data-component-type="s-search-result">
                <h2><span>Carte sans lien</span></h2>
            </div>"#;

        let links = parser.product_links(html);
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].as_str(), "https://www.amazon.fr/Arlo-Pro/dp/B0777TMW1Y/");
        assert_eq!(links[1].as_str(), "https://www.amazon.fr/Ring/dp/B01HSIIFQ2/");
    }

    // Reviews entry point

    #[test]
    fn test_all_reviews_url_rewrites_query() {
        let parser = make_parser();
        let html = r#"<a data-hook="see-all-reviews-link-foot"
            href="/Arlo-Pro/product-reviews/B0777TMW1Y/ref=foo?filterByStar=critical">Voir tous les avis</a>"#;

        let url = parser.all_reviews_url(html).unwrap();
        assert_eq!(url.path(), "/Arlo-Pro/product-reviews/B0777TMW1Y/ref=foo");
        assert_eq!(url.query(), Some("ie=UTF8&reviewerType=all_reviews"));
    }

    #[test]
    fn test_all_reviews_url_absent() {
        let parser = make_parser();
        assert!(parser.all_reviews_url("<html><body></body></html>").is_none());
    }

    // Review extraction

    #[test]
    fn test_parse_reviews() {
        let parser = make_parser();
        let html = r#"<div id="cm_cr-review_list">
            <div data-hook="review">
                <span class="a-profile-name">Claire D.</span>
                <a data-hook="review-title">
                    <i data-hook="review-star-rating"><span class="a-icon-alt">4,5 sur 5 étoiles</span></i>
                    <span> Très bon produit </span>
                </a>
                <span data-hook="review-date">Évalué en France le 12 mars 2023</span>
                <span data-hook="review-body"> Installation simple, image nette. </span>
            </div>
            <div data-hook="review">
                <span class="a-profile-name">Marc</span>
                <a data-hook="review-title">
                    <i data-hook="review-star-rating"><span class="a-icon-alt">2 sur 5 étoiles</span></i>
                    <span>Déçu</span>
                </a>
                <span data-hook="review-date">Évalué en France le 3 janvier 2023</span>
                <span data-hook="review-body">Batterie trop faible.</span>
            </div>
        </div>"#;

        let reviews = parser.parse_reviews(html, "B0777TMW1Y").unwrap();
        assert_eq!(reviews.len(), 2);

        let first = &reviews[0];
        assert_eq!(first.product_id, "B0777TMW1Y");
        assert_eq!(first.reviewer_name, "Claire D.");
        assert_eq!(first.rating, "4,5");
        assert_eq!(first.date, "Évalué en France le 12 mars 2023");
        assert_eq!(first.short_title, "Très bon produit");
        assert_eq!(first.full_text, "Installation simple, image nette.");

        assert_eq!(reviews[1].rating, "2");
    }

    #[test]
    fn test_parse_reviews_malformed_rating_propagates() {
        let parser = make_parser();
        let html = r#"<div data-hook="review">
            <span class="a-profile-name">Anonyme</span>
            <i data-hook="review-star-rating"><span class="a-icon-alt">étoiles</span></i>
        </div>"#;

        let err = parser.parse_reviews(html, "B0777TMW1Y").unwrap_err();
        assert!(matches!(err, CrawlError::MissingField { field: "review rating" }));
    }

    #[test]
    fn test_parse_reviews_empty_page() {
        let parser = make_parser();
        let reviews = parser.parse_reviews("<html><body></body></html>", "X").unwrap();
        assert!(reviews.is_empty());
    }

    #[test]
    fn test_parse_review_tolerates_missing_optional_markup() {
        let parser = make_parser();
        let html = r#"<div data-hook="review">
            <i data-hook="review-star-rating"><span class="a-icon-alt">3 sur 5 étoiles</span></i>
        </div>"#;

        let reviews = parser.parse_reviews(html, "B0777TMW1Y").unwrap();
        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews[0].rating, "3");
        assert!(reviews[0].reviewer_name.is_empty());
        assert!(reviews[0].short_title.is_empty());
        assert!(reviews[0].full_text.is_empty());
    }
}
