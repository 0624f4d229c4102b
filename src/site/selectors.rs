//! CSS selectors for the Amazon.fr markup contract.
//!
//! Every selector the extractor relies on lives here. These are
//! external-site dependencies and break when the site ships new markup;
//! when extraction fails, capture an HTML sample, fix the selector, and
//! add a fixture.

use scraper::Selector;
use std::sync::LazyLock;

/// Selectors for category/search listing pages.
pub mod listing {
    use super::*;

    /// Element the fetcher waits on before reading the page.
    pub static READY: &str = "div.s-main-slot";

    /// Search result card.
    pub static RESULT: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("[data-component-type='s-search-result']").unwrap());

    /// Product detail link inside a result card.
    pub static LINK: LazyLock<Selector> = LazyLock::new(|| {
        Selector::parse(
            "h2 a.a-link-normal, \
             h2 a.s-link-style",
        )
        .unwrap()
    });
}

/// Selectors for the shared pagination strip.
pub mod pagination {
    use super::*;

    /// The "next/last" pagination control.
    pub static LAST: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("ul.a-pagination li.a-last").unwrap());

    /// Anchor inside the control.
    pub static LINK: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").unwrap());

    /// Class marking the control as disabled (already on the last page).
    pub static DISABLED_CLASS: &str = "a-disabled";
}

/// Selectors for product detail pages.
pub mod product {
    use super::*;

    pub static READY: &str = "#productTitle";

    /// Product title.
    pub static TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("#productTitle").unwrap());

    /// Current price.
    pub static PRICE: LazyLock<Selector> = LazyLock::new(|| {
        Selector::parse(
            "#corePrice_feature_div .a-price .a-offscreen, \
             #priceblock_ourprice, \
             #priceblock_dealprice",
        )
        .unwrap()
    });

    /// Rating summary ("4,5 sur 5 étoiles").
    pub static RATING: LazyLock<Selector> = LazyLock::new(|| {
        Selector::parse(
            "#acrPopover span.a-icon-alt, \
             span[data-hook='rating-out-of-text']",
        )
        .unwrap()
    });

    /// Total review count ("1 234 évaluations").
    pub static REVIEW_COUNT: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("#acrCustomerReviewText").unwrap());

    /// Rows of the technical details table.
    pub static SPEC_ROW: LazyLock<Selector> = LazyLock::new(|| {
        Selector::parse(
            "#productDetails_techSpec_section_1 tr, \
             #productDetails_detailBullets_sections1 tr",
        )
        .unwrap()
    });

    /// Label cell of a spec row.
    pub static SPEC_LABEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("th").unwrap());

    /// Value cell of a spec row.
    pub static SPEC_VALUE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").unwrap());

    /// "See all reviews" call-to-action at the bottom of the review block.
    pub static ALL_REVIEWS_LINK: LazyLock<Selector> = LazyLock::new(|| {
        Selector::parse(
            "a[data-hook='see-all-reviews-link-foot'], \
             a[data-hook='see-all-reviews-link']",
        )
        .unwrap()
    });
}

/// Selectors for paginated review list pages.
pub mod review {
    use super::*;

    pub static READY: &str = "#cm_cr-review_list";

    /// One review container.
    pub static CONTAINER: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("div[data-hook='review']").unwrap());

    /// Reviewer display name.
    pub static AUTHOR: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("span.a-profile-name").unwrap());

    /// Star rating alt text ("4,5 sur 5 étoiles").
    pub static RATING: LazyLock<Selector> = LazyLock::new(|| {
        Selector::parse(
            "i[data-hook='review-star-rating'] span.a-icon-alt, \
             i[data-hook='cmps-review-star-rating'] span.a-icon-alt",
        )
        .unwrap()
    });

    /// Localized review date line.
    pub static DATE: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("span[data-hook='review-date']").unwrap());

    /// Review headline. The title anchor also carries the star icon, so
    /// the icon-alt span is excluded here.
    pub static TITLE: LazyLock<Selector> = LazyLock::new(|| {
        Selector::parse(
            "a[data-hook='review-title'] span:not(.a-icon-alt), \
             span[data-hook='review-title']",
        )
        .unwrap()
    });

    /// Review body.
    pub static BODY: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("span[data-hook='review-body']").unwrap());
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    #[test]
    fn test_selectors_compile() {
        // Force evaluation of all lazy selectors to ensure they compile
        let _ = &*listing::RESULT;
        let _ = &*listing::LINK;
        let _ = &*pagination::LAST;
        let _ = &*pagination::LINK;
        let _ = &*product::TITLE;
        let _ = &*product::PRICE;
        let _ = &*product::RATING;
        let _ = &*product::REVIEW_COUNT;
        let _ = &*product::SPEC_ROW;
        let _ = &*product::ALL_REVIEWS_LINK;
        let _ = &*review::CONTAINER;
        let _ = &*review::RATING;
        let _ = &*review::TITLE;
        let _ = &*review::BODY;
    }

    #[test]
    fn test_result_card_matching() {
        let html = Html::parse_document(
            r#"<div data-component-type="s-search-result" data-asin="B0777TMW1Y">
                <h2><a class="a-link-normal" href="/Arlo-Pro/dp/B0777TMW1Y/"><span>Arlo Pro</span></a></h2>
            </div>"#,
        );

        let cards: Vec<_> = html.select(&listing::RESULT).collect();
        assert_eq!(cards.len(), 1);

        let link = cards[0].select(&listing::LINK).next().unwrap();
        assert_eq!(link.value().attr("href"), Some("/Arlo-Pro/dp/B0777TMW1Y/"));
    }

    #[test]
    fn test_review_title_skips_star_icon() {
        let html = Html::parse_document(
            r#"<div data-hook="review">
                <a data-hook="review-title">
                    <i data-hook="review-star-rating"><span class="a-icon-alt">4,0 sur 5 étoiles</span></i>
                    <span>Bon rapport qualité-prix</span>
                </a>
            </div>"#,
        );

        let title = html.select(&review::TITLE).next().unwrap();
        let text = title.text().collect::<String>();
        assert_eq!(text.trim(), "Bon rapport qualité-prix");
    }
}
