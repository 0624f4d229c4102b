//! Value records produced by the crawl.

use serde::{Deserialize, Serialize};

/// One product detail page, flattened.
///
/// Numeric-looking fields stay strings: they are exported verbatim as the
/// site printed them (`"4,5"`, `"1 234"`), with locale intact. Field order
/// is the CSV column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Product title as shown on the detail page
    pub name: String,
    /// Opaque catalog identifier (ASIN)
    pub id: String,
    /// Currency-formatted price, absent when the page shows none
    pub price: Option<String>,
    /// Decimal rating lifted from the localized "x sur 5" phrase
    pub average_rating: String,
    /// Total review count as printed
    pub review_count: String,
}

/// One user review, tagged with the product it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    /// Catalog identifier of the parent [`Product`]
    pub product_id: String,
    pub reviewer_name: String,
    /// Decimal rating lifted from the localized "x sur 5 étoiles" phrase
    pub rating: String,
    /// Localized review date, unparsed
    pub date: String,
    pub short_title: String,
    pub full_text: String,
}

/// Everything one category traversal accumulated.
///
/// Each traversal level builds its own collections and appends them into
/// the caller's by value; nothing is shared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Harvest {
    pub products: Vec<Product>,
    pub reviews: Vec<Review>,
}

impl Harvest {
    /// Returns true if the run produced nothing at all.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty() && self.reviews.is_empty()
    }
}
