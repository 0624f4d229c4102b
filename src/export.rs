//! Flat CSV export of harvested records.

use std::path::Path;
use tracing::info;

use crate::error::CrawlError;
use crate::site::models::{Product, Review};

/// Writes the product collection to `path`: a header row in model field
/// order, then one row per record. An empty collection writes no file at
/// all.
pub fn write_products(path: &Path, products: &[Product]) -> Result<(), CrawlError> {
    if products.is_empty() {
        return Ok(());
    }

    let mut writer = csv::Writer::from_path(path)?;
    for product in products {
        writer.serialize(product)?;
    }
    writer.flush()?;

    info!("wrote {} products to {}", products.len(), path.display());
    Ok(())
}

/// Same contract as [`write_products`], for reviews.
pub fn write_reviews(path: &Path, reviews: &[Review]) -> Result<(), CrawlError> {
    if reviews.is_empty() {
        return Ok(());
    }

    let mut writer = csv::Writer::from_path(path)?;
    for review in reviews {
        writer.serialize(review)?;
    }
    writer.flush()?;

    info!("wrote {} reviews to {}", reviews.len(), path.display());
    Ok(())
}
