//! Catalog identifier resolution strategies.
//!
//! The identifier is preferably read out of the technical details table;
//! when the table is missing it falls back to a fixed position in the
//! product URL path. Both rules are pluggable behind a trait so a markup
//! change only swaps a strategy.

use scraper::Html;
use url::Url;

use crate::site::selectors::product;

/// A strategy for finding the catalog identifier of a product page.
pub trait IdentifierResolver: Send + Sync {
    /// Returns the identifier, or `None` if this strategy does not apply.
    fn resolve(&self, document: &Html, url: &Url) -> Option<String>;

    /// Short label for logging.
    fn description(&self) -> &'static str;
}

/// Reads the identifier from the labeled technical-spec table row.
pub struct SpecTableResolver {
    label: &'static str,
}

impl SpecTableResolver {
    pub fn new() -> Self {
        Self { label: "ASIN" }
    }
}

impl Default for SpecTableResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentifierResolver for SpecTableResolver {
    fn resolve(&self, document: &Html, _url: &Url) -> Option<String> {
        for row in document.select(&product::SPEC_ROW) {
            let Some(label) = row
                .select(&product::SPEC_LABEL)
                .next()
                .map(|e| e.text().collect::<String>())
            else {
                continue;
            };

            if label.trim().eq_ignore_ascii_case(self.label) {
                let value = row
                    .select(&product::SPEC_VALUE)
                    .next()
                    .map(|e| e.text().collect::<String>().trim().to_string());

                match value {
                    Some(v) if !v.is_empty() => return Some(v),
                    _ => continue,
                }
            }
        }
        None
    }

    fn description(&self) -> &'static str {
        "spec table"
    }
}

/// Derives the identifier from a fixed position in the URL path.
///
/// Detail URLs look like `/Arlo-Pro-VMS4330P/dp/B0777TMW1Y/ref=...`; the
/// identifier sits at path index 2. Brittle to URL-format drift, which is
/// exactly why it is only the fallback.
pub struct PathSegmentResolver {
    index: usize,
}

impl PathSegmentResolver {
    pub fn new(index: usize) -> Self {
        Self { index }
    }
}

impl Default for PathSegmentResolver {
    fn default() -> Self {
        Self::new(2)
    }
}

impl IdentifierResolver for PathSegmentResolver {
    fn resolve(&self, _document: &Html, url: &Url) -> Option<String> {
        let segment = url.path_segments()?.nth(self.index)?;
        if segment.is_empty() {
            return None;
        }
        Some(segment.to_string())
    }

    fn description(&self) -> &'static str {
        "url path segment"
    }
}

/// Ordered chain of resolvers; the first hit wins.
pub struct CatalogIdResolver {
    strategies: Vec<Box<dyn IdentifierResolver>>,
}

impl CatalogIdResolver {
    /// Builds the default chain: spec table first, URL position second.
    pub fn new() -> Self {
        Self {
            strategies: vec![
                Box::new(SpecTableResolver::new()),
                Box::new(PathSegmentResolver::default()),
            ],
        }
    }

    /// Builds a chain from explicit strategies.
    pub fn with_strategies(strategies: Vec<Box<dyn IdentifierResolver>>) -> Self {
        Self { strategies }
    }

    pub fn resolve(&self, document: &Html, url: &Url) -> Option<String> {
        for strategy in &self.strategies {
            if let Some(id) = strategy.resolve(document, url) {
                tracing::trace!("resolved catalog id via {}: {}", strategy.description(), id);
                return Some(id);
            }
        }
        None
    }
}

impl Default for CatalogIdResolver {
    fn default() -> Self {
        Self::new()
    }
}
