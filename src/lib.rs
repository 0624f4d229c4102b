//! avis-crawler - Amazon.fr category, product, and review crawler
//!
//! Walks a category listing page by page, visits every product's detail
//! page, pages through each product's reviews, and exports the harvest
//! as two flat CSV files.

pub mod config;
pub mod crawl;
pub mod error;
pub mod export;
pub mod fetch;
pub mod site;

pub use config::{Config, FailurePolicy};
pub use crawl::{crawl_category, CrawlOptions};
pub use error::CrawlError;
pub use fetch::{BrowserFetcher, PageFetcher};
pub use site::{Harvest, Product, Review, SiteParser};
