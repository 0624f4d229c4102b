//! Site-specific modules: markup contract, extraction, and data models.

pub mod identity;
pub mod models;
pub mod parser;
pub mod selectors;

pub use identity::{CatalogIdResolver, IdentifierResolver};
pub use models::{Harvest, Product, Review};
pub use parser::SiteParser;
