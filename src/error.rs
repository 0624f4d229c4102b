//! Error taxonomy for fetching, extraction, and export.

use thiserror::Error;

/// Errors surfaced by the crawl pipeline.
///
/// Nothing below the category loop catches these; under the default
/// failure policy any of them terminates the run.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// The ready selector never appeared within the configured timeout.
    #[error("timed out after {timeout_secs}s waiting for `{selector}` at {url}")]
    FetchTimeout { url: String, selector: String, timeout_secs: u64 },

    /// The browser collaborator failed to navigate or hand back the page.
    #[error("browser failure at {url}: {message}")]
    Browser { url: String, message: String },

    /// A required selector was absent or its text did not match the
    /// expected pattern.
    #[error("missing required field `{field}`")]
    MissingField { field: &'static str },

    #[error("csv export failed: {0}")]
    Export(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CrawlError {
    pub(crate) fn browser(url: &url::Url, err: impl std::fmt::Display) -> Self {
        CrawlError::Browser { url: url.to_string(), message: err.to_string() }
    }
}
