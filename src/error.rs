//! Error types for gestar-scraper

use thiserror::Error;

/// Result type alias for gestar-scraper operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for gestar-scraper
///
/// Each variant carries the context needed to diagnose where in the
/// fetch-parse-persist pipeline the failure originated.
#[derive(Debug, Error)]
pub enum Error {
    /// Transport failure that survived the whole retry budget.
    ///
    /// HTTP error statuses never produce this variant: the fetcher returns
    /// any response body it receives. Only connect/timeout/body-read failures
    /// are retried and, once exhausted, wrapped here.
    #[error("fetch failed for {url} after {attempts} attempts: {source}")]
    Fetch {
        /// The URL that could not be fetched
        url: String,
        /// Total attempts made before giving up
        attempts: u32,
        /// The last transport error observed
        source: reqwest::Error,
    },

    /// Malformed document bytes (not decodable as UTF-8)
    #[error("malformed document from {url}: {reason}")]
    Parse {
        /// The URL the document came from
        url: String,
        /// Why decoding failed
        reason: String,
    },

    /// A selector in the fixed extraction table failed to compile
    #[error("invalid selector `{selector}`: {reason}")]
    Selector {
        /// The CSS selector text
        selector: String,
        /// The parser's complaint
        reason: String,
    },

    /// Invalid URL
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// I/O error from the output sink
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable description of the invalid setting
        message: String,
    },
}
