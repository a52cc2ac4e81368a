//! # gestar-scraper
//!
//! Scraper for the Montevideo "Gestar" resolution portal: walks the portal's
//! date index, fetches every resolution document for each date, extracts a
//! structured record per document through a fixed selector table, and appends
//! the records to per-date newline-delimited JSON partitions.
//!
//! ## Design Philosophy
//!
//! - **Append-only output** - partitions are never rewritten, so interrupted
//!   runs resume by re-running (at the cost of duplicate lines for the day
//!   that was in flight)
//! - **Degrade, don't fail** - the portal's template is addressed by
//!   position; when it drifts, fields come back empty instead of erroring
//! - **Bounded concurrency** - one worker per day, a semaphore for the pool,
//!   a single consumer owning every file write
//!
//! ## Quick Start
//!
//! ```no_run
//! use gestar_scraper::{Config, Scraper};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config {
//!         concurrency: 4,
//!         limit: Some(10),
//!         ..Default::default()
//!     };
//!
//!     let scraper = Scraper::new(config)?;
//!
//!     // Subscribe to progress events
//!     let mut events = scraper.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     let total = scraper.run().await?;
//!     println!("{total} resolutions parsed");
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Record extraction from resolution documents
pub mod extract;
/// HTTP fetching with bounded retry
pub mod fetcher;
/// Portal index listings
pub mod index;
/// Fixed-delay retry combinator
pub mod retry;
/// The crawl pipeline
pub mod scrape;
/// Append-only partition sink
pub mod sink;
/// Core record and event types
pub mod types;

// Re-export commonly used types
pub use config::{Config, DEFAULT_BASE_URL, RetryPolicy};
pub use error::{Error, Result};
pub use extract::Extractor;
pub use fetcher::Fetcher;
pub use scrape::Scraper;
pub use types::{Author, Event, Resolution};
