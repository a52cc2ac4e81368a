//! The crawl pipeline
//!
//! [`Scraper`] ties the pieces together: the two-level index walk, per-day
//! aggregation, the bounded worker pool, and the single consumer loop that
//! owns every sink write.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::extract::{self, Extractor};
use crate::fetcher::Fetcher;
use crate::index;
use crate::sink;
use crate::types::{Event, Resolution};
use rand::seq::SliceRandom;
use std::sync::Arc;
use tokio::sync::{Semaphore, broadcast, mpsc};
use url::Url;

/// Capacity of the progress event channel; laggards lose events, the
/// pipeline never blocks on them
const EVENT_CAPACITY: usize = 64;

/// Handle over the whole fetch-parse-persist pipeline
///
/// Cheap to clone; clones share the HTTP connection pool, the compiled
/// selector table and the event channel.
#[derive(Clone)]
pub struct Scraper {
    config: Arc<Config>,
    base: Url,
    fetcher: Fetcher,
    extractor: Arc<Extractor>,
    event_tx: broadcast::Sender<Event>,
}

impl std::fmt::Debug for Scraper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scraper")
            .field("config", &self.config)
            .field("base", &self.base)
            .finish_non_exhaustive()
    }
}

impl Scraper {
    /// Create a scraper from a validated configuration
    ///
    /// Fails on a zero concurrency, an unparsable base URL, or a selector
    /// table that does not compile.
    pub fn new(config: Config) -> Result<Self> {
        if config.concurrency == 0 {
            return Err(Error::Config {
                message: "concurrency must be at least 1".to_string(),
            });
        }
        let base = Url::parse(&config.base_url)?;
        let fetcher = Fetcher::new(config.retry);
        let extractor = Arc::new(Extractor::new()?);
        let (event_tx, _) = broadcast::channel(EVENT_CAPACITY);

        Ok(Self {
            config: Arc::new(config),
            base,
            fetcher,
            extractor,
            event_tx,
        })
    }

    /// Subscribe to progress events
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Fetch the full ascending date listing
    pub async fn list_dates(&self) -> Result<Vec<String>> {
        let url = index::dates_url(&self.config.base_url, self.config.count_cap);
        let bytes = self.fetcher.fetch(&url).await?;
        let text = extract::decode_document(&url, &bytes)?;
        index::parse_dates(text)
    }

    /// Fetch the resolution URL listing for one date
    pub async fn resolution_urls_for_day(&self, date: &str) -> Result<Vec<String>> {
        let url = index::day_url(&self.config.base_url, date, self.config.count_cap);
        let bytes = self.fetcher.fetch(&url).await?;
        let text = extract::decode_document(&url, &bytes)?;
        index::parse_resolution_links(text, &self.base)
    }

    /// Fetch and extract a single resolution document
    pub async fn fetch_resolution(&self, url: &str, date: &str) -> Result<Resolution> {
        let bytes = self.fetcher.fetch(url).await?;
        self.extractor
            .extract(url, &bytes, date, self.config.include_html)
    }

    /// Aggregate one day's records, sequentially, in listing order
    ///
    /// Errors are not caught per URL: one failed fetch or parse aborts the
    /// whole day's batch.
    pub async fn fetch_day(&self, date: &str) -> Result<Vec<Resolution>> {
        let urls = self.resolution_urls_for_day(date).await?;
        let mut records = Vec::with_capacity(urls.len());
        for url in &urls {
            records.push(self.fetch_resolution(url, date).await?);
        }
        tracing::info!(date, records = records.len(), "day aggregated");
        Ok(records)
    }

    /// Run the full pipeline and return the total record count
    ///
    /// One worker task per scheduled date, gated by a semaphore of
    /// `concurrency` permits; submission follows date-list order, completions
    /// are consumed in arrival order. All sink writes happen here in the
    /// consumer loop, so partitions need no locking. The first failed day
    /// aborts the run with that day's error; partitions already written
    /// stay on disk and a re-run appends to them.
    pub async fn run(&self) -> Result<usize> {
        let dates = self.list_dates().await?;
        let found = dates.len();
        let scheduled = self.sample_dates(dates)?;
        tracing::info!(found, scheduled = scheduled.len(), "date index fetched");
        let _ = self.event_tx.send(Event::DatesDiscovered {
            found,
            scheduled: scheduled.len(),
        });

        let semaphore = Arc::new(Semaphore::new(self.config.concurrency));
        let (tx, mut rx) = mpsc::channel(scheduled.len().max(1));
        for date in scheduled {
            let scraper = self.clone();
            let semaphore = Arc::clone(&semaphore);
            let tx = tx.clone();
            tokio::spawn(async move {
                // The driver never closes the semaphore
                let Ok(_permit) = semaphore.acquire().await else {
                    return;
                };
                let result = scraper.fetch_day(&date).await;
                let _ = tx.send((date, result)).await;
            });
        }
        drop(tx);

        let mut total = 0usize;
        while let Some((date, result)) = rx.recv().await {
            let mut records = result?;
            sink::write_day(&self.config.output_dir, &date, &mut records)?;
            total += records.len();
            let _ = self.event_tx.send(Event::DayCompleted {
                date,
                records: records.len(),
            });
        }
        Ok(total)
    }

    /// Down-sample the date list to `limit` dates, uniformly without
    /// replacement; asking for more dates than exist is an error, not a
    /// clamp
    fn sample_dates(&self, dates: Vec<String>) -> Result<Vec<String>> {
        match self.config.limit {
            Some(limit) if limit > dates.len() => Err(Error::Config {
                message: format!(
                    "limit {limit} exceeds the {} available dates",
                    dates.len()
                ),
            }),
            Some(limit) => {
                let mut rng = rand::thread_rng();
                Ok(dates.choose_multiple(&mut rng, limit).cloned().collect())
            }
            None => Ok(dates),
        }
    }
}
