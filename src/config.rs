//! Configuration types for gestar-scraper

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Base URL of the Gestar resolution portal
pub const DEFAULT_BASE_URL: &str =
    "http://www.montevideo.gub.uy/asl/sistemas/Gestar/resoluci.nsf";

/// Main configuration for [`Scraper`](crate::Scraper)
///
/// Every field has a sensible default mirroring the portal's production
/// crawl; `Config::default()` works out of the box.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Portal base URL (default: the Montevideo Gestar host)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Output folder for per-date `.jsonl` partitions (default: "resolutions/")
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Number of concurrent day workers, at least 1 (default: 1)
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Process only this many dates, sampled uniformly at random without
    /// replacement (None = all dates)
    #[serde(default)]
    pub limit: Option<usize>,

    /// Embed the serialized source document in each record (default: true)
    #[serde(default = "default_true")]
    pub include_html: bool,

    /// `Count` cap sent to the portal's listing views (default: 30000)
    ///
    /// A soft limit: the portal renders flat listings with no pagination, so
    /// entries beyond the cap are silently truncated.
    #[serde(default = "default_count_cap")]
    pub count_cap: u32,

    /// Retry policy for transport failures
    #[serde(default)]
    pub retry: RetryPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            output_dir: default_output_dir(),
            concurrency: default_concurrency(),
            limit: None,
            include_html: true,
            count_cap: default_count_cap(),
            retry: RetryPolicy::default(),
        }
    }
}

/// Retry policy for transport failures
///
/// The portal drops connections under load rather than answering with error
/// statuses, so the policy is deliberately simple: a fixed budget of attempts
/// with a fixed delay between them. Tests inject a zero-delay policy.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts before giving up (default: 5)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Fixed delay between attempts (default: 1 second)
    #[serde(default = "default_retry_delay", with = "duration_serde")]
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            delay: Duration::from_secs(1),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("resolutions/")
}

fn default_concurrency() -> usize {
    1
}

fn default_true() -> bool {
    true
}

fn default_count_cap() -> u32 {
    30_000
}

fn default_max_attempts() -> u32 {
    5
}

fn default_retry_delay() -> Duration {
    Duration::from_secs(1)
}

// Duration serialization helper (whole seconds)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
