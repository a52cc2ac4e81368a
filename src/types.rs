//! Core record and event types

use serde::{Deserialize, Serialize};

/// One signing author of a resolution
///
/// Fields are declared in alphabetical order; serde emits keys in declaration
/// order, which keeps serialized output byte-stable across runs.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    /// Job title as rendered, without the trailing ".-" the portal emits
    pub job_title: String,
    /// Name as rendered, without the trailing comma the portal emits
    pub name: String,
}

/// One extracted resolution record
///
/// Constructed entirely from a single fetched document; any selector that no
/// longer matches the portal's template leaves its field as an empty string
/// rather than failing. `url` and `date` are always populated.
///
/// Fields are declared in alphabetical order; serde emits keys in declaration
/// order, which keeps every serialized line's key order deterministic.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    /// Approval date as rendered (raw concatenation, not normalized)
    pub approval_date: String,
    /// Signing authors in document order
    pub authors: Vec<Author>,
    /// Issuing department, whitespace-normalized
    pub category: String,
    /// Full resolution text, whitespace-normalized
    pub content: String,
    /// The date token this record was fetched under
    pub date: String,
    /// File/expediente identifier as rendered (raw concatenation)
    pub file_id: String,
    /// Serialized source document, present only when requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    /// Resolution number as rendered; the sort key within a day partition
    pub resolution_number: String,
    /// Topic, whitespace-normalized
    pub subcategory: String,
    /// One-line summary, whitespace-normalized
    pub summary: String,
    /// Source document URL
    pub url: String,
}

/// Progress events emitted by a running [`Scraper`](crate::Scraper)
///
/// Delivered over a broadcast channel; lagging subscribers lose old events
/// rather than blocking the pipeline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// The date index was fetched and the run's work list is fixed
    DatesDiscovered {
        /// Dates present in the portal's index
        found: usize,
        /// Dates actually scheduled after sampling
        scheduled: usize,
    },
    /// One day's batch was extracted and appended to its partition
    DayCompleted {
        /// The date token
        date: String,
        /// Records written for that date
        records: usize,
    },
}
