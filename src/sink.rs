//! Append-only per-date partition sink
//!
//! One `<date>.jsonl` file per date token. Partitions are only ever appended
//! to: re-running a date accumulates duplicate lines rather than rewriting
//! history, which is what makes interrupted runs safely resumable.

use crate::error::Result;
use crate::types::Resolution;
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Append one day's batch to its partition file
///
/// Creates the folder and the partition file if absent (never truncating an
/// existing file), sorts the batch in place ascending by the raw
/// `resolution_number` string, and appends one JSON object per line with
/// keys in sorted order and non-ASCII characters preserved literally.
///
/// An empty batch still creates the (empty) partition file.
pub fn write_day(folder: &Path, date: &str, records: &mut [Resolution]) -> Result<PathBuf> {
    std::fs::create_dir_all(folder)?;
    let path = folder.join(format!("{date}.jsonl"));

    records.sort_by(|a, b| a.resolution_number.cmp(&b.resolution_number));

    let file = OpenOptions::new().create(true).append(true).open(&path)?;
    let mut writer = BufWriter::new(file);
    for record in records.iter() {
        serde_json::to_writer(&mut writer, record)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;

    tracing::debug!(path = %path.display(), records = records.len(), "partition appended");
    Ok(path)
}
