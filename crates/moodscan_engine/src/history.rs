//! Capped, newest-first list of successful submissions.
//!
//! The list is kept as one JSON array in a single named slot of an injected
//! [`HistoryStore`], so the recorder works the same against a file on disk or
//! an in-memory slot.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, NaiveDate, Utc};
use moodscan_core::{SubmissionRequest, SubmissionResult};
use moodscan_logging::{moodscan_info, moodscan_warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::{replace_file, PersistError};

pub const HISTORY_LIMIT: usize = 50;
pub const HISTORY_FILENAME: &str = "history.json";
pub const DEFAULT_PAGE_SIZE: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub source_url: String,
    pub plan_id: String,
    pub download_link: String,
}

impl HistoryEntry {
    pub fn from_submission(
        request: &SubmissionRequest,
        result: &SubmissionResult,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp,
            source_url: request.source_url.clone(),
            plan_id: request.plan.id().to_string(),
            download_link: result.download_link.clone(),
        }
    }
}

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("stored history is corrupt: {0}")]
    Corrupt(#[source] serde_json::Error),
    #[error("could not encode history: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("history storage failed: {0}")]
    Storage(#[from] PersistError),
    #[error("history storage failed: {0}")]
    Io(#[from] io::Error),
    #[error("csv export failed: {0}")]
    Csv(#[from] csv::Error),
}

/// Key-value slot holding the raw serialized history.
pub trait HistoryStore: Send + Sync {
    /// `Ok(None)` when nothing has been stored yet.
    fn load(&self) -> Result<Option<String>, HistoryError>;
    fn save(&self, raw: &str) -> Result<(), HistoryError>;
    fn clear(&self) -> Result<(), HistoryError>;
}

/// Stores the history as `history.json` inside a data directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
    filename: String,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            filename: HISTORY_FILENAME.to_string(),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(&self.filename)
    }
}

impl HistoryStore for JsonFileStore {
    fn load(&self) -> Result<Option<String>, HistoryError> {
        match fs::read_to_string(self.path()) {
            Ok(text) => Ok(Some(text)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn save(&self, raw: &str) -> Result<(), HistoryError> {
        replace_file(&self.dir, &self.filename, raw.as_bytes())?;
        Ok(())
    }

    fn clear(&self) -> Result<(), HistoryError> {
        match fs::remove_file(self.path()) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    slot: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(raw.into())),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl HistoryStore for MemoryStore {
    fn load(&self) -> Result<Option<String>, HistoryError> {
        Ok(self.lock().clone())
    }

    fn save(&self, raw: &str) -> Result<(), HistoryError> {
        *self.lock() = Some(raw.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), HistoryError> {
        *self.lock() = None;
        Ok(())
    }
}

pub struct HistoryRecorder<S> {
    store: S,
    limit: usize,
}

impl<S: HistoryStore> HistoryRecorder<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            limit: HISTORY_LIMIT,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Prepends `entry` and keeps only the most recent entries.
    ///
    /// A corrupt stored list is left untouched and reported; use
    /// [`HistoryRecorder::clear`] to start over.
    pub fn record(&self, entry: HistoryEntry) -> Result<(), HistoryError> {
        let mut entries = self.list()?;
        entries.insert(0, entry);
        entries.truncate(self.limit);
        let raw = serde_json::to_string(&entries).map_err(HistoryError::Encode)?;
        self.store.save(&raw)?;
        moodscan_info!("Recorded history entry ({} stored)", entries.len());
        Ok(())
    }

    /// Stored entries, newest first. An empty slot is an empty list.
    pub fn list(&self) -> Result<Vec<HistoryEntry>, HistoryError> {
        match self.store.load()? {
            None => Ok(Vec::new()),
            Some(raw) if raw.trim().is_empty() => Ok(Vec::new()),
            Some(raw) => serde_json::from_str(&raw).map_err(HistoryError::Corrupt),
        }
    }

    /// Like [`HistoryRecorder::list`], but a broken store reads as empty.
    pub fn list_or_empty(&self) -> Vec<HistoryEntry> {
        self.list().unwrap_or_else(|err| {
            moodscan_warn!("Ignoring unreadable history: {}", err);
            Vec::new()
        })
    }

    pub fn clear(&self) -> Result<(), HistoryError> {
        self.store.clear()?;
        moodscan_info!("Cleared history");
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    /// 1-based, clamped into `1..=total_pages`.
    pub number: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

/// Slices `items` into 1-based pages of `per_page` (at least 1).
pub fn paginate<T>(items: &[T], page: usize, per_page: usize) -> Page<'_, T> {
    let per_page = per_page.max(1);
    let total_pages = items.len().div_ceil(per_page).max(1);
    let number = page.clamp(1, total_pages);
    let start = ((number - 1) * per_page).min(items.len());
    let end = (start + per_page).min(items.len());
    Page {
        items: &items[start..end],
        number,
        total_pages,
        total_items: items.len(),
    }
}

/// Default export file name for a given day.
pub fn export_filename(day: NaiveDate) -> String {
    format!("moodscan-history-{}.csv", day.format("%Y-%m-%d"))
}

/// Writes `entries` as CSV with a header row.
pub fn export_csv<W: io::Write>(entries: &[HistoryEntry], writer: W) -> Result<(), HistoryError> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(["id", "timestamp", "source_url", "plan", "download_link"])?;
    for entry in entries {
        csv.write_record([
            entry.id.as_str(),
            entry.timestamp.to_rfc3339().as_str(),
            entry.source_url.as_str(),
            entry.plan_id.as_str(),
            entry.download_link.as_str(),
        ])?;
    }
    csv.flush()?;
    Ok(())
}

/// Exports `entries` into `dir`, returning the written path.
pub fn export_csv_file(
    entries: &[HistoryEntry],
    dir: &Path,
    filename: &str,
) -> Result<PathBuf, HistoryError> {
    let mut buffer = Vec::new();
    export_csv(entries, &mut buffer)?;
    let path = replace_file(dir, filename, &buffer)?;
    Ok(path)
}
