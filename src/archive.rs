//! JSON file persistence, kept alongside the database for plain-file setups.
//!
//! Two files are maintained: the current price list (a JSON array of
//! records) and the history (a JSON array of dated snapshots). Files are
//! written to a temp file first and renamed into place, so an interrupted
//! write never leaves a truncated file behind.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::ArchiveConfig;
use crate::error::Result;
use crate::models::{ParsedRecord, SortKey};

/// Every record as scraped on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub date: NaiveDate,
    pub records: Vec<ParsedRecord>,
}

impl Snapshot {
    pub fn new(date: NaiveDate, records: Vec<ParsedRecord>) -> Self {
        Self { date, records }
    }
}

/// Dated snapshots in the order they were merged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriceArchive {
    snapshots: Vec<Snapshot>,
}

impl PriceArchive {
    /// Load the history file. A missing file is a fresh, empty archive.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "no history file yet, starting fresh");
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Add a snapshot, replacing any existing snapshot for the same date.
    pub fn merge(&mut self, snapshot: Snapshot) {
        self.snapshots.retain(|s| s.date != snapshot.date);
        self.snapshots.push(snapshot);
    }

    /// Sort the records inside every snapshot.
    pub fn sort_by(&mut self, key: SortKey) {
        for snapshot in &mut self.snapshots {
            sort_records(&mut snapshot.records, key);
        }
    }

    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    /// The snapshot with the most recent date.
    pub fn latest(&self) -> Option<&Snapshot> {
        self.snapshots.iter().max_by_key(|s| s.date)
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        write_json(path.as_ref(), self)
    }
}

/// File one day's scrape: sort it, overwrite the current list, then merge it
/// into the history file under `date`. Returns the updated history.
pub fn record_snapshot(
    config: &ArchiveConfig,
    date: NaiveDate,
    records: &mut [ParsedRecord],
    key: SortKey,
) -> Result<PriceArchive> {
    sort_records(records, key);
    write_current(&config.current, records)?;

    let mut history = PriceArchive::load(&config.history)?;
    history.merge(Snapshot::new(date, records.to_vec()));
    history.sort_by(key);
    history.save(&config.history)?;

    tracing::info!(%date, records = records.len(), snapshots = history.len(), "history updated");
    Ok(history)
}

/// Sort records in place by the given field.
pub fn sort_records(records: &mut [ParsedRecord], key: SortKey) {
    match key {
        SortKey::Artist => records.sort_by(|a, b| a.artist.cmp(&b.artist)),
        SortKey::Album => records.sort_by(|a, b| a.album.cmp(&b.album)),
        SortKey::Price => records.sort_by(|a, b| a.price.cmp(&b.price)),
    }
}

/// Write the current price list as a pretty JSON array.
pub fn write_current<P: AsRef<Path>>(path: P, records: &[ParsedRecord]) -> Result<()> {
    write_json(path.as_ref(), records)
}

/// Read a current price list written by [`write_current`].
pub fn read_current<P: AsRef<Path>>(path: P) -> Result<Vec<ParsedRecord>> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// `serde_json` writes `<`, `>` and `&` literally, so no unescaping pass is needed.
fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_vec_pretty(value)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent)?;
            parent
        }
        _ => Path::new("."),
    };

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(&json)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;

    tracing::info!(path = %path.display(), bytes = json.len(), "written");
    Ok(())
}
