// src/cache.rs

use crate::error::PipelineError;
use crate::pipeline::clean_data;
use crate::load::{load_table, LoadOutcome};
use arrow::record_batch::RecordBatch;
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
    time::SystemTime,
};
use tracing::{debug, info};

/// What identifies one version of a source file on disk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Fingerprint {
    pub modified: Option<SystemTime>,
    pub len: u64,
}

impl Fingerprint {
    /// `None` when the file cannot be stat'ed.
    pub fn of(path: &Path) -> Option<Self> {
        let meta = fs::metadata(path).ok()?;
        Some(Fingerprint {
            modified: meta.modified().ok(),
            len: meta.len(),
        })
    }
}

struct Entry {
    fingerprint: Fingerprint,
    snapshot: Arc<RecordBatch>,
}

/// Cleaned snapshots keyed by source path.
///
/// An entry is reused while the file's modification time and length are
/// unchanged and rebuilt from scratch otherwise. Loads that produce no data
/// are never cached, so a missing file is retried on the next call.
/// `SnapshotCache` is owned by whoever serves the data; the pipeline itself
/// holds no state.
pub struct SnapshotCache {
    delimiter: u8,
    entries: Mutex<HashMap<PathBuf, Entry>>,
}

impl SnapshotCache {
    pub fn new(delimiter: u8) -> Self {
        Self {
            delimiter,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Cached snapshot for `path`, reloading when the file changed.
    ///
    /// `Ok(None)` mirrors [`crate::load_and_clean`]: the source produced no
    /// data and the caller should stop.
    pub fn get_or_load(&self, path: &Path) -> Result<Option<Arc<RecordBatch>>, PipelineError> {
        let fingerprint = Fingerprint::of(path);

        if let Some(fp) = fingerprint {
            let entries = self.entries.lock().unwrap();
            if let Some(entry) = entries.get(path) {
                if entry.fingerprint == fp {
                    debug!(path = %path.display(), "snapshot cache hit");
                    return Ok(Some(Arc::clone(&entry.snapshot)));
                }
            }
        }

        let raw = match load_table(path, self.delimiter) {
            LoadOutcome::Loaded(raw) => raw,
            LoadOutcome::NoData(_) => {
                self.invalidate(path);
                return Ok(None);
            }
        };
        let snapshot = Arc::new(clean_data(&raw)?);

        if let Some(fp) = fingerprint {
            info!(path = %path.display(), rows = snapshot.num_rows(), "snapshot cached");
            self.entries.lock().unwrap().insert(
                path.to_path_buf(),
                Entry {
                    fingerprint: fp,
                    snapshot: Arc::clone(&snapshot),
                },
            );
        }
        Ok(Some(snapshot))
    }

    /// Drop the entry for `path`, if any.
    pub fn invalidate(&self, path: &Path) -> bool {
        self.entries.lock().unwrap().remove(path).is_some()
    }

    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
