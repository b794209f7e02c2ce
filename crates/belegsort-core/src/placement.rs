//! Collision-safe placement of documents in the target directory.

use std::collections::HashMap;
use std::fs::{self, FileTimes, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use lazy_static::lazy_static;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::PlacementError;
use crate::models::record::CompleteRecord;
use crate::naming::NamingScheme;

/// Collision indices tried before giving up (`0..MAX_ATTEMPTS`).
pub const MAX_ATTEMPTS: u32 = 50;

/// Result type for placement operations.
pub type Result<T> = std::result::Result<T, PlacementError>;

lazy_static! {
    static ref DIRECTORY_LOCKS: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>> =
        Mutex::new(HashMap::new());
}

/// Process-wide lock for one target directory.
fn directory_lock(dir: &Path) -> Arc<Mutex<()>> {
    let key = fs::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf());
    let mut locks = DIRECTORY_LOCKS.lock().unwrap_or_else(|e| e.into_inner());
    locks.entry(key).or_default().clone()
}

/// Where a document ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Placement {
    pub source: PathBuf,
    pub destination: PathBuf,
    /// Suffix used to avoid an existing file, 0 if none.
    pub collision_index: u32,
    /// An existing file was replaced.
    pub replaced: bool,
}

/// Copies complete records into a target directory under synthesized names.
#[derive(Debug, Clone)]
pub struct Placer {
    target_dir: PathBuf,
    scheme: NamingScheme,
    overwrite: bool,
    lock: Arc<Mutex<()>>,
}

impl Placer {
    /// Create a placer for `target_dir`, creating the directory if needed.
    pub fn new(target_dir: impl Into<PathBuf>, scheme: NamingScheme, overwrite: bool) -> Result<Self> {
        let target_dir = target_dir.into();
        fs::create_dir_all(&target_dir)?;
        let lock = directory_lock(&target_dir);

        Ok(Self {
            target_dir,
            scheme,
            overwrite,
            lock,
        })
    }

    pub fn target_dir(&self) -> &Path {
        &self.target_dir
    }

    pub fn overwrite(&self) -> bool {
        self.overwrite
    }

    fn guard(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Destination `record` would get right now, without copying.
    pub fn resolve(&self, record: &CompleteRecord) -> Result<(PathBuf, u32)> {
        let _guard = self.guard();
        self.free_path(record)
    }

    fn free_path(&self, record: &CompleteRecord) -> Result<(PathBuf, u32)> {
        if self.overwrite {
            return Ok((self.candidate(record, 0)?, 0));
        }

        let mut candidate = self.candidate(record, 0)?;
        for index in 0..MAX_ATTEMPTS {
            candidate = self.candidate(record, index)?;
            if !candidate.exists() {
                return Ok((candidate, index));
            }
            debug!("{} exists, trying next index", candidate.display());
        }

        Err(PlacementError::CollisionExhausted {
            source_path: record.source_path.clone(),
            last_candidate: candidate,
            attempts: MAX_ATTEMPTS,
        })
    }

    fn candidate(&self, record: &CompleteRecord, index: u32) -> Result<PathBuf> {
        Ok(self.target_dir.join(self.scheme.synthesize(record, index)?))
    }

    /// Copy the record's source file to its destination.
    ///
    /// Name resolution and copy happen under the directory lock, so concurrent
    /// placers never pick the same free name.
    pub fn place(&self, record: &CompleteRecord) -> Result<Placement> {
        let _guard = self.guard();

        let (destination, collision_index) = self.free_path(record)?;
        let replaced = destination.exists();

        copy_with_times(&record.source_path, &destination).map_err(|source| {
            PlacementError::Copy {
                from: record.source_path.clone(),
                to: destination.clone(),
                source,
            }
        })?;

        info!(
            "{} -> {}",
            record.source_path.display(),
            destination.display()
        );

        Ok(Placement {
            source: record.source_path.clone(),
            destination,
            collision_index,
            replaced,
        })
    }
}

/// Copy content and permissions, then carry over access and modification times.
fn copy_with_times(from: &Path, to: &Path) -> std::io::Result<()> {
    fs::copy(from, to)?;

    let metadata = fs::metadata(from)?;
    let mut times = FileTimes::new().set_modified(metadata.modified()?);
    if let Ok(accessed) = metadata.accessed() {
        times = times.set_accessed(accessed);
    }

    // Read-only sources produce read-only copies; the owner may still set times.
    let file = OpenOptions::new()
        .write(true)
        .open(to)
        .or_else(|_| fs::File::open(to))?;
    file.set_times(times)
}
