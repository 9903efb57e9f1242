//! Durable record read/write for the checkpoint store.
//!
//! # Responsibility
//! - Serialize the full `StoreState` as one JSON document.
//! - Replace the record atomically so readers never see a torn write.
//! - Degrade to an empty state when the record cannot be used at startup.
//!
//! # Invariants
//! - A successful `write_record` leaves no temporary file behind.
//! - `write_record` fails only when the record was not replaced.
//! - `load_or_empty` never fails; problems are logged and discarded.

use super::state::StoreState;
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

const TEMP_SUFFIX: &str = "tmp";

pub type RecordResult<T> = Result<T, RecordError>;

/// Errors from reading or writing the durable record.
#[derive(Debug)]
pub enum RecordError {
    /// File system failure.
    Io(std::io::Error),
    /// Record is not valid JSON for the expected shape.
    Json(serde_json::Error),
    /// Record parsed but violates store invariants.
    InvalidData(String),
}

impl Display for RecordError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "{err}"),
            Self::Json(err) => write!(f, "malformed store record: {err}"),
            Self::InvalidData(message) => write!(f, "invalid store record: {message}"),
        }
    }
}

impl Error for RecordError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<std::io::Error> for RecordError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for RecordError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Reads and validates the record at `path`.
///
/// Returns `Ok(None)` when no record exists yet.
pub fn read_record(path: &Path) -> RecordResult<Option<StoreState>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    let state: StoreState = serde_json::from_slice(&bytes)?;
    state.validate().map_err(RecordError::InvalidData)?;
    Ok(Some(state))
}

/// Writes `state` to `path` through a sibling temporary file and rename.
///
/// # Side effects
/// - Creates the parent directory when missing.
/// - Flushes file contents before the rename.
/// - Syncs the parent directory afterwards; a failed directory sync is
///   logged but does not fail the write, since the record is already
///   replaced.
pub fn write_record(path: &Path, state: &StoreState) -> RecordResult<()> {
    write_record_with(path, state, sync_dir)
}

fn write_record_with(
    path: &Path,
    state: &StoreState,
    sync_parent: impl FnOnce(&Path) -> std::io::Result<()>,
) -> RecordResult<()> {
    let bytes = serde_json::to_vec_pretty(state)?;
    let parent = path.parent().filter(|parent| !parent.as_os_str().is_empty());
    if let Some(parent) = parent {
        fs::create_dir_all(parent)?;
    }

    let temp_path = temp_path_for(path);
    let result = write_then_rename(&temp_path, path, &bytes);
    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result?;

    // Directory handles can only be synced on unix.
    if cfg!(unix) {
        if let Some(parent) = parent {
            if let Err(err) = sync_parent(parent) {
                warn!(
                    "event=store_save module=store status=degraded error_code=dir_sync_failed error={}",
                    err
                );
            }
        }
    }
    Ok(())
}

fn sync_dir(dir: &Path) -> std::io::Result<()> {
    File::open(dir)?.sync_all()
}

/// Loads the record at `path`, falling back to an empty state.
///
/// # Side effects
/// - Emits `store_load` events with status and duration.
/// - Renumbers tours whose ranks are not contiguous.
pub fn load_or_empty(path: &Path) -> StoreState {
    let started_at = Instant::now();
    info!("event=store_load module=store status=start");

    match read_record(path) {
        Ok(Some(mut state)) => {
            let repaired = state.normalize_orders();
            if repaired > 0 {
                warn!(
                    "event=store_load module=store status=repaired tours_renumbered={}",
                    repaired
                );
            }
            info!(
                "event=store_load module=store status=ok tours={} checkpoints={} duration_ms={}",
                state.tours.len(),
                state.checkpoints.len(),
                started_at.elapsed().as_millis()
            );
            state
        }
        Ok(None) => {
            info!(
                "event=store_load module=store status=ok record=absent duration_ms={}",
                started_at.elapsed().as_millis()
            );
            StoreState::new()
        }
        Err(err) => {
            error!(
                "event=store_load module=store status=error error_code=record_unusable fallback=empty duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            );
            StoreState::new()
        }
    }
}

fn write_then_rename(temp_path: &Path, path: &Path, bytes: &[u8]) -> RecordResult<()> {
    let mut temp = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(temp_path)?;
    temp.write_all(bytes)?;
    temp.sync_all()?;
    fs::rename(temp_path, path)?;
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|value| value.to_os_string())
        .unwrap_or_default();
    name.push(".");
    name.push(TEMP_SUFFIX);
    path.with_file_name(name)
}
