//! Ordered checkpoint store with durable snapshots.
//!
//! # Responsibility
//! - Own tours and checkpoints behind one coarse lock.
//! - Snapshot the whole state to the durable record after every change.
//!
//! # Invariants
//! - Not-found and cross-tour requests are answered with `false`/`None`.
//! - `StoreError` reports persistence failures and requests the record
//!   cannot represent; the in-memory state is left exactly as it was
//!   before the failed operation.

use crate::model::checkpoint::CheckpointId;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub mod ordering;
pub mod record;
pub mod state;
mod tour_store;

pub use record::{RecordError, RecordResult};
pub use state::{MoveOutcome, StoreState};
pub use tour_store::{TourRepository, TourStore};

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug)]
pub enum StoreError {
    /// Durable record could not be written. The mutation was discarded.
    Persist { path: PathBuf, source: RecordError },
    /// A coordinate was NaN or infinite. Nothing was changed.
    InvalidLocation {
        id: CheckpointId,
        latitude: f64,
        longitude: f64,
    },
    /// The named id counter cannot advance any further.
    IdsExhausted { counter: &'static str },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Persist { path, source } => write!(
                f,
                "failed to persist store record `{}`: {source}",
                path.display()
            ),
            Self::InvalidLocation {
                id,
                latitude,
                longitude,
            } => write!(
                f,
                "checkpoint #{id} cannot be placed at {latitude}, {longitude}: coordinates must be finite"
            ),
            Self::IdsExhausted { counter } => write!(f, "{counter} is exhausted"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Persist { source, .. } => Some(source),
            Self::InvalidLocation { .. } | Self::IdsExhausted { .. } => None,
        }
    }
}
