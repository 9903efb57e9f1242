//! Tour/checkpoint repository contract and its locked, file-backed store.
//!
//! # Responsibility
//! - Serialize every operation through one exclusive lock.
//! - Commit a mutation to memory only after the durable record accepted it.
//!
//! # Invariants
//! - Reads and writes take the same mutex; there is no reader/writer split.
//! - Mutations run on a copy of the state and are swapped in after saving,
//!   so a panic or failed save never leaves a half-applied change behind.
//! - Operations that change nothing do not rewrite the record.

use super::record::{load_or_empty, write_record};
use super::state::{MoveOutcome, StoreState};
use super::{StoreError, StoreResult};
use crate::model::checkpoint::{Checkpoint, CheckpointId, Placement};
use crate::model::tour::{Tour, TourId};
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

/// Boundary contract consumed by request handlers and the CLI.
pub trait TourRepository {
    /// Lists all tours by ascending id.
    fn list_tours(&self) -> Vec<Tour>;
    fn get_tour(&self, id: TourId) -> Option<Tour>;
    /// Creates one tour. Empty names are accepted.
    fn create_tour(&self, name: &str) -> StoreResult<Tour>;
    /// Deletes one tour and all its checkpoints. Returns whether it existed.
    fn delete_tour(&self, id: TourId) -> StoreResult<bool>;
    /// Lists checkpoints of one tour by ascending rank.
    fn list_checkpoints(&self, tour_id: TourId) -> Vec<Checkpoint>;
    fn get_checkpoint(&self, id: CheckpointId) -> Option<Checkpoint>;
    /// Appends one checkpoint to a tour. The tour is not required to exist.
    fn create_checkpoint(&self, tour_id: TourId, name: &str) -> StoreResult<Checkpoint>;
    /// Deletes one checkpoint and renumbers its siblings.
    fn delete_checkpoint(&self, id: CheckpointId) -> StoreResult<bool>;
    /// Sets both coordinates. Returns whether the checkpoint existed.
    ///
    /// NaN and infinite coordinates are refused with
    /// `StoreError::InvalidLocation`; magnitudes are not range-checked.
    fn update_location(
        &self,
        id: CheckpointId,
        latitude: f64,
        longitude: f64,
    ) -> StoreResult<bool>;
    /// Clears both coordinates. Returns whether the checkpoint existed.
    fn clear_location(&self, id: CheckpointId) -> StoreResult<bool>;
    /// Moves `id` next to `target`. Returns `false` for unknown ids or
    /// checkpoints of different tours.
    fn move_checkpoint(
        &self,
        id: CheckpointId,
        target: CheckpointId,
        placement: Placement,
    ) -> StoreResult<bool>;

    fn move_before(&self, id: CheckpointId, target: CheckpointId) -> StoreResult<bool> {
        self.move_checkpoint(id, target, Placement::Before)
    }

    fn move_after(&self, id: CheckpointId, target: CheckpointId) -> StoreResult<bool> {
        self.move_checkpoint(id, target, Placement::After)
    }
}

impl<R: TourRepository + ?Sized> TourRepository for Arc<R> {
    fn list_tours(&self) -> Vec<Tour> {
        (**self).list_tours()
    }

    fn get_tour(&self, id: TourId) -> Option<Tour> {
        (**self).get_tour(id)
    }

    fn create_tour(&self, name: &str) -> StoreResult<Tour> {
        (**self).create_tour(name)
    }

    fn delete_tour(&self, id: TourId) -> StoreResult<bool> {
        (**self).delete_tour(id)
    }

    fn list_checkpoints(&self, tour_id: TourId) -> Vec<Checkpoint> {
        (**self).list_checkpoints(tour_id)
    }

    fn get_checkpoint(&self, id: CheckpointId) -> Option<Checkpoint> {
        (**self).get_checkpoint(id)
    }

    fn create_checkpoint(&self, tour_id: TourId, name: &str) -> StoreResult<Checkpoint> {
        (**self).create_checkpoint(tour_id, name)
    }

    fn delete_checkpoint(&self, id: CheckpointId) -> StoreResult<bool> {
        (**self).delete_checkpoint(id)
    }

    fn update_location(
        &self,
        id: CheckpointId,
        latitude: f64,
        longitude: f64,
    ) -> StoreResult<bool> {
        (**self).update_location(id, latitude, longitude)
    }

    fn clear_location(&self, id: CheckpointId) -> StoreResult<bool> {
        (**self).clear_location(id)
    }

    fn move_checkpoint(
        &self,
        id: CheckpointId,
        target: CheckpointId,
        placement: Placement,
    ) -> StoreResult<bool> {
        (**self).move_checkpoint(id, target, placement)
    }
}

/// Where committed state is snapshotted.
#[derive(Debug, Clone)]
enum Persistence {
    Durable(PathBuf),
    Memory,
}

/// Checkpoint store guarded by one coarse lock.
///
/// Construct once per process and share through `Arc`.
#[derive(Debug)]
pub struct TourStore {
    state: Mutex<StoreState>,
    persistence: Persistence,
}

impl TourStore {
    /// Opens the store backed by the record at `path`.
    ///
    /// A missing, unreadable or invalid record yields an empty store; the
    /// failure is logged and never returned.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let state = load_or_empty(&path);
        Self {
            state: Mutex::new(state),
            persistence: Persistence::Durable(path),
        }
    }

    /// Creates an empty store that keeps state in memory only.
    pub fn in_memory() -> Self {
        Self {
            state: Mutex::new(StoreState::new()),
            persistence: Persistence::Memory,
        }
    }

    /// Durable record path, `None` for in-memory stores.
    pub fn record_path(&self) -> Option<&Path> {
        match &self.persistence {
            Persistence::Durable(path) => Some(path.as_path()),
            Persistence::Memory => None,
        }
    }

    /// Copy of the full current state.
    pub fn snapshot(&self) -> StoreState {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        // Committed state is only ever replaced whole, so a poisoned guard
        // still holds a consistent value.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn read<T>(&self, f: impl FnOnce(&StoreState) -> T) -> T {
        f(&*self.lock())
    }

    /// Runs `f` on a working copy and commits it when `f` reports a change.
    fn mutate<T>(
        &self,
        event: &'static str,
        f: impl FnOnce(&mut StoreState) -> (T, bool),
    ) -> StoreResult<T> {
        let mut guard = self.lock();
        let mut working = guard.clone();
        let (value, changed) = f(&mut working);
        if changed {
            self.persist(event, &working)?;
            *guard = working;
        }
        Ok(value)
    }

    fn persist(&self, event: &'static str, state: &StoreState) -> StoreResult<()> {
        let Persistence::Durable(path) = &self.persistence else {
            return Ok(());
        };

        let started_at = Instant::now();
        match write_record(path, state) {
            Ok(()) => {
                debug!(
                    "event=store_save module=store status=ok trigger={} duration_ms={}",
                    event,
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(source) => {
                error!(
                    "event=store_save module=store status=error trigger={} error_code=record_write_failed duration_ms={} error={}",
                    event,
                    started_at.elapsed().as_millis(),
                    source
                );
                Err(StoreError::Persist {
                    path: path.clone(),
                    source,
                })
            }
        }
    }
}

impl TourRepository for TourStore {
    fn list_tours(&self) -> Vec<Tour> {
        self.read(StoreState::tours)
    }

    fn get_tour(&self, id: TourId) -> Option<Tour> {
        self.read(|state| state.tour(id).cloned())
    }

    fn create_tour(&self, name: &str) -> StoreResult<Tour> {
        let created = self.mutate("tour_create", |state| {
            let tour = state.create_tour(name);
            let changed = tour.is_some();
            (tour, changed)
        })?;
        let Some(tour) = created else {
            error!("event=tour_create module=store status=error error_code=ids_exhausted");
            return Err(StoreError::IdsExhausted {
                counter: "tourIdCounter",
            });
        };
        info!("event=tour_create module=store status=ok tour_id={}", tour.id);
        Ok(tour)
    }

    fn delete_tour(&self, id: TourId) -> StoreResult<bool> {
        let (existed, removed) = self.mutate("tour_delete", |state| {
            let outcome = state.delete_tour(id);
            (outcome, outcome.0 || outcome.1 > 0)
        })?;
        info!(
            "event=tour_delete module=store status={} tour_id={} checkpoints_removed={}",
            if existed { "ok" } else { "not_found" },
            id,
            removed
        );
        Ok(existed)
    }

    fn list_checkpoints(&self, tour_id: TourId) -> Vec<Checkpoint> {
        self.read(|state| state.checkpoints_of(tour_id))
    }

    fn get_checkpoint(&self, id: CheckpointId) -> Option<Checkpoint> {
        self.read(|state| state.checkpoint(id).cloned())
    }

    fn create_checkpoint(&self, tour_id: TourId, name: &str) -> StoreResult<Checkpoint> {
        let (created, orphan) = self.mutate("checkpoint_create", |state| {
            let orphan = state.tour(tour_id).is_none();
            let checkpoint = state.create_checkpoint(tour_id, name);
            let changed = checkpoint.is_some();
            ((checkpoint, orphan), changed)
        })?;
        let Some(checkpoint) = created else {
            error!(
                "event=checkpoint_create module=store status=error error_code=ids_exhausted tour_id={}",
                tour_id
            );
            return Err(StoreError::IdsExhausted {
                counter: "checkpointIdCounter",
            });
        };
        if orphan {
            warn!(
                "event=checkpoint_create module=store status=orphan checkpoint_id={} tour_id={}",
                checkpoint.id, tour_id
            );
        } else {
            info!(
                "event=checkpoint_create module=store status=ok checkpoint_id={} tour_id={} order={}",
                checkpoint.id, tour_id, checkpoint.order
            );
        }
        Ok(checkpoint)
    }

    fn delete_checkpoint(&self, id: CheckpointId) -> StoreResult<bool> {
        let existed = self.mutate("checkpoint_delete", |state| {
            let existed = state.delete_checkpoint(id);
            (existed, existed)
        })?;
        debug!(
            "event=checkpoint_delete module=store status={} checkpoint_id={}",
            if existed { "ok" } else { "not_found" },
            id
        );
        Ok(existed)
    }

    fn update_location(
        &self,
        id: CheckpointId,
        latitude: f64,
        longitude: f64,
    ) -> StoreResult<bool> {
        // serde_json writes non-finite floats as null, which would not reload.
        if !latitude.is_finite() || !longitude.is_finite() {
            warn!(
                "event=checkpoint_locate module=store status=rejected error_code=non_finite_coordinate checkpoint_id={}",
                id
            );
            return Err(StoreError::InvalidLocation {
                id,
                latitude,
                longitude,
            });
        }
        self.mutate("checkpoint_locate", |state| {
            let existed = state.set_location(id, Some((latitude, longitude)));
            (existed, existed)
        })
    }

    fn clear_location(&self, id: CheckpointId) -> StoreResult<bool> {
        self.mutate("checkpoint_unlocate", |state| {
            let existed = state.set_location(id, None);
            (existed, existed)
        })
    }

    fn move_checkpoint(
        &self,
        id: CheckpointId,
        target: CheckpointId,
        placement: Placement,
    ) -> StoreResult<bool> {
        let outcome = self.mutate("checkpoint_move", |state| {
            let outcome = state.move_checkpoint(id, target, placement);
            (outcome, outcome == MoveOutcome::Moved)
        })?;
        debug!(
            "event=checkpoint_move module=store status={} checkpoint_id={} target_id={} placement={}",
            outcome.as_str(),
            id,
            target,
            placement.as_str()
        );
        Ok(outcome != MoveOutcome::Rejected)
    }
}
