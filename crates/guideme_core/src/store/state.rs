//! In-memory store state and its structural mutations.
//!
//! # Responsibility
//! - Own tours, checkpoints and both id counters as one value.
//! - Re-establish per-tour rank contiguity after every structural change.
//!
//! # Invariants
//! - Counters hold the next id to assign and only grow.
//! - For every tour id, checkpoint orders are exactly `0..count`.
//! - Map keys equal the id stored in the entity.

use super::ordering::{next_order, ranks, relocate};
use crate::model::checkpoint::{Checkpoint, CheckpointId, Placement};
use crate::model::tour::{Tour, TourId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

const FIRST_ID: i64 = 1;

/// Full store state. Also the durable record shape.
///
/// Only the store mutates it; callers outside the crate get read access
/// through `TourStore::snapshot`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreState {
    pub(crate) tours: BTreeMap<TourId, Tour>,
    pub(crate) checkpoints: BTreeMap<CheckpointId, Checkpoint>,
    pub(crate) tour_id_counter: TourId,
    pub(crate) checkpoint_id_counter: CheckpointId,
}

impl Default for StoreState {
    fn default() -> Self {
        Self {
            tours: BTreeMap::new(),
            checkpoints: BTreeMap::new(),
            tour_id_counter: FIRST_ID,
            checkpoint_id_counter: FIRST_ID,
        }
    }
}

/// Result of a relative move request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Ranks changed.
    Moved,
    /// Request was valid but the sequence is already in the requested shape.
    Unchanged,
    /// Unknown id or checkpoints of different tours.
    Rejected,
}

impl MoveOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Moved => "moved",
            Self::Unchanged => "unchanged",
            Self::Rejected => "rejected",
        }
    }
}

impl StoreState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tours in ascending id order.
    pub fn tours(&self) -> Vec<Tour> {
        self.tours.values().cloned().collect()
    }

    /// Id the next created tour will get.
    pub fn next_tour_id(&self) -> TourId {
        self.tour_id_counter
    }

    /// Id the next created checkpoint will get.
    pub fn next_checkpoint_id(&self) -> CheckpointId {
        self.checkpoint_id_counter
    }

    pub fn tour(&self, id: TourId) -> Option<&Tour> {
        self.tours.get(&id)
    }

    pub fn checkpoint(&self, id: CheckpointId) -> Option<&Checkpoint> {
        self.checkpoints.get(&id)
    }

    /// Checkpoints of one tour in rank order.
    pub fn checkpoints_of(&self, tour_id: TourId) -> Vec<Checkpoint> {
        let mut items = self
            .checkpoints
            .values()
            .filter(|checkpoint| checkpoint.tour_id == tour_id)
            .cloned()
            .collect::<Vec<_>>();
        items.sort_by_key(|checkpoint| (checkpoint.order, checkpoint.id));
        items
    }

    /// Inserts a tour under the next id. `None` once the counter is spent.
    pub(crate) fn create_tour(&mut self, name: impl Into<String>) -> Option<Tour> {
        let next = self.tour_id_counter.checked_add(1)?;
        let tour = Tour::new(self.tour_id_counter, name);
        self.tour_id_counter = next;
        self.tours.insert(tour.id, tour.clone());
        Some(tour)
    }

    /// Removes the tour and every checkpoint pointing at it.
    ///
    /// Returns whether the tour existed and how many checkpoints were
    /// dropped. Checkpoints are dropped even when the tour itself was
    /// unknown, so orphans under that id are cleaned up too.
    pub(crate) fn delete_tour(&mut self, id: TourId) -> (bool, usize) {
        let existed = self.tours.remove(&id).is_some();
        let before = self.checkpoints.len();
        self.checkpoints.retain(|_, checkpoint| checkpoint.tour_id != id);
        (existed, before - self.checkpoints.len())
    }

    /// Appends a checkpoint to the tour. `None` once the counter is spent.
    pub(crate) fn create_checkpoint(
        &mut self,
        tour_id: TourId,
        name: impl Into<String>,
    ) -> Option<Checkpoint> {
        let next = self.checkpoint_id_counter.checked_add(1)?;
        let order = next_order(
            self.checkpoints
                .values()
                .filter(|checkpoint| checkpoint.tour_id == tour_id)
                .map(|checkpoint| checkpoint.order),
        );
        let checkpoint = Checkpoint::new(self.checkpoint_id_counter, tour_id, name, order);
        self.checkpoint_id_counter = next;
        self.checkpoints.insert(checkpoint.id, checkpoint.clone());
        Some(checkpoint)
    }

    /// Removes one checkpoint and closes the rank gap it leaves.
    pub(crate) fn delete_checkpoint(&mut self, id: CheckpointId) -> bool {
        match self.checkpoints.remove(&id) {
            Some(removed) => {
                self.renumber(removed.tour_id);
                true
            }
            None => false,
        }
    }

    /// Sets or clears both coordinates of one checkpoint.
    pub(crate) fn set_location(&mut self, id: CheckpointId, location: Option<(f64, f64)>) -> bool {
        let Some(checkpoint) = self.checkpoints.get_mut(&id) else {
            return false;
        };
        match location {
            Some((latitude, longitude)) => checkpoint.set_location(latitude, longitude),
            None => checkpoint.clear_location(),
        }
        true
    }

    /// Moves `id` immediately before or after `target` within their tour.
    pub(crate) fn move_checkpoint(
        &mut self,
        id: CheckpointId,
        target: CheckpointId,
        placement: Placement,
    ) -> MoveOutcome {
        let (Some(mover), Some(anchor)) = (self.checkpoints.get(&id), self.checkpoints.get(&target))
        else {
            return MoveOutcome::Rejected;
        };
        if mover.tour_id != anchor.tour_id {
            return MoveOutcome::Rejected;
        }

        let tour_id = mover.tour_id;
        let sequence = self.sequence_of(tour_id);
        let Some(moved) = relocate(&sequence, id, target, placement) else {
            return MoveOutcome::Rejected;
        };
        if moved == sequence {
            return MoveOutcome::Unchanged;
        }
        self.apply_ranks(&moved);
        MoveOutcome::Moved
    }

    /// Checks structural consistency of a state read from outside.
    ///
    /// Rank gaps are not reported here; `normalize_orders` repairs them.
    pub(crate) fn validate(&self) -> Result<(), String> {
        for (key, tour) in &self.tours {
            if *key != tour.id {
                return Err(format!("tour key {key} holds tour id {}", tour.id));
            }
            if tour.id >= self.tour_id_counter {
                return Err(format!(
                    "tour id {} is not below tourIdCounter {}",
                    tour.id, self.tour_id_counter
                ));
            }
        }
        for (key, checkpoint) in &self.checkpoints {
            if *key != checkpoint.id {
                return Err(format!(
                    "checkpoint key {key} holds checkpoint id {}",
                    checkpoint.id
                ));
            }
            if checkpoint.id >= self.checkpoint_id_counter {
                return Err(format!(
                    "checkpoint id {} is not below checkpointIdCounter {}",
                    checkpoint.id, self.checkpoint_id_counter
                ));
            }
            if checkpoint.latitude.is_some() != checkpoint.longitude.is_some() {
                return Err(format!(
                    "checkpoint {} has only one coordinate set",
                    checkpoint.id
                ));
            }
            if let Some((latitude, longitude)) = checkpoint.location() {
                if !latitude.is_finite() || !longitude.is_finite() {
                    return Err(format!(
                        "checkpoint {} has a non-finite coordinate",
                        checkpoint.id
                    ));
                }
            }
        }
        if self.tour_id_counter < FIRST_ID || self.checkpoint_id_counter < FIRST_ID {
            return Err("id counters must start at 1".to_string());
        }
        Ok(())
    }

    /// Renumbers every tour to contiguous ranks.
    ///
    /// Returns the number of tours whose ranks had to change.
    pub(crate) fn normalize_orders(&mut self) -> usize {
        let tour_ids = self
            .checkpoints
            .values()
            .map(|checkpoint| checkpoint.tour_id)
            .collect::<BTreeSet<_>>();
        let mut repaired = 0;
        for tour_id in tour_ids {
            if self.renumber(tour_id) {
                repaired += 1;
            }
        }
        repaired
    }

    fn sequence_of(&self, tour_id: TourId) -> Vec<CheckpointId> {
        self.checkpoints_of(tour_id)
            .into_iter()
            .map(|checkpoint| checkpoint.id)
            .collect()
    }

    fn renumber(&mut self, tour_id: TourId) -> bool {
        let sequence = self.sequence_of(tour_id);
        self.apply_ranks(&sequence)
    }

    fn apply_ranks(&mut self, sequence: &[CheckpointId]) -> bool {
        let mut changed = false;
        for (id, rank) in ranks(sequence) {
            if let Some(checkpoint) = self.checkpoints.get_mut(&id) {
                if checkpoint.order != rank {
                    checkpoint.order = rank;
                    changed = true;
                }
            }
        }
        changed
    }
}
