//! Rank arithmetic for one tour's checkpoint sequence.
//!
//! # Responsibility
//! - Compute append ranks and relative moves over id sequences.
//! - Stay free of storage concerns so the store can apply results atomically.
//!
//! # Invariants
//! - A sequence position is the rank; renumbering is `enumerate()`.
//! - Untouched ids keep their relative order.

use crate::model::checkpoint::{CheckpointId, Placement};

/// Returns the rank a newly appended checkpoint receives.
///
/// `max + 1` over the existing ranks, or `0` for an empty tour.
pub fn next_order(orders: impl IntoIterator<Item = i64>) -> i64 {
    orders.into_iter().max().map_or(0, |max| max + 1)
}

/// Moves `mover` next to `target` inside `sequence`.
///
/// Returns `None` when either id is missing from the sequence. Moving an id
/// relative to itself returns the sequence unchanged.
pub fn relocate(
    sequence: &[CheckpointId],
    mover: CheckpointId,
    target: CheckpointId,
    placement: Placement,
) -> Option<Vec<CheckpointId>> {
    if !sequence.contains(&mover) || !sequence.contains(&target) {
        return None;
    }
    if mover == target {
        return Some(sequence.to_vec());
    }

    let mut remaining = sequence
        .iter()
        .copied()
        .filter(|id| *id != mover)
        .collect::<Vec<_>>();
    let target_index = remaining.iter().position(|id| *id == target)?;
    let insert_at = match placement {
        Placement::Before => target_index,
        Placement::After => target_index + 1,
    };
    remaining.insert(insert_at, mover);
    Some(remaining)
}

/// Pairs every id with its positional rank.
pub fn ranks(sequence: &[CheckpointId]) -> impl Iterator<Item = (CheckpointId, i64)> + '_ {
    sequence
        .iter()
        .enumerate()
        .map(|(index, id)| (*id, index as i64))
}
