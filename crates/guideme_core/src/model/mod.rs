//! Tour planner domain model.
//!
//! # Responsibility
//! - Define the records owned by the checkpoint store.
//! - Keep the serialized field names stable for the durable record.
//!
//! # Invariants
//! - Identifiers are assigned by the store and never reused.
//! - `Checkpoint::order` is meaningful only among checkpoints of one tour.

pub mod checkpoint;
pub mod tour;
