//! Checkpoint record and relative placement selector.
//!
//! # Invariants
//! - `latitude` and `longitude` are set together or not at all.
//! - `order` is a zero-based rank within the owning tour.

use super::tour::TourId;
use serde::{Deserialize, Serialize};

/// Store-assigned checkpoint identifier, unique across all tours.
pub type CheckpointId = i64;

/// Named point that belongs to exactly one tour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checkpoint {
    pub id: CheckpointId,
    /// Owning tour. Not validated against existing tours on create.
    pub tour_id: TourId,
    pub name: String,
    /// Rank among checkpoints sharing `tour_id`.
    pub order: i64,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl Checkpoint {
    /// Creates an unlocated checkpoint.
    pub fn new(id: CheckpointId, tour_id: TourId, name: impl Into<String>, order: i64) -> Self {
        Self {
            id,
            tour_id,
            name: name.into(),
            order,
            latitude: None,
            longitude: None,
        }
    }

    /// Returns `(latitude, longitude)` when the checkpoint has been placed.
    pub fn location(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some((latitude, longitude)),
            _ => None,
        }
    }

    /// Sets both coordinates in one step.
    pub fn set_location(&mut self, latitude: f64, longitude: f64) {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
    }

    /// Clears both coordinates in one step.
    pub fn clear_location(&mut self) {
        self.latitude = None;
        self.longitude = None;
    }
}

/// Side of the target checkpoint a moved checkpoint lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Immediately before the target.
    Before,
    /// Immediately after the target.
    After,
}

impl Placement {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Before => "before",
            Self::After => "after",
        }
    }
}
