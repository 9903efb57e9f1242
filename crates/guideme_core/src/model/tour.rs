//! Tour record.

use serde::{Deserialize, Serialize};

/// Store-assigned tour identifier.
pub type TourId = i64;

/// Named collection of ordered checkpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tour {
    pub id: TourId,
    /// User-facing label. Accepted as given, including empty.
    pub name: String,
}

impl Tour {
    pub fn new(id: TourId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}
