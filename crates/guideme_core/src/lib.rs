//! Core domain logic for the GuideMe tour planner.
//! Owns tours, their ordered checkpoints and the durable store record.

pub mod config;
pub mod logging;
pub mod model;
pub mod store;

pub use config::CoreConfig;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::checkpoint::{Checkpoint, CheckpointId, Placement};
pub use model::tour::{Tour, TourId};
pub use store::{
    MoveOutcome, RecordError, StoreError, StoreResult, StoreState, TourRepository, TourStore,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
