//! Subcommand dispatch over the store contract.
//!
//! # Responsibility
//! - Map each subcommand to one repository call.
//! - Render results as plain text lines.
//!
//! # Invariants
//! - Not-found and cross-tour outcomes are reported, not raised.
//! - Only persistence failures surface as errors.

use clap::Subcommand;
use guideme_core::{Checkpoint, CheckpointId, StoreResult, Tour, TourId, TourRepository};
use std::io::{self, Write};

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// List all tours
    Tours,
    /// Create a tour
    AddTour { name: String },
    /// Delete a tour and all of its checkpoints
    DeleteTour { id: TourId },
    /// List the checkpoints of a tour in visiting order
    Checkpoints { tour_id: TourId },
    /// Append a checkpoint to a tour
    AddCheckpoint { tour_id: TourId, name: String },
    /// Delete a checkpoint
    DeleteCheckpoint { id: CheckpointId },
    /// Pin a checkpoint to map coordinates
    Locate {
        id: CheckpointId,
        #[arg(allow_negative_numbers = true)]
        latitude: f64,
        #[arg(allow_negative_numbers = true)]
        longitude: f64,
    },
    /// Remove a checkpoint's map pin
    Unlocate { id: CheckpointId },
    /// Move a checkpoint directly before another one of the same tour
    MoveBefore { id: CheckpointId, target: CheckpointId },
    /// Move a checkpoint directly after another one of the same tour
    MoveAfter { id: CheckpointId, target: CheckpointId },
    /// Print the core library version
    Version,
}

/// Whether the requested entity was found and the command applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    Missing,
}

impl From<bool> for Outcome {
    fn from(value: bool) -> Self {
        if value {
            Self::Applied
        } else {
            Self::Missing
        }
    }
}

/// Runs one command against `repo`, writing human-readable output to `out`.
pub fn run<R: TourRepository>(
    repo: &R,
    command: &Command,
    out: &mut impl Write,
) -> StoreResult<Outcome> {
    let outcome = match command {
        Command::Tours => {
            let tours = repo.list_tours();
            if tours.is_empty() {
                write_line(out, "No tours yet.");
            }
            for tour in &tours {
                write_line(out, &format_tour(tour, repo.list_checkpoints(tour.id).len()));
            }
            Outcome::Applied
        }
        Command::AddTour { name } => {
            let tour = repo.create_tour(name)?;
            write_line(out, &format!("Created tour #{}.", tour.id));
            Outcome::Applied
        }
        Command::DeleteTour { id } => report(
            out,
            repo.delete_tour(*id)?,
            format!("Deleted tour #{id}."),
            format!("Tour #{id} not found."),
        ),
        Command::Checkpoints { tour_id } => {
            let checkpoints = repo.list_checkpoints(*tour_id);
            if checkpoints.is_empty() {
                write_line(out, "No checkpoints yet.");
            }
            for checkpoint in &checkpoints {
                write_line(out, &format_checkpoint(checkpoint));
            }
            Outcome::Applied
        }
        Command::AddCheckpoint { tour_id, name } => {
            let checkpoint = repo.create_checkpoint(*tour_id, name)?;
            write_line(
                out,
                &format!(
                    "Created checkpoint #{} at position {}.",
                    checkpoint.id,
                    checkpoint.order + 1
                ),
            );
            Outcome::Applied
        }
        Command::DeleteCheckpoint { id } => report(
            out,
            repo.delete_checkpoint(*id)?,
            format!("Deleted checkpoint #{id}."),
            format!("Checkpoint #{id} not found."),
        ),
        Command::Locate {
            id,
            latitude,
            longitude,
        } => report(
            out,
            repo.update_location(*id, *latitude, *longitude)?,
            format!("Pinned checkpoint #{id} at {latitude}, {longitude}."),
            format!("Checkpoint #{id} not found."),
        ),
        Command::Unlocate { id } => report(
            out,
            repo.clear_location(*id)?,
            format!("Unpinned checkpoint #{id}."),
            format!("Checkpoint #{id} not found."),
        ),
        Command::MoveBefore { id, target } => report(
            out,
            repo.move_before(*id, *target)?,
            format!("Moved checkpoint #{id} before #{target}."),
            format!("Cannot move #{id} before #{target}: unknown checkpoint or different tours."),
        ),
        Command::MoveAfter { id, target } => report(
            out,
            repo.move_after(*id, *target)?,
            format!("Moved checkpoint #{id} after #{target}."),
            format!("Cannot move #{id} after #{target}: unknown checkpoint or different tours."),
        ),
        Command::Version => {
            write_line(
                out,
                &format!("guideme_core version={}", guideme_core::core_version()),
            );
            Outcome::Applied
        }
    };
    Ok(outcome)
}

fn report(out: &mut impl Write, applied: bool, done: String, missing: String) -> Outcome {
    write_line(out, if applied { done.as_str() } else { missing.as_str() });
    Outcome::from(applied)
}

fn format_tour(tour: &Tour, checkpoint_count: usize) -> String {
    format!(
        "#{} {} ({} checkpoint{})",
        tour.id,
        tour.name,
        checkpoint_count,
        if checkpoint_count == 1 { "" } else { "s" }
    )
}

fn format_checkpoint(checkpoint: &Checkpoint) -> String {
    let mut line = format!(
        "{}. {} (#{})",
        checkpoint.order + 1,
        checkpoint.name,
        checkpoint.id
    );
    if let Some((latitude, longitude)) = checkpoint.location() {
        line.push_str(&format!(" @ {latitude}, {longitude}"));
    }
    line
}

fn write_line(out: &mut impl Write, line: &str) {
    // Write errors are ignored; the store change is already committed.
    let _ = writeln!(out, "{line}");
}

/// Stdout sink used by the binary.
pub fn stdout() -> impl Write {
    io::stdout().lock()
}
