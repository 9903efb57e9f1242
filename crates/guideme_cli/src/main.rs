//! `guideme` command-line front-end for the tour planner store.
//!
//! # Responsibility
//! - Resolve configuration from flags and environment.
//! - Open the durable store once and run one subcommand against it.
//!
//! Flags override the `GUIDEME_*` environment read by `CoreConfig::from_env`.
//!
//! Exit codes: `0` applied, `1` unknown entity, rejected move or refused
//! input, `2` persistence failure.

mod commands;

use clap::Parser;
use commands::{Command, Outcome};
use guideme_core::{init_logging, CoreConfig, StoreError, TourStore};
use log::error;
use std::path::PathBuf;
use std::process::ExitCode;

/// Plan tours as ordered lists of checkpoints.
#[derive(Parser, Debug)]
#[command(name = "guideme", version)]
struct Cli {
    /// Durable store record
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// Log level (trace|debug|info|warn|error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Absolute directory for rolling log files
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    fn config(&self) -> CoreConfig {
        let mut config = CoreConfig::from_env();
        if let Some(data) = &self.data {
            config.data_path = data.clone();
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        if let Some(dir) = &self.log_dir {
            config.log_dir = Some(dir.clone());
        }
        config
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = cli.config();

    if let Some(log_dir) = &config.log_dir {
        if let Err(err) = init_logging(&config.log_level, log_dir) {
            eprintln!("guideme: logging disabled: {err}");
        }
    }

    let store = TourStore::open(&config.data_path);
    match commands::run(&store, &cli.command, &mut commands::stdout()) {
        Ok(Outcome::Applied) => ExitCode::SUCCESS,
        Ok(Outcome::Missing) => ExitCode::from(1),
        Err(err) => {
            error!("event=cli_command module=cli status=error error={}", err);
            eprintln!("guideme: {err}");
            ExitCode::from(exit_code_for(&err))
        }
    }
}

fn exit_code_for(err: &StoreError) -> u8 {
    match err {
        StoreError::Persist { .. } => 2,
        StoreError::InvalidLocation { .. } | StoreError::IdsExhausted { .. } => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::{exit_code_for, Cli};
    use crate::commands::Command;
    use clap::Parser;
    use guideme_core::{RecordError, StoreError};
    use std::path::PathBuf;

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "guideme",
            "add-checkpoint",
            "3",
            "Crane",
            "--data",
            "/tmp/guideme-test.json",
        ])
        .unwrap();
        assert_eq!(
            cli.command,
            Command::AddCheckpoint {
                tour_id: 3,
                name: "Crane".to_string(),
            }
        );
        assert_eq!(cli.data, Some(PathBuf::from("/tmp/guideme-test.json")));
        assert_eq!(
            cli.config().data_path,
            PathBuf::from("/tmp/guideme-test.json")
        );
    }

    #[test]
    fn locate_accepts_negative_coordinates() {
        let cli = Cli::try_parse_from(["guideme", "locate", "7", "-33.86", "-151.2"]).unwrap();
        assert_eq!(
            cli.command,
            Command::Locate {
                id: 7,
                latitude: -33.86,
                longitude: -151.2,
            }
        );
    }

    #[test]
    fn refused_input_exits_with_one_and_persist_failure_with_two() {
        let refused = StoreError::InvalidLocation {
            id: 1,
            latitude: f64::NAN,
            longitude: 18.0,
        };
        assert_eq!(exit_code_for(&refused), 1);

        let persist = StoreError::Persist {
            path: PathBuf::from("/tmp/guideme.json"),
            source: RecordError::InvalidData("read-only".to_string()),
        };
        assert_eq!(exit_code_for(&persist), 2);
    }

    #[test]
    fn move_requires_a_target() {
        assert!(Cli::try_parse_from(["guideme", "move-before", "1"]).is_err());
    }
}
