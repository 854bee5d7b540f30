//! Core library entry for the `islgen` CLI.
//!
//! `islgen` turns a manifest of intent specifications into implementation
//! files by asking a generation oracle for each changed entry. Entries whose
//! inputs are unchanged since the last committed run are skipped; every
//! generated file leaves a signature sidecar that later entries code against.

pub mod adapters;
pub mod build_context;
pub mod cassette;
pub mod cli;
pub mod commands;
pub mod context;
pub mod layout;
pub mod ledger;
pub mod pipeline;
pub mod ports;
pub mod request;
pub mod response;
pub mod review;
pub mod signature;
pub mod stack;

#[cfg(test)]
pub(crate) mod testing;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Run the CLI with the provided arguments.
///
/// # Errors
///
/// Returns an error string when argument parsing fails or command execution fails.
pub fn run<I, T>(args: I) -> Result<(), String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = cli::Cli::try_parse_from(args).map_err(|err| err.to_string())?;
    init_tracing(cli.verbose);
    commands::dispatch(&cli)
}

/// Install the stderr log subscriber. `RUST_LOG` overrides the level.
fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    // A subscriber may already be installed when running in-process.
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| level.into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time().with_writer(std::io::stderr))
        .try_init();
}

#[cfg(test)]
mod tests {
    use std::ffi::OsStr;

    use super::run;

    #[test]
    fn run_lists_stacks() {
        assert!(run(["islgen", "stacks"]).is_ok());
    }

    #[test]
    fn run_errors_on_unknown_subcommand() {
        assert!(run(["islgen", "unknown"]).is_err());
    }

    #[test]
    fn run_reports_missing_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join("build-manifest.json");
        let args = [OsStr::new("islgen"), OsStr::new("generate"), manifest.as_os_str()];
        let err = run(args).unwrap_err();
        assert!(err.contains("manifest not found"), "{err}");
    }
}
