//! Binary entrypoint for the `islgen` CLI.

use std::process::ExitCode;

fn main() -> ExitCode {
    // A missing .env file is fine; keys may come from the real environment.
    let _ = dotenvy::dotenv();

    // Recording and replay are handled in commands::dispatch via
    // ISLGEN_RECORD=<dir> and ISLGEN_REPLAY=<dir>.
    match islgen::run(std::env::args()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
