//! Binary entrypoint for the `gridstamp` CLI.

use std::process::ExitCode;

fn main() -> ExitCode {
    // A missing .env is fine; GRIDSTAMP_* can come from the real environment.
    let _ = dotenvy::dotenv();

    // Recording is handled in commands::dispatch via GRIDSTAMP_RECORD=<dir>.
    match gridstamp::run(std::env::args()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
