//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

use std::io::Write;
use std::process::ExitCode;

fn main() -> ExitCode {
    match haulage_cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(haulage_cli::CliError::ArgumentParsing(err)) => {
            // Clap renders help and version requests as errors too.
            let code = if err.use_stderr() { ExitCode::FAILURE } else { ExitCode::SUCCESS };
            if err.print().is_err() {
                return ExitCode::FAILURE;
            }
            code
        }
        Err(err) => {
            let mut stderr = std::io::stderr().lock();
            if writeln!(stderr, "haulage: {err}").is_err() {
                return ExitCode::FAILURE;
            }
            ExitCode::FAILURE
        }
    }
}
