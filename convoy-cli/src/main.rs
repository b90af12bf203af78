//! Entry point for the `convoy` command-line interface.
#![forbid(unsafe_code)]

use convoy_cli::CliError;

fn main() -> eyre::Result<()> {
    match convoy_cli::run() {
        // Help and version requests are not failures.
        Err(CliError::ArgumentParsing(err)) => err.exit(),
        other => other.map_err(eyre::Report::from),
    }
}
