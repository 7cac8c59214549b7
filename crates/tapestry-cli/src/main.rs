use tapestry_core::logging;

mod cli;

use crate::cli::CliCommand;

fn main() {
    logging::init_logging();

    if let Err(err) = CliCommand::run_from_args() {
        tracing::debug!("command failed: {:#}", err);
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}
