use framepull_core::logging;

mod cli;

use crate::cli::CliCommand;

#[tokio::main]
async fn main() {
    // File + stderr when the state dir is writable, stderr only otherwise.
    if let Err(e) = logging::init_logging() {
        logging::init_logging_stderr();
        tracing::warn!("file logging unavailable, logging to stderr only: {:#}", e);
    }

    if let Err(err) = CliCommand::run_from_args().await {
        eprintln!("framepull error: {:#}", err);
        std::process::exit(1);
    }
}
