//! CLI command handlers, one file per subcommand.

mod check;
mod config;
mod run;

pub use check::run_check;
pub use config::run_config;
pub use run::run_batch;
