use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// Terminal task logger.
/// Data lives in ~/.tasklog or the directory passed via --data-dir.
#[derive(Parser)]
#[command(name = "tasklog", version, about = "Log timestamped tasks and export them as CSV")]
pub struct Cli {
    /// Directory holding local storage and logs.
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Defaults to `ui` when omitted.
    #[command(subcommand)]
    pub command: Option<Commands>,
}
