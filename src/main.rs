//! # Task Log
//!
//! A terminal form for logging timestamped tasks: each row records when
//! something happened, what kind of activity it was, and a free-text note.
//!
//! ## Key Features
//!
//! - **Editable table**: add rows stamped with the current time, edit date,
//!   type and content in place, delete rows, sort by date
//! - **Local storage**: save the current list as a CSV snapshot and import it back
//! - **CSV export**: write the list to `output.txt` for use elsewhere
//! - **Finish stamps**: mark the end of the working session with one key
//!
//! ## Quick Start
//!
//! ```bash
//! # Launch the task table
//! tasklog
//!
//! # Print what was last saved
//! tasklog list
//!
//! # Export the saved list
//! tasklog export -o today.csv
//! ```
//!
//! Data is stored in `~/.tasklog/` unless `--data-dir` says otherwise.

use clap::Parser;

pub mod cli;
pub mod clock;
pub mod cmd;
pub mod codec;
pub mod config;
pub mod error;
pub mod export;
pub mod fields;
pub mod logging;
pub mod storage;
pub mod store;
pub mod task;
pub mod tui {
    pub mod app;
    pub mod colors;
    pub mod enums;
    pub mod input;
    pub mod run;
    pub mod utils;
}

use cli::Cli;
use cmd::*;
use config::Config;

fn main() {
    let cli = Cli::parse();

    let config = match Config::resolve(cli.data_dir.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to create data directory: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = logging::init(&config.log_path) {
        eprintln!("Warning: logging disabled, cannot open {}: {e}", config.log_path.display());
    }

    match cli.command.unwrap_or(Commands::Ui) {
        Commands::Ui => cmd_ui(&config),
        Commands::List => cmd_list(&config),
        Commands::Export { output } => cmd_export(&config, output),
        Commands::Import { input } => cmd_import(&config, &input),
        Commands::Completions { shell } => cmd_completions(shell),
    }
}
