//! Command implementations for the CLI interface.
//!
//! `ui` launches the interactive table; the remaining subcommands work
//! directly against the snapshot saved in local storage.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Subcommand;
use clap_complete::{generate, Shell};
use tracing::{error, info};

use crate::config::Config;
use crate::error::StoreError;
use crate::export::write_export;
use crate::storage::{load_tasks_csv, save_tasks, LocalStorage};
use crate::store::TaskStore;
use crate::task::Task;
use crate::tui::run::run_tui;

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the interactive task table.
    Ui,

    /// Print the tasks saved in local storage.
    List,

    /// Write the saved tasks to a CSV file.
    Export {
        /// Output file path (default: output.txt)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Validate a CSV file and save it to local storage, replacing the saved tasks.
    Import {
        /// Input CSV file path
        input: PathBuf,
    },

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Launch the terminal user interface.
pub fn cmd_ui(config: &Config) {
    if let Err(e) = run_tui(config) {
        error!("UI error: {e}");
        eprintln!("UI error: {e}");
        std::process::exit(1);
    }
}

/// Print the saved task collection as a table.
pub fn cmd_list(config: &Config) {
    let store = load_or_exit(config);
    if store.is_empty() {
        println!("No saved tasks.");
        return;
    }
    print!("{}", format_table(store.tasks()));
}

/// Export the saved task collection to a CSV file.
pub fn cmd_export(config: &Config, output: Option<PathBuf>) {
    let store = load_or_exit(config);
    let output_path = output.unwrap_or_else(|| config.export_path.clone());
    match write_export(&output_path, store.tasks()) {
        Ok(count) => println!("Exported {} task(s) to {}", count, output_path.display()),
        Err(e) => {
            eprintln!("Failed to write export file: {}", e);
            std::process::exit(1);
        }
    }
}

/// Import a CSV file into local storage.
pub fn cmd_import(config: &Config, input: &Path) {
    let csv_content = match fs::read_to_string(input) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Failed to read CSV file '{}': {}", input.display(), e);
            std::process::exit(1);
        }
    };

    let mut store = TaskStore::new();
    if let Err(e) = store.import_from(&csv_content) {
        eprintln!("Invalid CSV file '{}': {}", input.display(), e);
        std::process::exit(1);
    }

    let mut storage = open_storage_or_exit(config);
    if let Err(e) = save_tasks(&mut storage, &store) {
        eprintln!("Failed to save tasks: {e}");
        std::process::exit(1);
    }
    info!(count = store.len(), input = %input.display(), "imported CSV file");
    println!("Imported {} task(s).", store.len());
}

/// Generate shell completion scripts.
pub fn cmd_completions(shell: Shell) {
    use clap::CommandFactory;
    use crate::cli::Cli;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, &mut std::io::stdout());
}

/// Decode the snapshot saved under the tasks key; no snapshot means no tasks.
pub fn load_saved_tasks(storage: &LocalStorage) -> Result<TaskStore, StoreError> {
    let mut store = TaskStore::new();
    if let Some(csv) = load_tasks_csv(storage) {
        store.import_from(csv)?;
    }
    Ok(store)
}

fn open_storage_or_exit(config: &Config) -> LocalStorage {
    match LocalStorage::open(&config.storage_path) {
        Ok(storage) => storage,
        Err(e) => {
            eprintln!("Failed to open storage: {e}");
            std::process::exit(1);
        }
    }
}

fn load_or_exit(config: &Config) -> TaskStore {
    let storage = open_storage_or_exit(config);
    match load_saved_tasks(&storage) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Saved tasks are unreadable: {e}");
            std::process::exit(1);
        }
    }
}

/// Render tasks as a fixed-width table with a header row.
pub fn format_table(tasks: &[Task]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<5} {:<20} {:<12} {}", "ID", "Date", "Type", "Content");
    for t in tasks {
        let _ = writeln!(
            out,
            "{:<5} {:<20} {:<12} {}",
            t.id,
            truncate(&t.date, 20),
            t.kind.as_str(),
            t.content.replace('\n', " ")
        );
    }
    out
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out = String::new();
        for (i, ch) in s.chars().enumerate() {
            if i + 1 >= width {
                out.push('…');
                break;
            }
            out.push(ch);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::Field;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a long timestamp", 6), "a lon…");
    }

    #[test]
    fn test_format_table() {
        let mut store = TaskStore::new();
        let id = store.add_at("2024-01-01 09:00:00").unwrap();
        store.edit_field(id, Field::Content, "two\nlines").unwrap();
        let table = format_table(store.tasks());
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("ID"));
        assert!(lines[1].starts_with("0 "));
        assert!(lines[1].ends_with("two lines"));
    }

    #[test]
    fn test_load_saved_tasks() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = LocalStorage::open(&dir.path().join("storage.json")).unwrap();
        assert!(load_saved_tasks(&storage).unwrap().is_empty());

        let mut store = TaskStore::new();
        store.add_at("2024-01-01").unwrap();
        save_tasks(&mut storage, &store).unwrap();
        assert_eq!(load_saved_tasks(&storage).unwrap(), store);

        storage.set(crate::storage::TASKS_KEY, "id,date\n").unwrap();
        assert!(load_saved_tasks(&storage).is_err());
    }
}
