//! Enumerations for TUI state management.

/// Which screen or overlay currently receives key input.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AppState {
    Table,
    Editing,
    Help,
    ConfirmClear,
}
