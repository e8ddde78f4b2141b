//! Color constants for the terminal user interface.

use ratatui::style::Color;

/// Header and status bar background.
pub const SLATE: Color = Color::Rgb(40, 56, 80);
/// Cell under edit.
pub const GOLD: Color = Color::Rgb(255, 215, 0);
/// Confirmation dialog background.
pub const DARK_RED: Color = Color::Rgb(114, 0, 0);
/// Rows stamped as `finish`.
pub const DARK_PURPLE: Color = Color::Rgb(86, 60, 92);
