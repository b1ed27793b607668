//! Presentation layer with the terminal UI and key handling.

/// Key handling.
pub mod events;
/// UI screens.
pub mod ui;
/// Reusable widgets.
pub mod widgets;

pub use ui::App;
