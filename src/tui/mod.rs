// src/tui/mod.rs — Terminal dashboard.
//
// Live task table with filter tabs and counters, built with ratatui.
// Launch via `tasksphere dashboard` (or no subcommand at all).

pub mod app;
pub mod theme;
pub mod widgets;

pub use app::run_dashboard;
