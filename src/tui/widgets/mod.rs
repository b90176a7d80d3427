// src/tui/widgets/mod.rs — Dashboard panels

pub mod header;
pub mod tasks;
