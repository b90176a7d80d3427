// src/lib.rs — Library root for TaskSphere

pub mod api;
pub mod auth;
pub mod cli;
pub mod infra;
pub mod store;
pub mod sync;
pub mod tui;
pub mod views;
