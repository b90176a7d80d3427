// src/sync/mod.rs — Keeping views fresh: interval polling plus optional push

pub mod poller;
pub mod push;

pub use poller::{FetchFn, Poller};
pub use push::PushListener;
