// src/store/mod.rs — Client-side view caches and change notifications

pub mod bus;
pub mod tasks;

pub use bus::{EventBus, StoreEvent, TaskChange};
pub use tasks::{filter_tasks, TaskFilter, TaskList};
