// src/store/tasks.rs — Per-view task cache
//
// A view's copy of the backend task list. Entries are only ever replaced by
// what the server returned; nothing here computes task state locally.

use serde::{Deserialize, Serialize};

use crate::api::types::Task;

/// Which subset of tasks a view shows.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum TaskFilter {
    #[default]
    All,
    Completed,
    Pending,
}

impl TaskFilter {
    pub const ALL: [TaskFilter; 3] = [TaskFilter::All, TaskFilter::Completed, TaskFilter::Pending];

    pub fn label(&self) -> &'static str {
        match self {
            TaskFilter::All => "all",
            TaskFilter::Completed => "completed",
            TaskFilter::Pending => "pending",
        }
    }

    pub fn matches(&self, task: &Task) -> bool {
        match self {
            TaskFilter::All => true,
            TaskFilter::Completed => task.status,
            TaskFilter::Pending => !task.status,
        }
    }

    /// Next filter in display order, wrapping around.
    pub fn cycle(&self) -> TaskFilter {
        let idx = Self::ALL.iter().position(|f| f == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

impl std::fmt::Display for TaskFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for TaskFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "all" => Ok(TaskFilter::All),
            "completed" | "done" => Ok(TaskFilter::Completed),
            "pending" | "open" => Ok(TaskFilter::Pending),
            other => Err(format!("unknown filter '{other}' (expected all, completed, pending)")),
        }
    }
}

/// Ordered task list keyed by task id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskList {
    tasks: Vec<Task>,
}

impl TaskList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole list with a server snapshot. Duplicate ids in the
    /// snapshot collapse to their first occurrence.
    pub fn replace_all(&mut self, tasks: Vec<Task>) {
        let mut seen = std::collections::HashSet::new();
        self.tasks = tasks.into_iter().filter(|t| seen.insert(t.id)).collect();
    }

    /// Put a freshly created task at the front. If the id is already present
    /// (e.g. a poll landed first) the stale copy is dropped.
    pub fn prepend(&mut self, task: Task) {
        self.tasks.retain(|t| t.id != task.id);
        self.tasks.insert(0, task);
    }

    /// Replace the entry with the same id, keeping its position. Returns
    /// false when the id is not in the list.
    pub fn replace(&mut self, task: Task) -> bool {
        match self.tasks.iter_mut().find(|t| t.id == task.id) {
            Some(slot) => {
                *slot = task;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: i64) -> Option<Task> {
        let pos = self.tasks.iter().position(|t| t.id == id)?;
        Some(self.tasks.remove(pos))
    }

    pub fn get(&self, id: i64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }

    pub fn filtered(&self, filter: TaskFilter) -> Vec<&Task> {
        filter_tasks(&self.tasks, filter)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn completed_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.status).count()
    }
}

pub fn filter_tasks(tasks: &[Task], filter: TaskFilter) -> Vec<&Task> {
    tasks.iter().filter(|t| filter.matches(t)).collect()
}
