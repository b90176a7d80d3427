// src/store/bus.rs — Typed "tasks changed" notifications
//
// Task-mutating code publishes here; list views subscribe and refresh. The
// bus is an ordinary value handed to whoever needs it, not a global.

use tokio::sync::broadcast;

/// What happened to the task set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TaskChange {
    Created(i64),
    Updated(i64),
    Deleted(i64),
    /// The assistant replied; it may have touched any task.
    Assistant,
    /// A push notification from the backend.
    Remote,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreEvent {
    TasksChanged(TaskChange),
}

#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<StoreEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(256);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.sender.subscribe()
    }

    pub fn publish(&self, event: StoreEvent) {
        // No subscribers is fine: nobody is looking at a task list right now.
        let _ = self.sender.send(event);
    }

    pub fn tasks_changed(&self, change: TaskChange) {
        tracing::debug!("tasks changed: {:?}", change);
        self.publish(StoreEvent::TasksChanged(change));
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
