// src/views/tasks.rs — Task list: load, mutate, filter, keep fresh
//
// Local state changes only after the server confirms. Every confirmed
// mutation is announced on the bus so other views (and this view's own
// poller) pick it up.

use futures::FutureExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::api::types::{Task, TaskDraft, TaskEdit};
use crate::api::ApiClient;
use crate::infra::errors::ApiError;
use crate::store::{EventBus, TaskChange, TaskFilter, TaskList};
use crate::sync::{FetchFn, Poller};

pub const LOGIN_REQUIRED: &str = "You must be logged in to view your tasks.";
pub const LOAD_FAILED: &str = "Failed to load tasks. Please try again.";
pub const ADD_FAILED: &str = "Failed to add task";
pub const STATUS_FAILED: &str = "Failed to update status";
pub const UPDATE_FAILED: &str = "Failed to update task";
pub const DELETE_FAILED: &str = "Failed to delete task";

type PollResult = Result<Vec<Task>, ApiError>;

struct Polling {
    poller: Poller,
    results: mpsc::Receiver<PollResult>,
}

pub struct TasksView {
    api: Arc<ApiClient>,
    bus: EventBus,
    tasks: TaskList,
    filter: TaskFilter,
    loading: bool,
    error: Option<String>,
    alert: Option<String>,
    poll_interval: Duration,
    polling: Option<Polling>,
}

impl TasksView {
    pub fn new(api: Arc<ApiClient>, bus: EventBus) -> Self {
        Self {
            api,
            bus,
            tasks: TaskList::new(),
            filter: TaskFilter::All,
            loading: false,
            error: None,
            alert: None,
            poll_interval: Duration::from_secs(10),
            polling: None,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_filter(mut self, filter: TaskFilter) -> Self {
        self.filter = filter;
        self
    }

    // -- State --

    pub fn tasks(&self) -> &TaskList {
        &self.tasks
    }

    /// Tasks matching the active filter, in list order.
    pub fn visible(&self) -> Vec<&Task> {
        self.tasks.filtered(self.filter)
    }

    pub fn filter(&self) -> TaskFilter {
        self.filter
    }

    pub fn set_filter(&mut self, filter: TaskFilter) {
        self.filter = filter;
    }

    pub fn cycle_filter(&mut self) -> TaskFilter {
        self.filter = self.filter.cycle();
        self.filter
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Why the list could not be loaded.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Notice from the last failed mutation.
    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    pub fn take_alert(&mut self) -> Option<String> {
        self.alert.take()
    }

    // -- Loading --

    /// Fetch the full list. Without a token this redirects to login and
    /// sends nothing.
    pub async fn load(&mut self) -> Result<(), ApiError> {
        if !self.api.session().require_auth() {
            self.error = Some(LOGIN_REQUIRED.into());
            return Err(ApiError::NotAuthenticated);
        }

        self.loading = true;
        let result = self.api.list_tasks().await;
        self.loading = false;

        match result {
            Ok(tasks) => {
                tracing::debug!("Loaded {} tasks", tasks.len());
                self.tasks.replace_all(tasks);
                self.error = None;
                Ok(())
            }
            Err(e) => {
                self.error = Some(if e.is_unauthorized() {
                    LOGIN_REQUIRED.into()
                } else {
                    LOAD_FAILED.into()
                });
                tracing::warn!("Failed to load tasks: {}", e);
                Err(e)
            }
        }
    }

    // -- Mutations --

    /// Create a task and put it at the front of the list. A blank title is
    /// ignored and returns `Ok(None)`.
    pub async fn create(&mut self, draft: TaskDraft) -> Result<Option<Task>, ApiError> {
        if draft.title.trim().is_empty() {
            return Ok(None);
        }
        let draft = TaskDraft {
            title: draft.title.trim().to_string(),
            ..draft
        };

        let result = self.api.create_task(&draft).await;
        let task = result.map_err(|e| self.alert_on(e, ADD_FAILED))?;

        self.alert = None;
        self.tasks.prepend(task.clone());
        self.bus.tasks_changed(TaskChange::Created(task.id));
        Ok(Some(task))
    }

    /// Flip a task's completion flag.
    pub async fn toggle(&mut self, id: i64) -> Result<Task, ApiError> {
        let current = self.known(id).map_err(|e| self.alert_on(e, STATUS_FAILED))?;
        let draft = current.toggled();
        self.put(id, draft, STATUS_FAILED).await
    }

    /// Apply a partial edit; untouched fields keep their current values.
    pub async fn update(&mut self, id: i64, edit: &TaskEdit) -> Result<Task, ApiError> {
        let current = self.known(id).map_err(|e| self.alert_on(e, UPDATE_FAILED))?;
        let draft = edit.apply_to(&current);
        self.put(id, draft, UPDATE_FAILED).await
    }

    pub async fn delete(&mut self, id: i64) -> Result<(), ApiError> {
        let result = self.api.delete_task(id).await;
        result.map_err(|e| self.alert_on(e, DELETE_FAILED))?;

        self.alert = None;
        self.tasks.remove(id);
        self.bus.tasks_changed(TaskChange::Deleted(id));
        Ok(())
    }

    async fn put(&mut self, id: i64, draft: TaskDraft, fallback: &str) -> Result<Task, ApiError> {
        let result = self.api.update_task(id, &draft).await;
        let task = result.map_err(|e| self.alert_on(e, fallback))?;

        self.alert = None;
        if !self.tasks.replace(task.clone()) {
            self.tasks.prepend(task.clone());
        }
        self.bus.tasks_changed(TaskChange::Updated(task.id));
        Ok(task)
    }

    fn known(&self, id: i64) -> Result<Task, ApiError> {
        self.tasks.get(id).cloned().ok_or_else(|| ApiError::Status {
            status: 404,
            message: format!("No task with id {id} in the current list"),
        })
    }

    /// Record an alert for a failed user action. An expired session has
    /// already sent the user to login, so no alert is shown for it.
    fn alert_on(&mut self, e: ApiError, fallback: &str) -> ApiError {
        if !e.is_unauthorized() {
            tracing::warn!("{}: {}", fallback, e);
            self.alert = Some(e.message_or(fallback));
        }
        e
    }

    // -- Freshness --

    pub fn start_polling(&mut self) {
        if self.polling.is_some() {
            return;
        }
        let api = self.api.clone();
        let fetch: FetchFn<PollResult> = Arc::new(move || {
            let api = api.clone();
            async move { api.list_tasks().await }.boxed()
        });
        let (poller, results) = Poller::start(self.poll_interval, Some(&self.bus), fetch);
        self.polling = Some(Polling { poller, results });
    }

    pub fn stop_polling(&mut self) {
        if let Some(mut polling) = self.polling.take() {
            polling.poller.stop();
        }
    }

    pub fn is_polling(&self) -> bool {
        self.polling
            .as_ref()
            .is_some_and(|p| p.poller.is_running())
    }

    /// Manual refresh: stop the timer, reload, and start the timer again
    /// from zero if it was running.
    pub async fn refresh(&mut self) -> Result<(), ApiError> {
        let was_polling = self.polling.is_some();
        self.stop_polling();
        let result = self.load().await;
        if was_polling && self.api.session().is_authenticated() {
            self.start_polling();
        }
        result
    }

    /// Apply any poll results that have already arrived, without waiting.
    /// Returns how many were applied.
    pub fn try_apply_updates(&mut self) -> usize {
        let mut applied = 0;
        loop {
            let Some(polling) = self.polling.as_mut() else {
                break;
            };
            match polling.results.try_recv() {
                Ok(result) => {
                    let _ = self.apply_poll(result);
                    applied += 1;
                }
                Err(_) => break,
            }
        }
        applied
    }

    /// Wait for the next poll result and apply it. `None` when not polling.
    pub async fn next_update(&mut self) -> Option<Result<(), ApiError>> {
        let polling = self.polling.as_mut()?;
        let result = polling.results.recv().await?;
        Some(self.apply_poll(result))
    }

    fn apply_poll(&mut self, result: PollResult) -> Result<(), ApiError> {
        match result {
            Ok(tasks) => {
                self.tasks.replace_all(tasks);
                self.error = None;
                Ok(())
            }
            Err(e) => {
                if e.is_unauthorized() || matches!(e, ApiError::NotAuthenticated) {
                    self.error = Some(LOGIN_REQUIRED.into());
                    self.stop_polling();
                } else {
                    tracing::warn!("Background refresh failed: {}", e);
                }
                Err(e)
            }
        }
    }
}

impl Drop for TasksView {
    fn drop(&mut self) {
        self.stop_polling();
    }
}
