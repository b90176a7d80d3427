// src/api/tasks.rs — Task CRUD and dashboard stats

use super::types::{DashboardStats, Task, TaskDraft};
use super::ApiClient;
use crate::infra::errors::ApiError;

impl ApiClient {
    pub async fn list_tasks(&self) -> Result<Vec<Task>, ApiError> {
        self.get(&self.routes().tasks()).await
    }

    pub async fn create_task(&self, draft: &TaskDraft) -> Result<Task, ApiError> {
        self.post(&self.routes().tasks(), draft).await
    }

    /// Full replacement of a task's editable fields.
    pub async fn update_task(&self, id: i64, draft: &TaskDraft) -> Result<Task, ApiError> {
        self.put(&self.routes().task(id), draft).await
    }

    pub async fn delete_task(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&self.routes().task(id)).await
    }

    pub async fn stats(&self) -> Result<DashboardStats, ApiError> {
        self.get(&self.routes().stats()).await
    }
}
