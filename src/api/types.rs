// src/api/types.rs — Wire types for the TaskSphere backend

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A task as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// true = completed, false = pending.
    #[serde(default)]
    pub status: bool,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
}

impl Task {
    /// Full field set for a PUT, with the status flipped.
    pub fn toggled(&self) -> TaskDraft {
        TaskDraft {
            status: !self.status,
            ..TaskDraft::from(self)
        }
    }

    pub fn status_label(&self) -> &'static str {
        if self.status {
            "Completed"
        } else {
            "Pending"
        }
    }
}

/// Body for task create (POST) and update (PUT).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskDraft {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub status: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        let description = description.into();
        self.description = (!description.trim().is_empty()).then_some(description);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        let category = category.into();
        self.category = (!category.trim().is_empty()).then_some(category);
        self
    }
}

impl From<&Task> for TaskDraft {
    fn from(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            status: task.status,
            category: task.category.clone(),
        }
    }
}

/// Partial edit applied on top of an existing task.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskEdit {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<bool>,
    pub category: Option<String>,
}

impl TaskEdit {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.category.is_none()
    }

    /// The full PUT body: the current task with this edit applied.
    pub fn apply_to(&self, task: &Task) -> TaskDraft {
        let mut draft = TaskDraft::from(task);
        if let Some(ref title) = self.title {
            draft.title = title.clone();
        }
        if let Some(ref description) = self.description {
            draft.description = Some(description.clone());
        }
        if let Some(status) = self.status {
            draft.status = status;
        }
        if let Some(ref category) = self.category {
            draft.category = Some(category.clone());
        }
        draft
    }
}

/// `GET /dashboard/stats`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    #[serde(default)]
    pub tasks_completed: u64,
    #[serde(default)]
    pub pending_tasks: u64,
    #[serde(default)]
    pub upcoming_deadlines: u64,
}

// -- Auth --

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisteredUser {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CsrfResponse {
    #[serde(rename = "csrfToken")]
    pub csrf_token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
}

// -- Chat --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

impl Sender {
    /// Anything the backend calls other than "user" is rendered as the
    /// assistant's side of the transcript.
    pub fn from_wire(sender: &str) -> Self {
        if sender.eq_ignore_ascii_case("user") {
            Sender::User
        } else {
            Sender::Assistant
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub sender: Sender,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            sender: Sender::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest<'a> {
    pub message: &'a str,
    pub conversation_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub conversation_id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LatestConversation {
    #[serde(default)]
    pub conversation_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireMessage {
    pub sender: String,
    pub content: String,
}

impl From<WireMessage> for ChatMessage {
    fn from(m: WireMessage) -> Self {
        Self {
            sender: Sender::from_wire(&m.sender),
            content: m.content,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessagesResponse {
    #[serde(default)]
    pub messages: Vec<WireMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewConversationResponse {
    pub conversation_id: i64,
}
