// src/views/chat.rs — Assistant chat session
//
// States: Initializing -> Authenticated | Unauthenticated. While
// authenticated the conversation is either unbound (no id yet) or bound to
// the id the backend gave us, and that id threads every send until the user
// starts a new conversation.
//
// Methods take `&self` so a front end can share the view between its input
// loop and whatever renders it. The state lock is never held across an
// await; a pending flag keeps sends from overlapping instead.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::api::types::ChatMessage;
use crate::api::ApiClient;
use crate::infra::errors::ApiError;
use crate::store::{EventBus, TaskChange};
use crate::views::Lifetime;

pub const CONNECTION_ERROR: &str = "Connection error. Please try again.";

/// A canned prompt offered next to the input box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuickAction {
    pub label: &'static str,
    pub prompt: &'static str,
}

/// Prompts end with a space where the user is expected to keep typing.
pub const QUICK_ACTIONS: [QuickAction; 5] = [
    QuickAction {
        label: "List my tasks",
        prompt: "Show me all my tasks",
    },
    QuickAction {
        label: "Add a task",
        prompt: "Add a new task called ",
    },
    QuickAction {
        label: "Delete a task",
        prompt: "Delete task with ID ",
    },
    QuickAction {
        label: "Complete a task",
        prompt: "Mark task ID as complete: ",
    },
    QuickAction {
        label: "Pending tasks",
        prompt: "How many tasks are pending?",
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatPhase {
    Initializing,
    Authenticated,
    Unauthenticated,
}

/// How initialization ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatInit {
    /// No usable session; the user has been sent to login.
    Unauthenticated,
    /// Signed in, no previous conversation (or it could not be loaded).
    Fresh,
    /// Picked up the latest conversation.
    Resumed { conversation_id: i64, messages: usize },
    /// The view went away first. Nothing was applied.
    Cancelled,
}

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("Message is empty")]
    Empty,

    #[error("Still waiting for the previous reply")]
    Busy,

    #[error("Chat is still loading")]
    NotReady,

    #[error("Not signed in")]
    NotAuthenticated,

    /// The session expired mid-send; the user has been sent to login.
    #[error("Session expired")]
    Unauthorized,

    /// The send failed; the text was also added to the transcript.
    #[error("{0}")]
    Failed(String),

    #[error(transparent)]
    Api(#[from] ApiError),
}

#[derive(Debug)]
struct ChatState {
    phase: ChatPhase,
    conversation_id: Option<i64>,
    messages: Vec<ChatMessage>,
    pending: bool,
}

pub struct ChatView {
    api: Arc<ApiClient>,
    bus: EventBus,
    state: Mutex<ChatState>,
}

/// Clears the pending flag however the send ends, including when its
/// future is dropped.
struct PendingGuard<'a> {
    state: &'a Mutex<ChatState>,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        lock(self.state).pending = false;
    }
}

fn lock(state: &Mutex<ChatState>) -> MutexGuard<'_, ChatState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ChatView {
    pub fn new(api: Arc<ApiClient>, bus: EventBus) -> Self {
        Self {
            api,
            bus,
            state: Mutex::new(ChatState {
                phase: ChatPhase::Initializing,
                conversation_id: None,
                messages: Vec::new(),
                pending: false,
            }),
        }
    }

    pub fn phase(&self) -> ChatPhase {
        lock(&self.state).phase
    }

    pub fn conversation_id(&self) -> Option<i64> {
        lock(&self.state).conversation_id
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        lock(&self.state).messages.clone()
    }

    pub fn is_pending(&self) -> bool {
        lock(&self.state).pending
    }

    pub fn quick_action(index: usize) -> Option<&'static QuickAction> {
        QUICK_ACTIONS.get(index)
    }

    /// Resolve the latest conversation and load its history. Work is
    /// abandoned, with nothing applied, if `lifetime` ends first.
    pub async fn init(&self, lifetime: &Lifetime) -> ChatInit {
        if !self.api.session().require_auth() {
            lock(&self.state).phase = ChatPhase::Unauthenticated;
            return ChatInit::Unauthenticated;
        }

        let latest = match lifetime.guard(self.api.latest_conversation()).await {
            Ok(latest) => latest,
            Err(e) => return self.init_failed(e),
        };

        let Some(conversation_id) = latest else {
            self.become_authenticated(None, Vec::new());
            return ChatInit::Fresh;
        };

        match lifetime
            .guard(self.api.conversation_messages(conversation_id))
            .await
        {
            Ok(messages) => {
                let count = messages.len();
                tracing::info!(
                    "Resumed conversation {} ({} messages)",
                    conversation_id,
                    count
                );
                self.become_authenticated(Some(conversation_id), messages);
                ChatInit::Resumed {
                    conversation_id,
                    messages: count,
                }
            }
            Err(e) => self.init_failed(e),
        }
    }

    fn init_failed(&self, e: ApiError) -> ChatInit {
        match e {
            ApiError::Cancelled => ChatInit::Cancelled,
            ApiError::NotAuthenticated | ApiError::Unauthorized { .. } => {
                lock(&self.state).phase = ChatPhase::Unauthenticated;
                ChatInit::Unauthenticated
            }
            e => {
                tracing::error!("Chat init failed: {}", e);
                self.become_authenticated(None, Vec::new());
                ChatInit::Fresh
            }
        }
    }

    fn become_authenticated(&self, conversation_id: Option<i64>, messages: Vec<ChatMessage>) {
        let mut state = lock(&self.state);
        state.phase = ChatPhase::Authenticated;
        state.conversation_id = conversation_id;
        state.messages = messages;
    }

    /// Send one message and return the assistant's reply.
    ///
    /// The user's message shows up in the transcript right away. On
    /// success the reply is appended and the returned conversation id is
    /// adopted. A failed send appends an `Error: ...` bubble instead, except
    /// for an expired session, which just ends the chat.
    pub async fn send(&self, input: &str) -> Result<String, ChatError> {
        let message = input.trim();
        if message.is_empty() {
            return Err(ChatError::Empty);
        }

        let conversation_id = {
            let mut state = lock(&self.state);
            match state.phase {
                ChatPhase::Initializing => return Err(ChatError::NotReady),
                ChatPhase::Unauthenticated => return Err(ChatError::NotAuthenticated),
                ChatPhase::Authenticated => {}
            }
            if state.pending {
                return Err(ChatError::Busy);
            }
            state.pending = true;
            state.messages.push(ChatMessage::user(message));
            state.conversation_id
        };
        let _pending = PendingGuard { state: &self.state };

        let result = self.api.send_chat(message, conversation_id).await;

        match result {
            Ok(reply) => {
                {
                    let mut state = lock(&self.state);
                    state.messages.push(ChatMessage::assistant(reply.response.clone()));
                    state.conversation_id = Some(reply.conversation_id);
                }
                self.bus.tasks_changed(TaskChange::Assistant);
                Ok(reply.response)
            }
            Err(e) if e.is_unauthorized() || matches!(e, ApiError::NotAuthenticated) => {
                lock(&self.state).phase = ChatPhase::Unauthenticated;
                Err(ChatError::Unauthorized)
            }
            Err(e) => {
                tracing::warn!("Chat send failed: {}", e);
                let text = format!("Error: {}", e.message_or(CONNECTION_ERROR));
                lock(&self.state)
                    .messages
                    .push(ChatMessage::assistant(text.clone()));
                Err(ChatError::Failed(text))
            }
        }
    }

    /// Forget the current conversation. The next send starts a new one on
    /// the server.
    pub fn new_conversation(&self) -> Result<(), ChatError> {
        let mut state = lock(&self.state);
        if state.pending {
            return Err(ChatError::Busy);
        }
        state.conversation_id = None;
        state.messages.clear();
        Ok(())
    }

    /// Ask the backend for a fresh conversation and bind to it right away.
    pub async fn open_new_conversation(&self) -> Result<i64, ChatError> {
        {
            let mut state = lock(&self.state);
            if state.pending {
                return Err(ChatError::Busy);
            }
            if state.phase != ChatPhase::Authenticated {
                return Err(ChatError::NotReady);
            }
            state.pending = true;
        }
        let _pending = PendingGuard { state: &self.state };

        let id = match self.api.new_conversation().await {
            Ok(id) => id,
            Err(e) if e.is_unauthorized() => {
                lock(&self.state).phase = ChatPhase::Unauthenticated;
                return Err(ChatError::Unauthorized);
            }
            Err(e) => return Err(e.into()),
        };
        let mut state = lock(&self.state);
        state.conversation_id = Some(id);
        state.messages.clear();
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{MemoryTokenStore, MockNavigator, Session};
    use crate::infra::config::ApiConfig;

    fn offline_view(token: Option<&str>, nav: MockNavigator) -> ChatView {
        let tokens: Arc<dyn crate::auth::TokenStore> = match token {
            Some(t) => Arc::new(MemoryTokenStore::with_token(t)),
            None => Arc::new(MemoryTokenStore::new()),
        };
        let session = Arc::new(Session::new(tokens, Arc::new(nav)));
        let config = ApiConfig {
            base_url: "http://127.0.0.1:9".into(),
            ..ApiConfig::default()
        };
        let api = Arc::new(ApiClient::new(&config, session).unwrap());
        ChatView::new(api, EventBus::new())
    }

    #[test]
    fn test_quick_actions() {
        assert_eq!(QUICK_ACTIONS.len(), 5);
        assert_eq!(
            ChatView::quick_action(0).map(|a| a.prompt),
            Some("Show me all my tasks")
        );
        assert_eq!(
            ChatView::quick_action(1).map(|a| a.prompt),
            Some("Add a new task called ")
        );
        assert!(ChatView::quick_action(5).is_none());
    }

    #[tokio::test]
    async fn test_init_without_token_redirects_once() {
        let mut nav = MockNavigator::new();
        nav.expect_navigate()
            .with(mockall::predicate::eq(crate::auth::Route::Login))
            .times(1)
            .return_const(());
        let view = offline_view(None, nav);
        let (_mount, life) = crate::views::mount();

        assert_eq!(view.init(&life).await, ChatInit::Unauthenticated);
        assert_eq!(view.phase(), ChatPhase::Unauthenticated);
        assert!(matches!(
            view.send("hi").await,
            Err(ChatError::NotAuthenticated)
        ));
    }

    #[tokio::test]
    async fn test_send_before_init_is_not_ready() {
        let view = offline_view(Some("tok"), MockNavigator::new());
        assert!(matches!(view.send("hello").await, Err(ChatError::NotReady)));
        assert!(view.messages().is_empty());
    }

    #[tokio::test]
    async fn test_empty_input_rejected() {
        let view = offline_view(Some("tok"), MockNavigator::new());
        assert!(matches!(view.send("   ").await, Err(ChatError::Empty)));
    }

    #[tokio::test]
    async fn test_init_cancelled_applies_nothing() {
        let view = offline_view(Some("tok"), MockNavigator::new());
        let (mount, life) = crate::views::mount();
        mount.unmount();

        assert_eq!(view.init(&life).await, ChatInit::Cancelled);
        assert_eq!(view.phase(), ChatPhase::Initializing);
    }

    #[tokio::test]
    async fn test_unreachable_backend_degrades_to_fresh_session() {
        let view = offline_view(Some("tok"), MockNavigator::new());
        let (_mount, life) = crate::views::mount();

        assert_eq!(view.init(&life).await, ChatInit::Fresh);
        assert_eq!(view.phase(), ChatPhase::Authenticated);
        assert!(view.conversation_id().is_none());

        // Sending now fails on the network and leaves an error bubble.
        let err = view.send("hello").await.unwrap_err();
        assert!(matches!(err, ChatError::Failed(ref t) if t == "Error: Connection error. Please try again."));
        let messages = view.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0], ChatMessage::user("hello"));
        assert!(!view.is_pending());
    }

    #[test]
    fn test_new_conversation_clears_everything() {
        let view = offline_view(Some("tok"), MockNavigator::new());
        view.become_authenticated(Some(9), vec![ChatMessage::user("a")]);
        view.new_conversation().unwrap();
        assert!(view.conversation_id().is_none());
        assert!(view.messages().is_empty());
    }
}
