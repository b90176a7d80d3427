// tests/common/mod.rs — In-process fake of the TaskSphere backend
//
// Serves the same routes and payload shapes as the real server on an
// ephemeral port. Only "good-token" is accepted as a bearer token until
// `revoke` is called.

#![allow(dead_code)]

use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Form, Json, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::sse::{Event, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::Router;
use serde::Deserialize;
use serde_json::{json, Value};

use tasksphere::api::types::{Task, TaskDraft};
use tasksphere::auth::{MemoryTokenStore, Route, TokenStore};
use tasksphere::cli::AppContext;
use tasksphere::infra::config::Config;

pub const GOOD_TOKEN: &str = "good-token";
pub const PASSWORD: &str = "secret";
pub const CSRF_TOKEN: &str = "csrf-abc";
/// Conversation id the fake assigns to a chat sent without one.
pub const NEW_CHAT_ID: i64 = 42;
/// Conversation id returned by `POST /api/conversations/new`.
pub const OPENED_CHAT_ID: i64 = 100;

#[derive(Default)]
struct Inner {
    token_valid: bool,
    tasks: Vec<Task>,
    next_id: i64,
    users: Vec<String>,
    require_csrf: bool,
    csrf_seen: Option<String>,
    latest_conversation: Option<i64>,
    conversations: HashMap<i64, Vec<(String, String)>>,
    last_chat_conversation: Option<Option<i64>>,
    chat_delay: Duration,
    hits: HashMap<String, usize>,
}

#[derive(Clone)]
pub struct Backend {
    pub addr: SocketAddr,
    inner: Arc<Mutex<Inner>>,
}

impl Backend {
    pub async fn start() -> Self {
        let inner = Arc::new(Mutex::new(Inner {
            token_valid: true,
            next_id: 1,
            ..Default::default()
        }));

        let app = Router::new()
            .route("/", get(health))
            .route("/auth/login", post(login))
            .route("/auth/register", post(register))
            .route("/api/auth/csrf", get(csrf))
            .route("/dashboard/tasks/", get(list_tasks).post(create_task))
            .route("/dashboard/tasks/{id}", put(update_task).delete(delete_task))
            .route("/dashboard/stats", get(stats))
            .route("/api/chat", post(chat))
            .route("/api/conversations/latest", get(latest_conversation))
            .route("/api/conversations/{id}/messages", get(conversation_messages))
            .route("/api/conversations/new", post(new_conversation))
            .route("/events", get(events))
            .with_state(inner.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, inner }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn config(&self) -> Config {
        let mut config = Config::default();
        config.api.base_url = self.url();
        config.api.timeout_secs = 5;
        config
    }

    /// A context whose token store starts with `token`.
    pub fn context(&self, token: Option<&str>) -> AppContext {
        self.context_with(self.config(), token)
    }

    pub fn context_with(&self, config: Config, token: Option<&str>) -> AppContext {
        let tokens: Arc<dyn TokenStore> = match token {
            Some(t) => Arc::new(MemoryTokenStore::with_token(t)),
            None => Arc::new(MemoryTokenStore::new()),
        };
        AppContext::new(config, tokens, Route::Dashboard).unwrap()
    }

    pub fn signed_in(&self) -> AppContext {
        self.context(Some(GOOD_TOKEN))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap()
    }

    /// Add a task as if another client had created it.
    pub fn insert_task(&self, title: &str, done: bool) -> i64 {
        let mut inner = self.lock();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.tasks.insert(0, task(id, &TaskDraft { status: done, ..TaskDraft::new(title) }));
        id
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.lock().tasks.clone()
    }

    /// From now on every bearer token is rejected.
    pub fn revoke(&self) {
        self.lock().token_valid = false;
    }

    pub fn require_csrf(&self) {
        self.lock().require_csrf = true;
    }

    pub fn csrf_seen(&self) -> Option<String> {
        self.lock().csrf_seen.clone()
    }

    pub fn add_user(&self, email: &str) {
        self.lock().users.push(email.to_string());
    }

    pub fn seed_conversation(&self, id: i64, messages: &[(&str, &str)]) {
        let mut inner = self.lock();
        inner.latest_conversation = Some(id);
        inner.conversations.insert(
            id,
            messages
                .iter()
                .map(|(s, c)| (s.to_string(), c.to_string()))
                .collect(),
        );
    }

    /// The `conversation_id` carried by the most recent chat request.
    pub fn last_chat_conversation(&self) -> Option<Option<i64>> {
        self.lock().last_chat_conversation
    }

    pub fn set_chat_delay(&self, delay: Duration) {
        self.lock().chat_delay = delay;
    }

    /// How many requests reached `"METHOD /path"`.
    pub fn hits(&self, route: &str) -> usize {
        self.lock().hits.get(route).copied().unwrap_or(0)
    }
}

type Shared = Arc<Mutex<Inner>>;

fn task(id: i64, draft: &TaskDraft) -> Task {
    let now = chrono::Utc::now().naive_utc();
    Task {
        id,
        title: draft.title.clone(),
        description: draft.description.clone(),
        status: draft.status,
        category: draft.category.clone(),
        user_id: Some(1),
        created_at: Some(now),
        updated_at: Some(now),
    }
}

fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}

fn hit(state: &Shared, route: &str) {
    *state.lock().unwrap().hits.entry(route.to_string()).or_default() += 1;
}

fn check_auth(state: &Shared, headers: &HeaderMap) -> Result<(), Response> {
    let valid = state.lock().unwrap().token_valid;
    let bearer = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    match bearer {
        Some(GOOD_TOKEN) if valid => Ok(()),
        _ => Err(detail(StatusCode::UNAUTHORIZED, "Could not validate credentials")),
    }
}

/// Records the `X-CSRF-Token` header and, when required, rejects requests
/// that lack the issued token.
fn check_csrf(state: &Shared, headers: &HeaderMap) -> Result<(), Response> {
    let csrf = headers
        .get("x-csrf-token")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let mut inner = state.lock().unwrap();
    inner.csrf_seen = csrf.clone();
    if inner.require_csrf && csrf.as_deref() != Some(CSRF_TOKEN) {
        return Err(detail(StatusCode::FORBIDDEN, "CSRF token missing or invalid"));
    }
    Ok(())
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "message": "TaskSphere API is running" }))
}

#[derive(Deserialize)]
struct LoginForm {
    username: String,
    password: String,
}

async fn login(
    State(state): State<Shared>,
    headers: HeaderMap,
    Form(form): Form<LoginForm>,
) -> Response {
    hit(&state, "POST /auth/login");
    if let Err(r) = check_csrf(&state, &headers) {
        return r;
    }
    if form.username.is_empty() || form.password != PASSWORD {
        return detail(StatusCode::UNAUTHORIZED, "Incorrect email or password");
    }
    Json(json!({ "access_token": GOOD_TOKEN, "token_type": "bearer" })).into_response()
}

#[derive(Deserialize)]
struct RegisterBody {
    email: String,
    password: String,
}

async fn register(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<RegisterBody>,
) -> Response {
    hit(&state, "POST /auth/register");
    if let Err(r) = check_csrf(&state, &headers) {
        return r;
    }
    let mut inner = state.lock().unwrap();
    if body.password.len() < 6 {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "detail": [
                { "loc": ["body", "password"], "msg": "Password too short" }
            ]})),
        )
            .into_response();
    }
    if inner.users.contains(&body.email) {
        return detail(StatusCode::BAD_REQUEST, "Email already registered");
    }
    inner.users.push(body.email.clone());
    let id = inner.users.len() as i64;
    Json(json!({ "id": id, "email": body.email })).into_response()
}

async fn csrf(State(state): State<Shared>) -> Json<Value> {
    hit(&state, "GET /api/auth/csrf");
    Json(json!({ "csrfToken": CSRF_TOKEN }))
}

async fn list_tasks(State(state): State<Shared>, headers: HeaderMap) -> Response {
    hit(&state, "GET /dashboard/tasks/");
    if let Err(r) = check_auth(&state, &headers) {
        return r;
    }
    Json(state.lock().unwrap().tasks.clone()).into_response()
}

async fn create_task(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(draft): Json<TaskDraft>,
) -> Response {
    hit(&state, "POST /dashboard/tasks/");
    if let Err(r) = check_auth(&state, &headers) {
        return r;
    }
    if draft.title.trim().is_empty() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "detail": [
                { "loc": ["body", "title"], "msg": "Field required" },
                { "loc": ["body", "title"], "msg": "String should have at least 1 character" }
            ]})),
        )
            .into_response();
    }
    let mut inner = state.lock().unwrap();
    let id = inner.next_id;
    inner.next_id += 1;
    let created = task(id, &draft);
    inner.tasks.insert(0, created.clone());
    (StatusCode::CREATED, Json(created)).into_response()
}

async fn update_task(
    State(state): State<Shared>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(draft): Json<TaskDraft>,
) -> Response {
    hit(&state, "PUT /dashboard/tasks/{id}");
    if let Err(r) = check_auth(&state, &headers) {
        return r;
    }
    let mut inner = state.lock().unwrap();
    let Some(existing) = inner.tasks.iter_mut().find(|t| t.id == id) else {
        return detail(StatusCode::NOT_FOUND, "Task not found");
    };
    let created_at = existing.created_at;
    *existing = Task {
        created_at,
        ..task(id, &draft)
    };
    Json(existing.clone()).into_response()
}

async fn delete_task(
    State(state): State<Shared>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    hit(&state, "DELETE /dashboard/tasks/{id}");
    if let Err(r) = check_auth(&state, &headers) {
        return r;
    }
    let mut inner = state.lock().unwrap();
    let before = inner.tasks.len();
    inner.tasks.retain(|t| t.id != id);
    if inner.tasks.len() == before {
        return detail(StatusCode::NOT_FOUND, "Task not found");
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn stats(State(state): State<Shared>, headers: HeaderMap) -> Response {
    hit(&state, "GET /dashboard/stats");
    if let Err(r) = check_auth(&state, &headers) {
        return r;
    }
    let inner = state.lock().unwrap();
    let done = inner.tasks.iter().filter(|t| t.status).count();
    Json(json!({
        "tasksCompleted": done,
        "pendingTasks": inner.tasks.len() - done,
        "upcomingDeadlines": 0
    }))
    .into_response()
}

#[derive(Deserialize)]
struct ChatBody {
    message: String,
    conversation_id: Option<i64>,
}

/// Echoes the message. "boom" fails; "Add a new task called X" creates X
/// the way the real assistant would.
async fn chat(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<ChatBody>,
) -> Response {
    hit(&state, "POST /api/chat");
    if let Err(r) = check_auth(&state, &headers) {
        return r;
    }

    let delay = state.lock().unwrap().chat_delay;
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    let mut inner = state.lock().unwrap();
    inner.last_chat_conversation = Some(body.conversation_id);
    if body.message == "boom" {
        return detail(StatusCode::INTERNAL_SERVER_ERROR, "Assistant unavailable");
    }

    let conversation_id = body.conversation_id.unwrap_or(NEW_CHAT_ID);
    let response = match body.message.strip_prefix("Add a new task called ") {
        Some(title) => {
            let id = inner.next_id;
            inner.next_id += 1;
            inner.tasks.insert(0, task(id, &TaskDraft::new(title)));
            format!("Added task #{id}: {title}")
        }
        None => format!("Echo: {}", body.message),
    };

    let log = inner.conversations.entry(conversation_id).or_default();
    log.push(("user".into(), body.message.clone()));
    log.push(("assistant".into(), response.clone()));
    inner.latest_conversation = Some(conversation_id);

    Json(json!({ "response": response, "conversation_id": conversation_id })).into_response()
}

async fn latest_conversation(State(state): State<Shared>, headers: HeaderMap) -> Response {
    hit(&state, "GET /api/conversations/latest");
    if let Err(r) = check_auth(&state, &headers) {
        return r;
    }
    let latest = state.lock().unwrap().latest_conversation;
    Json(json!({ "conversation_id": latest })).into_response()
}

async fn conversation_messages(
    State(state): State<Shared>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    hit(&state, "GET /api/conversations/{id}/messages");
    if let Err(r) = check_auth(&state, &headers) {
        return r;
    }
    let inner = state.lock().unwrap();
    let Some(log) = inner.conversations.get(&id) else {
        return detail(StatusCode::NOT_FOUND, "Conversation not found");
    };
    let messages: Vec<Value> = log
        .iter()
        .map(|(sender, content)| json!({ "sender": sender, "content": content }))
        .collect();
    Json(json!({ "messages": messages })).into_response()
}

async fn new_conversation(State(state): State<Shared>, headers: HeaderMap) -> Response {
    hit(&state, "POST /api/conversations/new");
    if let Err(r) = check_auth(&state, &headers) {
        return r;
    }
    let mut inner = state.lock().unwrap();
    inner.conversations.insert(OPENED_CHAT_ID, Vec::new());
    inner.latest_conversation = Some(OPENED_CHAT_ID);
    Json(json!({ "conversation_id": OPENED_CHAT_ID })).into_response()
}

/// One change notification, then the stream ends.
async fn events(State(state): State<Shared>, headers: HeaderMap) -> Response {
    hit(&state, "GET /events");
    if let Err(r) = check_auth(&state, &headers) {
        return r;
    }
    let stream = futures::stream::iter(vec![Ok::<_, Infallible>(
        Event::default().event("tasks").data("changed"),
    )]);
    Sse::new(stream).into_response()
}
