// src/api/mod.rs — Authenticated HTTP client for the TaskSphere backend
//
// Every request goes through `ApiClient::execute`: attach the bearer token
// from the session, send, and decode. A 401 on a protected call clears the
// token and sends the user back to login before the error reaches the caller,
// so callers never apply a partial update. Nothing is retried or queued.

pub mod auth;
pub mod chat;
pub mod routes;
pub mod tasks;
pub mod types;

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::Session;
use crate::infra::config::{ApiConfig, MAX_INTERVAL_SECS};
use crate::infra::errors::ApiError;
pub use routes::Routes;

/// Whether a call needs a signed-in user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Refused locally without a token; a 401 expires the session.
    Protected,
    /// Login, register, health. A 401 is just an error.
    Public,
}

#[derive(Debug, Clone)]
pub enum Body {
    Empty,
    Json(serde_json::Value),
    Form(Vec<(String, String)>),
}

/// One outgoing call.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    endpoint: String,
    body: Body,
    access: Access,
    headers: Vec<(&'static str, String)>,
}

impl ApiRequest {
    pub fn new(method: Method, endpoint: impl Into<String>) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
            body: Body::Empty,
            access: Access::Protected,
            headers: Vec::new(),
        }
    }

    pub fn get(endpoint: impl Into<String>) -> Self {
        Self::new(Method::GET, endpoint)
    }

    pub fn post(endpoint: impl Into<String>) -> Self {
        Self::new(Method::POST, endpoint)
    }

    pub fn put(endpoint: impl Into<String>) -> Self {
        Self::new(Method::PUT, endpoint)
    }

    pub fn delete(endpoint: impl Into<String>) -> Self {
        Self::new(Method::DELETE, endpoint)
    }

    pub fn json<B: serde::Serialize>(mut self, body: &B) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body)
            .map_err(|e| ApiError::Other(anyhow::anyhow!("Failed to encode request: {e}")))?;
        self.body = Body::Json(value);
        Ok(self)
    }

    pub fn form(mut self, fields: &[(&str, &str)]) -> Self {
        self.body = Body::Form(
            fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        );
        self
    }

    pub fn public(mut self) -> Self {
        self.access = Access::Public;
        self
    }

    pub fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    routes: Routes,
    csrf: bool,
    session: Arc<Session>,
}

impl ApiClient {
    pub fn new(config: &ApiConfig, session: Arc<Session>) -> Result<Self, ApiError> {
        let base_url = config.base_url.trim().trim_end_matches('/').to_string();
        url::Url::parse(&base_url).map_err(|e| ApiError::InvalidUrl {
            url: config.base_url.clone(),
            message: e.to_string(),
        })?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.clamp(1, MAX_INTERVAL_SECS)))
            .build()?;

        Ok(Self {
            http,
            base_url,
            routes: Routes::from_config(config),
            csrf: config.csrf,
            session,
        })
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn routes(&self) -> &Routes {
        &self.routes
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn csrf_enabled(&self) -> bool {
        self.csrf
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Absolute URL for a relative endpoint.
    pub fn url(&self, endpoint: &str) -> Result<url::Url, ApiError> {
        let full = if endpoint.starts_with('/') {
            format!("{}{}", self.base_url, endpoint)
        } else {
            format!("{}/{}", self.base_url, endpoint)
        };
        url::Url::parse(&full).map_err(|e| ApiError::InvalidUrl {
            url: full,
            message: e.to_string(),
        })
    }

    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        self.execute(ApiRequest::get(endpoint)).await
    }

    pub async fn post<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.execute(ApiRequest::post(endpoint).json(body)?).await
    }

    pub async fn put<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.execute(ApiRequest::put(endpoint).json(body)?).await
    }

    pub async fn delete(&self, endpoint: &str) -> Result<(), ApiError> {
        self.execute(ApiRequest::delete(endpoint)).await
    }

    /// Send a request and decode the response body. `204 No Content` (or an
    /// empty body) decodes as JSON `null`, so `()` and `Option<_>` work.
    pub async fn execute<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        let token = self.session.token();
        if request.access == Access::Protected && token.is_none() {
            return Err(ApiError::NotAuthenticated);
        }

        let url = self.url(&request.endpoint)?;
        tracing::debug!("{} {}", request.method, request.endpoint);

        let mut builder = self.http.request(request.method.clone(), url);
        if let Some(ref token) = token {
            builder = builder.bearer_auth(token);
        }
        for (name, value) in &request.headers {
            builder = builder.header(*name, value);
        }
        builder = match request.body {
            Body::Empty => builder,
            Body::Json(ref value) => builder.json(value),
            Body::Form(ref fields) => builder.form(fields),
        };

        let response = builder.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            let text = response.text().await.unwrap_or_default();
            if let (Access::Protected, Some(sent)) = (request.access, token.as_deref()) {
                self.session.expire(sent);
            }
            return Err(ApiError::Unauthorized {
                message: error_message(status, &text),
            });
        }

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            tracing::debug!("{} {} -> {}", request.method, request.endpoint, status);
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: error_message(status, &text),
            });
        }

        let bytes = response.bytes().await?;
        if status == StatusCode::NO_CONTENT || bytes.iter().all(|b| b.is_ascii_whitespace()) {
            return serde_json::from_value(serde_json::Value::Null)
                .map_err(|e| ApiError::Decode(format!("empty response: {e}")));
        }
        serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

/// Human-readable message from an error response.
///
/// Prefers the backend's `detail` (a string, or a list of validation errors
/// with `msg` fields), then `error`/`message`, then the status reason.
pub fn error_message(status: StatusCode, body: &str) -> String {
    let fallback = || {
        status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string()
    };

    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return fallback();
    };

    match &value["detail"] {
        serde_json::Value::String(s) if !s.is_empty() => return s.clone(),
        serde_json::Value::Array(items) => {
            let msgs: Vec<&str> = items
                .iter()
                .filter_map(|item| item["msg"].as_str().or_else(|| item.as_str()))
                .collect();
            if !msgs.is_empty() {
                return msgs.join("; ");
            }
        }
        serde_json::Value::Object(obj) => {
            if let Some(msg) = obj.get("msg").and_then(|m| m.as_str()) {
                return msg.to_string();
            }
        }
        _ => {}
    }

    ["error", "message"]
        .iter()
        .find_map(|key| value[*key].as_str().filter(|s| !s.is_empty()))
        .map(str::to_string)
        .unwrap_or_else(fallback)
}
