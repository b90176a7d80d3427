// src/views/login.rs — Login screen

use std::sync::Arc;

use crate::api::ApiClient;
use crate::auth::Route;

const LOGIN_FALLBACK: &str = "Invalid email or password";

pub struct LoginView {
    api: Arc<ApiClient>,
    error: Option<String>,
}

impl LoginView {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api, error: None }
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Submit credentials. On success the token is stored and the user is
    /// sent to the dashboard; on failure `error()` holds the message.
    pub async fn submit(&mut self, email: &str, password: &str) -> bool {
        self.error = None;

        let token = match self.api.login(email.trim(), password).await {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!("Login failed: {}", e);
                self.error = Some(e.message_or(LOGIN_FALLBACK));
                return false;
            }
        };

        if let Err(e) = self.api.session().sign_in(&token) {
            tracing::error!("Could not store session token: {}", e);
            self.error = Some(e.to_string());
            return false;
        }

        self.api.session().navigate(Route::Dashboard);
        true
    }
}
