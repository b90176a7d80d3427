// src/views/register.rs — Account creation screen

use std::sync::Arc;

use crate::api::ApiClient;
use crate::auth::Route;

const REGISTER_FALLBACK: &str = "Registration failed";
pub const REGISTER_SUCCESS: &str = "Registration successful! Please log in.";

pub struct RegisterView {
    api: Arc<ApiClient>,
    error: Option<String>,
    success: Option<String>,
}

impl RegisterView {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            api,
            error: None,
            success: None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn success(&self) -> Option<&str> {
        self.success.as_deref()
    }

    /// Create the account, then route to login. Registering does not sign
    /// the user in.
    pub async fn submit(&mut self, email: &str, password: &str) -> bool {
        self.error = None;
        self.success = None;

        match self.api.register(email.trim(), password).await {
            Ok(user) => {
                tracing::info!(
                    "Registered {}",
                    user.email.as_deref().unwrap_or(email.trim())
                );
                self.success = Some(REGISTER_SUCCESS.to_string());
                self.api.session().navigate(Route::Login);
                true
            }
            Err(e) => {
                tracing::warn!("Registration failed: {}", e);
                self.error = Some(e.message_or(REGISTER_FALLBACK));
                false
            }
        }
    }
}
