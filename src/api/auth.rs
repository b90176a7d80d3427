// src/api/auth.rs — Login, registration and health calls
//
// These are public calls: a 401 from the backend here means bad credentials,
// not an expired session, so it never triggers the login redirect.

use super::types::{
    CsrfResponse, HealthResponse, LoginResponse, RegisterRequest, RegisteredUser,
};
use super::{ApiClient, ApiRequest};
use crate::infra::errors::ApiError;

impl ApiClient {
    /// Exchange credentials for a bearer token. When CSRF is enabled in
    /// config, a token is fetched first and sent as `X-CSRF-Token`.
    ///
    /// The backend's OAuth2 form wants the email in the `username` field.
    /// Does not store the token; the caller decides what to do with it.
    pub async fn login(&self, email: &str, password: &str) -> Result<String, ApiError> {
        let request = ApiRequest::post(self.routes().login())
            .form(&[("username", email), ("password", password)])
            .public();
        let request = self.with_csrf(request).await?;
        let response: LoginResponse = self.execute(request).await?;

        match response.access_token.filter(|t| !t.is_empty()) {
            Some(token) => {
                tracing::debug!(
                    "Login succeeded (token type: {})",
                    response.token_type.as_deref().unwrap_or("bearer")
                );
                Ok(token)
            }
            None => Err(ApiError::Other(anyhow::anyhow!(
                "Token not returned from backend"
            ))),
        }
    }

    /// Create an account. Like `login`, sends `X-CSRF-Token` when CSRF is
    /// enabled in config.
    pub async fn register(&self, email: &str, password: &str) -> Result<RegisteredUser, ApiError> {
        let request = ApiRequest::post(self.routes().register())
            .json(&RegisterRequest { email, password })?
            .public();
        let request = self.with_csrf(request).await?;
        self.execute(request).await
    }

    /// Attach a fresh `X-CSRF-Token` when CSRF is enabled in config.
    async fn with_csrf(&self, request: ApiRequest) -> Result<ApiRequest, ApiError> {
        if !self.csrf_enabled() {
            return Ok(request);
        }
        let token = self.csrf_token().await?;
        Ok(request.header("X-CSRF-Token", token))
    }

    pub async fn csrf_token(&self) -> Result<String, ApiError> {
        let response: CsrfResponse = self
            .execute(ApiRequest::get(self.routes().csrf()).public())
            .await?;
        Ok(response.csrf_token)
    }

    /// `GET /`: liveness of the backend.
    pub async fn health(&self) -> Result<HealthResponse, ApiError> {
        self.execute(ApiRequest::get(self.routes().health()).public())
            .await
    }
}
