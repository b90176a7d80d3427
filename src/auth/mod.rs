// src/auth/mod.rs — Session context shared by every view that talks to the API
//
// A `Session` bundles the token store and the navigator. It is created once
// at startup and passed to the HTTP client and the views; nothing reads the
// token from ambient state.

pub mod token;

use std::sync::{Arc, Mutex};
use tokio::sync::watch;

use crate::infra::errors::ApiError;
pub use token::{FileTokenStore, MemoryTokenStore, TokenStore};

/// Screens of the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Register,
    Dashboard,
    Tasks,
    Chat,
}

impl Route {
    pub fn is_protected(&self) -> bool {
        !matches!(self, Route::Login | Route::Register)
    }
}

/// Moves the user between screens.
#[cfg_attr(test, mockall::automock)]
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

/// Navigator that records the current route and lets front ends watch it.
pub struct RouteTracker {
    current: watch::Sender<Route>,
    history: Mutex<Vec<Route>>,
}

impl RouteTracker {
    pub fn new(initial: Route) -> Self {
        let (current, _) = watch::channel(initial);
        Self {
            current,
            history: Mutex::new(Vec::new()),
        }
    }

    pub fn current(&self) -> Route {
        *self.current.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<Route> {
        self.current.subscribe()
    }

    /// Every navigation so far, oldest first.
    pub fn history(&self) -> Vec<Route> {
        self.history.lock().map(|h| h.clone()).unwrap_or_default()
    }

    /// How many times the user was sent to `route`.
    pub fn visits(&self, route: Route) -> usize {
        self.history().iter().filter(|r| **r == route).count()
    }
}

impl Navigator for RouteTracker {
    fn navigate(&self, route: Route) {
        tracing::debug!("navigate -> {:?}", route);
        if let Ok(mut history) = self.history.lock() {
            history.push(route);
        }
        self.current.send_replace(route);
    }
}

/// Authentication state plus the means to act on it.
pub struct Session {
    tokens: Arc<dyn TokenStore>,
    navigator: Arc<dyn Navigator>,
}

impl Session {
    pub fn new(tokens: Arc<dyn TokenStore>, navigator: Arc<dyn Navigator>) -> Self {
        Self { tokens, navigator }
    }

    pub fn token(&self) -> Option<String> {
        self.tokens.get()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// Store a freshly issued token.
    pub fn sign_in(&self, token: &str) -> Result<(), ApiError> {
        self.tokens.set(token)?;
        tracing::info!("Signed in");
        Ok(())
    }

    /// User-initiated logout: drop the token and go to the login screen.
    pub fn sign_out(&self) {
        self.tokens.take();
        tracing::info!("Signed out");
        self.navigator.navigate(Route::Login);
    }

    /// The backend rejected `sent`, the token a request carried. Clears it
    /// and redirects to login.
    ///
    /// Only the caller that actually removed the token navigates, so a burst
    /// of concurrent 401s produces a single redirect. A token stored after
    /// `sent` went out is left alone. Returns whether this call performed
    /// the redirect.
    pub fn expire(&self, sent: &str) -> bool {
        if self.tokens.take_if(sent) {
            tracing::warn!("Session rejected by backend; token cleared");
            self.navigator.navigate(Route::Login);
            true
        } else {
            false
        }
    }

    pub fn navigate(&self, route: Route) {
        self.navigator.navigate(route);
    }

    /// Guard for protected views: redirect to login when signed out.
    /// Returns true when the view may proceed.
    pub fn require_auth(&self) -> bool {
        if self.is_authenticated() {
            true
        } else {
            self.navigator.navigate(Route::Login);
            false
        }
    }
}
