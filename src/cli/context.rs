// src/cli/context.rs — Wiring shared by every command
//
// Builds the session (token store + route tracker), the HTTP client and the
// change bus once, and hands out views bound to them.

use std::sync::Arc;
use std::time::Duration;

use crate::api::ApiClient;
use crate::auth::{FileTokenStore, Navigator, Route, RouteTracker, Session, TokenStore};
use crate::infra::config::{Config, MAX_INTERVAL_SECS};
use crate::store::EventBus;
use crate::sync::PushListener;
use crate::views::{ChatView, DashboardView, LoginView, RegisterView, TasksView};

pub struct AppContext {
    pub config: Config,
    pub api: Arc<ApiClient>,
    pub bus: EventBus,
    pub routes: Arc<RouteTracker>,
    session: Arc<Session>,
}

impl AppContext {
    /// Context backed by the session file in the config directory.
    pub fn from_config(config: Config, initial: Route) -> anyhow::Result<Self> {
        Self::new(config, Arc::new(FileTokenStore::open_default()), initial)
    }

    pub fn new(config: Config, tokens: Arc<dyn TokenStore>, initial: Route) -> anyhow::Result<Self> {
        let routes = Arc::new(RouteTracker::new(initial));
        let navigator: Arc<dyn Navigator> = routes.clone();
        let session = Arc::new(Session::new(tokens, navigator));
        let api = Arc::new(ApiClient::new(&config.api, session.clone())?);

        Ok(Self {
            config,
            api,
            bus: EventBus::new(),
            routes,
            session,
        })
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Whether anything during this run sent the user back to login.
    pub fn sent_to_login(&self) -> bool {
        self.routes.visits(Route::Login) > 0
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.config.sync.poll_interval_secs.clamp(1, MAX_INTERVAL_SECS))
    }

    pub fn login_view(&self) -> LoginView {
        LoginView::new(self.api.clone())
    }

    pub fn register_view(&self) -> RegisterView {
        RegisterView::new(self.api.clone())
    }

    pub fn tasks_view(&self) -> TasksView {
        TasksView::new(self.api.clone(), self.bus.clone())
            .with_poll_interval(self.poll_interval())
            .with_filter(self.config.ui.default_filter)
    }

    pub fn dashboard_view(&self) -> DashboardView {
        DashboardView::with_tasks(self.api.clone(), self.tasks_view())
    }

    pub fn chat_view(&self) -> ChatView {
        ChatView::new(self.api.clone(), self.bus.clone())
    }

    /// Start the push listener when the config names an endpoint for it.
    /// Failing to start only means we rely on polling.
    pub fn push_listener(&self) -> Option<PushListener> {
        let path = self.config.sync.push_path.as_deref()?;
        match PushListener::start(self.api.clone(), path, self.bus.clone()) {
            Ok(listener) => Some(listener),
            Err(e) => {
                tracing::warn!("Push updates unavailable: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemoryTokenStore;
    use crate::store::TaskFilter;

    #[test]
    fn test_context_uses_config() {
        let mut config = Config::default();
        config.sync.poll_interval_secs = 0;
        config.ui.default_filter = TaskFilter::Pending;
        let ctx = AppContext::new(config, Arc::new(MemoryTokenStore::new()), Route::Dashboard).unwrap();

        assert_eq!(ctx.poll_interval(), Duration::from_secs(1));
        assert_eq!(ctx.tasks_view().filter(), TaskFilter::Pending);
        assert!(!ctx.sent_to_login());
        assert!(ctx.push_listener().is_none());
    }

    #[test]
    fn test_sign_out_is_tracked() {
        let ctx = AppContext::new(
            Config::default(),
            Arc::new(MemoryTokenStore::with_token("tok")),
            Route::Dashboard,
        )
        .unwrap();
        ctx.session().sign_out();
        assert!(ctx.sent_to_login());
        assert_eq!(ctx.routes.current(), Route::Login);
    }
}
