// src/views/dashboard.rs — Dashboard: task list plus counters and logout

use std::sync::Arc;

use crate::api::types::DashboardStats;
use crate::api::ApiClient;
use crate::auth::Route;
use crate::infra::errors::ApiError;
use crate::store::EventBus;
use crate::views::TasksView;

pub struct DashboardView {
    api: Arc<ApiClient>,
    tasks: TasksView,
    stats: Option<DashboardStats>,
}

impl DashboardView {
    pub fn new(api: Arc<ApiClient>, bus: EventBus) -> Self {
        Self {
            tasks: TasksView::new(api.clone(), bus),
            api,
            stats: None,
        }
    }

    /// Wrap an already configured task view.
    pub fn with_tasks(api: Arc<ApiClient>, tasks: TasksView) -> Self {
        Self {
            api,
            tasks,
            stats: None,
        }
    }

    pub fn tasks(&self) -> &TasksView {
        &self.tasks
    }

    pub fn tasks_mut(&mut self) -> &mut TasksView {
        &mut self.tasks
    }

    pub fn stats(&self) -> Option<&DashboardStats> {
        self.stats.as_ref()
    }

    /// Show the dashboard. Any failure to load the list sends the user to
    /// login; returns whether the dashboard is usable.
    pub async fn mount(&mut self) -> bool {
        match self.tasks.load().await {
            Ok(()) => {
                self.refresh_stats().await;
                true
            }
            // Both already redirected.
            Err(ApiError::NotAuthenticated) => false,
            Err(e) if e.is_unauthorized() => false,
            Err(e) => {
                tracing::error!("Dashboard failed to load: {}", e);
                self.api.session().navigate(Route::Login);
                false
            }
        }
    }

    /// Re-read the counters. Failures only cost the header its numbers.
    pub async fn refresh_stats(&mut self) {
        self.stats = match self.api.stats().await {
            Ok(stats) => Some(stats),
            Err(e) => {
                tracing::warn!("Failed to load dashboard stats: {}", e);
                None
            }
        };
    }

    pub fn logout(&mut self) {
        self.tasks.stop_polling();
        self.stats = None;
        self.api.session().sign_out();
    }
}
