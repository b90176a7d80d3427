// src/views/mod.rs — View models for each screen
//
// A view owns the local copy of whatever server state its screen shows and
// reconciles it through the `ApiClient`. Front ends (CLI, TUI) drive views
// and render their state; views never print.

pub mod chat;
pub mod dashboard;
pub mod login;
pub mod register;
pub mod tasks;

use std::future::Future;
use tokio::sync::watch;

use crate::infra::errors::ApiError;

pub use chat::{ChatInit, ChatView, QuickAction, QUICK_ACTIONS};
pub use dashboard::DashboardView;
pub use login::LoginView;
pub use register::RegisterView;
pub use tasks::TasksView;

/// Owned by whoever shows a view. Unmounting (or dropping) it cancels work
/// tied to the view's `Lifetime`.
pub struct Mount {
    tx: watch::Sender<bool>,
}

/// Handed to a view's async work so it can stop when the view goes away.
#[derive(Clone)]
pub struct Lifetime {
    rx: watch::Receiver<bool>,
}

pub fn mount() -> (Mount, Lifetime) {
    let (tx, rx) = watch::channel(false);
    (Mount { tx }, Lifetime { rx })
}

impl Mount {
    pub fn unmount(&self) {
        self.tx.send_replace(true);
    }

    pub fn lifetime(&self) -> Lifetime {
        Lifetime {
            rx: self.tx.subscribe(),
        }
    }
}

impl Drop for Mount {
    fn drop(&mut self) {
        self.unmount();
    }
}

impl Lifetime {
    pub fn is_unmounted(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once the view is unmounted (or its `Mount` is gone).
    pub async fn unmounted(&self) {
        let mut rx = self.rx.clone();
        let _ = rx.wait_for(|gone| *gone).await;
    }

    /// Run `fut` unless the view is torn down first, in which case the
    /// future is dropped and `ApiError::Cancelled` is returned.
    pub async fn guard<T, F>(&self, fut: F) -> Result<T, ApiError>
    where
        F: Future<Output = Result<T, ApiError>>,
    {
        if self.is_unmounted() {
            return Err(ApiError::Cancelled);
        }
        tokio::select! {
            _ = self.unmounted() => Err(ApiError::Cancelled),
            result = fut => result,
        }
    }
}
