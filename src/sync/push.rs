// src/sync/push.rs — Server-sent "tasks changed" notifications
//
// Optional. When the backend exposes an SSE endpoint, every message on it is
// treated as "something changed, refresh". The payload is not interpreted.
// Polling keeps running underneath, so a dropped stream only costs latency.

use futures::StreamExt;
use reqwest_eventsource::{Event, RequestBuilderExt};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::api::ApiClient;
use crate::infra::errors::ApiError;
use crate::store::{EventBus, TaskChange};

pub struct PushListener {
    shutdown_tx: Option<broadcast::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl PushListener {
    /// Open the stream at `path` and forward each message to the bus as
    /// `TaskChange::Remote`.
    pub fn start(api: Arc<ApiClient>, path: &str, bus: EventBus) -> Result<Self, ApiError> {
        let token = api.session().token().ok_or(ApiError::NotAuthenticated)?;
        let url = api.url(path)?;

        let mut es = api
            .http()
            .get(url)
            .bearer_auth(&token)
            .eventsource()
            .map_err(|e| ApiError::Other(anyhow::anyhow!("Failed to start SSE stream: {e}")))?;

        let (shutdown_tx, mut shutdown_rx) = broadcast::channel(1);
        let path = path.to_string();

        let handle = tokio::spawn(async move {
            tracing::info!("Listening for task updates on {}", path);
            loop {
                let event = tokio::select! {
                    _ = shutdown_rx.recv() => break,
                    event = es.next() => event,
                };
                let Some(event) = event else { break };

                match event {
                    Ok(Event::Open) => {}
                    Ok(Event::Message(msg)) => {
                        tracing::debug!("Push event '{}'", msg.event);
                        bus.tasks_changed(TaskChange::Remote);
                    }
                    Err(reqwest_eventsource::Error::StreamEnded) => break,
                    Err(reqwest_eventsource::Error::InvalidStatusCode(status, _))
                        if status == reqwest::StatusCode::UNAUTHORIZED =>
                    {
                        api.session().expire(&token);
                        break;
                    }
                    Err(e) => {
                        tracing::warn!("Push stream error, falling back to polling: {}", e);
                        break;
                    }
                }
            }
            es.close();
            tracing::debug!("Push listener stopped");
        });

        Ok(Self {
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        })
    }

    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for PushListener {
    fn drop(&mut self) {
        self.stop();
    }
}
