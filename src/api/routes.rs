// src/api/routes.rs — Endpoint paths, resolved from config

use crate::infra::config::ApiConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Routes {
    tasks: String,
    stats: String,
    chat_prefix: String,
    csrf: String,
}

impl Routes {
    pub fn from_config(config: &ApiConfig) -> Self {
        Self {
            tasks: normalize_prefix(&config.tasks_path),
            stats: normalize_path(&config.stats_path),
            chat_prefix: normalize_prefix(&config.chat_prefix),
            csrf: normalize_path(&config.csrf_path),
        }
    }

    pub fn health(&self) -> String {
        "/".into()
    }

    pub fn login(&self) -> String {
        "/auth/login".into()
    }

    pub fn register(&self) -> String {
        "/auth/register".into()
    }

    pub fn csrf(&self) -> String {
        self.csrf.clone()
    }

    /// Collection endpoint (trailing slash, as the backend's router expects).
    pub fn tasks(&self) -> String {
        format!("{}/", self.tasks)
    }

    pub fn task(&self, id: i64) -> String {
        format!("{}/{}", self.tasks, id)
    }

    pub fn stats(&self) -> String {
        self.stats.clone()
    }

    pub fn chat(&self) -> String {
        format!("{}/chat", self.chat_prefix)
    }

    pub fn latest_conversation(&self) -> String {
        format!("{}/conversations/latest", self.chat_prefix)
    }

    pub fn conversation_messages(&self, id: i64) -> String {
        format!("{}/conversations/{}/messages", self.chat_prefix, id)
    }

    pub fn new_conversation(&self) -> String {
        format!("{}/conversations/new", self.chat_prefix)
    }
}

impl Default for Routes {
    fn default() -> Self {
        Self::from_config(&ApiConfig::default())
    }
}

/// "/api/" -> "/api", "api" -> "/api", "" or "/" -> "".
fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}

fn normalize_path(path: &str) -> String {
    let p = normalize_prefix(path);
    if p.is_empty() {
        "/".into()
    } else {
        p
    }
}
