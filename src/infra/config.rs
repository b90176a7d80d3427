// src/infra/config.rs — Configuration loading (TOML)

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::infra::paths;
use crate::store::TaskFilter;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub sync: SyncConfig,

    #[serde(default)]
    pub ui: UiConfig,
}

/// Upper bound for `timeout_secs` and `poll_interval_secs` (one day).
pub const MAX_INTERVAL_SECS: u64 = 86_400;

/// Backend location and route layout.
///
/// Several revisions of the backend mounted the task router under different
/// prefixes, so every path is configurable. The task default is
/// `/dashboard/tasks`, the collection path the client has always called; a
/// backend that nests its `/tasks` router under that mount serves
/// `/dashboard/tasks/tasks/` instead and needs `tasks_path` set to match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_tasks_path")]
    pub tasks_path: String,
    #[serde(default = "default_stats_path")]
    pub stats_path: String,
    #[serde(default = "default_chat_prefix")]
    pub chat_prefix: String,
    /// Fetch a CSRF token before registering (some deployments require it).
    #[serde(default)]
    pub csrf: bool,
    #[serde(default = "default_csrf_path")]
    pub csrf_path: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            tasks_path: default_tasks_path(),
            stats_path: default_stats_path(),
            chat_prefix: default_chat_prefix(),
            csrf: false,
            csrf_path: default_csrf_path(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000".into()
}

fn default_timeout() -> u64 {
    30
}

fn default_tasks_path() -> String {
    "/dashboard/tasks".into()
}

fn default_stats_path() -> String {
    "/dashboard/stats".into()
}

fn default_chat_prefix() -> String {
    "/api".into()
}

fn default_csrf_path() -> String {
    "/api/auth/csrf".into()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    /// Server-sent events endpoint announcing task changes. Polling stays on
    /// either way; the push channel only shortens the delay.
    #[serde(default)]
    pub push_path: Option<String>,
}

fn default_poll_interval() -> u64 {
    10
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
            push_path: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default)]
    pub default_filter: TaskFilter,
}

impl Config {
    /// Load config from file, falling back to defaults.
    pub fn load() -> anyhow::Result<Self> {
        let path = paths::config_file_path();
        let mut config = if path.exists() {
            Self::load_from(&path)?
        } else {
            Self::default()
        };
        config.apply_api_url_override(std::env::var("TASKSPHERE_API_URL").ok());
        Ok(config)
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;
        config.clamp_limits();
        Ok(config)
    }

    /// Keep durations in a range timers and HTTP timeouts can represent.
    pub fn clamp_limits(&mut self) {
        self.api.timeout_secs = self.api.timeout_secs.clamp(1, MAX_INTERVAL_SECS);
        self.sync.poll_interval_secs = self.sync.poll_interval_secs.clamp(1, MAX_INTERVAL_SECS);
    }

    /// Replace the backend base URL when an override is given and non-empty.
    pub fn apply_api_url_override(&mut self, url: Option<String>) {
        if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
            self.api.base_url = url.trim().to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_reasonable() {
        let c = Config::default();
        assert_eq!(c.api.base_url, "http://localhost:8000");
        assert_eq!(c.api.timeout_secs, 30);
        assert_eq!(c.api.tasks_path, "/dashboard/tasks");
        assert_eq!(c.api.chat_prefix, "/api");
        assert!(!c.api.csrf);
        assert_eq!(c.sync.poll_interval_secs, 10);
        assert!(c.sync.push_path.is_none());
        assert_eq!(c.ui.default_filter, TaskFilter::All);
    }

    #[test]
    fn test_parse_minimal_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.sync.poll_interval_secs, 10);
        assert_eq!(config.api.stats_path, "/dashboard/stats");
    }

    #[test]
    fn test_parse_full_toml() {
        let toml_str = r#"
[api]
base_url = "https://tasks.example.com"
timeout_secs = 5
tasks_path = "/tasks"
chat_prefix = ""
csrf = true

[sync]
poll_interval_secs = 3
push_path = "/api/events"

[ui]
default_filter = "pending"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.api.base_url, "https://tasks.example.com");
        assert_eq!(config.api.timeout_secs, 5);
        assert_eq!(config.api.tasks_path, "/tasks");
        assert_eq!(config.api.chat_prefix, "");
        assert!(config.api.csrf);
        assert_eq!(config.api.csrf_path, "/api/auth/csrf");
        assert_eq!(config.sync.poll_interval_secs, 3);
        assert_eq!(config.sync.push_path.as_deref(), Some("/api/events"));
        assert_eq!(config.ui.default_filter, TaskFilter::Pending);
    }

    #[test]
    fn test_api_section_only_base_url() {
        let config: Config = toml::from_str("[api]\nbase_url = \"http://10.0.0.2:8000\"\n").unwrap();
        assert_eq!(config.api.base_url, "http://10.0.0.2:8000");
        assert_eq!(config.api.tasks_path, "/dashboard/tasks");
    }

    #[test]
    fn test_api_url_override() {
        let mut c = Config::default();
        c.apply_api_url_override(None);
        assert_eq!(c.api.base_url, "http://localhost:8000");

        c.apply_api_url_override(Some("   ".into()));
        assert_eq!(c.api.base_url, "http://localhost:8000");

        c.apply_api_url_override(Some(" http://api.internal:9000 ".into()));
        assert_eq!(c.api.base_url, "http://api.internal:9000");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[sync]\npoll_interval_secs = 42\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.sync.poll_interval_secs, 42);
    }

    #[test]
    fn test_nested_task_router_layout() {
        assert_eq!(Config::default().api.tasks_path, "/dashboard/tasks");
        let config: Config =
            toml::from_str("[api]\ntasks_path = \"/dashboard/tasks/tasks\"\n").unwrap();
        assert_eq!(config.api.tasks_path, "/dashboard/tasks/tasks");
        assert_eq!(config.api.chat_prefix, "/api");
    }

    #[test]
    fn test_load_from_clamps_durations() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[api]\ntimeout_secs = 18446744073709551615\n[sync]\npoll_interval_secs = 0\n",
        )
        .unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.api.timeout_secs, MAX_INTERVAL_SECS);
        assert_eq!(config.sync.poll_interval_secs, 1);
    }
}
