// src/infra/paths.rs — Config directory layout
//
// All paths respect the TASKSPHERE_HOME environment variable for isolation.
// When TASKSPHERE_HOME is set, config and session live under that directory.
// When unset, everything lives under ~/.tasksphere/.

use std::path::PathBuf;

/// Returns the TASKSPHERE_HOME override, if set.
fn tasksphere_home() -> Option<PathBuf> {
    std::env::var_os("TASKSPHERE_HOME").map(PathBuf::from)
}

/// Configuration directory: $TASKSPHERE_HOME/ or ~/.tasksphere/
pub fn config_dir() -> PathBuf {
    if let Some(home) = tasksphere_home() {
        return home;
    }
    dirs_home().join(".tasksphere")
}

/// Home directory (falls back to the working directory on exotic platforms)
pub fn dirs_home() -> PathBuf {
    directories::BaseDirs::new()
        .map(|dirs| dirs.home_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Config file path
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Persisted session (bearer token) path
pub fn session_file_path() -> PathBuf {
    config_dir().join("session.json")
}

/// Ensure the config directory exists
pub async fn ensure_dirs() -> anyhow::Result<()> {
    tokio::fs::create_dir_all(config_dir()).await?;
    Ok(())
}
