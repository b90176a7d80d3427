// src/auth/token.rs — Bearer token persistence
//
// The token lives in ~/.tasksphere/session.json under the key `token`. Its
// presence is the only signal the client trusts between runs.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Mutex;

use crate::infra::errors::ApiError;
use crate::infra::paths;

/// Where the session token is kept.
pub trait TokenStore: Send + Sync {
    fn get(&self) -> Option<String>;

    fn set(&self, token: &str) -> Result<(), ApiError>;

    /// Remove the token, returning it if one was present.
    fn take(&self) -> Option<String>;

    /// Remove the token only if it is still `expected`. Returns whether it
    /// was removed.
    fn take_if(&self, expected: &str) -> bool;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SessionFile {
    #[serde(default)]
    token: Option<String>,
}

/// Token stored on disk, cached in memory after the first read.
///
/// # Security Note
/// The token is stored as plaintext JSON (chmod 600 on Unix), the same way
/// the browser client kept it in local storage.
pub struct FileTokenStore {
    path: PathBuf,
    cached: Mutex<Option<String>>,
}

impl FileTokenStore {
    /// Open the default session file.
    pub fn open_default() -> Self {
        Self::open(paths::session_file_path())
    }

    /// Open a session file at `path`. A missing or unreadable file means
    /// "signed out".
    pub fn open(path: PathBuf) -> Self {
        let token = std::fs::read_to_string(&path)
            .ok()
            .and_then(|content| match serde_json::from_str::<SessionFile>(&content) {
                Ok(file) => file.token,
                Err(e) => {
                    tracing::warn!("Ignoring unreadable session file {}: {}", path.display(), e);
                    None
                }
            })
            .filter(|t| !t.is_empty());

        Self {
            path,
            cached: Mutex::new(token),
        }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Write the session file atomically (temp file + rename, chmod 600).
    fn persist(&self, token: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&SessionFile {
            token: Some(token.to_string()),
        })
        .map_err(std::io::Error::other)?;

        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, json)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&tmp_path, std::fs::Permissions::from_mode(0o600))?;
        }

        std::fs::rename(&tmp_path, &self.path)
    }

    fn remove_file(&self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!("Failed to remove session file {}: {}", self.path.display(), e);
            }
        }
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self) -> Option<String> {
        self.cached.lock().ok().and_then(|t| t.clone())
    }

    fn set(&self, token: &str) -> Result<(), ApiError> {
        self.persist(token)?;
        if let Ok(mut cached) = self.cached.lock() {
            *cached = Some(token.to_string());
        }
        Ok(())
    }

    fn take(&self) -> Option<String> {
        let previous = self.cached.lock().ok().and_then(|mut t| t.take());
        if previous.is_some() {
            self.remove_file();
        }
        previous
    }

    fn take_if(&self, expected: &str) -> bool {
        let removed = match self.cached.lock() {
            Ok(mut cached) if cached.as_deref() == Some(expected) => cached.take().is_some(),
            _ => false,
        };
        if removed {
            self.remove_file();
        }
        removed
    }
}

/// In-memory token, for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        Self {
            token: Mutex::new(Some(token.to_string())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self) -> Option<String> {
        self.token.lock().ok().and_then(|t| t.clone())
    }

    fn set(&self, token: &str) -> Result<(), ApiError> {
        if let Ok(mut t) = self.token.lock() {
            *t = Some(token.to_string());
        }
        Ok(())
    }

    fn take(&self) -> Option<String> {
        self.token.lock().ok().and_then(|mut t| t.take())
    }

    fn take_if(&self, expected: &str) -> bool {
        match self.token.lock() {
            Ok(mut t) if t.as_deref() == Some(expected) => t.take().is_some(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_signed_out() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::open(dir.path().join("session.json"));
        assert!(store.get().is_none());
        assert!(store.take().is_none());
    }

    #[test]
    fn test_set_persists_and_reopens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let store = FileTokenStore::open(path.clone());
        store.set("abc.def.ghi").unwrap();
        assert_eq!(store.get().as_deref(), Some("abc.def.ghi"));

        let content = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["token"], "abc.def.ghi");

        let reopened = FileTokenStore::open(path);
        assert_eq!(reopened.get().as_deref(), Some("abc.def.ghi"));
    }

    #[cfg(unix)]
    #[test]
    fn test_session_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        FileTokenStore::open(path.clone()).set("t").unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_take_removes_file_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let store = FileTokenStore::open(path.clone());
        store.set("tok").unwrap();

        assert_eq!(store.take().as_deref(), Some("tok"));
        assert!(!path.exists());
        assert!(store.take().is_none());
        assert!(store.get().is_none());
    }

    #[test]
    fn test_take_if_only_removes_matching_token() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let store = FileTokenStore::open(path.clone());
        store.set("new").unwrap();

        assert!(!store.take_if("old"));
        assert_eq!(store.get().as_deref(), Some("new"));
        assert!(path.exists());

        assert!(store.take_if("new"));
        assert!(!path.exists());
        assert!(!store.take_if("new"));

        let memory = MemoryTokenStore::with_token("a");
        assert!(!memory.take_if("b"));
        assert!(memory.take_if("a"));
        assert!(memory.get().is_none());
    }

    #[test]
    fn test_corrupt_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(FileTokenStore::open(path).get().is_none());
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryTokenStore::with_token("x");
        assert_eq!(store.get().as_deref(), Some("x"));
        assert_eq!(store.take().as_deref(), Some("x"));
        assert!(store.get().is_none());
        store.set("y").unwrap();
        assert_eq!(store.get().as_deref(), Some("y"));
    }
}
