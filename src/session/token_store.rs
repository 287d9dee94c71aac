//! Durable storage for the session credential.
//!
//! A single opaque value lives under [`TOKEN_KEY`]. Disk failures never
//! surface to callers: the in-memory copy stays authoritative for the
//! current process and the failure is logged.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, warn};

/// Key under which the credential is persisted
pub const TOKEN_KEY: &str = "token";

pub type SharedTokenStore = Arc<dyn TokenStore>;

/// Get/set/clear access to the stored credential
pub trait TokenStore: Send + Sync {
    fn get(&self) -> Option<String>;
    fn set(&self, token: &str);
    fn clear(&self);
}

/// Process-local store, used for `--ephemeral` runs and tests
#[derive(Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        Self {
            token: RwLock::new(Some(token.to_string())),
        }
    }

    pub fn shared() -> SharedTokenStore {
        Arc::new(Self::new())
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set(&self, token: &str) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token.to_string());
    }

    fn clear(&self) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl std::fmt::Debug for MemoryTokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryTokenStore")
            .field("has_token", &self.get().is_some())
            .finish()
    }
}

#[derive(Serialize, Deserialize)]
struct StoredSession {
    #[serde(rename = "token")]
    token: String,
}

/// File-backed store: `{"token": "..."}` written with owner-only permissions
pub struct FileTokenStore {
    path: PathBuf,
    cached: RwLock<Option<String>>,
}

impl FileTokenStore {
    /// Open the store at `path`, reading any credential already on disk
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let cached = read_token(&path);
        debug!(path = %path.display(), present = cached.is_some(), "opened token store");
        Self {
            path,
            cached: RwLock::new(cached),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, token: &str) -> std::io::Result<()> {
        if let Some(dir) = self.path.parent() {
            create_private_dir(dir)?;
        }
        let contents = serde_json::to_string(&StoredSession {
            token: token.to_string(),
        })?;
        write_private_file(&self.path, contents.as_bytes())
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self) -> Option<String> {
        self.cached
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set(&self, token: &str) {
        *self.cached.write().unwrap_or_else(PoisonError::into_inner) = Some(token.to_string());
        if let Err(e) = self.persist(token) {
            warn!(path = %self.path.display(), error = %e, "failed to persist session token");
        }
    }

    fn clear(&self) {
        *self.cached.write().unwrap_or_else(PoisonError::into_inner) = None;
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to remove session token")
            }
        }
    }
}

impl std::fmt::Debug for FileTokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileTokenStore")
            .field("path", &self.path)
            .field("has_token", &self.get().is_some())
            .finish()
    }
}

fn read_token(path: &Path) -> Option<String> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to read session token");
            return None;
        }
    };

    match serde_json::from_str::<StoredSession>(&contents) {
        Ok(stored) => Some(stored.token),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "ignoring corrupt session file");
            None
        }
    }
}

fn create_private_dir(dir: &Path) -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        std::fs::DirBuilder::new()
            .recursive(true)
            .mode(0o700)
            .create(dir)
    }
    #[cfg(not(unix))]
    {
        std::fs::create_dir_all(dir)
    }
}

fn write_private_file(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use std::io::Write;
        use std::os::unix::fs::OpenOptionsExt;
        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)?;
        file.write_all(contents)
    }
    #[cfg(not(unix))]
    {
        std::fs::write(path, contents)
    }
}
