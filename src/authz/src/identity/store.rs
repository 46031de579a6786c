//! Session persistence port
//!
//! The login flow saves the authenticated [`Session`] here and clears it on
//! logout. The permission engine never touches a store; callers load the
//! identity and pass a snapshot into each check.

use super::{Identity, Session};
use crate::error::{AuthzError, Result};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

/// Session store trait
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Current session, if any
    async fn load(&self) -> Result<Option<Session>>;

    /// Replace the stored session
    async fn save(&self, session: &Session) -> Result<()>;

    /// Forget the stored session (logout)
    async fn clear(&self) -> Result<()>;
}

/// Identity of the stored session; an absent session is an empty identity
pub async fn current_identity(store: &dyn SessionStore) -> Result<Identity> {
    Ok(store
        .load()
        .await?
        .map(|session| session.identity)
        .unwrap_or_default())
}

/// In-memory session store implementation
#[derive(Clone, Default)]
pub struct InMemorySessionStore {
    session: Arc<RwLock<Option<Session>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self) -> Result<Option<Session>> {
        let session = self.session.read().await;
        Ok(session.clone())
    }

    async fn save(&self, session: &Session) -> Result<()> {
        let mut slot = self.session.write().await;
        *slot = Some(session.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let mut slot = self.session.write().await;
        *slot = None;
        Ok(())
    }
}

/// Session persisted as a single JSON file
///
/// A file that cannot be parsed (including one naming a role outside the
/// catalog) is deleted and reported as no session. Writes through one store
/// are serialized, so the temp file is never shared by two saves.
pub struct FileSessionStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    async fn remove(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self) -> Result<Option<Session>> {
        let json = match tokio::fs::read_to_string(&self.path).await {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str::<Session>(&json) {
            Ok(session) => {
                debug!("Loaded session for {} from {}", session.user_id, self.path.display());
                Ok(Some(session))
            }
            Err(e) => {
                warn!(
                    "Discarding unreadable session file {}: {}",
                    self.path.display(),
                    e
                );
                self.clear().await?;
                Ok(None)
            }
        }
    }

    async fn save(&self, session: &Session) -> Result<()> {
        let json = serde_json::to_vec_pretty(session)?;
        let tmp = self.temp_path();
        let _guard = self.write_lock.lock().await;

        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| AuthzError::Storage(format!("write {}: {}", tmp.display(), e)))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| AuthzError::Storage(format!("rename to {}: {}", self.path.display(), e)))?;

        debug!("Saved session for {} to {}", session.user_id, self.path.display());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.remove().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::role::Role;

    #[tokio::test]
    async fn test_in_memory_lifecycle() {
        let store = InMemorySessionStore::new();
        assert!(store.load().await.unwrap().is_none());

        let session = Session::new("sv001", "Nguyễn Văn A", Identity::new([Role::Student]));
        store.save(&session).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(session));

        store.clear().await.unwrap();
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_current_identity_defaults_to_anonymous() {
        let store = InMemorySessionStore::new();
        let identity = current_identity(&store).await.unwrap();
        assert!(!identity.is_authenticated());
    }

    #[test]
    fn test_temp_path_sits_next_to_target() {
        let store = FileSessionStore::new("/var/lib/app/session.json");
        assert_eq!(store.temp_path(), PathBuf::from("/var/lib/app/session.json.tmp"));
    }
}
