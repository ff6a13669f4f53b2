//! File-based Cache Mirror
//!
//! Stores one JSON snapshot per session under a base directory, plus a
//! pointer file naming the current session. Keys match the original client
//! cache layout: `conversation-{session_id}` and `current-conversation-id`.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::domain::foundation::SessionId;
use crate::domain::retrospective::Session;
use crate::ports::{CacheMirror, MirrorError};

/// File-backed mirror of session snapshots.
#[derive(Debug, Clone)]
pub struct FileCacheMirror {
    base_path: PathBuf,
}

impl FileCacheMirror {
    /// Creates a mirror rooted at the given directory.
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    fn snapshot_path(&self, session_id: SessionId) -> PathBuf {
        self.base_path
            .join(format!("conversation-{}.json", session_id))
    }

    fn pointer_path(&self) -> PathBuf {
        self.base_path.join("current-conversation-id")
    }

    async fn ensure_dir(&self) -> Result<(), MirrorError> {
        fs::create_dir_all(&self.base_path)
            .await
            .map_err(|e| MirrorError::Io(e.to_string()))
    }
}

#[async_trait]
impl CacheMirror for FileCacheMirror {
    async fn save_snapshot(&self, session: &Session) -> Result<(), MirrorError> {
        self.ensure_dir().await?;
        let json = serde_json::to_vec_pretty(session)
            .map_err(|e| MirrorError::Serialization(e.to_string()))?;
        fs::write(self.snapshot_path(session.session_id()), json)
            .await
            .map_err(|e| MirrorError::Io(e.to_string()))
    }

    async fn load_snapshot(&self, session_id: SessionId) -> Result<Session, MirrorError> {
        let path = self.snapshot_path(session_id);
        if !path.exists() {
            return Err(MirrorError::NotFound(session_id));
        }
        let json = fs::read_to_string(&path)
            .await
            .map_err(|e| MirrorError::Io(e.to_string()))?;
        serde_json::from_str(&json).map_err(|e| MirrorError::Deserialization(e.to_string()))
    }

    async fn current_session_id(&self) -> Result<Option<SessionId>, MirrorError> {
        let path = self.pointer_path();
        if !path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&path)
            .await
            .map_err(|e| MirrorError::Io(e.to_string()))?;
        raw.trim()
            .parse()
            .map(Some)
            .map_err(|e: uuid::Error| MirrorError::Deserialization(e.to_string()))
    }

    async fn set_current(&self, session_id: SessionId) -> Result<(), MirrorError> {
        self.ensure_dir().await?;
        fs::write(self.pointer_path(), session_id.to_string())
            .await
            .map_err(|e| MirrorError::Io(e.to_string()))
    }

    async fn exists(&self, session_id: SessionId) -> Result<bool, MirrorError> {
        Ok(self.snapshot_path(session_id).exists())
    }

    async fn delete(&self, session_id: SessionId) -> Result<(), MirrorError> {
        let snapshot = self.snapshot_path(session_id);
        if snapshot.exists() {
            fs::remove_file(&snapshot)
                .await
                .map_err(|e| MirrorError::Io(e.to_string()))?;
        }
        if self.current_session_id().await? == Some(session_id) {
            fs::remove_file(self.pointer_path())
                .await
                .map_err(|e| MirrorError::Io(e.to_string()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{CoupleId, Partner, Theme};

    fn session() -> Session {
        Session::start(CoupleId::new(), Theme::Planning, Partner::A)
    }

    #[tokio::test]
    async fn snapshot_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let mirror = FileCacheMirror::new(dir.path());
        let session = session();

        mirror.save_snapshot(&session).await.unwrap();
        let loaded = mirror.load_snapshot(session.session_id()).await.unwrap();
        assert_eq!(session, loaded);
    }

    #[tokio::test]
    async fn missing_snapshot_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let mirror = FileCacheMirror::new(dir.path());
        assert!(matches!(
            mirror.load_snapshot(SessionId::new()).await.unwrap_err(),
            MirrorError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn pointer_tracks_current_session() {
        let dir = tempfile::tempdir().unwrap();
        let mirror = FileCacheMirror::new(dir.path());
        assert_eq!(mirror.current_session_id().await.unwrap(), None);

        let session = session();
        mirror.set_current(session.session_id()).await.unwrap();
        assert_eq!(
            mirror.current_session_id().await.unwrap(),
            Some(session.session_id())
        );
    }

    #[tokio::test]
    async fn delete_removes_snapshot_and_matching_pointer() {
        let dir = tempfile::tempdir().unwrap();
        let mirror = FileCacheMirror::new(dir.path());
        let session = session();

        mirror.save_snapshot(&session).await.unwrap();
        mirror.set_current(session.session_id()).await.unwrap();
        mirror.delete(session.session_id()).await.unwrap();

        assert!(!mirror.exists(session.session_id()).await.unwrap());
        assert_eq!(mirror.current_session_id().await.unwrap(), None);

        // Idempotent.
        mirror.delete(session.session_id()).await.unwrap();
    }

    #[tokio::test]
    async fn delete_leaves_unrelated_pointer() {
        let dir = tempfile::tempdir().unwrap();
        let mirror = FileCacheMirror::new(dir.path());
        let kept = session();
        let dropped = session();

        mirror.save_snapshot(&kept).await.unwrap();
        mirror.save_snapshot(&dropped).await.unwrap();
        mirror.set_current(kept.session_id()).await.unwrap();

        mirror.delete(dropped.session_id()).await.unwrap();
        assert_eq!(
            mirror.current_session_id().await.unwrap(),
            Some(kept.session_id())
        );
        assert!(mirror.exists(kept.session_id()).await.unwrap());
    }
}
