//! In-memory Cache Mirror
//!
//! Snapshot map plus pointer behind an RwLock. Useful for tests; supports
//! write-failure injection so callers can verify that mirror failures never
//! block a session transition.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::SessionId;
use crate::domain::retrospective::Session;
use crate::ports::{CacheMirror, MirrorError};

/// In-memory mirror of session snapshots.
#[derive(Clone, Default)]
pub struct InMemoryCacheMirror {
    snapshots: Arc<RwLock<HashMap<SessionId, Session>>>,
    current: Arc<RwLock<Option<SessionId>>>,
    fail_writes: Arc<AtomicBool>,
}

impl InMemoryCacheMirror {
    /// Creates an empty mirror.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent write fail with an IO error.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of stored snapshots.
    pub async fn snapshot_count(&self) -> usize {
        self.snapshots.read().await.len()
    }

    fn check_writable(&self) -> Result<(), MirrorError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(MirrorError::Io("writes disabled".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl CacheMirror for InMemoryCacheMirror {
    async fn save_snapshot(&self, session: &Session) -> Result<(), MirrorError> {
        self.check_writable()?;
        self.snapshots
            .write()
            .await
            .insert(session.session_id(), session.clone());
        Ok(())
    }

    async fn load_snapshot(&self, session_id: SessionId) -> Result<Session, MirrorError> {
        self.snapshots
            .read()
            .await
            .get(&session_id)
            .cloned()
            .ok_or(MirrorError::NotFound(session_id))
    }

    async fn current_session_id(&self) -> Result<Option<SessionId>, MirrorError> {
        Ok(*self.current.read().await)
    }

    async fn set_current(&self, session_id: SessionId) -> Result<(), MirrorError> {
        self.check_writable()?;
        *self.current.write().await = Some(session_id);
        Ok(())
    }

    async fn exists(&self, session_id: SessionId) -> Result<bool, MirrorError> {
        Ok(self.snapshots.read().await.contains_key(&session_id))
    }

    async fn delete(&self, session_id: SessionId) -> Result<(), MirrorError> {
        self.snapshots.write().await.remove(&session_id);
        let mut current = self.current.write().await;
        if *current == Some(session_id) {
            *current = None;
        }
        Ok(())
    }
}
