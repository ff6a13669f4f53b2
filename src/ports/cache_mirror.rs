//! Cache Mirror Port - local snapshot store for session resume.
//!
//! Keyed by session id, with one extra pointer entry ("current session") so
//! a later process start can rehydrate the most recent in-progress session
//! without the caller supplying an id. Strictly advisory: mirror writes are
//! fire-and-forget and their failure never blocks a session transition.

use async_trait::async_trait;

use crate::domain::foundation::SessionId;
use crate::domain::retrospective::Session;

/// Port for the durable local key-value mirror of session state.
#[async_trait]
pub trait CacheMirror: Send + Sync {
    /// Stores the full session snapshot under its session id.
    async fn save_snapshot(&self, session: &Session) -> Result<(), MirrorError>;

    /// Loads a session snapshot.
    ///
    /// # Errors
    /// Returns `MirrorError::NotFound` if no snapshot exists.
    async fn load_snapshot(&self, session_id: SessionId) -> Result<Session, MirrorError>;

    /// Returns the current-session pointer, if set.
    async fn current_session_id(&self) -> Result<Option<SessionId>, MirrorError>;

    /// Points the current-session entry at the given session.
    async fn set_current(&self, session_id: SessionId) -> Result<(), MirrorError>;

    /// Checks whether a snapshot exists for a session.
    async fn exists(&self, session_id: SessionId) -> Result<bool, MirrorError>;

    /// Removes the snapshot and, if it matches, the current-session pointer.
    /// Idempotent.
    async fn delete(&self, session_id: SessionId) -> Result<(), MirrorError>;
}

/// Errors from the cache mirror.
#[derive(Debug, thiserror::Error)]
pub enum MirrorError {
    #[error("snapshot not found for session: {0}")]
    NotFound(SessionId),

    #[error("failed to serialize snapshot: {0}")]
    Serialization(String),

    #[error("failed to deserialize snapshot: {0}")]
    Deserialization(String),

    #[error("IO error: {0}")]
    Io(String),
}
