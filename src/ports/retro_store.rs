//! Persistence Gateway Port - CRUD over the retrospective entities.
//!
//! Five entities composed by foreign key: couple, retrospective, round,
//! response, insight. Each write is independently committed; there are no
//! cross-entity transactions, and the conversation engine tolerates partial
//! failure (the in-memory session stays authoritative).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{
    CoupleId, InsightId, Partner, ResponseId, RoundId, SessionId, SessionStatus, Theme, Timestamp,
};

/// A couple row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoupleRecord {
    pub id: CoupleId,
    pub partner_a_email: String,
    pub partner_b_email: Option<String>,
    pub created_at: Timestamp,
}

impl CoupleRecord {
    /// Creates a couple record; partner B may join later.
    pub fn new(partner_a_email: impl Into<String>, partner_b_email: Option<String>) -> Self {
        Self {
            id: CoupleId::new(),
            partner_a_email: partner_a_email.into(),
            partner_b_email,
            created_at: Timestamp::now(),
        }
    }
}

/// A retrospective row. `id` doubles as the engine's session id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrospectiveRecord {
    pub id: SessionId,
    pub couple_id: CoupleId,
    pub theme: Theme,
    pub status: SessionStatus,
    pub current_round: u32,
    pub round_count: u32,
    pub tags: Vec<String>,
    pub emotional_themes: Vec<String>,
    /// Final summary as JSON, present once completed.
    pub ai_summary: Option<serde_json::Value>,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// A conversation round row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundRecord {
    pub id: RoundId,
    pub retrospective_id: SessionId,
    pub round_number: u32,
    pub question: String,
    pub created_at: Timestamp,
}

/// A partner response row. `transcription_text` mirrors `response_text` for
/// typed input; `voice_recording_url` is set by the (external) audio flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseRecord {
    pub id: ResponseId,
    pub round_id: RoundId,
    pub partner: Partner,
    pub response_text: String,
    pub voice_recording_url: Option<String>,
    pub transcription_text: Option<String>,
    pub created_at: Timestamp,
}

impl ResponseRecord {
    /// Creates a typed-input response row.
    pub fn typed(round_id: RoundId, partner: Partner, response_text: impl Into<String>) -> Self {
        let text = response_text.into();
        Self {
            id: ResponseId::new(),
            round_id,
            partner,
            transcription_text: Some(text.clone()),
            response_text: text,
            voice_recording_url: None,
            created_at: Timestamp::now(),
        }
    }
}

/// Kind of stored AI insight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightType {
    RoundAnalysis,
    Summary,
}

impl InsightType {
    /// Stable label used in stored records.
    pub fn as_str(&self) -> &'static str {
        match self {
            InsightType::RoundAnalysis => "round_analysis",
            InsightType::Summary => "summary",
        }
    }
}

impl fmt::Display for InsightType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An AI insight row (round analysis or final summary as JSON).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightRecord {
    pub id: InsightId,
    pub retrospective_id: SessionId,
    pub insight_type: InsightType,
    pub content: serde_json::Value,
    pub confidence_score: Option<f32>,
    pub created_at: Timestamp,
}

impl InsightRecord {
    /// Creates an insight row with no confidence score.
    pub fn new(
        retrospective_id: SessionId,
        insight_type: InsightType,
        content: serde_json::Value,
    ) -> Self {
        Self {
            id: InsightId::new(),
            retrospective_id,
            insight_type,
            content,
            confidence_score: None,
            created_at: Timestamp::now(),
        }
    }
}

/// Port for the external structured-data store.
///
/// CRUD only; no business logic. Implementations commit each write
/// independently.
#[async_trait]
pub trait RetroStore: Send + Sync {
    /// Inserts a couple row.
    async fn create_couple(&self, couple: &CoupleRecord) -> Result<(), StoreError>;

    /// Fetches a couple row.
    async fn get_couple(&self, id: CoupleId) -> Result<CoupleRecord, StoreError>;

    /// Inserts or updates a retrospective row by id.
    async fn upsert_retrospective(&self, retro: &RetrospectiveRecord) -> Result<(), StoreError>;

    /// Fetches a retrospective row.
    async fn get_retrospective(&self, id: SessionId) -> Result<RetrospectiveRecord, StoreError>;

    /// Lists a couple's retrospectives, newest first.
    async fn list_retrospectives(
        &self,
        couple_id: CoupleId,
    ) -> Result<Vec<RetrospectiveRecord>, StoreError>;

    /// Inserts a conversation round row.
    async fn create_round(&self, round: &RoundRecord) -> Result<(), StoreError>;

    /// Lists a retrospective's rounds in round order.
    async fn list_rounds(&self, retrospective_id: SessionId) -> Result<Vec<RoundRecord>, StoreError>;

    /// Inserts a partner response row.
    async fn create_response(&self, response: &ResponseRecord) -> Result<(), StoreError>;

    /// Inserts an AI insight row.
    async fn create_insight(&self, insight: &InsightRecord) -> Result<(), StoreError>;

    /// Lists a retrospective's insights, newest first.
    async fn list_insights(
        &self,
        retrospective_id: SessionId,
    ) -> Result<Vec<InsightRecord>, StoreError>;
}

/// Errors from the persistence gateway.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("database error: {0}")]
    Database(String),

    #[error("failed to serialize record: {0}")]
    Serialization(String),
}

impl StoreError {
    /// Creates a not-found error for an entity/id pair.
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_response_mirrors_transcription() {
        let record = ResponseRecord::typed(RoundId::new(), Partner::B, "we talked");
        assert_eq!(record.response_text, "we talked");
        assert_eq!(record.transcription_text.as_deref(), Some("we talked"));
        assert!(record.voice_recording_url.is_none());
    }

    #[test]
    fn insight_type_labels_are_stable() {
        assert_eq!(InsightType::RoundAnalysis.as_str(), "round_analysis");
        assert_eq!(InsightType::Summary.as_str(), "summary");
    }

    #[test]
    fn not_found_names_entity_and_id() {
        let err = StoreError::not_found("couple", CoupleId::new());
        assert!(err.to_string().starts_with("couple not found"));
    }
}
