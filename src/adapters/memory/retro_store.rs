//! In-memory RetroStore.
//!
//! Keeps all five entities in maps behind an RwLock. Useful for tests and
//! development; supports write-failure injection so callers can exercise the
//! engine's partial-failure tolerance.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{CoupleId, SessionId};
use crate::ports::{
    CoupleRecord, InsightRecord, ResponseRecord, RetroStore, RetrospectiveRecord, RoundRecord,
    StoreError,
};

/// In-memory persistence gateway.
#[derive(Clone, Default)]
pub struct InMemoryRetroStore {
    couples: Arc<RwLock<HashMap<CoupleId, CoupleRecord>>>,
    retrospectives: Arc<RwLock<HashMap<SessionId, RetrospectiveRecord>>>,
    rounds: Arc<RwLock<Vec<RoundRecord>>>,
    responses: Arc<RwLock<Vec<ResponseRecord>>>,
    insights: Arc<RwLock<Vec<InsightRecord>>>,
    fail_writes: Arc<AtomicBool>,
}

impl InMemoryRetroStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent write fail with a database error.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of stored round rows.
    pub async fn round_count(&self) -> usize {
        self.rounds.read().await.len()
    }

    /// Number of stored response rows.
    pub async fn response_count(&self) -> usize {
        self.responses.read().await.len()
    }

    /// Number of stored insight rows.
    pub async fn insight_count(&self) -> usize {
        self.insights.read().await.len()
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(StoreError::Database("writes disabled".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl RetroStore for InMemoryRetroStore {
    async fn create_couple(&self, couple: &CoupleRecord) -> Result<(), StoreError> {
        self.check_writable()?;
        self.couples.write().await.insert(couple.id, couple.clone());
        Ok(())
    }

    async fn get_couple(&self, id: CoupleId) -> Result<CoupleRecord, StoreError> {
        self.couples
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("couple", id))
    }

    async fn upsert_retrospective(&self, retro: &RetrospectiveRecord) -> Result<(), StoreError> {
        self.check_writable()?;
        self.retrospectives
            .write()
            .await
            .insert(retro.id, retro.clone());
        Ok(())
    }

    async fn get_retrospective(&self, id: SessionId) -> Result<RetrospectiveRecord, StoreError> {
        self.retrospectives
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("retrospective", id))
    }

    async fn list_retrospectives(
        &self,
        couple_id: CoupleId,
    ) -> Result<Vec<RetrospectiveRecord>, StoreError> {
        let mut result: Vec<RetrospectiveRecord> = self
            .retrospectives
            .read()
            .await
            .values()
            .filter(|r| r.couple_id == couple_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(result)
    }

    async fn create_round(&self, round: &RoundRecord) -> Result<(), StoreError> {
        self.check_writable()?;
        self.rounds.write().await.push(round.clone());
        Ok(())
    }

    async fn list_rounds(
        &self,
        retrospective_id: SessionId,
    ) -> Result<Vec<RoundRecord>, StoreError> {
        let mut result: Vec<RoundRecord> = self
            .rounds
            .read()
            .await
            .iter()
            .filter(|r| r.retrospective_id == retrospective_id)
            .cloned()
            .collect();
        result.sort_by_key(|r| r.round_number);
        Ok(result)
    }

    async fn create_response(&self, response: &ResponseRecord) -> Result<(), StoreError> {
        self.check_writable()?;
        self.responses.write().await.push(response.clone());
        Ok(())
    }

    async fn create_insight(&self, insight: &InsightRecord) -> Result<(), StoreError> {
        self.check_writable()?;
        self.insights.write().await.push(insight.clone());
        Ok(())
    }

    async fn list_insights(
        &self,
        retrospective_id: SessionId,
    ) -> Result<Vec<InsightRecord>, StoreError> {
        let mut result: Vec<InsightRecord> = self
            .insights
            .read()
            .await
            .iter()
            .filter(|i| i.retrospective_id == retrospective_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{Partner, RoundId, SessionStatus, Theme, Timestamp};
    use crate::ports::InsightType;

    fn retro(couple_id: CoupleId) -> RetrospectiveRecord {
        RetrospectiveRecord {
            id: SessionId::new(),
            couple_id,
            theme: Theme::Planning,
            status: SessionStatus::InProgress,
            current_round: 1,
            round_count: 3,
            tags: vec![],
            emotional_themes: vec![],
            ai_summary: None,
            completed_at: None,
            created_at: Timestamp::now(),
        }
    }

    #[tokio::test]
    async fn couple_round_trips() {
        let store = InMemoryRetroStore::new();
        let couple = CoupleRecord::new("a@example.com", Some("b@example.com".into()));
        store.create_couple(&couple).await.unwrap();
        assert_eq!(store.get_couple(couple.id).await.unwrap(), couple);
    }

    #[tokio::test]
    async fn missing_couple_is_not_found() {
        let store = InMemoryRetroStore::new();
        assert!(matches!(
            store.get_couple(CoupleId::new()).await.unwrap_err(),
            StoreError::NotFound { entity: "couple", .. }
        ));
    }

    #[tokio::test]
    async fn upsert_overwrites_retrospective() {
        let store = InMemoryRetroStore::new();
        let mut record = retro(CoupleId::new());
        store.upsert_retrospective(&record).await.unwrap();

        record.status = SessionStatus::Completed;
        record.current_round = 4;
        store.upsert_retrospective(&record).await.unwrap();

        let loaded = store.get_retrospective(record.id).await.unwrap();
        assert_eq!(loaded.status, SessionStatus::Completed);
        assert_eq!(loaded.current_round, 4);
    }

    #[tokio::test]
    async fn rounds_list_in_round_order() {
        let store = InMemoryRetroStore::new();
        let retro_id = SessionId::new();
        for n in [2u32, 1] {
            store
                .create_round(&RoundRecord {
                    id: RoundId::new(),
                    retrospective_id: retro_id,
                    round_number: n,
                    question: format!("Q{}", n),
                    created_at: Timestamp::now(),
                })
                .await
                .unwrap();
        }
        let rounds = store.list_rounds(retro_id).await.unwrap();
        assert_eq!(rounds[0].round_number, 1);
        assert_eq!(rounds[1].round_number, 2);
    }

    #[tokio::test]
    async fn failure_injection_rejects_writes() {
        let store = InMemoryRetroStore::new();
        store.fail_writes(true);
        let response = ResponseRecord::typed(RoundId::new(), Partner::A, "text");
        assert!(store.create_response(&response).await.is_err());

        store.fail_writes(false);
        store.create_response(&response).await.unwrap();
        assert_eq!(store.response_count().await, 1);
    }

    #[tokio::test]
    async fn insights_store_and_list() {
        let store = InMemoryRetroStore::new();
        let retro_id = SessionId::new();
        let insight = InsightRecord::new(
            retro_id,
            InsightType::RoundAnalysis,
            serde_json::json!({"emotionalThemes": ["gratitude"]}),
        );
        store.create_insight(&insight).await.unwrap();
        let listed = store.list_insights(retro_id).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].insight_type, InsightType::RoundAnalysis);
    }
}
