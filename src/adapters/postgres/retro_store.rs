//! PostgreSQL implementation of RetroStore.
//!
//! Runtime-checked `sqlx::query` with explicit binds; JSON payloads
//! (summaries, insight content) are stored as text columns.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

use crate::domain::foundation::{
    CoupleId, InsightId, RoundId, SessionId, SessionStatus, Theme, Timestamp,
};
use crate::ports::{
    CoupleRecord, InsightRecord, InsightType, ResponseRecord, RetroStore, RetrospectiveRecord,
    RoundRecord, StoreError,
};

/// PostgreSQL-backed persistence gateway.
#[derive(Clone)]
pub struct PostgresRetroStore {
    pool: PgPool,
}

impl PostgresRetroStore {
    /// Creates a new gateway over the given pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RetroStore for PostgresRetroStore {
    async fn create_couple(&self, couple: &CoupleRecord) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO couples (id, partner_a_email, partner_b_email, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(couple.id.as_uuid())
        .bind(&couple.partner_a_email)
        .bind(&couple.partner_b_email)
        .bind(couple.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(())
    }

    async fn get_couple(&self, id: CoupleId) -> Result<CoupleRecord, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, partner_a_email, partner_b_email, created_at
            FROM couples WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?
        .ok_or_else(|| StoreError::not_found("couple", id))?;

        Ok(CoupleRecord {
            id: CoupleId::from_uuid(row.get("id")),
            partner_a_email: row.get("partner_a_email"),
            partner_b_email: row.get("partner_b_email"),
            created_at: timestamp(&row, "created_at"),
        })
    }

    async fn upsert_retrospective(&self, retro: &RetrospectiveRecord) -> Result<(), StoreError> {
        let ai_summary = retro
            .ai_summary
            .as_ref()
            .map(|summary| serde_json::to_string(summary))
            .transpose()
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO retrospectives (
                id, couple_id, theme, status, current_round, round_count,
                tags, emotional_themes, ai_summary, completed_at, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (id) DO UPDATE SET
                status = EXCLUDED.status,
                current_round = EXCLUDED.current_round,
                tags = EXCLUDED.tags,
                emotional_themes = EXCLUDED.emotional_themes,
                ai_summary = EXCLUDED.ai_summary,
                completed_at = EXCLUDED.completed_at
            "#,
        )
        .bind(retro.id.as_uuid())
        .bind(retro.couple_id.as_uuid())
        .bind(retro.theme.display_name())
        .bind(retro.status.as_str())
        .bind(retro.current_round as i32)
        .bind(retro.round_count as i32)
        .bind(&retro.tags)
        .bind(&retro.emotional_themes)
        .bind(ai_summary)
        .bind(retro.completed_at.map(|t| *t.as_datetime()))
        .bind(retro.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(())
    }

    async fn get_retrospective(&self, id: SessionId) -> Result<RetrospectiveRecord, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, couple_id, theme, status, current_round, round_count,
                   tags, emotional_themes, ai_summary, completed_at, created_at
            FROM retrospectives WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?
        .ok_or_else(|| StoreError::not_found("retrospective", id))?;

        retrospective_from_row(&row)
    }

    async fn list_retrospectives(
        &self,
        couple_id: CoupleId,
    ) -> Result<Vec<RetrospectiveRecord>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, couple_id, theme, status, current_round, round_count,
                   tags, emotional_themes, ai_summary, completed_at, created_at
            FROM retrospectives
            WHERE couple_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(couple_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.iter().map(retrospective_from_row).collect()
    }

    async fn create_round(&self, round: &RoundRecord) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO conversation_rounds (id, retrospective_id, round_number, question, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(round.id.as_uuid())
        .bind(round.retrospective_id.as_uuid())
        .bind(round.round_number as i32)
        .bind(&round.question)
        .bind(round.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(())
    }

    async fn list_rounds(
        &self,
        retrospective_id: SessionId,
    ) -> Result<Vec<RoundRecord>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, retrospective_id, round_number, question, created_at
            FROM conversation_rounds
            WHERE retrospective_id = $1
            ORDER BY round_number ASC
            "#,
        )
        .bind(retrospective_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(rows
            .iter()
            .map(|row| RoundRecord {
                id: RoundId::from_uuid(row.get("id")),
                retrospective_id: SessionId::from_uuid(row.get("retrospective_id")),
                round_number: row.get::<i32, _>("round_number") as u32,
                question: row.get("question"),
                created_at: timestamp(row, "created_at"),
            })
            .collect())
    }

    async fn create_response(&self, response: &ResponseRecord) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO responses (
                id, round_id, partner, response_text,
                voice_recording_url, transcription_text, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(response.id.as_uuid())
        .bind(response.round_id.as_uuid())
        .bind(response.partner.as_label())
        .bind(&response.response_text)
        .bind(&response.voice_recording_url)
        .bind(&response.transcription_text)
        .bind(response.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(())
    }

    async fn create_insight(&self, insight: &InsightRecord) -> Result<(), StoreError> {
        let content = serde_json::to_string(&insight.content)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO ai_insights (
                id, retrospective_id, insight_type, content, confidence_score, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(insight.id.as_uuid())
        .bind(insight.retrospective_id.as_uuid())
        .bind(insight.insight_type.as_str())
        .bind(content)
        .bind(insight.confidence_score)
        .bind(insight.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(())
    }

    async fn list_insights(
        &self,
        retrospective_id: SessionId,
    ) -> Result<Vec<InsightRecord>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, retrospective_id, insight_type, content, confidence_score, created_at
            FROM ai_insights
            WHERE retrospective_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(retrospective_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.iter()
            .map(|row| {
                let content: String = row.get("content");
                let content = serde_json::from_str(&content)
                    .map_err(|e| StoreError::Serialization(e.to_string()))?;
                Ok(InsightRecord {
                    id: InsightId::from_uuid(row.get("id")),
                    retrospective_id: SessionId::from_uuid(row.get("retrospective_id")),
                    insight_type: insight_type_from_str(row.get("insight_type")),
                    content,
                    confidence_score: row.get("confidence_score"),
                    created_at: timestamp(row, "created_at"),
                })
            })
            .collect()
    }
}

fn db_err(err: sqlx::Error) -> StoreError {
    StoreError::Database(err.to_string())
}

fn timestamp(row: &sqlx::postgres::PgRow, column: &str) -> Timestamp {
    Timestamp::from_datetime(row.get::<DateTime<Utc>, _>(column))
}

fn insight_type_from_str(s: &str) -> InsightType {
    match s {
        "summary" => InsightType::Summary,
        _ => InsightType::RoundAnalysis,
    }
}

fn retrospective_from_row(row: &sqlx::postgres::PgRow) -> Result<RetrospectiveRecord, StoreError> {
    let ai_summary: Option<String> = row.get("ai_summary");
    let ai_summary = ai_summary
        .map(|raw| serde_json::from_str(&raw))
        .transpose()
        .map_err(|e| StoreError::Serialization(e.to_string()))?;

    Ok(RetrospectiveRecord {
        id: SessionId::from_uuid(row.get("id")),
        couple_id: CoupleId::from_uuid(row.get("couple_id")),
        theme: Theme::from_display_name_lossy(row.get("theme")),
        status: SessionStatus::from_str_lossy(row.get("status")),
        current_round: row.get::<i32, _>("current_round") as u32,
        round_count: row.get::<i32, _>("round_count") as u32,
        tags: row.get("tags"),
        emotional_themes: row.get("emotional_themes"),
        ai_summary,
        completed_at: row
            .get::<Option<DateTime<Utc>>, _>("completed_at")
            .map(Timestamp::from_datetime),
        created_at: timestamp(row, "created_at"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_insight_type_defaults_to_round_analysis() {
        assert_eq!(insight_type_from_str("summary"), InsightType::Summary);
        assert_eq!(
            insight_type_from_str("anything_else"),
            InsightType::RoundAnalysis
        );
    }
}
