//! ConversationService - drives the retrospective protocol.
//!
//! Owns the current `Session` and sequences the side effects around its pure
//! transitions: enrichment calls at the right protocol points, gateway writes
//! for each entity, and a mirror snapshot after every state change.
//!
//! Error posture follows the engine's design: precondition violations reject
//! synchronously with state unchanged; enrichment failures are absorbed into
//! fallback content; gateway failures are logged and reported as a non-fatal
//! `store_warning` on the outcome (the in-memory session stays authoritative),
//! except round-record creation, which fails `request_question` outright
//! because later response rows need the round id. Mirror writes are
//! fire-and-forget.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::adapters::ai::fallback;
use crate::domain::foundation::{CoupleId, Partner, RoundId, SessionId, SessionStatus, Theme, Timestamp};
use crate::domain::retrospective::{RoundAnalysis, Session, SessionError};
use crate::ports::{
    AiEnrichment, CacheMirror, InsightRecord, InsightType, ResponseRecord, RetroStore,
    RetrospectiveRecord, RoundRecord,
};

/// Errors surfaced by the conversation service.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A protocol precondition was violated; state is unchanged.
    #[error(transparent)]
    Validation(#[from] SessionError),

    /// No session is in progress.
    #[error("no session in progress")]
    NoSession,

    /// A load-bearing gateway write failed; state is unchanged.
    #[error("persistence failed: {0}")]
    Persistence(String),

    /// Enrichment failed with no fallback available.
    #[error("enrichment failed: {0}")]
    Enrichment(String),
}

/// Result of `request_question`.
#[derive(Debug, Clone)]
pub struct QuestionOutcome {
    pub question: String,
    pub round_id: RoundId,
}

/// Result of `submit_response`.
#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    /// True once both partners have submitted and answers are revealed.
    pub revealed: bool,
    pub store_warning: Option<String>,
}

/// Result of `analyze_round`.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub analysis: RoundAnalysis,
    pub store_warning: Option<String>,
}

/// Result of `advance_round`.
#[derive(Debug, Clone)]
pub struct AdvanceOutcome {
    /// True when this advance completed the session.
    pub completed: bool,
    pub store_warning: Option<String>,
}

/// Application service for one retrospective conversation at a time.
///
/// Single-threaded and cooperative: each operation runs to completion before
/// the next intent is processed, and re-entrant enrichment calls are blocked
/// by the session's in-flight flags, not by locks.
pub struct ConversationService {
    enrichment: Arc<dyn AiEnrichment>,
    store: Arc<dyn RetroStore>,
    mirror: Arc<dyn CacheMirror>,
    session: Option<Session>,
}

impl ConversationService {
    /// Creates a service with no session loaded.
    pub fn new(
        enrichment: Arc<dyn AiEnrichment>,
        store: Arc<dyn RetroStore>,
        mirror: Arc<dyn CacheMirror>,
    ) -> Self {
        Self {
            enrichment,
            store,
            mirror,
            session: None,
        }
    }

    /// The current session, if any.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Starts a new session for a couple.
    ///
    /// Fails if the mirror already holds an in-progress session for this
    /// couple; callers must `reset_session` first. Triggers no enrichment or
    /// gateway call; question generation is a separate explicit step.
    pub async fn start_session(
        &mut self,
        couple_id: CoupleId,
        theme: Theme,
        initiating_partner: Partner,
    ) -> Result<SessionId, EngineError> {
        if let Some(existing) = self.find_mirrored_session().await {
            if existing.couple_id() == couple_id && existing.status() == SessionStatus::InProgress {
                return Err(SessionError::SessionAlreadyActive { couple_id }.into());
            }
        }

        let session = Session::start(couple_id, theme, initiating_partner);
        let session_id = session.session_id();
        debug!(%session_id, theme = %theme, "session started");

        if let Err(err) = self.mirror.set_current(session_id).await {
            warn!(%session_id, error = %err, "failed to set current-session pointer");
        }
        self.session = Some(session);
        self.mirror_session().await;
        Ok(session_id)
    }

    /// Generates the question for the current round and persists the round
    /// record.
    ///
    /// Round 1 uses theme-conditioned generation; later rounds generate a
    /// follow-up conditioned on the completed rounds and the latest analysis.
    /// Previously used questions are excluded across the whole session.
    pub async fn request_question(&mut self) -> Result<QuestionOutcome, EngineError> {
        let current = self.session.as_ref().ok_or(EngineError::NoSession)?.clone();
        let pending = current.begin_question_generation()?;
        self.session = Some(pending.clone());
        self.mirror_session().await;

        let question = if pending.completed_rounds().is_empty() {
            self.enrichment
                .generate_question(pending.theme(), &pending.previous_questions())
                .await
        } else {
            let context = pending.completed_rounds().last().map(|r| &r.analysis);
            self.enrichment
                .generate_follow_up(pending.theme(), pending.completed_rounds(), context)
                .await
        };
        let question = match question {
            Ok(question) => question,
            // Unreachable behind the resilient wrapper; kept for bare clients.
            Err(err) => {
                warn!(error = %err, "question generation failed");
                self.session = self.session.take().map(Session::question_failed);
                self.mirror_session().await;
                return Err(EngineError::Enrichment(err.to_string()));
            }
        };

        let round_id = RoundId::new();
        let persist_result = async {
            self.store
                .upsert_retrospective(&Self::retrospective_record(&pending))
                .await?;
            self.store
                .create_round(&RoundRecord {
                    id: round_id,
                    retrospective_id: pending.session_id(),
                    round_number: pending.current_round_number(),
                    question: question.clone(),
                    created_at: Timestamp::now(),
                })
                .await
        }
        .await;

        if let Err(err) = persist_result {
            warn!(error = %err, "failed to persist round record");
            self.session = self.session.take().map(Session::question_failed);
            self.mirror_session().await;
            return Err(EngineError::Persistence(err.to_string()));
        }

        let session = self
            .session
            .take()
            .ok_or(EngineError::NoSession)?
            .question_ready(question.clone(), round_id)?;
        self.session = Some(session);
        self.mirror_session().await;
        Ok(QuestionOutcome { question, round_id })
    }

    /// Replaces one partner's draft text, even after that partner submitted.
    /// Never fails; drafts outside an active round are ignored.
    pub async fn update_draft(&mut self, partner: Partner, text: impl Into<String>) {
        if let Some(session) = self.session.take() {
            self.session = Some(session.update_draft(partner, text));
            self.mirror_session().await;
        }
    }

    /// Submits one partner's response and persists the response row.
    ///
    /// The second submission flips the reveal gate for both partners.
    /// Analysis is a separate explicit step.
    pub async fn submit_response(&mut self, partner: Partner) -> Result<SubmitOutcome, EngineError> {
        let current = self.session.as_ref().ok_or(EngineError::NoSession)?.clone();
        let already_submitted = current
            .active_round()
            .map(|r| r.slot(partner).submitted())
            .unwrap_or(false);
        let session = current.submit_response(partner)?;

        let mut store_warning = None;
        if !already_submitted {
            let round_row = session
                .active_round()
                .and_then(|r| r.round_id().map(|id| (id, r.slot(partner).response_text())));
            if let Some((round_id, text)) = round_row {
                let record = ResponseRecord::typed(round_id, partner, text);
                if let Err(err) = self.store.create_response(&record).await {
                    warn!(error = %err, "failed to persist response row");
                    store_warning = Some(err.to_string());
                }
            }
        }

        let revealed = session.active_round().map(|r| r.reveal_other()).unwrap_or(false);
        self.session = Some(session);
        self.mirror_session().await;
        Ok(SubmitOutcome {
            revealed,
            store_warning,
        })
    }

    /// Analyzes the current round's responses.
    ///
    /// Requires both submissions. Always leaves an analysis attached: on
    /// enrichment failure the fixed fallback analysis is used, so progression
    /// is never blocked.
    pub async fn analyze_round(&mut self) -> Result<AnalysisOutcome, EngineError> {
        let current = self.session.as_ref().ok_or(EngineError::NoSession)?.clone();
        let pending = current.begin_analysis()?;
        self.session = Some(pending.clone());
        self.mirror_session().await;

        // begin_analysis guarantees a round; the default is never observed.
        let round = pending.active_round().cloned().unwrap_or_default();
        let analysis = self
            .enrichment
            .analyze_responses(
                round.question().unwrap_or_default(),
                round.slot(Partner::A).response_text(),
                round.slot(Partner::B).response_text(),
            )
            .await
            .unwrap_or_else(|err| {
                warn!(error = %err, "analysis failed, attaching fallback");
                fallback::fallback_analysis()
            });

        let session = self
            .session
            .take()
            .ok_or(EngineError::NoSession)?
            .analysis_ready(analysis.clone())?;

        let mut store_warning = None;
        let insight = InsightRecord::new(
            session.session_id(),
            InsightType::RoundAnalysis,
            serde_json::to_value(&analysis).unwrap_or(serde_json::Value::Null),
        );
        if let Err(err) = self.store.create_insight(&insight).await {
            warn!(error = %err, "failed to persist round analysis insight");
            store_warning = Some(err.to_string());
        }

        self.session = Some(session);
        self.mirror_session().await;
        Ok(AnalysisOutcome {
            analysis,
            store_warning,
        })
    }

    /// Archives the analyzed round and advances.
    ///
    /// On the final round this completes the session and generates the final
    /// summary (fallback on enrichment failure; completion is never blocked).
    pub async fn advance_round(&mut self) -> Result<AdvanceOutcome, EngineError> {
        let current = self.session.as_ref().ok_or(EngineError::NoSession)?.clone();
        let mut session = current.advance_round()?;
        // Several independent rows are written here; every degradation is
        // reported, not just the last one.
        let mut warnings: Vec<String> = Vec::new();

        let completed = session.status() == SessionStatus::Completed;
        if completed {
            let summary = self
                .enrichment
                .generate_summary(session.theme(), session.completed_rounds())
                .await
                .unwrap_or_else(|err| {
                    warn!(error = %err, "summary generation failed, attaching fallback");
                    fallback::fallback_summary(session.theme())
                });
            session = session.attach_summary(summary.clone())?;

            let insight = InsightRecord::new(
                session.session_id(),
                InsightType::Summary,
                serde_json::to_value(&summary).unwrap_or(serde_json::Value::Null),
            );
            if let Err(err) = self.store.create_insight(&insight).await {
                warn!(error = %err, "failed to persist summary insight");
                warnings.push(err.to_string());
            }
            debug!(session_id = %session.session_id(), "session completed");
        }

        let retro = Self::retrospective_record(&session);
        self.session = Some(session);
        if let Err(err) = self.store.upsert_retrospective(&retro).await {
            warn!(error = %err, "failed to update retrospective row");
            warnings.push(err.to_string());
        }
        self.mirror_session().await;
        Ok(AdvanceOutcome {
            completed,
            store_warning: if warnings.is_empty() {
                None
            } else {
                Some(warnings.join("; "))
            },
        })
    }

    /// Discards the session and its mirror entries. Idempotent; a hard
    /// delete, not an archive.
    pub async fn reset_session(&mut self) {
        let session_id = match self.session.take() {
            Some(session) => Some(session.session_id()),
            None => self.mirror.current_session_id().await.ok().flatten(),
        };
        if let Some(session_id) = session_id {
            if let Err(err) = self.mirror.delete(session_id).await {
                warn!(%session_id, error = %err, "failed to delete mirror entry");
            }
            debug!(%session_id, "session reset");
        }
    }

    /// Rehydrates the most recent session from the mirror pointer.
    ///
    /// The mirror is strictly advisory: any read failure is logged and
    /// treated as "nothing to resume". In-flight flags are cleared because
    /// no enrichment call survives a reload.
    pub async fn resume(&mut self) -> Option<&Session> {
        let session_id = match self.mirror.current_session_id().await {
            Ok(Some(id)) => id,
            Ok(None) => return None,
            Err(err) => {
                warn!(error = %err, "failed to read current-session pointer");
                return None;
            }
        };
        match self.mirror.load_snapshot(session_id).await {
            Ok(snapshot) => {
                debug!(%session_id, "session resumed from mirror");
                self.session = Some(snapshot.after_reload());
                self.session.as_ref()
            }
            Err(err) => {
                warn!(%session_id, error = %err, "failed to load mirror snapshot");
                None
            }
        }
    }

    /// Saves a snapshot of the current session, fire-and-forget.
    async fn mirror_session(&mut self) {
        if let Some(session) = self.session.take() {
            let session = match self.mirror.save_snapshot(&session).await {
                Ok(()) => session.mark_persisted(Timestamp::now()),
                Err(err) => {
                    warn!(session_id = %session.session_id(), error = %err, "mirror write failed");
                    session
                }
            };
            self.session = Some(session);
        }
    }

    async fn find_mirrored_session(&self) -> Option<Session> {
        let session_id = self.mirror.current_session_id().await.ok().flatten()?;
        self.mirror.load_snapshot(session_id).await.ok()
    }

    /// Projects a session onto the retrospective row shape.
    fn retrospective_record(session: &Session) -> RetrospectiveRecord {
        let summary = session.final_summary();
        let mut emotional_themes: Vec<String> = Vec::new();
        for round in session.completed_rounds() {
            for theme in &round.analysis.emotional_themes {
                if !emotional_themes.contains(theme) {
                    emotional_themes.push(theme.clone());
                }
            }
        }
        RetrospectiveRecord {
            id: session.session_id(),
            couple_id: session.couple_id(),
            theme: session.theme(),
            status: session.status(),
            current_round: session.current_round_number(),
            round_count: session.total_rounds(),
            tags: summary.map(|s| s.tags.clone()).unwrap_or_default(),
            emotional_themes,
            ai_summary: summary.and_then(|s| serde_json::to_value(s).ok()),
            completed_at: if session.status() == SessionStatus::Completed {
                Some(Timestamp::now())
            } else {
                None
            },
            created_at: session.started_at(),
        }
    }
}
