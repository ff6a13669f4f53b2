//! Session aggregate - the canonical state of one retrospective.
//!
//! A `Session` is an immutable value: every operation is a named transition
//! that consumes `self` and returns a new value, so each invariant is checked
//! at exactly one place and a failed transition leaves the previous value
//! untouched.
//!
//! # Invariants
//!
//! - `current_round_number - 1 == completed_rounds.len()` whenever an active
//!   round exists
//! - a round reaches `completed_rounds` only with both slots submitted and an
//!   analysis attached (real or fallback)
//! - `final_summary` is set exactly once, only after the last round advances
//! - slot submission is one-way within a round
//!
//! The `is_generating_question` / `is_analyzing` flags are the protocol's
//! only mutual-exclusion mechanism: while an enrichment call is outstanding
//! the matching `begin_*` transition rejects re-entry.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    CoupleId, Partner, RoundId, SessionId, SessionStatus, Theme, Timestamp,
};

use super::analysis::{ConversationSummary, RoundAnalysis};
use super::errors::SessionError;
use super::round::{ActiveRound, CompletedRound};

/// Number of rounds in every retrospective.
pub const TOTAL_ROUNDS: u32 = 3;

/// Root aggregate for one retrospective conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    session_id: SessionId,
    couple_id: CoupleId,
    theme: Theme,
    initiating_partner: Partner,
    status: SessionStatus,
    current_round_number: u32,
    total_rounds: u32,
    active_round: Option<ActiveRound>,
    completed_rounds: Vec<CompletedRound>,
    final_summary: Option<ConversationSummary>,
    is_analyzing: bool,
    is_generating_question: bool,
    started_at: Timestamp,
    /// Advisory: when the cache mirror last accepted a snapshot.
    last_persisted_at: Option<Timestamp>,
}

impl Session {
    /// Starts a new session: in progress, round 1, fresh active round.
    pub fn start(couple_id: CoupleId, theme: Theme, initiating_partner: Partner) -> Self {
        Self {
            session_id: SessionId::new(),
            couple_id,
            theme,
            initiating_partner,
            status: SessionStatus::InProgress,
            current_round_number: 1,
            total_rounds: TOTAL_ROUNDS,
            active_round: Some(ActiveRound::new()),
            completed_rounds: Vec::new(),
            final_summary: None,
            is_analyzing: false,
            is_generating_question: false,
            started_at: Timestamp::now(),
            last_persisted_at: None,
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn couple_id(&self) -> CoupleId {
        self.couple_id
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn initiating_partner(&self) -> Partner {
        self.initiating_partner
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn current_round_number(&self) -> u32 {
        self.current_round_number
    }

    pub fn total_rounds(&self) -> u32 {
        self.total_rounds
    }

    pub fn active_round(&self) -> Option<&ActiveRound> {
        self.active_round.as_ref()
    }

    pub fn completed_rounds(&self) -> &[CompletedRound] {
        &self.completed_rounds
    }

    pub fn final_summary(&self) -> Option<&ConversationSummary> {
        self.final_summary.as_ref()
    }

    pub fn is_analyzing(&self) -> bool {
        self.is_analyzing
    }

    pub fn is_generating_question(&self) -> bool {
        self.is_generating_question
    }

    pub fn started_at(&self) -> Timestamp {
        self.started_at
    }

    pub fn last_persisted_at(&self) -> Option<Timestamp> {
        self.last_persisted_at
    }

    /// Questions already used in this session, oldest first.
    pub fn previous_questions(&self) -> Vec<String> {
        self.completed_rounds
            .iter()
            .map(|r| r.question.clone())
            .collect()
    }

    /// True when both partners have submitted the current round.
    pub fn both_submitted(&self) -> bool {
        self.active_round
            .as_ref()
            .map(ActiveRound::both_submitted)
            .unwrap_or(false)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Transitions
    // ─────────────────────────────────────────────────────────────────────

    /// Marks question generation as in flight.
    ///
    /// Rejected if the round already has a question or a generation call is
    /// already outstanding.
    pub fn begin_question_generation(mut self) -> Result<Self, SessionError> {
        let round = self.require_active_round()?;
        if round.question().is_some() {
            return Err(SessionError::QuestionAlreadySet {
                round: self.current_round_number,
            });
        }
        if self.is_generating_question {
            return Err(SessionError::GenerationInFlight);
        }
        self.is_generating_question = true;
        Ok(self)
    }

    /// Attaches the generated question and its store-assigned round id.
    pub fn question_ready(mut self, question: String, round_id: RoundId) -> Result<Self, SessionError> {
        let round = self.require_active_round()?;
        if round.question().is_some() {
            return Err(SessionError::QuestionAlreadySet {
                round: self.current_round_number,
            });
        }
        self.active_round = self
            .active_round
            .take()
            .map(|r| r.with_question(question, round_id));
        self.is_generating_question = false;
        Ok(self)
    }

    /// Clears the generation flag after a failed attempt. State otherwise
    /// unchanged; the caller may retry.
    pub fn question_failed(mut self) -> Self {
        self.is_generating_question = false;
        self
    }

    /// Replaces one partner's draft text. Never fails; without an active
    /// round the update is a no-op. The text stays editable even after that
    /// partner submitted; only the `submitted` flag is one-way.
    pub fn update_draft(mut self, partner: Partner, text: impl Into<String>) -> Self {
        self.active_round = self
            .active_round
            .take()
            .map(|r| r.with_draft(partner, text.into()));
        self
    }

    /// Submits one partner's response.
    ///
    /// Rejected when the draft is blank or no question exists yet. Idempotent
    /// after the first success: resubmitting leaves the slot submitted and
    /// does not disturb the reveal flag.
    pub fn submit_response(mut self, partner: Partner) -> Result<Self, SessionError> {
        let round = self.require_active_round()?;
        if round.question().is_none() {
            return Err(SessionError::QuestionNotSet);
        }
        if round.slot(partner).submitted() {
            return Ok(self);
        }
        if round.slot(partner).is_blank() {
            return Err(SessionError::EmptyResponse { partner });
        }
        self.active_round = self.active_round.take().map(|r| r.with_submission(partner));
        Ok(self)
    }

    /// Marks analysis as in flight. Requires both submissions; rejected while
    /// another analysis call is outstanding. Re-analyzing an already analyzed
    /// round is allowed and overwrites.
    pub fn begin_analysis(mut self) -> Result<Self, SessionError> {
        let round = self.require_active_round()?;
        if !round.both_submitted() {
            return Err(SessionError::BothResponsesRequired);
        }
        if self.is_analyzing {
            return Err(SessionError::AnalysisInFlight);
        }
        self.is_analyzing = true;
        Ok(self)
    }

    /// Attaches the analysis (real or fallback) to the active round.
    pub fn analysis_ready(mut self, analysis: RoundAnalysis) -> Result<Self, SessionError> {
        self.require_active_round()?;
        self.active_round = self.active_round.take().map(|r| r.with_analysis(analysis));
        self.is_analyzing = false;
        Ok(self)
    }

    /// Archives the analyzed round and moves to the next one.
    ///
    /// After the final round the session becomes `Completed` with no new
    /// active round; the final summary is attached separately via
    /// [`Session::attach_summary`].
    pub fn advance_round(mut self) -> Result<Self, SessionError> {
        let round = match self.active_round.take() {
            Some(round) => round,
            None => {
                return Err(SessionError::NoActiveRound {
                    status: self.status,
                })
            }
        };
        let analysis = match round.analysis().cloned() {
            Some(analysis) => analysis,
            None => {
                self.active_round = Some(round);
                return Err(SessionError::AnalysisRequired);
            }
        };

        self.completed_rounds.push(CompletedRound {
            round_number: self.current_round_number,
            round_id: round.round_id(),
            question: round.question().unwrap_or_default().to_string(),
            partner_a_response: round.slot(Partner::A).response_text().to_string(),
            partner_b_response: round.slot(Partner::B).response_text().to_string(),
            analysis,
        });
        self.current_round_number += 1;

        if self.current_round_number > self.total_rounds {
            self.status = SessionStatus::Completed;
            self.active_round = None;
        } else {
            self.active_round = Some(ActiveRound::new());
        }
        Ok(self)
    }

    /// Sets the final summary. Exactly once, only after completion.
    pub fn attach_summary(mut self, summary: ConversationSummary) -> Result<Self, SessionError> {
        if self.status != SessionStatus::Completed {
            return Err(SessionError::NotCompleted);
        }
        if self.final_summary.is_some() {
            return Err(SessionError::SummaryAlreadySet);
        }
        self.final_summary = Some(summary);
        Ok(self)
    }

    /// Records a successful mirror write. Advisory only.
    pub fn mark_persisted(mut self, at: Timestamp) -> Self {
        self.last_persisted_at = Some(at);
        self
    }

    /// Clears in-flight flags after a reload. Any enrichment call that was
    /// outstanding when the snapshot was taken is gone; its result, if it
    /// ever arrives, belongs to a process that no longer exists.
    pub fn after_reload(mut self) -> Self {
        self.is_analyzing = false;
        self.is_generating_question = false;
        self
    }

    /// Checks the aggregate's structural invariants. Used by tests.
    pub fn invariants_hold(&self) -> bool {
        let lockstep = match &self.active_round {
            Some(_) => self.current_round_number as usize == self.completed_rounds.len() + 1,
            None => true,
        };
        let bounded = self.current_round_number <= self.total_rounds + 1;
        let summary_only_when_complete =
            self.final_summary.is_none() || self.status == SessionStatus::Completed;
        lockstep && bounded && summary_only_when_complete
    }

    fn require_active_round(&self) -> Result<&ActiveRound, SessionError> {
        self.active_round
            .as_ref()
            .ok_or(SessionError::NoActiveRound {
                status: self.status,
            })
    }
}
