//! Error types for the conversation protocol.

use thiserror::Error;

use crate::domain::foundation::{CoupleId, Partner, SessionStatus};

/// Precondition violations raised by `Session` transitions.
///
/// These are rejected synchronously with the session state unchanged; the
/// caller corrects its input and may retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("no active round; session status is {status}")]
    NoActiveRound { status: SessionStatus },

    #[error("round {round} already has a question")]
    QuestionAlreadySet { round: u32 },

    #[error("question generation is already in flight")]
    GenerationInFlight,

    #[error("no question has been generated for this round")]
    QuestionNotSet,

    #[error("partner {partner} cannot submit an empty response")]
    EmptyResponse { partner: Partner },

    #[error("both partners must submit before the round can be analyzed")]
    BothResponsesRequired,

    #[error("analysis is already in flight")]
    AnalysisInFlight,

    #[error("the round must be analyzed before advancing")]
    AnalysisRequired,

    #[error("session is not completed")]
    NotCompleted,

    #[error("final summary is already set")]
    SummaryAlreadySet,

    #[error("a session is already in progress for couple {couple_id}")]
    SessionAlreadyActive { couple_id: CoupleId },
}
