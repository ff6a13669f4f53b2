//! AI Enrichment Port - Interface to the language-model service.
//!
//! Four independent request/response operations, each theme- or
//! context-conditioned. Callers treat the service as best effort: the
//! resilient adapter wraps any implementation and substitutes fallback
//! content on failure, so the state machine never blocks on an outage.

use async_trait::async_trait;

use crate::domain::foundation::Theme;
use crate::domain::retrospective::{CompletedRound, ConversationSummary, RoundAnalysis};

/// Port for AI enrichment of the conversation.
///
/// Implementations connect to a language-model API and translate between its
/// wire format and the domain's structured types. A parse failure on a
/// structured result is an [`AiError::Parse`], treated by callers exactly
/// like a request failure.
#[async_trait]
pub trait AiEnrichment: Send + Sync {
    /// Generates an opening question for the theme, avoiding any question in
    /// `previous_questions`.
    async fn generate_question(
        &self,
        theme: Theme,
        previous_questions: &[String],
    ) -> Result<String, AiError>;

    /// Extracts emotional themes, topics and per-partner sentiment from both
    /// responses to a question.
    async fn analyze_responses(
        &self,
        question: &str,
        partner_a_response: &str,
        partner_b_response: &str,
    ) -> Result<RoundAnalysis, AiError>;

    /// Generates a follow-up question conditioned on the rounds so far and
    /// the most recent analysis.
    async fn generate_follow_up(
        &self,
        theme: Theme,
        previous_rounds: &[CompletedRound],
        analysis_context: Option<&RoundAnalysis>,
    ) -> Result<String, AiError>;

    /// Generates the final summary over all completed rounds.
    async fn generate_summary(
        &self,
        theme: Theme,
        rounds: &[CompletedRound],
    ) -> Result<ConversationSummary, AiError>;
}

/// Errors from the enrichment service.
#[derive(Debug, thiserror::Error)]
pub enum AiError {
    /// Provider is unavailable or returned a server error.
    #[error("provider unavailable: {0}")]
    Unavailable(String),

    /// Network error during the request.
    #[error("network error: {0}")]
    Network(String),

    /// The response body could not be parsed into the expected shape.
    #[error("parse error: {0}")]
    Parse(String),

    /// API key or authentication failed.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Request timed out.
    #[error("request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u32 },
}

impl AiError {
    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Creates a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }
}
