//! Resilient Enrichment - wrapper that substitutes fallback content on failure.
//!
//! Wraps any `AiEnrichment` implementation; every operation returns `Ok` with
//! either the inner client's result or the matching canned fallback. The
//! recovered failure is logged, never propagated, so the conversation engine
//! can treat enrichment as a best-effort enhancement.
//!
//! # Example
//!
//! ```ignore
//! let inner = OpenAiEnrichment::new(config)?;
//! let enrichment = ResilientEnrichment::new(Arc::new(inner));
//! ```

use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

use crate::domain::foundation::Theme;
use crate::domain::retrospective::{CompletedRound, ConversationSummary, RoundAnalysis};
use crate::ports::{AiEnrichment, AiError};

use super::fallback;

/// Fallback-on-failure wrapper around an enrichment client.
#[derive(Clone)]
pub struct ResilientEnrichment {
    inner: Arc<dyn AiEnrichment>,
}

impl ResilientEnrichment {
    /// Wraps an enrichment client.
    pub fn new(inner: Arc<dyn AiEnrichment>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl AiEnrichment for ResilientEnrichment {
    async fn generate_question(
        &self,
        theme: Theme,
        previous_questions: &[String],
    ) -> Result<String, AiError> {
        match self.inner.generate_question(theme, previous_questions).await {
            Ok(question) => Ok(question),
            Err(err) => {
                warn!(theme = %theme, error = %err, "question generation failed, using canned question");
                Ok(fallback::fallback_question(theme, previous_questions))
            }
        }
    }

    async fn analyze_responses(
        &self,
        question: &str,
        partner_a_response: &str,
        partner_b_response: &str,
    ) -> Result<RoundAnalysis, AiError> {
        match self
            .inner
            .analyze_responses(question, partner_a_response, partner_b_response)
            .await
        {
            Ok(analysis) => Ok(analysis),
            Err(err) => {
                warn!(error = %err, "response analysis failed, using fallback analysis");
                Ok(fallback::fallback_analysis())
            }
        }
    }

    async fn generate_follow_up(
        &self,
        theme: Theme,
        previous_rounds: &[CompletedRound],
        analysis_context: Option<&RoundAnalysis>,
    ) -> Result<String, AiError> {
        match self
            .inner
            .generate_follow_up(theme, previous_rounds, analysis_context)
            .await
        {
            Ok(question) => Ok(question),
            Err(err) => {
                warn!(theme = %theme, error = %err, "follow-up generation failed, using canned follow-up");
                let asked: Vec<String> =
                    previous_rounds.iter().map(|r| r.question.clone()).collect();
                let canned = fallback::fallback_follow_up(theme);
                if !asked.iter().any(|q| q == canned) {
                    Ok(canned.to_string())
                } else if !asked.iter().any(|q| q == fallback::GENERIC_FOLLOW_UP) {
                    Ok(fallback::GENERIC_FOLLOW_UP.to_string())
                } else {
                    // Both canned lines used this session; pull from the
                    // question pool so rounds never repeat.
                    Ok(fallback::fallback_question(theme, &asked))
                }
            }
        }
    }

    async fn generate_summary(
        &self,
        theme: Theme,
        rounds: &[CompletedRound],
    ) -> Result<ConversationSummary, AiError> {
        match self.inner.generate_summary(theme, rounds).await {
            Ok(summary) => Ok(summary),
            Err(err) => {
                warn!(theme = %theme, error = %err, "summary generation failed, using fallback summary");
                Ok(fallback::fallback_summary(theme))
            }
        }
    }
}
