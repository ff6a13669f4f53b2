//! Mock enrichment client for testing.
//!
//! Configurable to return scripted content, inject failures, and track call
//! counts so tests can verify which operations the engine invoked.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::domain::foundation::{Partner, Theme};
use crate::domain::retrospective::{
    CompletedRound, ConversationSummary, PartnerSentiment, RoundAnalysis, Sentiment, Tone,
};
use crate::ports::{AiEnrichment, AiError};

/// Call counts per operation, for verification in tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrichmentCalls {
    pub questions: usize,
    pub analyses: usize,
    pub follow_ups: usize,
    pub summaries: usize,
}

/// Scripted mock implementation of `AiEnrichment`.
#[derive(Clone, Default)]
pub struct MockEnrichment {
    fail_all: bool,
    questions: Arc<Mutex<VecDeque<String>>>,
    follow_ups: Arc<Mutex<VecDeque<String>>>,
    analyses: Arc<Mutex<VecDeque<RoundAnalysis>>>,
    summaries: Arc<Mutex<VecDeque<ConversationSummary>>>,
    calls: Arc<Mutex<EnrichmentCalls>>,
}

impl MockEnrichment {
    /// Creates a mock that answers with generated defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock where every operation fails with `Unavailable`.
    pub fn failing() -> Self {
        Self {
            fail_all: true,
            ..Self::default()
        }
    }

    /// Queues a question to return (consumed in order).
    pub fn with_question(self, question: impl Into<String>) -> Self {
        self.questions.lock().unwrap().push_back(question.into());
        self
    }

    /// Queues a follow-up question to return.
    pub fn with_follow_up(self, question: impl Into<String>) -> Self {
        self.follow_ups.lock().unwrap().push_back(question.into());
        self
    }

    /// Queues an analysis to return.
    pub fn with_analysis(self, analysis: RoundAnalysis) -> Self {
        self.analyses.lock().unwrap().push_back(analysis);
        self
    }

    /// Queues a summary to return.
    pub fn with_summary(self, summary: ConversationSummary) -> Self {
        self.summaries.lock().unwrap().push_back(summary);
        self
    }

    /// Call counts so far.
    pub fn calls(&self) -> EnrichmentCalls {
        *self.calls.lock().unwrap()
    }

    fn check_available(&self) -> Result<(), AiError> {
        if self.fail_all {
            Err(AiError::unavailable("mock configured to fail"))
        } else {
            Ok(())
        }
    }

    /// Default analysis returned when none is queued.
    pub fn default_analysis() -> RoundAnalysis {
        RoundAnalysis {
            emotional_themes: vec!["gratitude".to_string(), "excitement".to_string()],
            key_topics: vec!["future plans".to_string()],
            partner_sentiments: vec![
                PartnerSentiment::new(Partner::A, Sentiment::Positive),
                PartnerSentiment::new(Partner::B, Sentiment::Positive),
            ],
            suggested_follow_ups: vec!["next steps".to_string()],
            overall_tone: Tone::Positive,
        }
    }

    /// Default summary returned when none is queued.
    pub fn default_summary(theme: Theme) -> ConversationSummary {
        ConversationSummary {
            overall_themes: vec![theme.as_tag().to_string()],
            key_insights: vec!["You both showed openness in sharing".to_string()],
            strengths: vec!["Good communication".to_string()],
            growth_areas: vec!["Continue these conversations".to_string()],
            suggested_actions: vec!["Schedule regular check-ins".to_string()],
            emotional_journey: "A meaningful conversation about your relationship".to_string(),
            tags: vec![theme.as_tag().to_string(), "connection".to_string()],
        }
    }
}

#[async_trait]
impl AiEnrichment for MockEnrichment {
    async fn generate_question(
        &self,
        theme: Theme,
        _previous_questions: &[String],
    ) -> Result<String, AiError> {
        self.calls.lock().unwrap().questions += 1;
        self.check_available()?;
        Ok(self
            .questions
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| format!("A {} question from the mock", theme.display_name())))
    }

    async fn analyze_responses(
        &self,
        _question: &str,
        _partner_a_response: &str,
        _partner_b_response: &str,
    ) -> Result<RoundAnalysis, AiError> {
        self.calls.lock().unwrap().analyses += 1;
        self.check_available()?;
        Ok(self
            .analyses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(Self::default_analysis))
    }

    async fn generate_follow_up(
        &self,
        theme: Theme,
        _previous_rounds: &[CompletedRound],
        _analysis_context: Option<&RoundAnalysis>,
    ) -> Result<String, AiError> {
        self.calls.lock().unwrap().follow_ups += 1;
        self.check_available()?;
        Ok(self
            .follow_ups
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| format!("A {} follow-up from the mock", theme.display_name())))
    }

    async fn generate_summary(
        &self,
        theme: Theme,
        _rounds: &[CompletedRound],
    ) -> Result<ConversationSummary, AiError> {
        self.calls.lock().unwrap().summaries += 1;
        self.check_available()?;
        Ok(self
            .summaries
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Self::default_summary(theme)))
    }
}
