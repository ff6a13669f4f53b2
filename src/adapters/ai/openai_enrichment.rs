//! OpenAI Enrichment Client - AiEnrichment implementation over the chat API.
//!
//! Each operation is a single non-streaming chat completion. Structured
//! results (analysis, summary) are requested as JSON and parsed tolerantly:
//! the first balanced object in the reply is extracted, unknown labels decode
//! lossily, and any remaining parse failure surfaces as `AiError::Parse` so
//! the resilient wrapper can substitute fallback content.
//!
//! # Configuration
//!
//! ```ignore
//! let config = OpenAiConfig::new(api_key).with_model("gpt-4");
//! let client = OpenAiEnrichment::new(config);
//! ```

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::foundation::{Partner, Theme};
use crate::domain::retrospective::{
    CompletedRound, ConversationSummary, PartnerSentiment, RoundAnalysis, Sentiment, Tone,
};
use crate::ports::{AiEnrichment, AiError};

use super::fallback::theme_prompt;

/// Configuration for the OpenAI enrichment client.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// API key for authentication.
    api_key: Secret<String>,
    /// Model to use.
    pub model: String,
    /// Base URL for the API.
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl OpenAiConfig {
    /// Creates a new configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: "gpt-4".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builds a client configuration from application settings.
    ///
    /// Returns `None` when no API key is configured; hosts then run on
    /// fallback content alone.
    pub fn from_settings(settings: &crate::config::AiConfig) -> Option<Self> {
        let key = settings.openai_api_key.as_deref().filter(|k| !k.is_empty())?;
        Some(
            Self::new(key)
                .with_model(settings.model.clone())
                .with_base_url(settings.base_url.clone())
                .with_timeout(settings.timeout()),
        )
    }

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// OpenAI-backed enrichment client.
pub struct OpenAiEnrichment {
    config: OpenAiConfig,
    client: Client,
}

impl OpenAiEnrichment {
    /// Creates a new client with the given configuration.
    pub fn new(config: OpenAiConfig) -> Result<Self, AiError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AiError::network(e.to_string()))?;
        Ok(Self { config, client })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url)
    }

    /// Runs one chat completion and returns the assistant's text.
    async fn chat(
        &self,
        system_prompt: String,
        user_prompt: String,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String, AiError> {
        let body = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user_prompt,
                },
            ],
            max_tokens,
            temperature,
        };

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(self.config.api_key())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AiError::Timeout {
                        timeout_secs: self.config.timeout.as_secs() as u32,
                    }
                } else {
                    AiError::network(e.to_string())
                }
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(AiError::AuthenticationFailed);
        }
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AiError::unavailable(format!("{}: {}", status, detail)));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| AiError::parse(e.to_string()))?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| AiError::parse("completion had no choices"))
    }
}

#[async_trait]
impl AiEnrichment for OpenAiEnrichment {
    async fn generate_question(
        &self,
        theme: Theme,
        previous_questions: &[String],
    ) -> Result<String, AiError> {
        let prompt = theme_prompt(theme);
        let mut system = format!(
            "{}\n\nCreate ONE thoughtful, open-ended question for couples to discuss. The question should:\n\
             - Be warm and non-judgmental\n\
             - Encourage vulnerability and connection\n\
             - Be specific enough to generate meaningful conversation\n\
             - Take 2-5 minutes for each partner to answer thoughtfully\n",
            prompt.system
        );
        if !previous_questions.is_empty() {
            system.push_str(&format!(
                "\nAvoid repeating these previously used questions: {}\n",
                previous_questions.join(", ")
            ));
        }
        system.push_str("\nReturn only the question, no additional text.");

        let content = self
            .chat(
                system,
                format!("Generate a {} question for couples.", theme.display_name()),
                100,
                0.8,
            )
            .await?;
        Ok(strip_quotes(content.trim()).to_string())
    }

    async fn analyze_responses(
        &self,
        question: &str,
        partner_a_response: &str,
        partner_b_response: &str,
    ) -> Result<RoundAnalysis, AiError> {
        let system = "You are an expert relationship analyst. Analyze these couple responses to identify:\n\
             1. Emotional themes (e.g., \"gratitude\", \"stress\", \"excitement\", \"concern\")\n\
             2. Key topics mentioned (e.g., \"work\", \"family\", \"future plans\", \"communication\")\n\
             3. Overall sentiment for each partner (positive/neutral/negative)\n\
             4. Suggested areas for follow-up questions\n\n\
             Return a JSON object with this structure:\n\
             {\"emotionalThemes\": [\"theme1\"], \"keyTopics\": [\"topic1\"], \
             \"partnerSentiments\": [{\"partner\": \"A\", \"sentiment\": \"positive\"}, {\"partner\": \"B\", \"sentiment\": \"neutral\"}], \
             \"suggestedFollowUps\": [\"area1\"], \"overallTone\": \"positive/neutral/concerning\"}"
            .to_string();
        let user = format!(
            "Question: {}\n\nResponses:\n{}\n\n---\n\n{}",
            question, partner_a_response, partner_b_response
        );

        let content = self.chat(system, user, 300, 0.3).await?;
        parse_analysis(&content)
    }

    async fn generate_follow_up(
        &self,
        theme: Theme,
        previous_rounds: &[CompletedRound],
        analysis_context: Option<&RoundAnalysis>,
    ) -> Result<String, AiError> {
        let round_summary = previous_rounds
            .iter()
            .map(|round| {
                format!(
                    "Round {}: {}\nKey themes: {}",
                    round.round_number,
                    round.question,
                    round.analysis.emotional_themes.join(", ")
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n");

        let mut system = format!(
            "You are an expert relationship counselor creating adaptive follow-up questions.\n\n\
             Based on the conversation so far, create ONE follow-up question that:\n\
             - Builds on themes that emerged from previous responses\n\
             - Goes deeper into areas that need exploration\n\
             - Maintains the {} focus\n\
             - Encourages actionable insights or connection\n\n\
             Previous conversation context:\n{}\n",
            theme.display_name(),
            round_summary
        );
        if let Some(analysis) = analysis_context {
            system.push_str(&format!(
                "\nRecent analysis suggests focus on: {}\n",
                analysis.suggested_follow_ups.join(", ")
            ));
        }
        system.push_str("\nReturn only the question, no additional text.");

        let content = self
            .chat(
                system,
                format!(
                    "Generate a follow-up question for this {} conversation.",
                    theme.display_name()
                ),
                100,
                0.7,
            )
            .await?;
        Ok(strip_quotes(content.trim()).to_string())
    }

    async fn generate_summary(
        &self,
        theme: Theme,
        rounds: &[CompletedRound],
    ) -> Result<ConversationSummary, AiError> {
        let conversation_text = rounds
            .iter()
            .map(|round| {
                format!(
                    "Round {}: {}\nResponses: {} | {}",
                    round.round_number,
                    round.question,
                    round.partner_a_response,
                    round.partner_b_response
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n");

        let system = "You are a relationship expert creating a thoughtful summary of a couple's conversation.\n\n\
             Create a JSON summary with:\n\
             {\"overallThemes\": [\"theme1\"], \"keyInsights\": [\"insight1\"], \"strengths\": [\"strength1\"], \
             \"growthAreas\": [\"area1\"], \"suggestedActions\": [\"action1\"], \
             \"emotionalJourney\": \"A brief description of the emotional flow\", \"tags\": [\"tag1\"]}\n\n\
             Keep insights positive and actionable. Focus on connection and growth."
            .to_string();
        let user = format!(
            "Theme: {}\n\nConversation:\n{}",
            theme.display_name(),
            conversation_text
        );

        let content = self.chat(system, user, 400, 0.3).await?;
        parse_summary(&content)
    }
}

/// Strips one layer of wrapping quotes from generated question text.
fn strip_quotes(s: &str) -> &str {
    s.trim_matches(|c| c == '"' || c == '\'')
}

/// Extracts the first balanced JSON object from free-form model output.
fn extract_json(content: &str) -> Result<&str, AiError> {
    let start = content
        .find('{')
        .ok_or_else(|| AiError::parse("no JSON object in reply"))?;
    let end = content
        .rfind('}')
        .ok_or_else(|| AiError::parse("unterminated JSON object in reply"))?;
    if end < start {
        return Err(AiError::parse("malformed JSON object in reply"));
    }
    Ok(&content[start..=end])
}

fn parse_analysis(content: &str) -> Result<RoundAnalysis, AiError> {
    let wire: WireAnalysis =
        serde_json::from_str(extract_json(content)?).map_err(|e| AiError::parse(e.to_string()))?;
    Ok(RoundAnalysis {
        emotional_themes: wire.emotional_themes,
        key_topics: wire.key_topics,
        partner_sentiments: wire
            .partner_sentiments
            .into_iter()
            .map(|s| {
                PartnerSentiment::new(
                    parse_partner_label(&s.partner),
                    Sentiment::from_str_lossy(&s.sentiment),
                )
            })
            .collect(),
        suggested_follow_ups: wire.suggested_follow_ups,
        overall_tone: Tone::from_str_lossy(&wire.overall_tone),
    })
}

fn parse_summary(content: &str) -> Result<ConversationSummary, AiError> {
    let wire: WireSummary =
        serde_json::from_str(extract_json(content)?).map_err(|e| AiError::parse(e.to_string()))?;
    Ok(ConversationSummary {
        overall_themes: wire.overall_themes,
        key_insights: wire.key_insights,
        strengths: wire.strengths,
        growth_areas: wire.growth_areas,
        suggested_actions: wire.suggested_actions,
        emotional_journey: wire.emotional_journey,
        tags: wire.tags,
    })
}

fn parse_partner_label(label: &str) -> Partner {
    match label.trim().to_ascii_lowercase().as_str() {
        "b" | "partner_b" | "partner b" => Partner::B,
        _ => Partner::A,
    }
}

// ── Wire types ──────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireAnalysis {
    #[serde(default)]
    emotional_themes: Vec<String>,
    #[serde(default)]
    key_topics: Vec<String>,
    #[serde(default)]
    partner_sentiments: Vec<WireSentiment>,
    #[serde(default)]
    suggested_follow_ups: Vec<String>,
    #[serde(default)]
    overall_tone: String,
}

#[derive(Debug, Deserialize)]
struct WireSentiment {
    #[serde(default)]
    partner: String,
    #[serde(default)]
    sentiment: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireSummary {
    #[serde(default)]
    overall_themes: Vec<String>,
    #[serde(default)]
    key_insights: Vec<String>,
    #[serde(default)]
    strengths: Vec<String>,
    #[serde(default)]
    growth_areas: Vec<String>,
    #[serde(default)]
    suggested_actions: Vec<String>,
    #[serde(default)]
    emotional_journey: String,
    #[serde(default)]
    tags: Vec<String>,
}
