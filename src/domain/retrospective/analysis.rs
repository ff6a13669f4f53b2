//! AI enrichment value types: round analysis and conversation summary.
//!
//! These are the structured results the enrichment client extracts from the
//! model (or substitutes from fallback content). Field names serialize in
//! camelCase to match the model's JSON contract and the mirror snapshots.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::Partner;

/// Per-partner sentiment reading within a round analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartnerSentiment {
    pub partner: Partner,
    pub sentiment: Sentiment,
}

impl PartnerSentiment {
    pub fn new(partner: Partner, sentiment: Sentiment) -> Self {
        Self { partner, sentiment }
    }
}

/// Sentiment classification for one partner's response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    /// Parses a model-produced label, defaulting to `Neutral` for anything
    /// unrecognized.
    pub fn from_str_lossy(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "positive" => Sentiment::Positive,
            "negative" => Sentiment::Negative,
            _ => Sentiment::Neutral,
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Sentiment::Positive => "positive",
            Sentiment::Neutral => "neutral",
            Sentiment::Negative => "negative",
        };
        write!(f, "{}", s)
    }
}

/// Overall tone of a round, across both responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Positive,
    Neutral,
    Concerning,
}

impl Tone {
    /// Parses a model-produced label, defaulting to `Neutral`.
    pub fn from_str_lossy(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "positive" => Tone::Positive,
            "concerning" => Tone::Concerning,
            _ => Tone::Neutral,
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Tone::Positive => "positive",
            Tone::Neutral => "neutral",
            Tone::Concerning => "concerning",
        };
        write!(f, "{}", s)
    }
}

/// Structured enrichment of one completed round of answers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundAnalysis {
    /// Emotional themes detected across both responses.
    pub emotional_themes: Vec<String>,
    /// Concrete topics mentioned (work, family, future plans...).
    pub key_topics: Vec<String>,
    /// Sentiment per partner.
    pub partner_sentiments: Vec<PartnerSentiment>,
    /// Areas worth a follow-up question.
    pub suggested_follow_ups: Vec<String>,
    /// Overall tone of the round.
    pub overall_tone: Tone,
}

/// Final summary of a completed retrospective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    pub overall_themes: Vec<String>,
    pub key_insights: Vec<String>,
    pub strengths: Vec<String>,
    pub growth_areas: Vec<String>,
    pub suggested_actions: Vec<String>,
    /// Brief narrative of the emotional flow of the conversation.
    pub emotional_journey: String,
    /// Tags for the retrospective history view.
    pub tags: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentiment_parses_lossily() {
        assert_eq!(Sentiment::from_str_lossy("Positive"), Sentiment::Positive);
        assert_eq!(Sentiment::from_str_lossy("NEGATIVE"), Sentiment::Negative);
        assert_eq!(Sentiment::from_str_lossy("meh"), Sentiment::Neutral);
    }

    #[test]
    fn tone_parses_lossily() {
        assert_eq!(Tone::from_str_lossy("concerning"), Tone::Concerning);
        assert_eq!(Tone::from_str_lossy("anything"), Tone::Neutral);
    }

    #[test]
    fn analysis_serializes_camel_case() {
        let analysis = RoundAnalysis {
            emotional_themes: vec!["gratitude".into()],
            key_topics: vec!["work".into()],
            partner_sentiments: vec![PartnerSentiment::new(Partner::A, Sentiment::Positive)],
            suggested_follow_ups: vec!["communication".into()],
            overall_tone: Tone::Positive,
        };
        let json = serde_json::to_value(&analysis).unwrap();
        assert!(json.get("emotionalThemes").is_some());
        assert!(json.get("overallTone").is_some());
    }

    #[test]
    fn summary_round_trips() {
        let summary = ConversationSummary {
            overall_themes: vec!["planning".into()],
            key_insights: vec!["shared goals".into()],
            strengths: vec!["honesty".into()],
            growth_areas: vec!["scheduling".into()],
            suggested_actions: vec!["weekly check-in".into()],
            emotional_journey: "warm throughout".into(),
            tags: vec!["planning".into(), "connection".into()],
        };
        let json = serde_json::to_string(&summary).unwrap();
        let back: ConversationSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(summary, back);
    }
}
