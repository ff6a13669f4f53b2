//! Fallback content - theme prompt tables and canned enrichment results.
//!
//! The conversation must never be blocked by a model outage, so every
//! enrichment operation has a local substitute: a canned theme-appropriate
//! question, a neutral analysis, a per-theme follow-up line, and a
//! positive-framing summary. The same theme tables also seed the system
//! prompts used by the live client.

use once_cell::sync::Lazy;
use rand::seq::SliceRandom;
use std::collections::HashMap;

use crate::domain::foundation::{Partner, Theme};
use crate::domain::retrospective::{
    ConversationSummary, PartnerSentiment, RoundAnalysis, Sentiment, Tone,
};

/// Per-theme prompt framing: a system prompt for the model and example
/// questions that double as the offline question pool.
#[derive(Debug, Clone, Copy)]
pub struct ThemePrompt {
    pub system: &'static str,
    pub examples: [&'static str; 3],
}

/// Generic question used once a theme's example pool is exhausted.
pub const GENERIC_QUESTION: &str = "What's something you appreciate about our relationship lately?";

/// Generic follow-up used for themes without a dedicated line.
pub const GENERIC_FOLLOW_UP: &str =
    "What's one thing we could do together based on our conversation?";

static THEME_PROMPTS: Lazy<HashMap<Theme, ThemePrompt>> = Lazy::new(|| {
    HashMap::from([
        (
            Theme::EmotionalCheckIn,
            ThemePrompt {
                system: "You are an expert relationship counselor who creates warm, open-ended questions for couples to explore their emotional connection.",
                examples: [
                    "What's something you're grateful for in your partner this week?",
                    "How are you feeling about our relationship lately?",
                    "What's one way I could better support you emotionally right now?",
                ],
            },
        ),
        (
            Theme::ConflictRepair,
            ThemePrompt {
                system: "You are a skilled mediator who helps couples process disagreements constructively and rebuild trust.",
                examples: [
                    "What's one thing we handled well during our recent disagreement?",
                    "How can we better communicate when we're feeling frustrated?",
                    "What would help you feel more heard during conflicts?",
                ],
            },
        ),
        (
            Theme::Planning,
            ThemePrompt {
                system: "You are a life coach who helps couples align on goals and create shared visions for their future.",
                examples: [
                    "What's one goal we could work on together this month?",
                    "How do you envision our life together in the next year?",
                    "What's something new you'd like us to try as a couple?",
                ],
            },
        ),
        (
            Theme::SexAndIntimacy,
            ThemePrompt {
                system: "You are a certified sex therapist who creates safe, respectful questions about physical and emotional intimacy.",
                examples: [
                    "What makes you feel most connected to me physically?",
                    "How can we better prioritize intimacy in our relationship?",
                    "What's one way we could enhance our physical connection?",
                ],
            },
        ),
        (
            Theme::Finances,
            ThemePrompt {
                system: "You are a financial counselor who helps couples navigate money conversations with trust and transparency.",
                examples: [
                    "How are you feeling about our current financial situation?",
                    "What's one financial goal we should prioritize together?",
                    "How can we better communicate about money decisions?",
                ],
            },
        ),
        (
            Theme::Parenting,
            ThemePrompt {
                system: "You are a family therapist who helps couples strengthen their partnership through parenting challenges.",
                examples: [
                    "What's one thing we're doing really well as parents?",
                    "How can we better support each other in our parenting roles?",
                    "What's one parenting challenge we should tackle together?",
                ],
            },
        ),
    ])
});

/// Prompt framing for a theme.
pub fn theme_prompt(theme: Theme) -> &'static ThemePrompt {
    THEME_PROMPTS
        .get(&theme)
        .unwrap_or_else(|| &THEME_PROMPTS[&Theme::EmotionalCheckIn])
}

/// Picks a canned question for the theme, excluding any already used.
///
/// Random over the remaining pool; falls back to [`GENERIC_QUESTION`] once
/// every example for the theme has been used.
pub fn fallback_question(theme: Theme, previous_questions: &[String]) -> String {
    let available: Vec<&'static str> = theme_prompt(theme)
        .examples
        .iter()
        .copied()
        .filter(|q| !previous_questions.iter().any(|p| p == q))
        .collect();

    available
        .choose(&mut rand::thread_rng())
        .map(|q| q.to_string())
        .unwrap_or_else(|| GENERIC_QUESTION.to_string())
}

/// Fixed per-theme follow-up line.
pub fn fallback_follow_up(theme: Theme) -> &'static str {
    match theme {
        Theme::EmotionalCheckIn => "How can we better support each other based on what we've shared?",
        Theme::ConflictRepair => "What's one thing we could do differently next time?",
        Theme::Planning => "What's our next step toward making this happen?",
        Theme::SexAndIntimacy => "How can we better prioritize this in our relationship?",
        Theme::Finances => "What's one small step we could take this week?",
        Theme::Parenting => "How can we support each other better in this area?",
    }
}

/// Neutral placeholder analysis with the full required shape.
pub fn fallback_analysis() -> RoundAnalysis {
    RoundAnalysis {
        emotional_themes: vec!["connection".to_string()],
        key_topics: vec!["relationship".to_string()],
        partner_sentiments: vec![
            PartnerSentiment::new(Partner::A, Sentiment::Neutral),
            PartnerSentiment::new(Partner::B, Sentiment::Neutral),
        ],
        suggested_follow_ups: vec!["communication".to_string()],
        overall_tone: Tone::Neutral,
    }
}

/// Positive-framing placeholder summary with the full required shape.
pub fn fallback_summary(theme: Theme) -> ConversationSummary {
    ConversationSummary {
        overall_themes: vec![theme.as_tag().to_string()],
        key_insights: vec!["You completed a meaningful conversation together".to_string()],
        strengths: vec!["Commitment to reflection".to_string()],
        growth_areas: vec!["Continue building on this foundation".to_string()],
        suggested_actions: vec!["Plan your next retrospective".to_string()],
        emotional_journey: "A step toward deeper connection".to_string(),
        tags: vec![theme.as_tag().to_string(), "growth".to_string()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_theme_has_a_prompt() {
        for theme in Theme::ALL {
            let prompt = theme_prompt(theme);
            assert!(!prompt.system.is_empty());
            assert_eq!(prompt.examples.len(), 3);
        }
    }

    #[test]
    fn fallback_question_avoids_previous() {
        let previous: Vec<String> = theme_prompt(Theme::Planning).examples[..2]
            .iter()
            .map(|q| q.to_string())
            .collect();
        for _ in 0..20 {
            let q = fallback_question(Theme::Planning, &previous);
            assert!(!previous.contains(&q));
        }
    }

    #[test]
    fn exhausted_pool_falls_back_to_generic() {
        let previous: Vec<String> = theme_prompt(Theme::Planning)
            .examples
            .iter()
            .map(|q| q.to_string())
            .collect();
        assert_eq!(fallback_question(Theme::Planning, &previous), GENERIC_QUESTION);
    }

    #[test]
    fn fallback_analysis_has_full_shape() {
        let analysis = fallback_analysis();
        assert!(!analysis.emotional_themes.is_empty());
        assert!(!analysis.key_topics.is_empty());
        assert_eq!(analysis.partner_sentiments.len(), 2);
        assert!(!analysis.suggested_follow_ups.is_empty());
        assert_eq!(analysis.overall_tone, Tone::Neutral);
    }

    #[test]
    fn fallback_summary_carries_theme_tag() {
        let summary = fallback_summary(Theme::Finances);
        assert!(summary.tags.contains(&"finances".to_string()));
        assert!(!summary.key_insights.is_empty());
        assert!(!summary.emotional_journey.is_empty());
    }
}
