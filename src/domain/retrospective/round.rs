//! Round value types: the active round being answered and completed rounds.
//!
//! `ActiveRound` is immutable; the `with_*` builders return a new value and
//! are only reachable through the `Session` transitions that enforce the
//! conversation protocol.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Partner, RoundId};

use super::analysis::RoundAnalysis;

/// Per-partner draft/submission state within the active round.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PartnerSlot {
    response_text: String,
    submitted: bool,
}

impl PartnerSlot {
    /// Current draft text.
    pub fn response_text(&self) -> &str {
        &self.response_text
    }

    /// Whether this partner has submitted. One-way within a round.
    pub fn submitted(&self) -> bool {
        self.submitted
    }

    /// True when the draft contains no non-whitespace text.
    pub fn is_blank(&self) -> bool {
        self.response_text.trim().is_empty()
    }

    fn with_text(mut self, text: String) -> Self {
        self.response_text = text;
        self
    }

    fn submit(mut self) -> Self {
        self.submitted = true;
        self
    }
}

/// The round currently being answered, not yet in the completed list.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ActiveRound {
    question: Option<String>,
    round_id: Option<RoundId>,
    partner_a: PartnerSlot,
    partner_b: PartnerSlot,
    reveal_other: bool,
    analysis: Option<RoundAnalysis>,
}

impl ActiveRound {
    /// A fresh round awaiting question generation.
    pub fn new() -> Self {
        Self::default()
    }

    /// The round's question, once generated.
    pub fn question(&self) -> Option<&str> {
        self.question.as_deref()
    }

    /// The store-assigned round record id, once the round is persisted.
    pub fn round_id(&self) -> Option<RoundId> {
        self.round_id
    }

    /// The slot for one partner.
    pub fn slot(&self, partner: Partner) -> &PartnerSlot {
        match partner {
            Partner::A => &self.partner_a,
            Partner::B => &self.partner_b,
        }
    }

    /// Whether each partner's UI may show the other's answer.
    ///
    /// Becomes true once both partners have submitted. A visibility flag
    /// only, not an access control.
    pub fn reveal_other(&self) -> bool {
        self.reveal_other
    }

    /// The round's enrichment, once produced (real or fallback).
    pub fn analysis(&self) -> Option<&RoundAnalysis> {
        self.analysis.as_ref()
    }

    /// True once both partners have submitted.
    pub fn both_submitted(&self) -> bool {
        self.partner_a.submitted() && self.partner_b.submitted()
    }

    pub(super) fn with_question(mut self, question: String, round_id: RoundId) -> Self {
        self.question = Some(question);
        self.round_id = Some(round_id);
        self
    }

    pub(super) fn with_draft(mut self, partner: Partner, text: String) -> Self {
        match partner {
            Partner::A => self.partner_a = std::mem::take(&mut self.partner_a).with_text(text),
            Partner::B => self.partner_b = std::mem::take(&mut self.partner_b).with_text(text),
        }
        self
    }

    pub(super) fn with_submission(mut self, partner: Partner) -> Self {
        match partner {
            Partner::A => self.partner_a = std::mem::take(&mut self.partner_a).submit(),
            Partner::B => self.partner_b = std::mem::take(&mut self.partner_b).submit(),
        }
        if self.both_submitted() {
            self.reveal_other = true;
        }
        self
    }

    pub(super) fn with_analysis(mut self, analysis: RoundAnalysis) -> Self {
        self.analysis = Some(analysis);
        self
    }
}

/// An archived question-and-two-answers cycle. Append-only once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedRound {
    pub round_number: u32,
    pub round_id: Option<RoundId>,
    pub question: String,
    pub partner_a_response: String,
    pub partner_b_response: String,
    pub analysis: RoundAnalysis,
}

impl CompletedRound {
    /// Response text for one partner.
    pub fn response(&self, partner: Partner) -> &str {
        match partner {
            Partner::A => &self.partner_a_response,
            Partner::B => &self.partner_b_response,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::retrospective::analysis::{Sentiment, Tone};
    use crate::domain::retrospective::PartnerSentiment;

    fn analysis() -> RoundAnalysis {
        RoundAnalysis {
            emotional_themes: vec!["connection".into()],
            key_topics: vec!["relationship".into()],
            partner_sentiments: vec![
                PartnerSentiment::new(Partner::A, Sentiment::Positive),
                PartnerSentiment::new(Partner::B, Sentiment::Positive),
            ],
            suggested_follow_ups: vec!["communication".into()],
            overall_tone: Tone::Positive,
        }
    }

    #[test]
    fn fresh_round_has_nothing_set() {
        let round = ActiveRound::new();
        assert!(round.question().is_none());
        assert!(round.round_id().is_none());
        assert!(!round.reveal_other());
        assert!(round.slot(Partner::A).is_blank());
        assert!(!round.slot(Partner::B).submitted());
    }

    #[test]
    fn reveal_requires_both_submissions() {
        let round = ActiveRound::new()
            .with_draft(Partner::A, "first".into())
            .with_submission(Partner::A);
        assert!(!round.reveal_other());

        let round = round
            .with_draft(Partner::B, "second".into())
            .with_submission(Partner::B);
        assert!(round.reveal_other());
        assert!(round.both_submitted());
    }

    #[test]
    fn analysis_attaches_and_overwrites() {
        let round = ActiveRound::new().with_analysis(analysis());
        assert!(round.analysis().is_some());

        let mut replacement = analysis();
        replacement.overall_tone = Tone::Neutral;
        let round = round.with_analysis(replacement);
        assert_eq!(round.analysis().unwrap().overall_tone, Tone::Neutral);
    }

    #[test]
    fn completed_round_exposes_responses_by_partner() {
        let round = CompletedRound {
            round_number: 1,
            round_id: Some(RoundId::new()),
            question: "Q".into(),
            partner_a_response: "a said".into(),
            partner_b_response: "b said".into(),
            analysis: analysis(),
        };
        assert_eq!(round.response(Partner::A), "a said");
        assert_eq!(round.response(Partner::B), "b said");
    }
}
