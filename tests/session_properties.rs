//! Property tests for the session state machine.
//!
//! Drives a session through arbitrary operation sequences and checks that the
//! structural invariants hold after every transition, whether the transition
//! was accepted or rejected.

use proptest::prelude::*;

use tandem::domain::foundation::{CoupleId, Partner, RoundId, SessionStatus, Theme};
use tandem::domain::retrospective::{RoundAnalysis, Session, TOTAL_ROUNDS};
use tandem::domain::retrospective::{PartnerSentiment, Sentiment, Tone};

#[derive(Debug, Clone)]
enum Op {
    BeginGeneration,
    QuestionReady(String),
    QuestionFailed,
    Draft(Partner, String),
    Submit(Partner),
    BeginAnalysis,
    AnalysisReady,
    Advance,
}

fn partner_strategy() -> impl Strategy<Value = Partner> {
    prop_oneof![Just(Partner::A), Just(Partner::B)]
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::BeginGeneration),
        "[a-z ?]{1,40}".prop_map(Op::QuestionReady),
        Just(Op::QuestionFailed),
        (partner_strategy(), "[a-z ]{0,20}").prop_map(|(p, t)| Op::Draft(p, t)),
        partner_strategy().prop_map(Op::Submit),
        Just(Op::BeginAnalysis),
        Just(Op::AnalysisReady),
        Just(Op::Advance),
    ]
}

fn theme_strategy() -> impl Strategy<Value = Theme> {
    proptest::sample::select(Theme::ALL.to_vec())
}

fn some_analysis() -> RoundAnalysis {
    RoundAnalysis {
        emotional_themes: vec!["trust".to_string()],
        key_topics: vec!["plans".to_string()],
        partner_sentiments: vec![
            PartnerSentiment::new(Partner::A, Sentiment::Positive),
            PartnerSentiment::new(Partner::B, Sentiment::Neutral),
        ],
        suggested_follow_ups: vec![],
        overall_tone: Tone::Positive,
    }
}

/// Applies one operation; rejected transitions leave the prior state.
fn apply(session: Session, op: &Op) -> Session {
    let before = session.clone();
    let result = match op {
        Op::BeginGeneration => session.begin_question_generation(),
        Op::QuestionReady(q) => session.question_ready(q.clone(), RoundId::new()),
        Op::QuestionFailed => Ok(session.question_failed()),
        Op::Draft(partner, text) => Ok(session.update_draft(*partner, text.clone())),
        Op::Submit(partner) => session.submit_response(*partner),
        Op::BeginAnalysis => session.begin_analysis(),
        Op::AnalysisReady => session.analysis_ready(some_analysis()),
        Op::Advance => session.advance_round(),
    };
    result.unwrap_or(before)
}

proptest! {
    #[test]
    fn invariants_hold_under_arbitrary_operations(
        theme in theme_strategy(),
        ops in proptest::collection::vec(op_strategy(), 0..120),
    ) {
        let mut session = Session::start(CoupleId::new(), theme, Partner::A);
        prop_assert!(session.invariants_hold());

        for op in &ops {
            session = apply(session, op);
            prop_assert!(session.invariants_hold(), "violated after {op:?}");
            prop_assert!(session.current_round_number() >= 1);
            prop_assert!(session.current_round_number() <= TOTAL_ROUNDS + 1);
            prop_assert!(session.completed_rounds().len() <= TOTAL_ROUNDS as usize);
        }
    }

    #[test]
    fn completion_is_terminal(
        theme in theme_strategy(),
        ops in proptest::collection::vec(op_strategy(), 0..80),
    ) {
        // Run a clean session to completion first.
        let mut session = Session::start(CoupleId::new(), theme, Partner::A);
        for _ in 0..TOTAL_ROUNDS {
            session = session
                .begin_question_generation().unwrap()
                .question_ready("question?".to_string(), RoundId::new()).unwrap()
                .update_draft(Partner::A, "a")
                .submit_response(Partner::A).unwrap()
                .update_draft(Partner::B, "b")
                .submit_response(Partner::B).unwrap()
                .begin_analysis().unwrap()
                .analysis_ready(some_analysis()).unwrap()
                .advance_round().unwrap();
        }
        prop_assert_eq!(session.status(), SessionStatus::Completed);
        let archived = session.completed_rounds().to_vec();

        // No subsequent operation revives it or touches the archive.
        for op in &ops {
            session = apply(session, op);
            prop_assert_eq!(session.status(), SessionStatus::Completed);
            prop_assert!(session.active_round().is_none());
            prop_assert_eq!(session.completed_rounds(), archived.as_slice());
        }
    }

    #[test]
    fn serde_round_trip_preserves_session(
        theme in theme_strategy(),
        ops in proptest::collection::vec(op_strategy(), 0..60),
    ) {
        let mut session = Session::start(CoupleId::new(), theme, Partner::B);
        for op in &ops {
            session = apply(session, op);
        }
        let json = serde_json::to_string(&session).unwrap();
        let restored: Session = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(restored, session);
    }
}
