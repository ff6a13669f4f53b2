//! Application layer - use cases orchestrating the domain and the ports.

mod conversation_service;

pub use conversation_service::{
    AdvanceOutcome, AnalysisOutcome, ConversationService, EngineError, QuestionOutcome,
    SubmitOutcome,
};
