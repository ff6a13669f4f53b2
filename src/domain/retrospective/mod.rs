//! Retrospective module - the conversation state machine.
//!
//! Owns the canonical in-memory representation of one retrospective session
//! and the turn-taking / round-progression protocol. Pure domain logic; the
//! application layer drives the enrichment and persistence side effects.

mod analysis;
mod errors;
mod round;
mod session;

pub use analysis::{ConversationSummary, PartnerSentiment, RoundAnalysis, Sentiment, Tone};
pub use errors::SessionError;
pub use round::{ActiveRound, CompletedRound, PartnerSlot};
pub use session::{Session, TOTAL_ROUNDS};
