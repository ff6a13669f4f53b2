//! Foundation module - Shared domain primitives.
//!
//! Contains the value objects, identifiers and enums that form the
//! vocabulary of the Tandem domain.

mod ids;
mod partner;
mod session_status;
mod theme;
mod timestamp;

pub use ids::{CoupleId, InsightId, ResponseId, RoundId, SessionId};
pub use partner::Partner;
pub use session_status::SessionStatus;
pub use theme::Theme;
pub use timestamp::Timestamp;
