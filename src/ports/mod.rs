//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between the
//! conversation engine and the outside world. Adapters implement these ports.
//!
//! - `AiEnrichment` - question generation, response analysis, follow-ups and
//!   summaries from the language-model service
//! - `RetroStore` - CRUD over the five persisted entities (couple,
//!   retrospective, round, response, insight)
//! - `CacheMirror` - durable local snapshot of the session, keyed by id, with
//!   a "current session" pointer for resume after reload

mod ai_enrichment;
mod cache_mirror;
mod retro_store;

pub use ai_enrichment::{AiEnrichment, AiError};
pub use cache_mirror::{CacheMirror, MirrorError};
pub use retro_store::{
    CoupleRecord, InsightRecord, InsightType, ResponseRecord, RetroStore, RetrospectiveRecord,
    RoundRecord, StoreError,
};
