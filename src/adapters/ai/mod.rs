//! AI adapters - enrichment client implementations.

pub mod fallback;
mod mock_enrichment;
mod openai_enrichment;
mod resilient;

pub use mock_enrichment::{EnrichmentCalls, MockEnrichment};
pub use openai_enrichment::{OpenAiConfig, OpenAiEnrichment};
pub use resilient::ResilientEnrichment;
