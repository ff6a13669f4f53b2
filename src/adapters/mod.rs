//! Adapters - implementations of the ports against real infrastructure.

pub mod ai;
pub mod cache;
pub mod memory;
pub mod postgres;

pub use ai::{MockEnrichment, OpenAiConfig, OpenAiEnrichment, ResilientEnrichment};
pub use cache::{FileCacheMirror, InMemoryCacheMirror};
pub use memory::InMemoryRetroStore;
pub use postgres::PostgresRetroStore;
