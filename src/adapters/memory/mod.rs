//! In-memory adapters for tests and development.

mod retro_store;

pub use retro_store::InMemoryRetroStore;
