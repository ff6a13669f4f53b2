//! PostgreSQL adapters.

mod retro_store;

pub use retro_store::PostgresRetroStore;
