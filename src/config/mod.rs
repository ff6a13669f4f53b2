//! Environment-driven configuration.
//!
//! All settings come from `TANDEM__`-prefixed environment variables (a local
//! `.env` file is honored), deserialized into typed sections via the `config`
//! crate. `__` separates nesting, so `TANDEM__DATABASE__URL` fills
//! `database.url`. Call [`AppConfig::validate`] after loading; type-level
//! deserialization alone does not catch semantic mistakes like an inverted
//! pool range.

mod ai;
mod cache;
mod database;
mod error;

pub use ai::AiConfig;
pub use cache::CacheConfig;
pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};

use serde::Deserialize;

/// Top-level configuration for the conversation engine.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,

    /// Optional; without an API key the engine runs on fallback content.
    #[serde(default)]
    pub ai: AiConfig,

    /// Local snapshot mirror settings.
    #[serde(default)]
    pub cache: CacheConfig,
}

impl AppConfig {
    /// Reads configuration from the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let source = config::Environment::default()
            .prefix("TANDEM")
            .separator("__");
        let config: Self = config::Config::builder()
            .add_source(source)
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Checks every section's semantic constraints.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.database.validate()?;
        self.ai.validate()?;
        self.cache.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, MutexGuard};

    // Env vars are process-global; every test takes the lock and cleans up.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn env_scope(vars: &[(&str, &str)]) -> MutexGuard<'static, ()> {
        let guard = ENV_MUTEX.lock().unwrap();
        for key in [
            "TANDEM__DATABASE__URL",
            "TANDEM__AI__OPENAI_API_KEY",
            "TANDEM__CACHE__MIRROR_DIR",
        ] {
            env::remove_var(key);
        }
        for (key, value) in vars {
            env::set_var(key, value);
        }
        guard
    }

    #[test]
    fn loads_database_url_from_environment() {
        let _guard = env_scope(&[(
            "TANDEM__DATABASE__URL",
            "postgresql://test@localhost/tandem",
        )]);

        let config = AppConfig::load().unwrap();
        assert_eq!(config.database.url, "postgresql://test@localhost/tandem");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn optional_sections_fall_back_to_defaults() {
        let _guard = env_scope(&[(
            "TANDEM__DATABASE__URL",
            "postgresql://test@localhost/tandem",
        )]);

        let config = AppConfig::load().unwrap();
        assert_eq!(config.ai.model, "gpt-4");
        assert!(!config.ai.has_openai());
        assert_eq!(config.cache.mirror_dir, ".tandem/sessions");
    }

    #[test]
    fn double_underscore_reaches_nested_fields() {
        let _guard = env_scope(&[
            (
                "TANDEM__DATABASE__URL",
                "postgresql://test@localhost/tandem",
            ),
            ("TANDEM__CACHE__MIRROR_DIR", "/tmp/tandem-cache"),
        ]);

        let config = AppConfig::load().unwrap();
        assert_eq!(config.cache.mirror_dir, "/tmp/tandem-cache");
    }
}
