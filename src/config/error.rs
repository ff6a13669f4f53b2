//! Configuration errors

use thiserror::Error;

/// Failure while loading or checking configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("configuration rejected: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// A specific value that failed semantic validation.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{0} must be set")]
    MissingRequired(&'static str),

    #[error("database URL must use the postgres:// or postgresql:// scheme")]
    InvalidDatabaseUrl,

    #[error("connection pool bounds are inconsistent or above the 100 cap")]
    InvalidPoolSize,

    #[error("OpenAI API keys start with sk-")]
    InvalidOpenAiKey,

    #[error("request timeout must be positive")]
    InvalidTimeout,

    #[error("mirror directory must not be empty")]
    EmptyMirrorDir,
}
