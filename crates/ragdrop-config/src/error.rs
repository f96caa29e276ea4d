//! Errors raised while loading, saving or checking settings.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not access config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Could not render config as TOML: {0}")]
    Render(#[from] toml::ser::Error),

    /// No platform config/data directory and no explicit path was given.
    #[error("No platform directory for ragdrop; set store.path explicitly")]
    NoConfigDir,

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
