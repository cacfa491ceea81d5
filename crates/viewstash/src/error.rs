//! Error types for the state manager.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("View store error: {0}")]
    Store(#[from] viewstash_session::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] viewstash_config::ConfigError),

    #[error("Host did not provide a session to save into")]
    SessionUnavailable,

    #[error("Failed to initialize logging: {0}")]
    Logging(String),
}

pub type Result<T> = std::result::Result<T, Error>;
