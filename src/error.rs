//! Unified error handling for talebot.
//!
//! Startup failures (resolve, connect, config, narrative load) are fatal
//! and abort before any worker starts. Everything recoverable — malformed
//! lines, failed auth attempts, unknown channels in admin commands — is
//! handled in place and never surfaces here.

use thiserror::Error;

use crate::config::ConfigError;

/// Errors that end the bot process.
#[derive(Debug, Error)]
pub enum BotError {
    #[error("cannot resolve server address: {0}")]
    Resolve(String),

    #[error("connection failed: {0}")]
    Connect(#[source] std::io::Error),

    #[error("server closed the connection")]
    ConnectionClosed,

    #[error("protocol error: {0}")]
    Proto(#[from] tale_proto::ProtocolError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to load narratives: {0}")]
    Narrative(#[from] std::io::Error),
}

/// Result type for bot operations.
pub type BotResult<T> = Result<T, BotError>;
