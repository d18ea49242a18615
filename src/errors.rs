//! Unified error type for `Votekeeper`.
//!
//! All fallible operations in the crate return [`Result`], which wraps the
//! single [`Error`] enum. Database and framework errors convert via `From`;
//! domain failures get their own variants so callers can match on them.

use thiserror::Error;

/// All errors that can occur within the application.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration loading or validation failed
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description of what went wrong
        message: String,
    },

    /// Database operation failed
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// No vote counter is registered where one was expected
    #[error("No vote counter found for channel {channel_id}")]
    CounterNotFound {
        /// Discord channel ID that was searched
        channel_id: String,
    },

    /// A ledger event was submitted without an acting player
    #[error("Event is missing a player id")]
    MissingPlayerId,

    /// I/O error (config file reads, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Required environment variable is missing or malformed
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// Serenity/Poise framework error (boxed, the error type is large)
    #[error("Discord framework error: {0}")]
    Discord(Box<poise::serenity_prelude::Error>),
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::Discord(Box::new(value))
    }
}

/// Convenience `Result` type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
