//! Error types for the promptdeck CLI.
//!
//! This module defines a unified error enum that covers all error categories
//! in the application: configuration, I/O, the custom-prompt backends, and
//! LLM dispatch.

use thiserror::Error;

/// Unified error type for the promptdeck CLI.
///
/// All fallible functions in the application return `Result<T, AppError>`.
/// We never panic — errors must be represented and propagated.
///
/// A missing prompt name is not an error: `PromptStore::get` returns
/// `Option` because a stale or mistyped name is an expected UI condition.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors; fatal at startup
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Custom-prompt backend read failure (network, parse, misconfiguration).
    /// The store logs these and keeps serving its previous mapping.
    #[error("Backend read failure: {0}")]
    BackendRead(String),

    /// Custom-prompt backend write failure. Propagated to the user action
    /// that triggered the write; never retried automatically.
    #[error("Backend write error: {0}")]
    BackendWrite(String),

    /// A remote row whose nested prompt object does not parse into a valid
    /// template. Surfaced, never skipped.
    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    /// Prompt template errors (rendering, invalid template)
    #[error("Template error: {0}")]
    Template(String),

    /// LLM provider errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
