//! Unified error types for quipsolve.
//!
//! This module provides a central `QuipsolveError` enum that covers the main
//! error categories across the codebase, enabling consistent `Result`-based
//! error propagation with the `?` operator.

use std::fmt;

/// Central error type for quipsolve operations.
#[derive(Debug)]
pub enum QuipsolveError {
    /// I/O errors (file operations, stdin/stdout).
    Io(std::io::Error),
    /// Transport-level failures (network errors, non-2xx responses,
    /// malformed JSON bodies), already normalized to a readable message.
    Http(String),
    /// An error reported by the solving oracle itself. The message is
    /// surfaced verbatim.
    Oracle(String),
    /// Input rejected before any network call was made.
    Validation(String),
    /// Daily-solution feed errors (unreachable endpoint, unusable shape).
    Feed(String),
    /// Serialization/deserialization errors (JSON).
    Serialization(String),
    /// The polling budget was exhausted, or a terminal status carried no
    /// solutions. Distinct from transport failure.
    NoSolution,
}

impl fmt::Display for QuipsolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuipsolveError::Io(e) => write!(f, "I/O error: {}", e),
            QuipsolveError::Http(msg) => write!(f, "{}", msg),
            QuipsolveError::Oracle(msg) => write!(f, "{}", msg),
            QuipsolveError::Validation(msg) => write!(f, "{}", msg),
            QuipsolveError::Feed(msg) => write!(f, "{}", msg),
            QuipsolveError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            QuipsolveError::NoSolution => write!(f, "No solution found."),
        }
    }
}

impl std::error::Error for QuipsolveError {}

impl From<std::io::Error> for QuipsolveError {
    fn from(e: std::io::Error) -> Self {
        QuipsolveError::Io(e)
    }
}

impl From<reqwest::Error> for QuipsolveError {
    fn from(e: reqwest::Error) -> Self {
        QuipsolveError::Http(e.to_string())
    }
}

impl From<serde_json::Error> for QuipsolveError {
    fn from(e: serde_json::Error) -> Self {
        QuipsolveError::Serialization(e.to_string())
    }
}
