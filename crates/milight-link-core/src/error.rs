//! Error types for milight-link core.
//!
//! Discovery never fails outwardly, so only pairing and response parsing
//! have error types.

use std::time::Duration;

use thiserror::Error;

/// Malformed discovery response.
///
/// Callers discard the datagram; this never reaches a user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Empty datagram")]
    Empty,

    #[error("Missing or empty field: {0}")]
    MissingField(&'static str),
}

/// Targeted pairing errors
#[derive(Debug, Error)]
pub enum PairingError {
    #[error("No bridge answered within {0:?}")]
    Timeout(Duration),

    #[error("Socket setup failed: {0}")]
    Socket(#[from] std::io::Error),

    #[error("Invalid bridge address: {0}")]
    InvalidAddress(String),
}

impl PairingError {
    /// Whether the caller should offer the user a retry.
    pub fn is_timeout(&self) -> bool {
        matches!(self, PairingError::Timeout(_))
    }
}
