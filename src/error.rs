//! Error types for the record API and the identity provider

use thiserror::Error;

/// Failures of a submit or fetch round trip
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// No ID token available; nothing was sent
    #[error("Authentication required")]
    AuthRequired,

    #[error("Network error: {0}")]
    Transport(String),

    /// Non-2xx response
    #[error("HTTP {status}: {message}")]
    Rejected { status: u16, message: String },
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::Transport(e.to_string())
    }
}

/// Identity provider failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Sign-in is not configured (missing Cognito client id)")]
    NotConfigured,

    #[error("Incorrect username or password")]
    InvalidCredentials,

    #[error("User not found")]
    UserNotFound,

    #[error("Additional authentication step required: {0}")]
    ChallengeRequired(String),

    #[error("Unable to reach the network: {0}")]
    Network(String),

    #[error("Identity service error {status} ({code}): {message}")]
    Service {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Unexpected identity service response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for AuthError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            AuthError::Decode(e.to_string())
        } else {
            AuthError::Network(e.to_string())
        }
    }
}
