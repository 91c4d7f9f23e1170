//! BP Companion Library
//!
//! Submit blood pressure readings to the record API and decode the
//! history file published to S3.

pub mod types;
pub mod error;
pub mod record_parser;
pub mod api_client;
pub mod auth;
pub mod service;
pub mod state;
pub mod defaults;

#[cfg(test)]
mod test_support;

pub use types::*;
pub use error::{ApiError, AuthError};
pub use record_parser::{parse_line, parse_records};
pub use api_client::{ApiConfig, HttpRecordApi, RecordApi};
pub use auth::{CognitoAuth, CognitoConfig, IdentityProvider, TokenProvider};
pub use service::ReadingService;
pub use state::AppState;
