//! Data types for BP Companion
//!
//! Domain records shared by the parser, the HTTP layer and the
//! UI-facing state holders.

use serde::{Deserialize, Serialize};

/// One blood pressure + pulse measurement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reading {
    /// Systolic pressure, mmHg
    pub systolic: i32,
    /// Diastolic pressure, mmHg
    pub diastolic: i32,
    /// Pulse, beats per minute
    pub pulse: i32,
    /// "<date> <time>" from the history file; None for readings we submit
    pub recorded_at: Option<String>,
}

impl Reading {
    pub fn new(systolic: i32, diastolic: i32, pulse: i32) -> Self {
        Self {
            systolic,
            diastolic,
            pulse,
            recorded_at: None,
        }
    }
}

/// Body of POST /add-blood-pressure-record.
///
/// Field names belong to the remote API and must stay as they are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitRequest {
    pub max: i32,
    pub min: i32,
    pub bpm: i32,
}

impl From<&Reading> for SubmitRequest {
    fn from(r: &Reading) -> Self {
        Self {
            max: r.systolic,
            min: r.diastolic,
            bpm: r.pulse,
        }
    }
}

/// App-level session state (drives login vs. main navigation)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppUiState {
    pub is_checking_session: bool,
    pub is_authenticated: bool,
}

impl Default for AppUiState {
    fn default() -> Self {
        Self {
            is_checking_session: true,
            is_authenticated: false,
        }
    }
}

/// Login form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginUiState {
    pub username: String,
    pub password: String,
    pub is_loading: bool,
    pub error_message: Option<String>,
    pub is_login_success: bool,
}

/// Reading input form. Inputs are kept as text until submit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MainUiState {
    pub systolic: String,
    pub diastolic: String,
    pub pulse: String,
    pub is_submitting: bool,
    pub result_message: Option<String>,
    pub is_error: bool,
}

/// History screen
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordListUiState {
    pub records: Vec<Reading>,
    pub is_loading: bool,
    pub error_message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submit_request_uses_remote_field_names() {
        let reading = Reading::new(120, 80, 70);
        let body = serde_json::to_value(SubmitRequest::from(&reading)).unwrap();

        assert_eq!(body, serde_json::json!({ "max": 120, "min": 80, "bpm": 70 }));
    }

    #[test]
    fn app_state_starts_checking_session() {
        let state = AppUiState::default();
        assert!(state.is_checking_session);
        assert!(!state.is_authenticated);
    }
}
