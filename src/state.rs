//! Global application state for BP Companion
//!
//! Holds the per-screen UI state and drives the identity provider and the
//! reading service on behalf of the UI.

use std::sync::Arc;

use log::{debug, info};
use tokio::sync::RwLock;

use crate::api_client::RecordApi;
use crate::auth::IdentityProvider;
use crate::service::ReadingService;
use crate::types::{AppUiState, LoginUiState, MainUiState, RecordListUiState};

const SUBMIT_SUCCESS_MESSAGE: &str = "Reading submitted";

/// Global application state
pub struct AppState<P, A> {
    identity: Arc<P>,
    readings: ReadingService<A, Arc<P>>,
    /// Session / navigation
    pub app: RwLock<AppUiState>,
    /// Login screen
    pub login: RwLock<LoginUiState>,
    /// Reading input screen
    pub main_form: RwLock<MainUiState>,
    /// History screen
    pub record_list: RwLock<RecordListUiState>,
}

fn digits_only(value: &str) -> String {
    value.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Validate one input field: blank and out-of-range values get a message.
fn field_value(value: &str, blank_message: &str, label: &str) -> Result<i32, String> {
    if value.trim().is_empty() {
        return Err(blank_message.to_string());
    }
    value
        .trim()
        .parse()
        .map_err(|_| format!("{} is out of range", label))
}

impl<P: IdentityProvider, A: RecordApi> AppState<P, A> {
    pub fn new(identity: Arc<P>, api: A) -> Self {
        Self {
            readings: ReadingService::new(api, identity.clone()),
            identity,
            app: RwLock::new(AppUiState::default()),
            login: RwLock::new(LoginUiState::default()),
            main_form: RwLock::new(MainUiState::default()),
            record_list: RwLock::new(RecordListUiState::default()),
        }
    }

    pub fn readings(&self) -> &ReadingService<A, Arc<P>> {
        &self.readings
    }

    pub async fn app_state(&self) -> AppUiState {
        self.app.read().await.clone()
    }

    pub async fn login_state(&self) -> LoginUiState {
        self.login.read().await.clone()
    }

    pub async fn main_form_state(&self) -> MainUiState {
        self.main_form.read().await.clone()
    }

    pub async fn record_list_state(&self) -> RecordListUiState {
        self.record_list.read().await.clone()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Session
    // ─────────────────────────────────────────────────────────────────────

    /// Startup check; any identity error counts as signed out.
    pub async fn check_session(&self) {
        let signed_in = match self.identity.check_session().await {
            Ok(v) => v,
            Err(e) => {
                debug!("Session check failed: {}", e);
                false
            }
        };
        let mut app = self.app.write().await;
        app.is_checking_session = false;
        app.is_authenticated = signed_in;
        info!("Session check: authenticated={}", signed_in);
    }

    pub async fn sign_out(&self) -> Result<(), String> {
        self.identity.sign_out().await.map_err(|e| e.to_string())?;
        *self.login.write().await = LoginUiState::default();
        *self.main_form.write().await = MainUiState::default();
        *self.record_list.write().await = RecordListUiState::default();
        self.app.write().await.is_authenticated = false;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Login screen
    // ─────────────────────────────────────────────────────────────────────

    pub async fn on_username_changed(&self, username: &str) {
        self.login.write().await.username = username.to_string();
    }

    pub async fn on_password_changed(&self, password: &str) {
        self.login.write().await.password = password.to_string();
    }

    pub async fn on_login_click(&self) {
        let (username, password) = {
            let mut login = self.login.write().await;
            if login.username.trim().is_empty() {
                login.error_message = Some("Enter your username".to_string());
                return;
            }
            if login.password.trim().is_empty() {
                login.error_message = Some("Enter your password".to_string());
                return;
            }
            login.is_loading = true;
            login.error_message = None;
            (login.username.clone(), login.password.clone())
        };

        let result = self.identity.sign_in(&username, &password).await;

        {
            let mut login = self.login.write().await;
            login.is_loading = false;
            match &result {
                Ok(()) => {
                    login.is_login_success = true;
                    login.error_message = None;
                }
                Err(e) => {
                    login.is_login_success = false;
                    login.error_message = Some(e.to_string());
                }
            }
        }

        if result.is_ok() {
            self.app.write().await.is_authenticated = true;
        }
    }

    pub async fn clear_login_error(&self) {
        self.login.write().await.error_message = None;
    }

    // ─────────────────────────────────────────────────────────────────────
    // Reading input screen
    // ─────────────────────────────────────────────────────────────────────

    pub async fn on_systolic_changed(&self, value: &str) {
        self.main_form.write().await.systolic = digits_only(value);
    }

    pub async fn on_diastolic_changed(&self, value: &str) {
        self.main_form.write().await.diastolic = digits_only(value);
    }

    pub async fn on_pulse_changed(&self, value: &str) {
        self.main_form.write().await.pulse = digits_only(value);
    }

    pub async fn on_submit_click(&self) {
        let values = {
            let mut form = self.main_form.write().await;
            let parsed = field_value(&form.systolic, "Enter systolic pressure", "Systolic")
                .and_then(|s| {
                    field_value(&form.diastolic, "Enter diastolic pressure", "Diastolic")
                        .map(|d| (s, d))
                })
                .and_then(|(s, d)| {
                    field_value(&form.pulse, "Enter pulse", "Pulse").map(|p| (s, d, p))
                });
            match parsed {
                Ok(values) => {
                    form.is_submitting = true;
                    form.result_message = None;
                    form.is_error = false;
                    values
                }
                Err(message) => {
                    form.result_message = Some(message);
                    form.is_error = true;
                    return;
                }
            }
        };

        let (systolic, diastolic, pulse) = values;
        let result = self.readings.submit(systolic, diastolic, pulse).await;

        let mut form = self.main_form.write().await;
        form.is_submitting = false;
        match result {
            Ok(()) => {
                debug!("Submitted {}/{} pulse {}", systolic, diastolic, pulse);
                form.result_message = Some(SUBMIT_SUCCESS_MESSAGE.to_string());
                form.is_error = false;
                form.systolic.clear();
                form.diastolic.clear();
                form.pulse.clear();
            }
            Err(e) => {
                form.result_message = Some(e.to_string());
                form.is_error = true;
            }
        }
    }

    pub async fn clear_message(&self) {
        let mut form = self.main_form.write().await;
        form.result_message = None;
        form.is_error = false;
    }

    // ─────────────────────────────────────────────────────────────────────
    // History screen
    // ─────────────────────────────────────────────────────────────────────

    pub async fn fetch_records(&self) {
        {
            let mut list = self.record_list.write().await;
            list.is_loading = true;
            list.error_message = None;
        }

        let result = self.readings.fetch_all().await;

        let mut list = self.record_list.write().await;
        list.is_loading = false;
        match result {
            Ok(records) => {
                list.records = records;
                list.error_message = None;
            }
            Err(e) => {
                debug!("Fetch records failed: {}", e);
                list.records.clear();
                list.error_message = Some(e.to_string());
            }
        }
    }

    pub async fn clear_record_error(&self) {
        self.record_list.write().await.error_message = None;
    }
}
