//! BP Companion - headless runner
//!
//! Goes through the same startup as the app:
//! - restore / check the session
//! - sign in if BP_USERNAME and BP_PASSWORD are set
//! - submit one reading if BP_SUBMIT="systolic,diastolic,pulse" is set
//! - fetch the history and print the latest readings

use std::sync::Arc;

use env_logger::Builder;
use log::{info, warn, LevelFilter};

use bp_companion::api_client::{self, ApiConfig, HttpRecordApi};
use bp_companion::auth::{CognitoAuth, CognitoConfig};
use bp_companion::state::AppState;
use bp_companion::Reading;

const SHOWN_READINGS: usize = 5;

#[tokio::main]
async fn main() {
    // .env is a dev convenience; a missing file is fine.
    let _ = dotenvy::dotenv();

    Builder::new()
        .filter_level(LevelFilter::Info)
        .filter_module("bp_companion", LevelFilter::Debug)
        .parse_default_env()
        .init();

    info!("BP Companion v{} starting...", env!("CARGO_PKG_VERSION"));
    api_client::warn_if_missing();

    let http = reqwest::Client::new();
    let cognito_cfg = CognitoConfig::from_env_or_compile();
    if !cognito_cfg.is_configured() {
        warn!("BP_COGNITO_CLIENT_ID not set. Sign-in disabled.");
    }

    let identity = Arc::new(CognitoAuth::new(http.clone(), cognito_cfg));
    let api = HttpRecordApi::new(http, ApiConfig::from_env_or_compile());
    info!(
        "Record API: write={} read={}",
        api.config().add_record_url(),
        api.config().records_url
    );
    let state = AppState::new(identity, api);

    state.check_session().await;

    if let (Ok(username), Ok(password)) = (std::env::var("BP_USERNAME"), std::env::var("BP_PASSWORD")) {
        state.on_username_changed(&username).await;
        state.on_password_changed(&password).await;
        state.on_login_click().await;
        let login = state.login_state().await;
        match login.error_message {
            Some(e) => warn!("Sign-in failed: {}", e),
            None => info!("Signed in"),
        }
    }

    if let Ok(spec) = std::env::var("BP_SUBMIT") {
        submit_from_env(&state, &spec).await;
    }

    state.fetch_records().await;
    let list = state.record_list_state().await;
    if let Some(e) = list.error_message {
        warn!("Failed to fetch records: {}", e);
        return;
    }

    info!("Loaded {} readings", list.records.len());
    for r in list.records.iter().rev().take(SHOWN_READINGS) {
        info!(
            "{}  {}/{} mmHg  pulse {}",
            display_time(r),
            r.systolic,
            r.diastolic,
            r.pulse
        );
    }
}

/// "2023-01-01 09:24" when the timestamp is recognised, the raw text otherwise.
fn display_time(r: &Reading) -> String {
    match r.recorded_at_naive() {
        Some(ts) => ts.format("%Y-%m-%d %H:%M").to_string(),
        None => r.recorded_at.clone().unwrap_or_else(|| "-".to_string()),
    }
}

async fn submit_from_env<P, A>(state: &AppState<P, A>, spec: &str)
where
    P: bp_companion::IdentityProvider,
    A: bp_companion::RecordApi,
{
    let parts: Vec<&str> = spec.split(',').map(str::trim).collect();
    let [systolic, diastolic, pulse] = parts.as_slice() else {
        warn!("BP_SUBMIT must be \"systolic,diastolic,pulse\", got {:?}", spec);
        return;
    };

    state.on_systolic_changed(systolic).await;
    state.on_diastolic_changed(diastolic).await;
    state.on_pulse_changed(pulse).await;
    state.on_submit_click().await;

    let form = state.main_form_state().await;
    let message = form.result_message.unwrap_or_default();
    if form.is_error {
        warn!("Submit failed: {}", message);
    } else {
        info!("{}", message);
    }
}
