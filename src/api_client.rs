//! Record API client
//!
//! - Authenticated write: POST one reading to the API gateway (Cognito ID token)
//! - Public read: GET the history file from S3 (no auth)
//!
//! Config via env:
//! - BP_API_BASE_URL
//! - BP_RECORDS_URL

use log::{debug, warn};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};

use crate::defaults;
use crate::error::ApiError;
use crate::types::SubmitRequest;

// ─────────────────────────────────────────────────────────────────────────────
// Config
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub records_url: String,
}

impl ApiConfig {
    pub fn from_env_or_compile() -> Self {
        let base_url = std::env::var("BP_API_BASE_URL")
            .ok()
            .or_else(|| option_env!("BP_API_BASE_URL").map(|s| s.to_string()))
            .unwrap_or_else(|| defaults::API_BASE_URL.to_string());
        let records_url = std::env::var("BP_RECORDS_URL")
            .ok()
            .or_else(|| option_env!("BP_RECORDS_URL").map(|s| s.to_string()))
            .unwrap_or_else(|| defaults::RECORDS_URL.to_string());
        Self { base_url, records_url }
    }

    pub fn add_record_url(&self) -> String {
        format!(
            "{}{}",
            self.base_url.trim_end_matches('/'),
            defaults::ADD_RECORD_PATH
        )
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Record API (write: POST one reading, read: GET history file)
// ─────────────────────────────────────────────────────────────────────────────

/// Transport seam between the reading service and the remote endpoints.
#[allow(async_fn_in_trait)]
pub trait RecordApi {
    /// One authenticated POST. Response body is ignored on success.
    async fn post_record(&self, request: &SubmitRequest, id_token: &str) -> Result<(), ApiError>;

    /// One unauthenticated GET of the raw history file.
    async fn fetch_records_text(&self) -> Result<String, ApiError>;
}

pub struct HttpRecordApi {
    http: reqwest::Client,
    cfg: ApiConfig,
}

impl HttpRecordApi {
    pub fn new(http: reqwest::Client, cfg: ApiConfig) -> Self {
        Self { http, cfg }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.cfg
    }
}

async fn rejection(resp: reqwest::Response) -> ApiError {
    let status = resp.status();
    let text = resp.text().await.unwrap_or_default();
    let message = match text.trim() {
        "" => status.canonical_reason().unwrap_or("Unknown status").to_string(),
        body => body.to_string(),
    };
    ApiError::Rejected {
        status: status.as_u16(),
        message,
    }
}

impl RecordApi for HttpRecordApi {
    async fn post_record(&self, request: &SubmitRequest, id_token: &str) -> Result<(), ApiError> {
        let endpoint = self.cfg.add_record_url();
        debug!("POST {} max={} min={} bpm={}", endpoint, request.max, request.min, request.bpm);

        let resp = self
            .http
            .post(endpoint)
            .header(AUTHORIZATION, format!("Bearer {}", id_token))
            .header(CONTENT_TYPE, "application/json")
            .json(request)
            .send()
            .await?;

        if !resp.status().is_success() {
            let err = rejection(resp).await;
            debug!("add record failed: {}", err);
            return Err(err);
        }

        Ok(())
    }

    async fn fetch_records_text(&self) -> Result<String, ApiError> {
        debug!("GET {}", self.cfg.records_url);

        let resp = self.http.get(&self.cfg.records_url).send().await?;

        if !resp.status().is_success() {
            let err = rejection(resp).await;
            debug!("fetch records failed: {}", err);
            return Err(err);
        }

        Ok(resp.text().await?)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Diagnostics
// ─────────────────────────────────────────────────────────────────────────────

pub fn warn_if_missing() {
    let missing: Vec<&str> = ["BP_API_BASE_URL", "BP_RECORDS_URL"]
        .into_iter()
        .filter(|k| std::env::var(k).is_err())
        .collect();
    if missing.is_empty() {
        debug!("Record API endpoints taken from env");
    } else {
        warn!("{} not set, using built-in endpoints", missing.join(" / "));
    }
}
