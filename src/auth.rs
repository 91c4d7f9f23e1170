//! Cognito user-pool auth
//!
//! Security model:
//! - The app client id and region are PUBLIC (no client secret is used).
//! - Tokens are kept in memory only; nothing is written to disk.
//! - The ID token is what the record API expects as bearer token. It is
//!   refreshed with the refresh token once it expires.
//!
//! Config via env:
//! - BP_COGNITO_REGION
//! - BP_COGNITO_CLIENT_ID
//! - BP_COGNITO_ENDPOINT (optional override of the regional endpoint)

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use log::{debug, info, warn};
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::defaults;
use crate::error::AuthError;

const AMZ_TARGET_HEADER: &str = "X-Amz-Target";
const INITIATE_AUTH_TARGET: &str = "AWSCognitoIdentityProviderService.InitiateAuth";
const AMZ_JSON: &str = "application/x-amz-json-1.1";

// ─────────────────────────────────────────────────────────────────────────────
// Identity seams
// ─────────────────────────────────────────────────────────────────────────────

/// Source of the bearer token for authenticated writes.
#[allow(async_fn_in_trait)]
pub trait TokenProvider {
    /// Current ID token, or None when there is no valid session.
    async fn current_id_token(&self) -> Option<String>;
}

impl<T: TokenProvider> TokenProvider for Arc<T> {
    async fn current_id_token(&self) -> Option<String> {
        (**self).current_id_token().await
    }
}

/// Session management on top of [`TokenProvider`].
#[allow(async_fn_in_trait)]
pub trait IdentityProvider: TokenProvider {
    async fn check_session(&self) -> Result<bool, AuthError>;
    async fn sign_in(&self, username: &str, password: &str) -> Result<(), AuthError>;
    async fn sign_out(&self) -> Result<(), AuthError>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Config & session
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct CognitoConfig {
    pub region: String,
    pub client_id: String,
    pub endpoint: String,
}

impl CognitoConfig {
    pub fn from_env_or_compile() -> Self {
        let region = std::env::var("BP_COGNITO_REGION")
            .ok()
            .or_else(|| option_env!("BP_COGNITO_REGION").map(|s| s.to_string()))
            .unwrap_or_else(|| defaults::COGNITO_REGION.to_string());
        let client_id = std::env::var("BP_COGNITO_CLIENT_ID")
            .ok()
            .or_else(|| option_env!("BP_COGNITO_CLIENT_ID").map(|s| s.to_string()))
            .unwrap_or_default();
        let endpoint = std::env::var("BP_COGNITO_ENDPOINT")
            .ok()
            .unwrap_or_else(|| format!("https://cognito-idp.{}.amazonaws.com/", region));
        Self {
            region,
            client_id,
            endpoint,
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.client_id.trim().is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct AuthSession {
    pub id_token: String,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl AuthSession {
    pub fn is_valid(&self) -> bool {
        Utc::now() < self.expires_at
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Cognito wire format
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InitiateAuthResponse {
    authentication_result: Option<AuthenticationResult>,
    challenge_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AuthenticationResult {
    id_token: String,
    access_token: String,
    refresh_token: Option<String>,
    expires_in: i64,
    token_type: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(rename = "__type")]
    kind: Option<String>,
    #[serde(alias = "Message")]
    message: Option<String>,
}

fn compute_expires_at(expires_in: i64) -> DateTime<Utc> {
    // small margin so a token is not used right at its expiry
    Utc::now() + Duration::seconds(expires_in.saturating_sub(30).max(0))
}

fn map_error(status: u16, text: &str) -> AuthError {
    let body: ErrorBody = serde_json::from_str(text).unwrap_or_default();
    // "__type" is sometimes namespaced: "com.amazonaws...#NotAuthorizedException"
    let code = body
        .kind
        .as_deref()
        .and_then(|k| k.rsplit('#').next())
        .unwrap_or("")
        .to_string();

    match code.as_str() {
        "NotAuthorizedException" => AuthError::InvalidCredentials,
        "UserNotFoundException" => AuthError::UserNotFound,
        _ => AuthError::Service {
            status,
            code,
            message: body.message.unwrap_or_else(|| text.trim().to_string()),
        },
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Cognito client (InitiateAuth: USER_PASSWORD_AUTH / REFRESH_TOKEN_AUTH)
// ─────────────────────────────────────────────────────────────────────────────

pub struct CognitoAuth {
    http: reqwest::Client,
    cfg: CognitoConfig,
    session: RwLock<Option<AuthSession>>,
}

impl CognitoAuth {
    pub fn new(http: reqwest::Client, cfg: CognitoConfig) -> Self {
        Self {
            http,
            cfg,
            session: RwLock::new(None),
        }
    }

    pub async fn session(&self) -> Option<AuthSession> {
        self.session.read().await.clone()
    }

    pub async fn set_session(&self, session: Option<AuthSession>) {
        let mut s = self.session.write().await;
        *s = session;
    }

    async fn initiate_auth(
        &self,
        flow: &str,
        params: serde_json::Value,
    ) -> Result<AuthenticationResult, AuthError> {
        if !self.cfg.is_configured() {
            return Err(AuthError::NotConfigured);
        }

        let body = serde_json::json!({
            "AuthFlow": flow,
            "ClientId": self.cfg.client_id,
            "AuthParameters": params,
        });

        debug!("Cognito InitiateAuth flow={}", flow);
        let resp = self
            .http
            .post(&self.cfg.endpoint)
            .header(AMZ_TARGET_HEADER, INITIATE_AUTH_TARGET)
            .header(CONTENT_TYPE, AMZ_JSON)
            .body(body.to_string())
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let text = resp.text().await.unwrap_or_default();
            return Err(map_error(status, &text));
        }

        let parsed: InitiateAuthResponse = resp.json().await?;
        if let Some(challenge) = parsed.challenge_name {
            return Err(AuthError::ChallengeRequired(challenge));
        }
        parsed
            .authentication_result
            .ok_or_else(|| AuthError::Decode("missing AuthenticationResult".to_string()))
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession, AuthError> {
        let result = self
            .initiate_auth(
                "REFRESH_TOKEN_AUTH",
                serde_json::json!({ "REFRESH_TOKEN": refresh_token }),
            )
            .await?;

        // Cognito does not rotate the refresh token here; keep the one we have.
        Ok(AuthSession {
            id_token: result.id_token,
            access_token: result.access_token,
            refresh_token: result.refresh_token.or_else(|| Some(refresh_token.to_string())),
            expires_at: compute_expires_at(result.expires_in),
        })
    }
}

impl TokenProvider for CognitoAuth {
    async fn current_id_token(&self) -> Option<String> {
        // fast-path
        let refresh = {
            let s = self.session.read().await;
            let sess = s.as_ref()?;
            if sess.is_valid() {
                return Some(sess.id_token.clone());
            }
            sess.refresh_token.clone()?
        };

        match self.refresh_session(&refresh).await {
            Ok(new_sess) => {
                let token = new_sess.id_token.clone();
                self.set_session(Some(new_sess)).await;
                debug!("Refreshed Cognito session");
                Some(token)
            }
            Err(e) => {
                warn!("Session refresh failed, signing out: {}", e);
                self.set_session(None).await;
                None
            }
        }
    }
}

impl IdentityProvider for CognitoAuth {
    async fn check_session(&self) -> Result<bool, AuthError> {
        Ok(self.current_id_token().await.is_some())
    }

    async fn sign_in(&self, username: &str, password: &str) -> Result<(), AuthError> {
        let result = self
            .initiate_auth(
                "USER_PASSWORD_AUTH",
                serde_json::json!({ "USERNAME": username, "PASSWORD": password }),
            )
            .await?;

        if let Some(tt) = result.token_type.as_deref() {
            if !tt.eq_ignore_ascii_case("bearer") {
                warn!("Unexpected token_type: {}", tt);
            }
        }

        self.set_session(Some(AuthSession {
            id_token: result.id_token,
            access_token: result.access_token,
            refresh_token: result.refresh_token,
            expires_at: compute_expires_at(result.expires_in),
        }))
        .await;
        info!("Signed in as {}", username);
        Ok(())
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        // Local sign-out only; tokens issued so far stay valid until they expire.
        self.set_session(None).await;
        info!("Signed out");
        Ok(())
    }
}
