use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::Deserialize;
use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::credentials::ClientCredentials;
use crate::error::{AuthError, AuthResult};
use crate::token::Token;

/// Token endpoint round-trips. Each call is a single request with no retry.
#[async_trait]
pub trait TokenExchanger: Send + Sync {
    async fn exchange_code(
        &self,
        credentials: &ClientCredentials,
        code: &str,
        redirect_uri: &str,
        code_verifier: &str,
    ) -> AuthResult<Token>;

    async fn refresh(
        &self,
        credentials: &ClientCredentials,
        refresh_token: &str,
    ) -> AuthResult<Token>;
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    token_type: Option<String>,
}

#[derive(Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

pub struct HttpTokenExchanger {
    client: reqwest::Client,
    clock: Arc<dyn Clock>,
}

impl HttpTokenExchanger {
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_clock(client, Arc::new(SystemClock))
    }

    pub fn with_clock(client: reqwest::Client, clock: Arc<dyn Clock>) -> Self {
        Self { client, clock }
    }

    async fn post_form(
        &self,
        credentials: &ClientCredentials,
        params: &[(&str, &str)],
    ) -> Result<Token, String> {
        let start = std::time::Instant::now();
        let response = self
            .client
            .post(&credentials.token_url)
            .form(params)
            .send()
            .await
            .map_err(|err| format!("token request failed: {err}"))?;
        let status = response.status();
        debug!(
            url = %credentials.token_url,
            status = %status,
            elapsed_ms = start.elapsed().as_millis(),
            "token endpoint response"
        );
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(describe_failure(status, &body));
        }
        let payload: TokenResponse = response
            .json()
            .await
            .map_err(|err| format!("invalid token response: {err}"))?;
        if payload.access_token.is_empty() {
            return Err("token response did not include an access token".to_string());
        }
        let expiry = expiry_after(self.clock.now(), payload.expires_in.unwrap_or(3600))?;
        Ok(Token {
            access_token: payload.access_token,
            refresh_token: payload.refresh_token.filter(|token| !token.is_empty()),
            expiry,
            token_type: payload
                .token_type
                .filter(|kind| !kind.is_empty())
                .unwrap_or_else(|| "Bearer".to_string()),
        })
    }
}

fn expiry_after(now: DateTime<Utc>, expires_in: i64) -> Result<DateTime<Utc>, String> {
    if expires_in < 0 {
        return Err(format!("token response has negative expires_in: {expires_in}"));
    }
    ChronoDuration::try_seconds(expires_in)
        .and_then(|lifetime| now.checked_add_signed(lifetime))
        .ok_or_else(|| format!("token response has out-of-range expires_in: {expires_in}"))
}

fn describe_failure(status: reqwest::StatusCode, body: &str) -> String {
    match serde_json::from_str::<TokenErrorResponse>(body) {
        Ok(error) => match error.error_description {
            Some(description) => format!("{status} {}: {description}", error.error),
            None => format!("{status} {}", error.error),
        },
        Err(_) => format!("{status} {body}"),
    }
}

#[async_trait]
impl TokenExchanger for HttpTokenExchanger {
    async fn exchange_code(
        &self,
        credentials: &ClientCredentials,
        code: &str,
        redirect_uri: &str,
        code_verifier: &str,
    ) -> AuthResult<Token> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", redirect_uri),
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
            ("code_verifier", code_verifier),
        ];
        self.post_form(credentials, &params)
            .await
            .map_err(AuthError::Exchange)
    }

    async fn refresh(
        &self,
        credentials: &ClientCredentials,
        refresh_token: &str,
    ) -> AuthResult<Token> {
        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
        ];
        self.post_form(credentials, &params)
            .await
            .map_err(AuthError::RefreshFailed)
    }
}
