use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use rand::RngCore;
use reqwest::Url;
use sha2::{Digest, Sha256};

use crate::credentials::ClientCredentials;
use crate::error::{AuthError, AuthResult};

/// Per-login state. Never persisted.
#[derive(Clone)]
pub struct AuthorizationAttempt {
    pub state: String,
    pub code_verifier: String,
    pub port: u16,
    pub redirect_uri: String,
    pub created_at: DateTime<Utc>,
}

impl AuthorizationAttempt {
    pub fn new(port: u16, redirect_uri: String, created_at: DateTime<Utc>) -> Self {
        Self {
            state: random_url_safe(16),
            code_verifier: random_url_safe(32),
            port,
            redirect_uri,
            created_at,
        }
    }

    pub fn code_challenge(&self) -> String {
        pkce_challenge(&self.code_verifier)
    }
}

fn random_url_safe(size: usize) -> String {
    let mut bytes = vec![0u8; size];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

fn pkce_challenge(verifier: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hasher.finalize())
}

/// Builds the consent URL. Forces the consent screen so the provider
/// re-issues a refresh token on every login.
pub fn build_authorization_url(
    credentials: &ClientCredentials,
    attempt: &AuthorizationAttempt,
) -> AuthResult<Url> {
    let mut url = Url::parse(&credentials.auth_url)
        .map_err(|err| AuthError::Configuration(format!("invalid auth_url: {err}")))?;
    {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("client_id", &credentials.client_id);
        pairs.append_pair("redirect_uri", &attempt.redirect_uri);
        pairs.append_pair("response_type", "code");
        pairs.append_pair("scope", &credentials.scope);
        pairs.append_pair("state", &attempt.state);
        pairs.append_pair("access_type", "offline");
        pairs.append_pair("prompt", "consent");
        pairs.append_pair("code_challenge", &attempt.code_challenge());
        pairs.append_pair("code_challenge_method", "S256");
    }
    Ok(url)
}
