use std::time::Duration;

use gsc_keystore::KeystoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid client configuration: {0}")]
    Configuration(String),
    #[error("{0}")]
    Listener(String),
    #[error("authorization failed: {0}")]
    AuthorizationDenied(String),
    #[error("could not exchange authorization code: {0}")]
    Exchange(String),
    #[error("authorization timed out after {}", describe_wait(.0))]
    Timeout(Duration),
    #[error("not logged in - run 'gsc auth login' first")]
    NotAuthenticated,
    #[error("could not refresh token: {0}; run 'gsc auth login' to re-authenticate")]
    RefreshFailed(String),
    #[error("secure storage error: {0}")]
    Storage(String),
}

impl From<KeystoreError> for AuthError {
    fn from(err: KeystoreError) -> Self {
        Self::Storage(err.to_string())
    }
}

fn describe_wait(wait: &Duration) -> String {
    let secs = wait.as_secs();
    if secs >= 60 && secs % 60 == 0 {
        format!("{} minutes", secs / 60)
    } else {
        format!("{} ms", wait.as_millis())
    }
}

pub type AuthResult<T> = Result<T, AuthError>;
