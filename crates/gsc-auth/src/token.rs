use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, PartialEq, Eq)]
pub struct Token {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expiry: DateTime<Utc>,
    pub token_type: String,
}

impl Token {
    /// True when `expiry` is strictly before `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiry < now
    }

    /// Keeps the current refresh token when a refreshed token comes back without one.
    pub(crate) fn inherit_refresh_token(mut self, previous: &Token) -> Self {
        if self.refresh_token.is_none() {
            self.refresh_token = previous.refresh_token.clone();
        }
        self
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("access_token", &"<redacted>")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "<redacted>"),
            )
            .field("expiry", &self.expiry)
            .field("token_type", &self.token_type)
            .finish()
    }
}

/// Read-only view of the stored credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenStatus {
    Absent,
    Present {
        expiry: DateTime<Utc>,
        expired: bool,
        token_type: String,
    },
}

pub(crate) const RECORD_VERSION: u32 = 1;

/// Serialized form of the single stored token.
#[derive(Serialize, Deserialize)]
pub(crate) struct StoredCredentialRecord {
    pub v: u32,
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub expiry: DateTime<Utc>,
    pub token_type: String,
}

impl From<&Token> for StoredCredentialRecord {
    fn from(token: &Token) -> Self {
        Self {
            v: RECORD_VERSION,
            access_token: token.access_token.clone(),
            refresh_token: token.refresh_token.clone(),
            expiry: token.expiry,
            token_type: token.token_type.clone(),
        }
    }
}

impl From<StoredCredentialRecord> for Token {
    fn from(record: StoredCredentialRecord) -> Self {
        Self {
            access_token: record.access_token,
            refresh_token: record.refresh_token,
            expiry: record.expiry,
            token_type: record.token_type,
        }
    }
}
