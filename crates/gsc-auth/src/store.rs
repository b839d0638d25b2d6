use gsc_keystore::SecretStore;
use tracing::debug;

use crate::error::{AuthError, AuthResult};
use crate::token::{StoredCredentialRecord, Token, RECORD_VERSION};

/// Holds at most one token, serialized as a single blob in secure storage.
pub struct CredentialStore {
    backend: Box<dyn SecretStore>,
}

impl CredentialStore {
    pub fn new(backend: Box<dyn SecretStore>) -> Self {
        Self { backend }
    }

    pub fn get(&self) -> AuthResult<Option<Token>> {
        let Some(blob) = self.backend.load()? else {
            return Ok(None);
        };
        let record: StoredCredentialRecord = serde_json::from_str(&blob).map_err(|err| {
            AuthError::Storage(format!(
                "stored credential is unreadable ({err}); run 'gsc auth logout' and log in again"
            ))
        })?;
        if record.v != RECORD_VERSION {
            return Err(AuthError::Storage(format!(
                "unsupported stored credential version {}",
                record.v
            )));
        }
        Ok(Some(record.into()))
    }

    pub fn set(&self, token: &Token) -> AuthResult<()> {
        let record = StoredCredentialRecord::from(token);
        let blob = serde_json::to_string(&record)
            .map_err(|err| AuthError::Storage(format!("could not encode token: {err}")))?;
        self.backend.store(&blob)?;
        debug!(expiry = %token.expiry, "stored credential");
        Ok(())
    }

    pub fn delete(&self) -> AuthResult<()> {
        self.backend.delete()?;
        debug!("deleted stored credential");
        Ok(())
    }
}
