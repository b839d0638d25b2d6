use keyring::Entry;
use tracing::debug;

use crate::{KeystoreError, SecretStore};

pub struct KeyringStore {
    service: String,
    account: String,
}

impl KeyringStore {
    pub fn new(service: &str, account: &str) -> Self {
        Self {
            service: service.to_string(),
            account: account.to_string(),
        }
    }

    fn entry(&self) -> Result<Entry, KeystoreError> {
        Entry::new(&self.service, &self.account).map_err(map_keyring_error)
    }
}

fn map_keyring_error(err: keyring::Error) -> KeystoreError {
    match err {
        keyring::Error::BadEncoding(_) => KeystoreError::BadEncoding,
        keyring::Error::PlatformFailure(inner) | keyring::Error::NoStorageAccess(inner) => {
            KeystoreError::Unavailable {
                message: inner.to_string(),
            }
        }
        other => KeystoreError::Internal {
            message: other.to_string(),
        },
    }
}

impl SecretStore for KeyringStore {
    fn load(&self) -> Result<Option<String>, KeystoreError> {
        let entry = self.entry()?;
        match entry.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(err) => Err(map_keyring_error(err)),
        }
    }

    fn store(&self, secret: &str) -> Result<(), KeystoreError> {
        let entry = self.entry()?;
        entry.set_password(secret).map_err(map_keyring_error)?;
        debug!(service = %self.service, account = %self.account, "stored secret in keyring");
        Ok(())
    }

    fn delete(&self) -> Result<(), KeystoreError> {
        let entry = self.entry()?;
        match entry.delete_password() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(err) => Err(map_keyring_error(err)),
        }
    }
}
