use std::sync::{Arc, Mutex};

use crate::{KeystoreError, SecretStore};

/// Process-local store. Clones share the same slot.
#[derive(Clone, Default)]
pub struct MemoryStore {
    slot: Arc<Mutex<Option<String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Option<String>>, KeystoreError> {
        self.slot.lock().map_err(|_| KeystoreError::Internal {
            message: "failed to lock memory store".to_string(),
        })
    }
}

impl SecretStore for MemoryStore {
    fn load(&self) -> Result<Option<String>, KeystoreError> {
        Ok(self.lock()?.clone())
    }

    fn store(&self, secret: &str) -> Result<(), KeystoreError> {
        *self.lock()? = Some(secret.to_string());
        Ok(())
    }

    fn delete(&self) -> Result<(), KeystoreError> {
        *self.lock()? = None;
        Ok(())
    }
}
