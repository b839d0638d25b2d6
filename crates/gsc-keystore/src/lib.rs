//! Secure storage for a single opaque secret blob.
//!
//! The store holds at most one value under a fixed (service, account) pair.
//! Callers own the format of the blob; this crate never inspects it.

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum KeystoreError {
    #[error("secure storage unavailable: {message}")]
    Unavailable { message: String },
    #[error("stored secret is not valid UTF-8")]
    BadEncoding,
    #[error("internal error: {message}")]
    Internal { message: String },
}

/// Minimal capability over OS secure storage.
///
/// `load` returns `Ok(None)` when nothing has been stored. `delete` succeeds
/// when nothing is stored.
pub trait SecretStore: Send + Sync {
    fn load(&self) -> Result<Option<String>, KeystoreError>;
    fn store(&self, secret: &str) -> Result<(), KeystoreError>;
    fn delete(&self) -> Result<(), KeystoreError>;
}

mod keyring_store;
mod memory;

pub use keyring_store::KeyringStore;
pub use memory::MemoryStore;

pub const DEFAULT_SERVICE: &str = "gsc-cli";
pub const DEFAULT_ACCOUNT: &str = "oauth_token";

pub fn default_store() -> Box<dyn SecretStore> {
    Box::new(KeyringStore::new(DEFAULT_SERVICE, DEFAULT_ACCOUNT))
}
