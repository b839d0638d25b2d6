#![deny(clippy::unwrap_used)]
#![allow(clippy::missing_errors_doc)]

//! OAuth2 loopback login and token lifecycle for the `gsc` command line.
//!
//! [`Authenticator`] is the only type most callers need: `login` runs the
//! browser consent flow against a one-shot listener on an ephemeral loopback
//! port, `valid_token` returns a usable token (refreshing it lazily), and
//! `inspect`/`logout` read or clear the single stored credential.

pub mod authorize;
pub mod browser;
pub mod callback;
pub mod clock;
pub mod credentials;
pub mod error;
pub mod exchange;
pub mod manager;
pub mod store;
pub mod token;

pub use crate::authorize::{build_authorization_url, AuthorizationAttempt};
pub use crate::browser::{BrowserLauncher, SystemBrowser};
pub use crate::callback::CallbackServer;
pub use crate::clock::{Clock, SystemClock};
pub use crate::credentials::{ClientCredentials, SEARCH_CONSOLE_SCOPE};
pub use crate::error::{AuthError, AuthResult};
pub use crate::exchange::{HttpTokenExchanger, TokenExchanger};
pub use crate::manager::{Authenticator, LOGIN_TIMEOUT};
pub use crate::store::CredentialStore;
pub use crate::token::{Token, TokenStatus};
