use std::sync::Arc;
use std::time::Duration;

use reqwest::Url;
use tokio::sync::Mutex as TokioMutex;
use tracing::{debug, info, warn};

use crate::authorize::{build_authorization_url, AuthorizationAttempt};
use crate::browser::{BrowserLauncher, SystemBrowser};
use crate::callback::{CallbackOutcome, CallbackServer};
use crate::clock::{Clock, SystemClock};
use crate::credentials::ClientCredentials;
use crate::error::{AuthError, AuthResult};
use crate::exchange::{HttpTokenExchanger, TokenExchanger};
use crate::store::CredentialStore;
use crate::token::{Token, TokenStatus};

pub const LOGIN_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Entry point for login, logout, status and token retrieval.
pub struct Authenticator {
    store: CredentialStore,
    exchanger: Arc<dyn TokenExchanger>,
    browser: Arc<dyn BrowserLauncher>,
    clock: Arc<dyn Clock>,
    login_timeout: Duration,
    refresh_lock: TokioMutex<()>,
}

impl Authenticator {
    pub fn new(store: CredentialStore, client: reqwest::Client) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        Self {
            store,
            exchanger: Arc::new(HttpTokenExchanger::with_clock(client, clock.clone())),
            browser: Arc::new(SystemBrowser),
            clock,
            login_timeout: LOGIN_TIMEOUT,
            refresh_lock: TokioMutex::new(()),
        }
    }

    pub fn with_exchanger(mut self, exchanger: Arc<dyn TokenExchanger>) -> Self {
        self.exchanger = exchanger;
        self
    }

    pub fn with_browser(mut self, browser: Arc<dyn BrowserLauncher>) -> Self {
        self.browser = browser;
        self
    }

    /// Replaces the clock used for expiry checks. The default exchanger keeps
    /// stamping expiries with the system clock; pair this with `with_exchanger`.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_login_timeout(mut self, timeout: Duration) -> Self {
        self.login_timeout = timeout;
        self
    }

    /// Runs the browser consent flow and stores the resulting token.
    pub async fn login(&self, credentials: &ClientCredentials) -> AuthResult<Token> {
        credentials.validate()?;

        let server = CallbackServer::bind().await?;
        let port = server.port();
        let redirect_uri = credentials.redirect_uri(port);
        let callback_path = Url::parse(&redirect_uri)
            .map_err(|err| AuthError::Configuration(format!("invalid redirect uri: {err}")))?
            .path()
            .to_string();
        let attempt = AuthorizationAttempt::new(port, redirect_uri, self.clock.now());
        let auth_url = build_authorization_url(credentials, &attempt)?;
        info!(port, created_at = %attempt.created_at, "starting authorization");

        if let Err(err) = self.browser.open(auth_url.as_str()) {
            warn!("{err}");
            eprintln!("Could not open browser automatically: {err}");
        }

        let code = match server
            .wait(&callback_path, &attempt.state, self.login_timeout)
            .await?
        {
            CallbackOutcome::Code(code) => code,
            CallbackOutcome::Denied(reason) => return Err(AuthError::AuthorizationDenied(reason)),
        };

        let token = self
            .exchanger
            .exchange_code(
                credentials,
                &code,
                &attempt.redirect_uri,
                &attempt.code_verifier,
            )
            .await?;
        if token.refresh_token.is_none() {
            warn!("provider did not issue a refresh token; silent refresh will not be possible");
        }
        self.store.set(&token)?;
        info!(expiry = %token.expiry, "login complete");
        Ok(token)
    }

    pub fn logout(&self) -> AuthResult<()> {
        self.store.delete()
    }

    /// Reports the stored token without refreshing it.
    pub fn inspect(&self) -> AuthResult<TokenStatus> {
        let status = match self.store.get()? {
            None => TokenStatus::Absent,
            Some(token) => TokenStatus::Present {
                expired: token.is_expired(self.clock.now()),
                expiry: token.expiry,
                token_type: token.token_type,
            },
        };
        Ok(status)
    }

    /// Returns the stored token, refreshing it first when it has expired.
    ///
    /// Refreshes are serialized: a caller that waited on another caller's
    /// refresh re-reads the store and reuses the fresh token.
    pub async fn valid_token(&self, credentials: &ClientCredentials) -> AuthResult<Token> {
        let token = self.store.get()?.ok_or(AuthError::NotAuthenticated)?;
        if !token.is_expired(self.clock.now()) {
            return Ok(token);
        }

        let _guard = self.refresh_lock.lock().await;
        let token = self.store.get()?.ok_or(AuthError::NotAuthenticated)?;
        if !token.is_expired(self.clock.now()) {
            debug!("token refreshed by a concurrent caller");
            return Ok(token);
        }

        let refresh_token = token.refresh_token.as_deref().ok_or_else(|| {
            AuthError::RefreshFailed("no refresh token stored".to_string())
        })?;
        debug!(expiry = %token.expiry, "token expired; refreshing");
        let refreshed = self
            .exchanger
            .refresh(credentials, refresh_token)
            .await?
            .inherit_refresh_token(&token);
        self.store.set(&refreshed)?;
        info!(expiry = %refreshed.expiry, "token refreshed");
        Ok(refreshed)
    }
}
