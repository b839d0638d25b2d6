#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use gsc_auth::{
    AuthError, AuthResult, Authenticator, BrowserLauncher, ClientCredentials, Clock,
    CredentialStore, Token, TokenExchanger,
};
use gsc_keystore::MemoryStore;
use reqwest::Url;
use tokio::task::JoinHandle;

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 18, 9, 0, 0)
        .single()
        .expect("valid time")
}

pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Arc<Self> {
        Arc::new(Self {
            now: Mutex::new(now),
        })
    }

    pub fn advance(&self, by: ChronoDuration) {
        let mut now = self.now.lock().expect("clock lock");
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock lock")
    }
}

/// What the simulated provider does once the consent page is "opened".
#[derive(Clone)]
pub enum Redirect {
    Code(&'static str),
    Error(&'static str),
    Nothing,
}

pub struct CallbackResponse {
    pub port: u16,
    pub status: u16,
    pub body: String,
}

/// Plays the user and the provider: reads the consent URL and immediately
/// follows the redirect back to the loopback listener.
pub struct ProviderBrowser {
    redirect: Redirect,
    fail_to_open: bool,
    opened: Mutex<Vec<Url>>,
    requests: Mutex<Vec<JoinHandle<Option<CallbackResponse>>>>,
}

impl ProviderBrowser {
    pub fn new(redirect: Redirect) -> Arc<Self> {
        Arc::new(Self {
            redirect,
            fail_to_open: false,
            opened: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Reports a launch failure but still delivers the redirect, as a user
    /// pasting the printed URL would.
    pub fn failing(redirect: Redirect) -> Arc<Self> {
        Arc::new(Self {
            redirect,
            fail_to_open: true,
            opened: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn opened(&self) -> Vec<Url> {
        self.opened.lock().expect("opened lock").clone()
    }

    pub fn ports(&self) -> Vec<u16> {
        self.opened()
            .iter()
            .filter_map(|url| query_value(url, "redirect_uri"))
            .filter_map(|uri| Url::parse(&uri).ok())
            .filter_map(|uri| uri.port())
            .collect()
    }

    pub async fn responses(&self) -> Vec<CallbackResponse> {
        let handles: Vec<_> = self
            .requests
            .lock()
            .expect("requests lock")
            .drain(..)
            .collect();
        let mut responses = Vec::new();
        for handle in handles {
            if let Ok(Some(response)) = handle.await {
                responses.push(response);
            }
        }
        responses
    }
}

pub fn query_value(url: &Url, key: &str) -> Option<String> {
    url.query_pairs()
        .find(|(name, _)| name == key)
        .map(|(_, value)| value.into_owned())
}

impl BrowserLauncher for ProviderBrowser {
    fn open(&self, url: &str) -> anyhow::Result<()> {
        let url = Url::parse(url)?;
        self.opened.lock().expect("opened lock").push(url.clone());

        let redirect_uri = query_value(&url, "redirect_uri")
            .ok_or_else(|| anyhow::anyhow!("consent url without redirect_uri"))?;
        let state = query_value(&url, "state").unwrap_or_default();
        let mut target = Url::parse(&redirect_uri.replace("localhost", "127.0.0.1"))?;
        let port = target.port().unwrap_or(80);
        match &self.redirect {
            Redirect::Code(code) => {
                target
                    .query_pairs_mut()
                    .append_pair("code", code)
                    .append_pair("state", &state);
            }
            Redirect::Error(error) => {
                target
                    .query_pairs_mut()
                    .append_pair("error", error)
                    .append_pair("state", &state);
            }
            Redirect::Nothing => {}
        }

        if !matches!(self.redirect, Redirect::Nothing) {
            let handle = tokio::spawn(async move {
                let response = reqwest::get(target).await.ok()?;
                let status = response.status().as_u16();
                let body = response.text().await.ok()?;
                Some(CallbackResponse { port, status, body })
            });
            self.requests.lock().expect("requests lock").push(handle);
        }

        if self.fail_to_open {
            anyhow::bail!("no display available");
        }
        Ok(())
    }
}

/// In-process token endpoint that counts round-trips.
pub struct CountingExchanger {
    clock: Arc<dyn Clock>,
    lifetime: ChronoDuration,
    fail_refresh: bool,
    issue_refresh_on_refresh: bool,
    delay: Duration,
    exchanges: AtomicUsize,
    refreshes: AtomicUsize,
}

impl CountingExchanger {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            lifetime: ChronoDuration::seconds(3600),
            fail_refresh: false,
            issue_refresh_on_refresh: false,
            delay: Duration::ZERO,
            exchanges: AtomicUsize::new(0),
            refreshes: AtomicUsize::new(0),
        }
    }

    pub fn failing_refresh(mut self) -> Self {
        self.fail_refresh = true;
        self
    }

    pub fn rotating_refresh_token(mut self) -> Self {
        self.issue_refresh_on_refresh = true;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn exchanges(&self) -> usize {
        self.exchanges.load(Ordering::SeqCst)
    }

    pub fn refreshes(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenExchanger for CountingExchanger {
    async fn exchange_code(
        &self,
        _credentials: &ClientCredentials,
        code: &str,
        _redirect_uri: &str,
        _code_verifier: &str,
    ) -> AuthResult<Token> {
        self.exchanges.fetch_add(1, Ordering::SeqCst);
        if code != "AUTH123" {
            return Err(AuthError::Exchange(format!("400 invalid_grant: {code}")));
        }
        Ok(Token {
            access_token: "tok1".to_string(),
            refresh_token: Some("ref1".to_string()),
            expiry: self.clock.now() + self.lifetime,
            token_type: "Bearer".to_string(),
        })
    }

    async fn refresh(
        &self,
        _credentials: &ClientCredentials,
        refresh_token: &str,
    ) -> AuthResult<Token> {
        let count = self.refreshes.fetch_add(1, Ordering::SeqCst) + 1;
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.fail_refresh {
            return Err(AuthError::RefreshFailed("400 invalid_grant".to_string()));
        }
        Ok(Token {
            access_token: format!("tok{}", count + 1),
            refresh_token: self
                .issue_refresh_on_refresh
                .then(|| format!("{refresh_token}-rotated")),
            expiry: self.clock.now() + self.lifetime,
            token_type: "Bearer".to_string(),
        })
    }
}

pub fn credentials() -> ClientCredentials {
    ClientCredentials::new("abc", "xyz", "read-only")
}

pub fn memory_store() -> (MemoryStore, CredentialStore) {
    let backend = MemoryStore::new();
    let store = CredentialStore::new(Box::new(backend.clone()));
    (backend, store)
}

pub fn authenticator(
    store: CredentialStore,
    clock: Arc<ManualClock>,
    exchanger: Arc<CountingExchanger>,
    browser: Arc<ProviderBrowser>,
) -> Authenticator {
    Authenticator::new(store, reqwest::Client::new())
        .with_clock(clock)
        .with_exchanger(exchanger)
        .with_browser(browser)
}

pub async fn port_is_closed(port: u16) -> bool {
    tokio::net::TcpStream::connect(("127.0.0.1", port))
        .await
        .is_err()
}
