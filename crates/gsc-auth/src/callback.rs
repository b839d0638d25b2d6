//! One-shot loopback listener for the authorization redirect.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use subtle::ConstantTimeEq;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::{AuthError, AuthResult};

const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

const SUCCESS_HTML: &str = "<html><body>\
<h1>Authorization Successful!</h1>\
<p>You can close this window and return to the terminal.</p>\
<script>window.close();</script>\
</body></html>";

const COMPLETED_HTML: &str = "<html><body>\
<h1>This login attempt has already finished</h1>\
<p>You can close this window and return to the terminal.</p>\
</body></html>";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CallbackOutcome {
    Code(String),
    Denied(String),
}

#[derive(Deserialize)]
struct CallbackQuery {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

struct CallbackState {
    expected_state: String,
    slot: Mutex<Option<oneshot::Sender<CallbackOutcome>>>,
}

impl CallbackState {
    fn claim(&self) -> Option<oneshot::Sender<CallbackOutcome>> {
        match self.slot.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        }
    }

    /// Writes the terminal outcome. Returns false when a request or the
    /// deadline already claimed the attempt.
    fn resolve(&self, outcome: CallbackOutcome) -> bool {
        match self.claim() {
            Some(sender) => sender.send(outcome).is_ok(),
            None => false,
        }
    }

    /// Claims the attempt for the deadline. Returns false when a request won.
    fn expire(&self) -> bool {
        self.claim().is_some()
    }

    fn state_matches(&self, state: Option<&str>) -> bool {
        let Some(state) = state else {
            return false;
        };
        state
            .as_bytes()
            .ct_eq(self.expected_state.as_bytes())
            .into()
    }
}

/// Listener bound to an OS-assigned loopback port, not yet serving.
#[derive(Debug)]
pub struct CallbackServer {
    listener: TcpListener,
    port: u16,
}

impl CallbackServer {
    pub async fn bind() -> AuthResult<Self> {
        let listener = TcpListener::bind(("127.0.0.1", 0))
            .await
            .map_err(|err| AuthError::Listener(format!("could not start callback server: {err}")))?;
        let port = listener
            .local_addr()
            .map_err(|err| AuthError::Listener(format!("could not read callback port: {err}")))?
            .port();
        debug!(port, "callback listener bound");
        Ok(Self { listener, port })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Serves `path` until a code, an error or the deadline arrives, then
    /// releases the socket before returning.
    pub(crate) async fn wait(
        self,
        path: &str,
        expected_state: &str,
        deadline: Duration,
    ) -> AuthResult<CallbackOutcome> {
        let (tx, mut rx) = oneshot::channel();
        let shared = Arc::new(CallbackState {
            expected_state: expected_state.to_string(),
            slot: Mutex::new(Some(tx)),
        });
        let app = callback_router(path, shared.clone());

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let CallbackServer { listener, port } = self;
        let task = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
        });
        let guard = ServerGuard {
            shutdown: Some(shutdown_tx),
            task: Some(task),
        };

        let waited = tokio::time::timeout(deadline, &mut rx).await;
        let result = match waited {
            Ok(received) => received.map_err(|_| ()),
            Err(_) if shared.expire() => {
                guard.stop().await;
                debug!(port, "callback listener closed");
                return Err(AuthError::Timeout(deadline));
            }
            // A request claimed the slot just before the deadline.
            Err(_) => rx.await.map_err(|_| ()),
        };
        guard.stop().await;
        debug!(port, "callback listener closed");

        result.map_err(|_| {
            AuthError::Listener("callback server stopped before a redirect arrived".to_string())
        })
    }
}

/// Owns the serving task. Dropping it without `stop` aborts the task so the
/// socket is released when the caller is cancelled.
struct ServerGuard {
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<std::io::Result<()>>>,
}

impl ServerGuard {
    async fn stop(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        let Some(mut task) = self.task.take() else {
            return;
        };
        match tokio::time::timeout(SHUTDOWN_GRACE, &mut task).await {
            Ok(Ok(Err(err))) => warn!("callback server error: {err}"),
            Ok(_) => {}
            Err(_) => {
                warn!("callback server did not drain in time; aborting");
                task.abort();
                let _ = task.await;
            }
        }
    }
}

impl Drop for ServerGuard {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

fn callback_router(path: &str, shared: Arc<CallbackState>) -> Router {
    Router::new()
        .route(path, get(handle_callback))
        .with_state(shared)
}

async fn handle_callback(
    State(shared): State<Arc<CallbackState>>,
    Query(query): Query<CallbackQuery>,
) -> Response {
    let code = query.code.filter(|code| !code.is_empty());
    if let Some(code) = code {
        if !shared.state_matches(query.state.as_deref()) {
            warn!("callback state mismatch; ignoring request");
            return page(
                StatusCode::BAD_REQUEST,
                failure_html("state mismatch; this request did not come from the login you started"),
            );
        }
        if shared.resolve(CallbackOutcome::Code(code)) {
            info!("authorization code received");
            return page(StatusCode::OK, SUCCESS_HTML.to_string());
        }
        return page(StatusCode::OK, COMPLETED_HTML.to_string());
    }

    let reason = match query.error.filter(|error| !error.is_empty()) {
        Some(error) => match query.error_description.filter(|d| !d.is_empty()) {
            Some(description) => format!("{error}: {description}"),
            None => error,
        },
        None => "no authorization code received".to_string(),
    };
    if shared.resolve(CallbackOutcome::Denied(reason.clone())) {
        info!(reason = %reason, "authorization failed");
        return page(StatusCode::BAD_REQUEST, failure_html(&reason));
    }
    page(StatusCode::OK, COMPLETED_HTML.to_string())
}

fn page(status: StatusCode, body: String) -> Response {
    (status, [(header::CONNECTION, "close")], Html(body)).into_response()
}

fn failure_html(reason: &str) -> String {
    format!(
        "<html><body><h1>Authorization Failed</h1><p>{}</p>\
<p>Return to the terminal and try again.</p></body></html>",
        escape_html(reason)
    )
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
