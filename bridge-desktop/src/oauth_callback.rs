//! Loopback OAuth Redirect Listener
//!
//! Implements the installed-application redirect flow: a small axum server
//! bound to `127.0.0.1` on an ephemeral port receives the authorization
//! server's redirect and hands `code` and `state` back through a oneshot
//! channel. Each connection is served on its own task, so an idle browser
//! connection cannot hold up the redirect.

use async_trait::async_trait;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use bridge_traits::{
    auth::{AuthCallbackListener, AuthorizationResponse},
    error::{BridgeError, Result},
};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};

/// How long to wait for the user to finish the consent screen
const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(300);

const SUCCESS_PAGE: &str = "<html><body>The authentication flow has completed. \
                            You may close this window.</body></html>";

/// Loopback listener for the OAuth redirect.
///
/// The socket is bound up front so the redirect URI is known before the
/// consent URL is built. It is served once, by the first call to
/// [`AuthCallbackListener::wait_for_authorization`].
pub struct LoopbackCallbackListener {
    listener: tokio::sync::Mutex<Option<TcpListener>>,
    local_addr: SocketAddr,
    timeout: Duration,
}

/// Result of inspecting the query of one redirect request
#[derive(Debug, PartialEq, Eq)]
enum CallbackOutcome {
    Authorized(AuthorizationResponse),
    Denied(String),
    /// No `code` or `error`; keep listening
    Ignored,
}

/// Router state: the sender half is taken by the first decisive redirect
#[derive(Clone)]
struct CallbackState {
    sender: Arc<Mutex<Option<oneshot::Sender<Result<AuthorizationResponse>>>>>,
}

impl CallbackState {
    fn deliver(&self, result: Result<AuthorizationResponse>) {
        let sender = match self.sender.lock() {
            Ok(mut slot) => slot.take(),
            Err(_) => None,
        };
        match sender {
            Some(sender) => {
                let _ = sender.send(result);
            }
            None => debug!("Authorization already delivered, ignoring redirect"),
        }
    }
}

impl LoopbackCallbackListener {
    /// Bind to an ephemeral port on the loopback interface
    pub async fn bind() -> Result<Self> {
        Self::bind_port(0).await
    }

    /// Bind to a specific loopback port
    pub async fn bind_port(port: u16) -> Result<Self> {
        let listener = TcpListener::bind(("127.0.0.1", port)).await?;
        let local_addr = listener.local_addr()?;
        debug!(addr = %local_addr, "OAuth callback listener bound");

        Ok(Self {
            listener: tokio::sync::Mutex::new(Some(listener)),
            local_addr,
            timeout: DEFAULT_WAIT_TIMEOUT,
        })
    }

    /// Override how long to wait for the redirect
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn take_listener(&self) -> Result<TcpListener> {
        self.listener.lock().await.take().ok_or_else(|| {
            BridgeError::NotAvailable("OAuth callback listener was already used".to_string())
        })
    }
}

#[async_trait]
impl AuthCallbackListener for LoopbackCallbackListener {
    fn redirect_uri(&self) -> String {
        format!("http://127.0.0.1:{}/", self.local_addr.port())
    }

    async fn wait_for_authorization(&self, auth_url: &str) -> Result<AuthorizationResponse> {
        let listener = self.take_listener().await?;
        let (sender, receiver) = oneshot::channel();
        let (stop, stopped) = oneshot::channel::<()>();

        let app = Router::new()
            .route("/", get(receive_redirect))
            .with_state(CallbackState {
                sender: Arc::new(Mutex::new(Some(sender))),
            });

        tokio::spawn(async move {
            let shutdown = async move {
                let _ = stopped.await;
            };
            if let Err(e) = axum::serve(listener, app)
                .with_graceful_shutdown(shutdown)
                .await
            {
                error!(error = %e, "OAuth callback server failed");
            }
        });

        info!(
            "Please visit this URL to authorize this application: {}",
            auth_url
        );

        let outcome = tokio::time::timeout(self.timeout, receiver).await;
        let _ = stop.send(());

        match outcome {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(BridgeError::OperationFailed(
                "OAuth callback server stopped before authorization".to_string(),
            )),
            Err(_) => Err(BridgeError::OperationFailed(format!(
                "Timed out after {}s waiting for authorization",
                self.timeout.as_secs()
            ))),
        }
    }
}

async fn receive_redirect(
    State(state): State<CallbackState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    match parse_callback_params(params) {
        CallbackOutcome::Authorized(response) => {
            state.deliver(Ok(response));
            (StatusCode::OK, Html(SUCCESS_PAGE.to_string())).into_response()
        }
        CallbackOutcome::Denied(reason) => {
            warn!(reason = %reason, "Authorization was denied");
            let page = format!("<html><body>Authorization failed: {}</body></html>", reason);
            state.deliver(Err(BridgeError::OperationFailed(format!(
                "Authorization was denied: {}",
                reason
            ))));
            (StatusCode::BAD_REQUEST, Html(page)).into_response()
        }
        CallbackOutcome::Ignored => StatusCode::NOT_FOUND.into_response(),
    }
}

fn parse_callback_params(mut params: HashMap<String, String>) -> CallbackOutcome {
    if let Some(error) = params.remove("error") {
        return CallbackOutcome::Denied(error);
    }

    match params.remove("code") {
        Some(code) => CallbackOutcome::Authorized(AuthorizationResponse {
            code,
            state: params.remove("state").unwrap_or_default(),
        }),
        None => CallbackOutcome::Ignored,
    }
}
