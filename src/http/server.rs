//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build the upstream target, shared client and the two strategies
//! - Create the Axum Router: `/api/login`, `/api/…`, static fallback
//! - Wire up middleware (tracing, request timeout)
//! - Serve until the shutdown signal fires

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::Response,
    routing::any,
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ProxyConfig;
use crate::http::static_files::{static_handler, WebFileSystem};
use crate::proxy::{
    FailureObserver, ProxyDispatcher, ProxyStrategy, TracingObserver, UpstreamClient,
    UpstreamTarget,
};

/// Extra time the whole handler gets on top of the upstream deadline.
const HANDLER_TIMEOUT_SLACK_SECS: u64 = 5;

/// Dispatchers injected into the proxy handlers.
#[derive(Clone)]
pub struct AppState {
    pub login: Arc<ProxyDispatcher>,
    pub api: Arc<ProxyDispatcher>,
}

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("invalid upstream target: {0}")]
    Target(#[from] axum::http::uri::InvalidUri),
}

/// HTTP server for the API proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a new HTTP server reporting failures as log events.
    pub fn new(config: ProxyConfig) -> Result<Self, ServerError> {
        Self::with_observer(config, Arc::new(TracingObserver))
    }

    /// Create a new HTTP server with a custom failure observer.
    pub fn with_observer(
        config: ProxyConfig,
        observer: Arc<dyn FailureObserver>,
    ) -> Result<Self, ServerError> {
        let target = Arc::new(UpstreamTarget::new(&config.api.scheme, &config.api.host)?);
        let client = UpstreamClient::new(&config.timeouts);

        let state = AppState {
            login: Arc::new(ProxyDispatcher::new(
                Arc::clone(&target),
                ProxyStrategy::login(client.clone(), config.limits.login_body_bytes),
                Arc::clone(&observer),
            )),
            api: Arc::new(ProxyDispatcher::new(
                target,
                ProxyStrategy::api(client),
                observer,
            )),
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        let handler_timeout =
            Duration::from_secs(config.timeouts.request_secs + HANDLER_TIMEOUT_SLACK_SECS);

        let proxy = Router::new()
            .route("/api/login", any(login_handler))
            .route("/api/", any(api_handler))
            .route("/api/{*rest}", any(api_handler))
            .with_state(state);

        let files = Router::new()
            .fallback(static_handler)
            .with_state(WebFileSystem::new(&config.root));

        proxy
            .fallback_service(files)
            .layer(TimeoutLayer::new(handler_timeout))
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %format!("{}://{}", self.config.api.scheme, self.config.api.host),
            root = %self.config.root,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// The fully layered router, for driving the server without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }
}

async fn login_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    state.login.handle(request).await
}

async fn api_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    state.api.handle(request).await
}
