//! Per-request orchestration: forward → process → return.
//!
//! # Responsibilities
//! - Run the three strategy capabilities strictly in sequence
//! - Turn an unreachable upstream into a bare 503
//! - Hand every swallowed failure to the observer
//!
//! # Design Decisions
//! - Exactly one of {503 short-circuit, full flow} runs per request; no retries
//! - The upstream body is owned by this task and released when it is dropped,
//!   whichever path the request takes

use axum::body::Body;
use axum::http::{header, HeaderValue, Request, Response, StatusCode};
use std::sync::Arc;

use crate::proxy::error::ProxyFailure;
use crate::proxy::observer::FailureObserver;
use crate::proxy::strategy::ProxyStrategy;
use crate::proxy::target::UpstreamTarget;

#[derive(Debug, Clone)]
pub struct ProxyDispatcher {
    target: Arc<UpstreamTarget>,
    strategy: ProxyStrategy,
    observer: Arc<dyn FailureObserver>,
}

impl ProxyDispatcher {
    pub fn new(
        target: Arc<UpstreamTarget>,
        strategy: ProxyStrategy,
        observer: Arc<dyn FailureObserver>,
    ) -> Self {
        Self {
            target,
            strategy,
            observer,
        }
    }

    pub async fn handle(&self, request: Request<Body>) -> Response<Body> {
        let method = request.method().clone();
        let path = request.uri().path().to_string();

        let upstream = match self.strategy.forward(&self.target, request).await {
            Ok(response) => response,
            Err(e) => {
                self.observer.report(&ProxyFailure::UpstreamUnreachable(e));
                return service_unavailable();
            }
        };

        tracing::debug!(
            method = %method,
            path = %path,
            status = upstream.status().as_u16(),
            "Upstream responded"
        );

        let processed = self.strategy.process(upstream, &self.observer).await;
        self.strategy.give_back(processed, &self.observer)
    }
}

/// Plain-text 503 carrying only the standard reason phrase.
fn service_unavailable() -> Response<Body> {
    let status = StatusCode::SERVICE_UNAVAILABLE;
    let text = format!("{}\n", status.canonical_reason().unwrap_or_default());

    let mut response = Response::new(Body::from(text));
    *response.status_mut() = status;
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    response
}
