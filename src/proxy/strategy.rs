//! Strategy capabilities and the two compositions the proxy serves.
//!
//! A strategy is three independently substitutable capabilities:
//!
//! ```text
//! Forwarder  (target, request)          → upstream response | ForwardError
//! Processor  (response)                 → (status, headers, body)
//! Returner   (status, headers, body)    → client response
//! ```
//!
//! Implementations hold no per-request state, so a single strategy instance
//! is shared by every in-flight request on its endpoint.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{HeaderMap, Request, Response, StatusCode};
use std::sync::Arc;

use crate::proxy::auth::{AuthCookieToHeaderForwarder, AuthHeaderToCookieProcessor};
use crate::proxy::client::UpstreamClient;
use crate::proxy::error::ForwardError;
use crate::proxy::observer::FailureObserver;
use crate::proxy::passthrough::{PassthroughForwarder, PassthroughProcessor, PassthroughReturner};
use crate::proxy::target::UpstreamTarget;

/// Response triple handed from a processor to a returner.
#[derive(Debug)]
pub struct ProcessedResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Body,
}

impl ProcessedResponse {
    /// Fixed outcome for a response the proxy could not decode: 500, no headers, no body.
    pub fn internal_error() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            headers: HeaderMap::new(),
            body: Body::empty(),
        }
    }
}

impl From<Response<Body>> for ProcessedResponse {
    fn from(response: Response<Body>) -> Self {
        let (parts, body) = response.into_parts();
        Self {
            status: parts.status,
            headers: parts.headers,
            body,
        }
    }
}

/// Dispatches a client request to the upstream.
#[async_trait]
pub trait Forwarder: Send + Sync + std::fmt::Debug {
    /// Rewrite `request` to point at `target` and send it.
    async fn forward(
        &self,
        target: &UpstreamTarget,
        request: Request<Body>,
    ) -> Result<Response<Body>, ForwardError>;
}

/// Transforms an upstream response before it is returned.
///
/// Never fails: internal problems are reported to `observer` and resolved to
/// a concrete response such as [`ProcessedResponse::internal_error`].
#[async_trait]
pub trait Processor: Send + Sync + std::fmt::Debug {
    async fn process(
        &self,
        response: Response<Body>,
        observer: &Arc<dyn FailureObserver>,
    ) -> ProcessedResponse;
}

/// Writes a processed response to the client.
pub trait Returner: Send + Sync + std::fmt::Debug {
    fn give_back(
        &self,
        processed: ProcessedResponse,
        observer: &Arc<dyn FailureObserver>,
    ) -> Response<Body>;
}

/// One forwarder, one processor and one returner, chosen per endpoint.
#[derive(Debug, Clone)]
pub struct ProxyStrategy {
    forwarder: Arc<dyn Forwarder>,
    processor: Arc<dyn Processor>,
    returner: Arc<dyn Returner>,
}

impl ProxyStrategy {
    pub fn new(
        forwarder: Arc<dyn Forwarder>,
        processor: Arc<dyn Processor>,
        returner: Arc<dyn Returner>,
    ) -> Self {
        Self {
            forwarder,
            processor,
            returner,
        }
    }

    /// General API endpoints: cookie becomes `X-Auth-Token`, response passes through.
    pub fn api(client: UpstreamClient) -> Self {
        Self::new(
            Arc::new(AuthCookieToHeaderForwarder::new(client)),
            Arc::new(PassthroughProcessor),
            Arc::new(PassthroughReturner),
        )
    }

    /// Login endpoint: request passes through, a 200 body's token becomes a cookie.
    pub fn login(client: UpstreamClient, body_limit: usize) -> Self {
        Self::new(
            Arc::new(PassthroughForwarder::new(client)),
            Arc::new(AuthHeaderToCookieProcessor::new(body_limit)),
            Arc::new(PassthroughReturner),
        )
    }

    pub async fn forward(
        &self,
        target: &UpstreamTarget,
        request: Request<Body>,
    ) -> Result<Response<Body>, ForwardError> {
        self.forwarder.forward(target, request).await
    }

    pub async fn process(
        &self,
        response: Response<Body>,
        observer: &Arc<dyn FailureObserver>,
    ) -> ProcessedResponse {
        self.processor.process(response, observer).await
    }

    pub fn give_back(
        &self,
        processed: ProcessedResponse,
        observer: &Arc<dyn FailureObserver>,
    ) -> Response<Body> {
        self.returner.give_back(processed, observer)
    }
}
