//! Shared transport to the upstream.
//!
//! # Design Decisions
//! - One pooled hyper-util client for the whole process, cloned into every forwarder
//! - The connector speaks both `http` and `https`, so the configured scheme decides
//! - Every dispatch carries a deadline so a hung upstream cannot pin a request task
//! - Responses are handed back as `Response<Body>` so processors never see hyper internals

use axum::body::Body;
use axum::http::{Request, Response};
use hyper::body::Incoming;
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use std::time::Duration;

use crate::config::TimeoutConfig;
use crate::proxy::error::ForwardError;

#[derive(Debug, Clone)]
pub struct UpstreamClient {
    inner: Client<HttpsConnector<HttpConnector>, Body>,
    request_timeout: Duration,
}

impl UpstreamClient {
    pub fn new(timeouts: &TimeoutConfig) -> Self {
        let mut http = HttpConnector::new();
        // The TLS layer hands `https` URIs down to the TCP connector.
        http.enforce_http(false);
        http.set_connect_timeout(Some(Duration::from_secs(timeouts.connect_secs)));

        let connector = HttpsConnectorBuilder::new()
            .with_webpki_roots()
            .https_or_http()
            .enable_http1()
            .wrap_connector(http);

        let inner = Client::builder(TokioExecutor::new()).build(connector);

        Self {
            inner,
            request_timeout: Duration::from_secs(timeouts.request_secs),
        }
    }

    /// Send a fully rewritten request and wait for the response head.
    pub async fn send(&self, request: Request<Body>) -> Result<Response<Body>, ForwardError> {
        match tokio::time::timeout(self.request_timeout, self.inner.request(request)).await {
            Ok(Ok(response)) => Ok(response.map(|body: Incoming| Body::new(body))),
            Ok(Err(e)) => Err(ForwardError::Transport(e)),
            Err(_) => Err(ForwardError::Timeout(self.request_timeout)),
        }
    }
}
