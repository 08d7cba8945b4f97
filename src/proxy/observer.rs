//! Side channel for failures that do not change what the client sees.

use crate::proxy::error::ProxyFailure;

/// Receives every failure the proxy handles on its own.
///
/// Implementations must be cheap and must not block: they are called inline
/// on the request task, and for streaming errors from inside the body stream.
pub trait FailureObserver: Send + Sync + std::fmt::Debug {
    fn report(&self, failure: &ProxyFailure);
}

/// Default observer: structured log events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl FailureObserver for TracingObserver {
    fn report(&self, failure: &ProxyFailure) {
        match failure {
            ProxyFailure::UpstreamUnreachable(_) => {
                tracing::error!(kind = failure.kind(), error = %failure, "Error forwarding request");
            }
            ProxyFailure::ResponseDecode(_) => {
                tracing::error!(kind = failure.kind(), error = %failure, "Error processing upstream response");
            }
            ProxyFailure::ClientWrite(_) => {
                tracing::warn!(kind = failure.kind(), error = %failure, "Error copying upstream response body");
            }
        }
    }
}
