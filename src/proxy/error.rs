//! Error taxonomy for the proxy core.
//!
//! None of these ever reach the client as text. The dispatcher turns a
//! [`ForwardError`] into a bare 503, processors turn decode problems into a
//! bare 500, and everything is reported through the
//! [`FailureObserver`](crate::proxy::observer::FailureObserver).

use std::time::Duration;
use thiserror::Error;

/// Failure while getting a request to the upstream and a response back.
#[derive(Debug, Error)]
pub enum ForwardError {
    /// The rewritten request (URI or `Host`) could not be built.
    #[error("invalid upstream request: {0}")]
    InvalidRequest(#[from] axum::http::Error),

    /// Connect or transport error from the upstream client.
    #[error("upstream transport error: {0}")]
    Transport(#[from] hyper_util::client::legacy::Error),

    /// The upstream did not answer within the request deadline.
    #[error("upstream did not respond within {0:?}")]
    Timeout(Duration),
}

/// Failure while turning an upstream response into a client response.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("failed to read upstream body: {0}")]
    Read(#[source] axum::Error),

    #[error("malformed login payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("minted auth cookie is not a valid header value: {0}")]
    Cookie(#[from] axum::http::header::InvalidHeaderValue),
}

/// Everything the proxy swallows on behalf of the client, by category.
#[derive(Debug, Error)]
pub enum ProxyFailure {
    #[error("upstream unreachable: {0}")]
    UpstreamUnreachable(#[source] ForwardError),

    #[error("response decode failure: {0}")]
    ResponseDecode(#[source] DecodeError),

    #[error("client write failure: {0}")]
    ClientWrite(#[source] axum::Error),
}

impl ProxyFailure {
    /// Short stable name, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            ProxyFailure::UpstreamUnreachable(_) => "upstream_unreachable",
            ProxyFailure::ResponseDecode(_) => "response_decode",
            ProxyFailure::ClientWrite(_) => "client_write",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_kinds_are_stable() {
        let err = ProxyFailure::UpstreamUnreachable(ForwardError::Timeout(Duration::from_secs(3)));
        assert_eq!(err.kind(), "upstream_unreachable");
        assert!(err.to_string().contains("3s"));

        let bad_json = serde_json::from_slice::<serde_json::Value>(b"{").unwrap_err();
        let err = ProxyFailure::ResponseDecode(DecodeError::Payload(bad_json));
        assert_eq!(err.kind(), "response_decode");
    }
}
