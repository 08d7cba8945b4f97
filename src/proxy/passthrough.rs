//! Passthrough capabilities: forward as-is, process nothing, copy everything back.

use async_trait::async_trait;
use axum::body::{Body, BodyDataStream, Bytes};
use axum::http::{header, HeaderMap, HeaderValue, Request, Response, Version};
use futures_util::Stream;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use crate::proxy::client::UpstreamClient;
use crate::proxy::error::{ForwardError, ProxyFailure};
use crate::proxy::observer::FailureObserver;
use crate::proxy::strategy::{Forwarder, ProcessedResponse, Processor, Returner};
use crate::proxy::target::UpstreamTarget;

/// Point `request` at `target` in place: URI scheme/authority and `Host`.
pub(crate) fn retarget(
    target: &UpstreamTarget,
    request: &mut Request<Body>,
) -> Result<(), ForwardError> {
    *request.uri_mut() = target.rewrite(request.uri())?;
    // The upstream connection is always HTTP/1.1, whatever the client spoke.
    *request.version_mut() = Version::HTTP_11;

    let host = HeaderValue::from_str(target.authority().as_str())
        .map_err(axum::http::Error::from)?;
    request.headers_mut().insert(header::HOST, host);
    Ok(())
}

#[derive(Debug, Clone)]
pub struct PassthroughForwarder {
    client: UpstreamClient,
}

impl PassthroughForwarder {
    pub fn new(client: UpstreamClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Forwarder for PassthroughForwarder {
    async fn forward(
        &self,
        target: &UpstreamTarget,
        mut request: Request<Body>,
    ) -> Result<Response<Body>, ForwardError> {
        retarget(target, &mut request)?;
        self.client.send(request).await
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughProcessor;

#[async_trait]
impl Processor for PassthroughProcessor {
    async fn process(
        &self,
        response: Response<Body>,
        _observer: &Arc<dyn FailureObserver>,
    ) -> ProcessedResponse {
        ProcessedResponse::from(response)
    }
}

/// Copies every header value, the status, and streams the body.
///
/// The body is written by the server after the handler returns, so copy
/// failures are reported from inside the body stream.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughReturner;

impl Returner for PassthroughReturner {
    fn give_back(
        &self,
        processed: ProcessedResponse,
        observer: &Arc<dyn FailureObserver>,
    ) -> Response<Body> {
        let body = ClientBodyStream::new(
            processed.body.into_data_stream(),
            content_length(&processed.headers),
            Arc::clone(observer),
        );

        let mut response = Response::new(Body::from_stream(body));
        *response.status_mut() = processed.status;

        let headers = response.headers_mut();
        for (name, value) in processed.headers.iter() {
            headers.append(name.clone(), value.clone());
        }

        response
    }
}

fn content_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(header::CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

/// Body stream handed to the server for writing to the client.
///
/// Reports [`ProxyFailure::ClientWrite`] when a chunk fails, or when the
/// server drops the stream after starting it but before the body ended
/// (the client went away). A body the server never polls (HEAD, 204, 304)
/// is not a failure. With a `Content-Length`, the body has ended once that
/// many bytes went out, since the server may stop polling right there.
struct ClientBodyStream {
    inner: BodyDataStream,
    remaining: Option<u64>,
    observer: Arc<dyn FailureObserver>,
    started: bool,
    finished: bool,
}

impl ClientBodyStream {
    fn new(
        inner: BodyDataStream,
        remaining: Option<u64>,
        observer: Arc<dyn FailureObserver>,
    ) -> Self {
        Self {
            inner,
            remaining,
            observer,
            started: false,
            finished: remaining == Some(0),
        }
    }
}

impl Stream for ClientBodyStream {
    type Item = Result<Bytes, axum::Error>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;
        this.started = true;

        let polled = Pin::new(&mut this.inner).poll_next(cx);
        match &polled {
            Poll::Ready(Some(Ok(chunk))) => {
                if let Some(remaining) = this.remaining.as_mut() {
                    *remaining = remaining.saturating_sub(chunk.len() as u64);
                    if *remaining == 0 {
                        this.finished = true;
                    }
                }
            }
            Poll::Ready(Some(Err(e))) => {
                this.finished = true;
                this.observer
                    .report(&ProxyFailure::ClientWrite(axum::Error::new(e.to_string())));
            }
            Poll::Ready(None) => this.finished = true,
            Poll::Pending => {}
        }
        polled
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl Drop for ClientBodyStream {
    fn drop(&mut self) {
        if self.started && !self.finished {
            self.observer.report(&ProxyFailure::ClientWrite(axum::Error::new(
                "client disconnected before the body was fully written",
            )));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use futures_util::StreamExt;
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct Recorder(Mutex<Vec<&'static str>>);

    impl FailureObserver for Recorder {
        fn report(&self, failure: &ProxyFailure) {
            self.0.lock().unwrap().push(failure.kind());
        }
    }

    #[test]
    fn retarget_sets_host_and_uri() {
        let target = UpstreamTarget::new("http", "upstream:9000").unwrap();
        let mut request = Request::builder()
            .uri("/api/items?x=1")
            .header("Host", "proxy.local")
            .body(Body::empty())
            .unwrap();

        retarget(&target, &mut request).unwrap();

        assert_eq!(request.uri().to_string(), "http://upstream:9000/api/items?x=1");
        assert_eq!(request.headers()[header::HOST], "upstream:9000");
        assert_eq!(request.headers().get_all(header::HOST).iter().count(), 1);
    }

    #[tokio::test]
    async fn returner_keeps_repeated_headers() {
        let mut headers = HeaderMap::new();
        headers.append(header::SET_COOKIE, HeaderValue::from_static("a=1"));
        headers.append(header::SET_COOKIE, HeaderValue::from_static("b=2"));
        let processed = ProcessedResponse {
            status: StatusCode::CREATED,
            headers,
            body: Body::from("created"),
        };

        let recorder = Arc::new(Recorder::default());
        let observer: Arc<dyn FailureObserver> = recorder.clone();
        let response = PassthroughReturner.give_back(processed, &observer);

        assert_eq!(response.status(), StatusCode::CREATED);
        let cookies: Vec<_> = response.headers().get_all(header::SET_COOKIE).iter().collect();
        assert_eq!(cookies, vec!["a=1", "b=2"]);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"created");
        assert!(recorder.0.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn returner_reports_stream_errors() {
        let chunks: Vec<Result<&'static str, std::io::Error>> = vec![
            Ok("partial"),
            Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset")),
        ];
        let processed = ProcessedResponse {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Body::from_stream(futures_util::stream::iter(chunks)),
        };

        let recorder = Arc::new(Recorder::default());
        let observer: Arc<dyn FailureObserver> = recorder.clone();
        let response = PassthroughReturner.give_back(processed, &observer);

        assert!(axum::body::to_bytes(response.into_body(), usize::MAX).await.is_err());
        assert_eq!(*recorder.0.lock().unwrap(), vec!["client_write"]);
    }

    fn streamed(chunks: &[&'static str], content_length: Option<&'static str>) -> ProcessedResponse {
        let mut headers = HeaderMap::new();
        if let Some(len) = content_length {
            headers.insert(header::CONTENT_LENGTH, HeaderValue::from_static(len));
        }
        let chunks: Vec<Result<&'static str, std::io::Error>> =
            chunks.iter().copied().map(Ok).collect();
        ProcessedResponse {
            status: StatusCode::OK,
            headers,
            body: Body::from_stream(futures_util::stream::iter(chunks)),
        }
    }

    #[tokio::test]
    async fn returner_reports_client_leaving_mid_body() {
        let recorder = Arc::new(Recorder::default());
        let observer: Arc<dyn FailureObserver> = recorder.clone();
        let response = PassthroughReturner.give_back(streamed(&["one", "two"], None), &observer);

        let mut body = response.into_body().into_data_stream();
        assert_eq!(&body.next().await.unwrap().unwrap()[..], b"one");
        drop(body);

        assert_eq!(*recorder.0.lock().unwrap(), vec!["client_write"]);
    }

    #[tokio::test]
    async fn returner_quiet_when_body_is_not_cut_short() {
        let recorder = Arc::new(Recorder::default());
        let observer: Arc<dyn FailureObserver> = recorder.clone();

        // Never polled, as for a HEAD response.
        drop(PassthroughReturner.give_back(streamed(&["one", "two"], None), &observer));

        // Every declared byte went out; the end of stream was never polled.
        let response = PassthroughReturner.give_back(streamed(&["one", "two"], Some("6")), &observer);
        let mut body = response.into_body().into_data_stream();
        body.next().await.unwrap().unwrap();
        body.next().await.unwrap().unwrap();
        drop(body);

        assert!(recorder.0.lock().unwrap().is_empty());
    }
}
