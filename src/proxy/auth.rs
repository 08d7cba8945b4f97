//! Auth token translation between the browser and the upstream.
//!
//! The browser only ever holds the token as an HTTP-only `AuthToken` cookie;
//! the upstream only ever sees it as an `X-Auth-Token` header.
//!
//! ```text
//! login:   upstream 200 {"token": T}  →  Set-Cookie: AuthToken=T; Expires=…; HttpOnly
//! api:     Cookie: AuthToken=T        →  X-Auth-Token: T
//! ```

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue, Request, Response, StatusCode};
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use std::sync::Arc;

use crate::proxy::client::UpstreamClient;
use crate::proxy::error::{DecodeError, ForwardError, ProxyFailure};
use crate::proxy::observer::FailureObserver;
use crate::proxy::passthrough::retarget;
use crate::proxy::strategy::{Forwarder, ProcessedResponse, Processor};
use crate::proxy::target::UpstreamTarget;

pub const AUTH_COOKIE_NAME: &str = "AuthToken";
pub const AUTH_HEADER_NAME: &str = "x-auth-token";

/// Lifetime of a freshly minted auth cookie.
pub const AUTH_COOKIE_TTL_HOURS: i64 = 24;

/// IMF-fixdate, the only `Expires` format browsers are required to accept.
const COOKIE_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Body of a successful login response.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct LoginPayload {
    #[serde(default)]
    pub token: String,
}

fn valid_cookie_value_byte(b: u8) -> bool {
    (0x20..0x7f).contains(&b) && b != b'"' && b != b';' && b != b'\\'
}

/// Find the first cookie called `name` across all `Cookie` headers.
///
/// Unparsable headers and invalid values count as absent.
pub fn find_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|line| line.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .filter(|(key, _)| key.trim() == name)
        .find_map(|(_, value)| {
            let value = value.trim();
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .unwrap_or(value);
            value
                .bytes()
                .all(valid_cookie_value_byte)
                .then(|| value.to_string())
        })
}

/// Drop bytes a cookie value cannot carry; quote values with a space or comma.
fn sanitize_cookie_value(value: &str) -> String {
    let cleaned: String = value
        .chars()
        .filter(|c| c.is_ascii() && valid_cookie_value_byte(*c as u8))
        .collect();

    if cleaned.contains(' ') || cleaned.contains(',') {
        format!("\"{}\"", cleaned)
    } else {
        cleaned
    }
}

/// `Set-Cookie` value carrying `token`, expiring one TTL after `now`.
pub fn auth_cookie(token: &str, now: DateTime<Utc>) -> String {
    let expires = now + Duration::hours(AUTH_COOKIE_TTL_HOURS);
    format!(
        "{}={}; Expires={}; HttpOnly",
        AUTH_COOKIE_NAME,
        sanitize_cookie_value(token),
        expires.format(COOKIE_DATE_FORMAT)
    )
}

/// Forwards like passthrough, adding `X-Auth-Token` from the `AuthToken` cookie.
#[derive(Debug, Clone)]
pub struct AuthCookieToHeaderForwarder {
    client: UpstreamClient,
}

impl AuthCookieToHeaderForwarder {
    pub fn new(client: UpstreamClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Forwarder for AuthCookieToHeaderForwarder {
    async fn forward(
        &self,
        target: &UpstreamTarget,
        mut request: Request<Body>,
    ) -> Result<Response<Body>, ForwardError> {
        retarget(target, &mut request)?;

        let token = find_cookie(request.headers(), AUTH_COOKIE_NAME)
            .and_then(|token| HeaderValue::from_str(&token).ok());
        if let Some(token) = token {
            request.headers_mut().append(AUTH_HEADER_NAME, token);
        }

        self.client.send(request).await
    }
}

/// Mints the auth cookie from a 200 login response.
///
/// The body is buffered (up to `body_limit` bytes) to read the token, then
/// replayed to the client byte for byte.
#[derive(Debug, Clone)]
pub struct AuthHeaderToCookieProcessor {
    body_limit: usize,
}

impl AuthHeaderToCookieProcessor {
    pub fn new(body_limit: usize) -> Self {
        Self { body_limit }
    }
}

#[async_trait]
impl Processor for AuthHeaderToCookieProcessor {
    async fn process(
        &self,
        response: Response<Body>,
        observer: &Arc<dyn FailureObserver>,
    ) -> ProcessedResponse {
        if response.status() != StatusCode::OK {
            return ProcessedResponse::from(response);
        }

        let (mut parts, body) = response.into_parts();

        let bytes = match axum::body::to_bytes(body, self.body_limit).await {
            Ok(bytes) => bytes,
            Err(e) => {
                observer.report(&ProxyFailure::ResponseDecode(DecodeError::Read(e)));
                return ProcessedResponse::internal_error();
            }
        };

        let payload: LoginPayload = match serde_json::from_slice(&bytes) {
            Ok(payload) => payload,
            Err(e) => {
                observer.report(&ProxyFailure::ResponseDecode(DecodeError::Payload(e)));
                return ProcessedResponse::internal_error();
            }
        };

        let cookie = match HeaderValue::from_str(&auth_cookie(&payload.token, Utc::now())) {
            Ok(cookie) => cookie,
            Err(e) => {
                observer.report(&ProxyFailure::ResponseDecode(DecodeError::Cookie(e)));
                return ProcessedResponse::internal_error();
            }
        };
        parts.headers.append(header::SET_COOKIE, cookie);

        ProcessedResponse {
            status: parts.status,
            headers: parts.headers,
            body: Body::from(bytes),
        }
    }
}
