//! API proxy library.
//!
//! Forwards `/api/…` to a single upstream, translating the `AuthToken`
//! browser cookie into an `X-Auth-Token` upstream header and back, and
//! serves static files for everything else.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod proxy;

pub use config::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
