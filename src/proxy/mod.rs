//! Proxy strategy engine.
//!
//! # Data Flow
//! ```text
//! client request
//!     → dispatcher.rs (orchestration, 503 on unreachable upstream)
//!     → Forwarder   (passthrough.rs / auth.rs: retarget, maybe cookie → header)
//!     → client.rs   (pooled upstream transport, request deadline)
//!     → Processor   (passthrough.rs / auth.rs: maybe token → cookie)
//!     → Returner    (passthrough.rs: copy headers, status, stream body)
//!     → client response
//! ```

pub mod auth;
pub mod client;
pub mod dispatcher;
pub mod error;
pub mod observer;
pub mod passthrough;
pub mod strategy;
pub mod target;

pub use client::UpstreamClient;
pub use dispatcher::ProxyDispatcher;
pub use error::{DecodeError, ForwardError, ProxyFailure};
pub use observer::{FailureObserver, TracingObserver};
pub use strategy::{Forwarder, ProcessedResponse, Processor, ProxyStrategy, Returner};
pub use target::UpstreamTarget;
