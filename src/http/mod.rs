//! HTTP surface of the proxy.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, tracing + timeout middleware)
//!     → /api/login    → login dispatcher (token → cookie)
//!     → /api/…        → api dispatcher (cookie → X-Auth-Token)
//!     → anything else → static_files.rs
//! ```

pub mod server;
pub mod static_files;

pub use server::{HttpServer, ServerError};
pub use static_files::WebFileSystem;
