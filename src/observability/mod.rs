//! Observability subsystem.
//!
//! All subsystems emit `tracing` events with structured fields; logging.rs
//! installs the subscriber. Proxy failures that do not change the client
//! response reach the logs through `proxy::observer::TracingObserver`.

pub mod logging;
