//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! --config flag (or ./api-proxy.toml)
//!     → loader.rs (existence, format, parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!     → used once at startup to build the target, client and strategies
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - Optional sections have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, resolve_config_path, ConfigError};
pub use schema::{ApiConfig, LimitsConfig, ObservabilityConfig, ProxyConfig, TimeoutConfig};
