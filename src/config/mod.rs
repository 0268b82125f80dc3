//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! appsettings.toml (+ optional appsettings.custom.toml overlay)
//!     → loader.rs (parse, merge, deserialize)
//!     → validation.rs (semantic checks)
//!     → ServiceConfig (validated, immutable)
//!     → observability::selector picks exporters from it
//! ```
//!
//! # Design Decisions
//! - Config is read once at startup; exporters cannot change afterwards
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_layered, ConfigError};
pub use schema::ConsoleConfig;
pub use schema::ListenerConfig;
pub use schema::OtlpConfig;
pub use schema::SelfCallConfig;
pub use schema::ServiceConfig;
pub use schema::TimeoutConfig;
pub use schema::ZipkinConfig;
