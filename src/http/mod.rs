//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, server span, timeout)
//!     → middleware.rs (trace context extraction, request duration)
//!     → handlers.rs (/, /hello, /increase-days, /metrics)
//!         → client.rs (GET / calls back into /hello)
//! ```

pub mod client;
pub mod handlers;
pub mod middleware;
pub mod server;

pub use client::{HelloClient, HelloError};
pub use server::{AppState, HttpServer};
