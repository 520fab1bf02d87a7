//! Observability for the storefront state core.
//!
//! This crate provides:
//! - `StructuredLogger` - Structured logging with session and route context
//! - `init_logging` - Process-wide `tracing` subscriber setup from `LoggingConfig`

mod logging;
mod subscriber;

pub use logging::*;
pub use subscriber::*;
