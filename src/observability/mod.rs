//! # Observability Infrastructure
//!
//! Structured logging for the scanner. Provider calls open `tracing` spans
//! tagged with a correlation id; snapshot and diff operations emit events
//! with counts and names, never values.

pub mod logging;

pub use logging::{init_logging, LogFormat, LoggingConfig};
