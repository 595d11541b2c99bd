//! # ADK Telemetry
//!
//! Structured logging for ADK evaluation runs, built on `tracing`.
//!
//! ## Usage
//!
//! ```rust
//! use adk_telemetry::{TelemetryConfig, info, init_telemetry};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     init_telemetry(&TelemetryConfig::new("my-eval"))?;
//!     info!("evaluation started");
//!     Ok(())
//! }
//! ```

pub mod init;
pub mod spans;

// Re-export tracing macros for convenience
pub use tracing::{Instrument, Span, debug, error, info, instrument, trace, warn};

pub use spans::*;

pub use init::{TelemetryConfig, init_telemetry};
