//! Cloudlog - structured logging presets with cloud error-report decoration.
//!
//! This crate provides:
//! - Default logger configurations for production, development and tests
//! - Error-severity entries reshaped for cloud error-report ingestion
//! - A process-wide logger handle with thread-safe swapping
//!
//! Encoding, buffering, filtering and output management stay with the
//! `tracing` ecosystem; this crate configures them and decorates what they
//! emit.
//!
//! # Example
//!
//! ```rust,no_run
//! use cloudlog::{LogConfig, ServiceContext};
//!
//! # fn main() -> Result<(), cloudlog::LogError> {
//! LogConfig::production()
//!     .with_name("web_server")
//!     .with_error_reporting(ServiceContext::from_cloud_run_env())
//!     .init()?;
//!
//! // Error entries now carry the service context and source location the
//! // ingestion pipeline keys on.
//! tracing::error!(request = "r-17", "upstream handshake failed");
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod prelude;

mod config;
mod error;
mod global;
mod logger;
mod observer;
mod report;
mod service;

pub use config::{FileRotation, LogConfig, LogFormat, LogTarget};
pub use error::{LogError, Result};
pub use global::{global, install_global, replace_global};
pub use logger::Logger;
pub use observer::{CapturedEntry, ObservedLogs, ObserverWriter};
pub use report::{
    CONTEXT_KEY, ErrorReportMakeWriter, ErrorReportWriter, LOGGER_KEY, SERVICE_CONTEXT_KEY,
    SOURCE_LOCATION_KEY,
};
pub use service::ServiceContext;
