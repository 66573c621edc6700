//! Prelude module - commonly used types for convenient import.
//!
//! Use `use cloudlog::prelude::*;` to import all essential types.
//!
//! # Example
//!
//! ```rust,no_run
//! use cloudlog::prelude::*;
//!
//! # fn main() -> Result<()> {
//! let logger = LogConfig::development().with_name("worker").build()?;
//! logger.in_scope(|| tracing::info!("starting up"));
//! # Ok(())
//! # }
//! ```

// Errors
pub use crate::{LogError, Result};

// Logging configuration
pub use crate::{FileRotation, LogConfig, LogFormat, LogTarget};

// Logger handles and the global registry
pub use crate::{Logger, global, install_global, replace_global};

// Error reporting and observation
pub use crate::{ObservedLogs, ServiceContext};
