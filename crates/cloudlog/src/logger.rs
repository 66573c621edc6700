//! Cheap-clone logger handles.

use std::sync::Arc;

use tracing::{Dispatch, dispatcher};

use crate::config::LogConfig;
use crate::error::Result;
use crate::observer::ObservedLogs;

/// Handle over a named, fully built log collector.
///
/// Cloning is cheap; clones share the same collector. A handle never owns
/// process-global state, so any number of loggers can coexist.
#[derive(Debug, Clone)]
pub struct Logger {
    name: Option<Arc<str>>,
    dispatch: Dispatch,
}

impl Logger {
    pub(crate) fn from_parts(name: Option<String>, dispatch: Dispatch) -> Self {
        Self {
            name: name.map(Arc::from),
            dispatch,
        }
    }

    /// Build a named logger from the default production configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration fails to build.
    pub fn production(name: impl Into<String>) -> Result<Self> {
        LogConfig::production().with_name(name).build()
    }

    /// Build a named logger from the default development configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration fails to build.
    pub fn development(name: impl Into<String>) -> Result<Self> {
        LogConfig::development().with_name(name).build()
    }

    /// Logger that routes entries to the test harness capture.
    #[must_use]
    pub fn test() -> Self {
        LogConfig::test().build().unwrap_or_else(|_| Self::noop())
    }

    /// Like [`Logger::test`], but also saves entries to an in-memory
    /// observer.
    #[must_use]
    pub fn observed_test() -> (Self, ObservedLogs) {
        LogConfig::test()
            .build_observed()
            .unwrap_or_else(|_| (Self::noop(), ObservedLogs::disconnected()))
    }

    /// Logger that discards every entry.
    #[must_use]
    pub fn noop() -> Self {
        Self {
            name: None,
            dispatch: Dispatch::none(),
        }
    }

    /// Name given to the logger at build time.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The underlying collector handle.
    #[must_use]
    pub fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }

    /// Run a closure with this logger as the thread-default collector.
    ///
    /// `tracing` macros invoked inside the closure route to this logger
    /// regardless of what is installed process-wide.
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        dispatcher::with_default(&self.dispatch, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_runs_closures() {
        let ran = Logger::noop().in_scope(|| {
            tracing::info!("discarded");
            true
        });
        assert!(ran);
    }

    #[test]
    fn test_named_constructors() {
        let logger = Logger::production("api").unwrap();
        assert_eq!(logger.name(), Some("api"));

        let logger = Logger::development("api").unwrap();
        assert_eq!(logger.name(), Some("api"));

        assert_eq!(Logger::noop().name(), None);
    }

    #[test]
    fn test_clones_share_collector() {
        let (logger, logs) = Logger::observed_test();
        let clone = logger.clone();

        clone.in_scope(|| tracing::info!("through the clone"));

        assert!(logs.contains("through the clone"));
    }

    #[test]
    fn test_observed_test_captures() {
        let (logger, logs) = Logger::observed_test();

        logger.in_scope(|| {
            tracing::info!(user = "ada", "hello observer");
            tracing::error!("boom");
        });

        assert_eq!(logs.len(), 2);
        assert!(logs.contains("hello observer"));
        assert_eq!(logs.filter_level(tracing::Level::ERROR).len(), 1);

        let entries = logs.all();
        assert_eq!(
            entries[0].fields.get("user"),
            Some(&serde_json::Value::from("ada"))
        );
        assert!(entries[0].target.starts_with("cloudlog"));
    }
}
