//! Process-wide logger handle with concurrency-safe swapping.

use std::sync::{LazyLock, OnceLock, PoisonError, RwLock};

use tracing::subscriber::{Interest, Subscriber};
use tracing::{Dispatch, Event, Metadata, dispatcher, span};

use crate::error::{LogError, Result};
use crate::logger::Logger;

static GLOBAL: LazyLock<RwLock<Logger>> = LazyLock::new(|| {
    let logger = Logger::development("global").unwrap_or_else(|_| Logger::noop());
    RwLock::new(logger)
});

static INSTALLED: OnceLock<()> = OnceLock::new();

/// Current global logger handle.
///
/// Starts out as a development logger until something replaces it.
#[must_use]
pub fn global() -> Logger {
    GLOBAL.read().unwrap_or_else(PoisonError::into_inner).clone()
}

/// Swap the global logger, returning the handle it replaces.
///
/// Safe under unsynchronized concurrent use with [`global`].
pub fn replace_global(logger: Logger) -> Logger {
    let mut guard = GLOBAL.write().unwrap_or_else(PoisonError::into_inner);
    std::mem::replace(&mut *guard, logger)
}

/// Route `tracing` macros anywhere in the process through [`global`].
///
/// Installs a forwarding collector as the process default exactly once;
/// calling again after a successful install is a no-op. Swaps via
/// [`replace_global`] take effect immediately, including at callsites first
/// seen under a previous logger.
///
/// # Errors
///
/// Returns an error if another collector already claimed the process
/// default.
pub fn install_global() -> Result<()> {
    if INSTALLED.get().is_some() {
        return Ok(());
    }
    dispatcher::set_global_default(Dispatch::new(GlobalForwarder))
        .map_err(|e| LogError::Init(e.to_string()))?;
    let _ = INSTALLED.set(());
    Ok(())
}

/// Collector that defers every callback to whatever [`global`] currently
/// holds.
///
/// [`global`] releases the registry lock before the callback runs, so no
/// lock is held while the inner collector does its work.
struct GlobalForwarder;

impl Subscriber for GlobalForwarder {
    // Cached interest would pin decisions made under a replaced logger;
    // keep every callsite dynamic.
    fn register_callsite(&self, _metadata: &'static Metadata<'static>) -> Interest {
        Interest::sometimes()
    }

    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        global().dispatch().enabled(metadata)
    }

    fn new_span(&self, attributes: &span::Attributes<'_>) -> span::Id {
        global().dispatch().new_span(attributes)
    }

    fn record(&self, id: &span::Id, values: &span::Record<'_>) {
        global().dispatch().record(id, values);
    }

    fn record_follows_from(&self, id: &span::Id, follows: &span::Id) {
        global().dispatch().record_follows_from(id, follows);
    }

    fn event(&self, event: &Event<'_>) {
        global().dispatch().event(event);
    }

    fn enter(&self, id: &span::Id) {
        global().dispatch().enter(id);
    }

    fn exit(&self, id: &span::Id) {
        global().dispatch().exit(id);
    }

    fn clone_span(&self, id: &span::Id) -> span::Id {
        global().dispatch().clone_span(id)
    }

    fn try_close(&self, id: span::Id) -> bool {
        global().dispatch().try_close(id)
    }
}
