//! `LogConfig::init` claims the process default collector directly.
//!
//! Separate integration binary: the process default can only be claimed once.

use cloudlog::{LogConfig, LogError, global};

#[test]
fn init_claims_the_process_default() {
    let logger = LogConfig::test().with_name("app").init().expect("first init");
    assert_eq!(logger.name(), Some("app"));
    assert_eq!(global().name(), Some("app"));

    tracing::info!("routed through the process default");

    let err = LogConfig::test().with_name("again").init().unwrap_err();
    assert!(matches!(err, LogError::Init(_)));
}
