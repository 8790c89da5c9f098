//! Tracing setup tests
//!
//! The global subscriber can be installed once per process, so the whole
//! startup sequence lives in one test.

use phyto_common::config::LoggingConfig;
use phyto_common::logging::init_tracing;
use tracing::Level;

#[test]
fn test_subscriber_precedes_config_and_takes_configured_level() {
    std::env::remove_var("RUST_LOG");

    let handle = init_tracing().unwrap();

    // Config loading messages are already visible at the default level
    assert!(tracing::enabled!(Level::INFO));
    assert!(tracing::enabled!(Level::WARN));
    assert!(!tracing::enabled!(Level::DEBUG));

    handle
        .apply(&LoggingConfig {
            level: "debug".to_string(),
        })
        .unwrap();
    assert!(tracing::enabled!(Level::DEBUG));

    let invalid = LoggingConfig {
        level: "info,phyto=notalevel".to_string(),
    };
    assert!(handle.apply(&invalid).is_err());

    assert!(init_tracing().is_err());
}
