//! Tracing initialization installs a process-wide subscriber, so it is tested in its own binary.

use bench_console::config::ConsoleConfig;
use bench_console::logging::{self, OutputFormat, TracingConfig};
use tracing::Level;

#[test]
fn init_is_idempotent() {
    let config = TracingConfig::new(Level::WARN)
        .with_format(OutputFormat::Json)
        .with_ansi(false);
    assert!(logging::init(config.clone()).is_ok());
    assert!(logging::init(config).is_ok());
    assert!(logging::init_from_config(&ConsoleConfig::default()).is_ok());
    tracing::warn!("still logging after repeated init");
}
