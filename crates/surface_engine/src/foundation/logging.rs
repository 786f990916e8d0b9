//! Logging utilities
//!
//! Thin wrapper over the `log` facade; binaries call [`init`] once at
//! startup to route records through `env_logger` (filtered via `RUST_LOG`).

pub use log::{debug, error, info, trace, warn};

/// Initialize the logging system
pub fn init() {
    env_logger::init();
}
