//! Infrastructure layer: config, logging, recipient storage, and OS integration.

pub mod config;
pub mod error;
pub mod logging;
pub mod pacing;
pub mod recipients_file;
pub mod secrets;
pub mod shutdown;
pub mod stubs;

/// Returns the infra module name for smoke checks.
pub fn module_name() -> &'static str {
    "infra"
}
