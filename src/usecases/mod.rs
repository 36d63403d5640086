//! Use case layer: broadcast dispatch and the bot command loop.

pub mod bootstrap;
pub mod broadcast;
pub mod context;
pub mod contracts;
pub mod listen;

/// Returns the usecases module name for smoke checks.
pub fn module_name() -> &'static str {
    "usecases"
}
