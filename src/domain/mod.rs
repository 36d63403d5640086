//! Domain layer: broadcast entities, tally rules, and operator-facing texts.

pub mod broadcast;
pub mod report;
pub mod transport;

/// Returns the domain module name for smoke checks.
pub fn module_name() -> &'static str {
    "domain"
}
