//! Telegram integration layer: Bot API client and update polling.

pub mod bot_api;
pub mod updates;

pub use bot_api::BotApiClient;
pub use updates::UpdatePoller;

/// Returns the telegram module name for smoke checks.
pub fn module_name() -> &'static str {
    "telegram"
}
