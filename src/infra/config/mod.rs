mod app_config;
mod file_config;
mod loader;

pub use app_config::{
    AppConfig, BotToken, BroadcastConfig, LogConfig, OperatorConfig, RecipientsConfig,
    TelegramConfig,
};
pub use loader::load;
