use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config file not found at {path}")]
    ConfigMissing { path: PathBuf },
    #[error("failed to read config file at {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file at {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("telegram bot token is not configured (set [telegram].bot_token or TGCAST_BOT_TOKEN)")]
    MissingBotToken,
    #[error("operator chat is not configured (pass --chat or set [operator].chat_id)")]
    MissingOperatorChat,
    #[error("failed to build telegram http client: {0}")]
    HttpClient(#[source] reqwest::Error),
    #[error("failed to register shutdown signal handler: {0}")]
    SignalRegistration(#[source] std::io::Error),
    #[error("failed to initialize logging: {0}")]
    LoggingInit(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),
}
