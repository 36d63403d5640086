use std::{fmt, path::PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct AppConfig {
    pub logging: LogConfig,
    pub telegram: TelegramConfig,
    pub broadcast: BroadcastConfig,
    pub recipients: RecipientsConfig,
    pub operator: OperatorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogConfig {
    pub level: String,
    /// When set, logs are also written to `tgcast.log` in this directory.
    pub directory: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            directory: None,
        }
    }
}

/// Bot API token; never printed by `Debug`.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(transparent)]
pub struct BotToken(String);

impl BotToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for BotToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            f.write_str("BotToken(<unset>)")
        } else {
            f.write_str("BotToken([REDACTED])")
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TelegramConfig {
    pub bot_token: BotToken,
    pub api_base_url: String,
    pub request_timeout_ms: u64,
    pub poll_timeout_secs: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: BotToken::default(),
            api_base_url: "https://api.telegram.org".to_owned(),
            request_timeout_ms: 10_000,
            poll_timeout_secs: 25,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BroadcastConfig {
    pub command: String,
    pub send_delay_ms: u64,
    pub progress_batch_size: usize,
    pub skip_trailing_delay: bool,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            command: "/broadcast".to_owned(),
            send_delay_ms: 50,
            progress_batch_size: 10,
            skip_trailing_delay: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecipientsConfig {
    pub file: PathBuf,
}

impl Default for RecipientsConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from("recipients.txt"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct OperatorConfig {
    /// Chat that receives status messages for one-shot `send` runs.
    pub chat_id: Option<i64>,
    /// Accounts allowed to issue the broadcast command in bot mode.
    pub admin_ids: Vec<i64>,
}
