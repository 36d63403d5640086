use std::path::PathBuf;

use serde::Deserialize;

use crate::infra::config::{
    AppConfig, BotToken, BroadcastConfig, LogConfig, OperatorConfig, RecipientsConfig,
    TelegramConfig,
};

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub logging: Option<FileLogConfig>,
    pub telegram: Option<FileTelegramConfig>,
    pub broadcast: Option<FileBroadcastConfig>,
    pub recipients: Option<FileRecipientsConfig>,
    pub operator: Option<FileOperatorConfig>,
}

impl FileConfig {
    pub fn merge_into(self, config: &mut AppConfig) {
        if let Some(logging) = self.logging {
            logging.merge_into(&mut config.logging);
        }

        if let Some(telegram) = self.telegram {
            telegram.merge_into(&mut config.telegram);
        }

        if let Some(broadcast) = self.broadcast {
            broadcast.merge_into(&mut config.broadcast);
        }

        if let Some(recipients) = self.recipients {
            recipients.merge_into(&mut config.recipients);
        }

        if let Some(operator) = self.operator {
            operator.merge_into(&mut config.operator);
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct FileLogConfig {
    pub level: Option<String>,
    pub directory: Option<PathBuf>,
}

impl FileLogConfig {
    fn merge_into(self, config: &mut LogConfig) {
        if let Some(level) = self.level {
            config.level = level;
        }

        if let Some(directory) = self.directory {
            config.directory = Some(directory);
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct FileTelegramConfig {
    pub bot_token: Option<String>,
    pub api_base_url: Option<String>,
    pub request_timeout_ms: Option<u64>,
    pub poll_timeout_secs: Option<u64>,
}

impl FileTelegramConfig {
    fn merge_into(self, config: &mut TelegramConfig) {
        if let Some(bot_token) = self.bot_token {
            config.bot_token = BotToken::new(bot_token);
        }

        if let Some(api_base_url) = self.api_base_url {
            config.api_base_url = api_base_url;
        }

        if let Some(timeout_ms) = self.request_timeout_ms {
            config.request_timeout_ms = timeout_ms;
        }

        if let Some(timeout_secs) = self.poll_timeout_secs {
            config.poll_timeout_secs = timeout_secs;
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct FileBroadcastConfig {
    pub command: Option<String>,
    pub send_delay_ms: Option<u64>,
    pub progress_batch_size: Option<usize>,
    pub skip_trailing_delay: Option<bool>,
}

impl FileBroadcastConfig {
    fn merge_into(self, config: &mut BroadcastConfig) {
        if let Some(command) = self.command {
            config.command = command;
        }

        if let Some(delay_ms) = self.send_delay_ms {
            config.send_delay_ms = delay_ms;
        }

        if let Some(batch_size) = self.progress_batch_size {
            config.progress_batch_size = batch_size;
        }

        if let Some(skip) = self.skip_trailing_delay {
            config.skip_trailing_delay = skip;
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct FileRecipientsConfig {
    pub file: Option<PathBuf>,
}

impl FileRecipientsConfig {
    fn merge_into(self, config: &mut RecipientsConfig) {
        if let Some(file) = self.file {
            config.file = file;
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct FileOperatorConfig {
    pub chat_id: Option<i64>,
    pub admin_ids: Option<Vec<i64>>,
}

impl FileOperatorConfig {
    fn merge_into(self, config: &mut OperatorConfig) {
        if let Some(chat_id) = self.chat_id {
            config.chat_id = Some(chat_id);
        }

        if let Some(admin_ids) = self.admin_ids {
            config.admin_ids = admin_ids;
        }
    }
}
