use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::infra::{
    config::{file_config::FileConfig, AppConfig, BotToken},
    error::AppError,
};

const DEFAULT_CONFIG_PATH: &str = "config.toml";
const APP_DIR_NAME: &str = "tgcast";

/// Environment variable that overrides `[telegram].bot_token`.
pub const BOT_TOKEN_ENV: &str = "TGCAST_BOT_TOKEN";

/// Loads config from an explicit path, `./config.toml`, or the user config dir.
///
/// An explicit path must exist; the implicit locations fall back to defaults.
pub fn load(path: Option<&Path>) -> Result<AppConfig, AppError> {
    let config_path = match path {
        Some(path) if !path.exists() => {
            return Err(AppError::ConfigMissing {
                path: path.to_path_buf(),
            })
        }
        Some(path) => Some(path.to_path_buf()),
        None => default_config_path(),
    };

    let mut config = AppConfig::default();

    if let Some(config_path) = config_path {
        let raw = fs::read_to_string(&config_path).map_err(|source| AppError::ConfigRead {
            path: config_path.clone(),
            source,
        })?;

        let file_config: FileConfig =
            toml::from_str(&raw).map_err(|source| AppError::ConfigParse {
                path: config_path,
                source,
            })?;

        file_config.merge_into(&mut config);
    }

    apply_env_overrides(&mut config);
    Ok(config)
}

fn default_config_path() -> Option<PathBuf> {
    let local = PathBuf::from(DEFAULT_CONFIG_PATH);
    if local.exists() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|base| base.join(APP_DIR_NAME).join(DEFAULT_CONFIG_PATH))
        .filter(|path| path.exists())
}

fn apply_env_overrides(config: &mut AppConfig) {
    if let Ok(token) = env::var(BOT_TOKEN_ENV) {
        if !token.trim().is_empty() {
            config.telegram.bot_token = BotToken::new(token);
        }
    }
}
