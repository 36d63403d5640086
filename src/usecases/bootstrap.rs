use std::{path::Path, time::Duration};

use crate::{
    domain::transport::UserId,
    infra::{
        self,
        config::{self, BroadcastConfig, OperatorConfig},
        error::AppError,
    },
    usecases::{broadcast::BroadcastSettings, context::AppContext, listen::ListenSettings},
};

pub fn bootstrap(config_path: Option<&Path>) -> Result<AppContext, AppError> {
    let context = build_context(config_path)?;
    let guard = infra::logging::init(&context.config.logging)?;

    Ok(context.with_logging(guard))
}

fn build_context(config_path: Option<&Path>) -> Result<AppContext, AppError> {
    let config = config::load(config_path)?;

    Ok(AppContext::new(config))
}

pub fn broadcast_settings(config: &BroadcastConfig) -> BroadcastSettings {
    BroadcastSettings {
        command: config.command.clone(),
        send_delay: Duration::from_millis(config.send_delay_ms),
        progress_batch_size: config.progress_batch_size,
        skip_trailing_delay: config.skip_trailing_delay,
    }
}

pub fn listen_settings(config: &OperatorConfig) -> ListenSettings {
    ListenSettings {
        admins: config.admin_ids.iter().copied().map(UserId).collect(),
        ..ListenSettings::default()
    }
}
