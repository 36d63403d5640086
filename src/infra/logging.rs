use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::infra::{config::LogConfig, error::AppError};

const LOG_FILE_PREFIX: &str = "tgcast";
const LOG_FILE_SUFFIX: &str = "log";

/// Keeps the file writer flushing until dropped.
#[derive(Debug)]
pub struct LoggingGuard {
    _file: Option<WorkerGuard>,
}

pub fn init(config: &LogConfig) -> Result<LoggingGuard, AppError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let (file_layer, file_guard) = match &config.directory {
        Some(directory) => {
            let appender = RollingFileAppender::builder()
                .rotation(Rotation::NEVER)
                .filename_prefix(LOG_FILE_PREFIX)
                .filename_suffix(LOG_FILE_SUFFIX)
                .build(directory)
                .map_err(|error| AppError::LoggingInit(Box::new(error)))?;
            let (writer, guard) = tracing_appender::non_blocking(appender);

            (
                Some(fmt::layer().with_ansi(false).with_writer(writer)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(file_layer)
        .try_init()
        .map_err(|error| AppError::LoggingInit(Box::new(error)))?;

    Ok(LoggingGuard { _file: file_guard })
}
