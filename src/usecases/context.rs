use crate::infra::{config::AppConfig, logging::LoggingGuard};

#[derive(Debug)]
pub struct AppContext {
    pub config: AppConfig,
    _logging: Option<LoggingGuard>,
}

impl AppContext {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            _logging: None,
        }
    }

    pub fn with_logging(mut self, guard: LoggingGuard) -> Self {
        self._logging = Some(guard);
        self
    }
}
