use signal_hook::{
    consts::{SIGINT, SIGTERM},
    flag,
};

use crate::{infra::error::AppError, usecases::contracts::CancelFlag};

/// Routes SIGINT/SIGTERM into `cancel`.
///
/// The first signal asks the running loop to stop between recipients; a
/// second SIGINT while the flag is already set exits the process.
pub fn install(cancel: &CancelFlag) -> Result<(), AppError> {
    flag::register_conditional_shutdown(SIGINT, 130, cancel.as_atomic())
        .map_err(AppError::SignalRegistration)?;
    flag::register(SIGINT, cancel.as_atomic()).map_err(AppError::SignalRegistration)?;
    flag::register(SIGTERM, cancel.as_atomic()).map_err(AppError::SignalRegistration)?;

    Ok(())
}
