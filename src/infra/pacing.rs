use std::{thread, time::Duration};

use crate::usecases::contracts::Pacer;

/// Blocks the current thread for the requested delay.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadPacer;

impl Pacer for ThreadPacer {
    fn pause(&self, delay: Duration) {
        if !delay.is_zero() {
            thread::sleep(delay);
        }
    }
}
