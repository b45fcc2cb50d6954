// Timer abstraction for the blocking driver
use super::cancel::CancelToken;
use std::time::{Duration, Instant};

/// Clock and sleep used by the blocking poll loop
pub trait Timer {
    fn now(&self) -> Instant;

    /// Sleep for `duration` unless cancelled first. Returns true if cancelled.
    fn sleep(&self, duration: Duration, cancel: &CancelToken) -> bool;
}

/// Real time, sleeping on the calling thread
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadTimer;

impl Timer for ThreadTimer {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration, cancel: &CancelToken) -> bool {
        cancel.sleep(duration)
    }
}
