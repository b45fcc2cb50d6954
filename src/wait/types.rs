// Types and enums for the wait/poll controller
use crate::error::{VisionError, VisionResult};
use crate::matcher::Match;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitState {
    Idle,
    Polling,
    Found,
    TimedOut,
    Cancelled,
}

impl WaitState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            WaitState::Found | WaitState::TimedOut | WaitState::Cancelled
        )
    }
}

/// How a wait ended. Timeouts and cancellations are ordinary outcomes, not
/// errors; real failures come back as `Err(VisionError)` from the drivers.
///
/// For `wait_vanish` the payload is `()` and `Found` means the pattern is gone.
#[derive(Debug, Clone, PartialEq)]
pub enum WaitOutcome<T = Match> {
    Found(T),
    TimedOut { elapsed: Duration, attempts: u32 },
    Cancelled { elapsed: Duration, attempts: u32 },
}

impl<T> WaitOutcome<T> {
    pub fn state(&self) -> WaitState {
        match self {
            WaitOutcome::Found(_) => WaitState::Found,
            WaitOutcome::TimedOut { .. } => WaitState::TimedOut,
            WaitOutcome::Cancelled { .. } => WaitState::Cancelled,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, WaitOutcome::Found(_))
    }

    pub fn found(self) -> Option<T> {
        match self {
            WaitOutcome::Found(value) => Some(value),
            _ => None,
        }
    }

    /// Convert into a `Result`, mapping timeout and cancellation to the
    /// matching `VisionError` variants for `pattern`.
    pub fn into_result(self, pattern: &str) -> VisionResult<T> {
        match self {
            WaitOutcome::Found(value) => Ok(value),
            WaitOutcome::TimedOut { elapsed, attempts } => Err(VisionError::MatchTimeout {
                pattern: pattern.to_string(),
                elapsed,
                attempts,
            }),
            WaitOutcome::Cancelled { elapsed, .. } => Err(VisionError::Cancelled {
                pattern: pattern.to_string(),
                elapsed,
            }),
        }
    }
}

impl WaitOutcome<Match> {
    pub fn into_match(self, pattern: &str) -> VisionResult<Match> {
        self.into_result(pattern)
    }
}

/// Timing knobs for one wait
#[derive(Debug, Clone, PartialEq)]
pub struct WaitConfig {
    /// Give up once this much time has passed without a match
    pub timeout: Duration,
    /// Delay between attempts
    pub poll_interval: Duration,
    /// Capture attempts per poll cycle before a transient failure is surfaced
    pub capture_retries: u32,
    /// Pause between two capture attempts of the same cycle
    pub retry_delay: Duration,
}

impl WaitConfig {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);
    pub const DEFAULT_CAPTURE_RETRIES: u32 = 3;
    pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(20);

    pub fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            timeout,
            poll_interval,
            ..Self::default()
        }
    }

    pub fn with_capture_retries(mut self, retries: u32) -> Self {
        self.capture_retries = retries.max(1);
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            timeout: Self::DEFAULT_TIMEOUT,
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
            capture_retries: Self::DEFAULT_CAPTURE_RETRIES,
            retry_delay: Self::DEFAULT_RETRY_DELAY,
        }
    }
}
