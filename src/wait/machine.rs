//! Clock-free polling state machine
//!
//! The machine never reads a clock or sleeps; drivers feed it the current
//! instant and act on the returned `PollStep`. The same machine therefore
//! runs under a blocking thread timer or a tokio task.

use super::types::{WaitConfig, WaitOutcome, WaitState};
use crate::matcher::Match;
use std::time::{Duration, Instant};

/// What the driver should do after an attempt
#[derive(Debug, Clone, PartialEq)]
pub enum PollStep<T = Match> {
    Sleep(Duration),
    Finish(WaitOutcome<T>),
}

#[derive(Debug, Clone)]
pub struct PollMachine<T = Match> {
    timeout: Duration,
    poll_interval: Duration,
    state: WaitState,
    started: Option<Instant>,
    attempts: u32,
    outcome: Option<WaitOutcome<T>>,
}

impl<T: Clone> PollMachine<T> {
    pub fn new(config: &WaitConfig) -> Self {
        Self {
            timeout: config.timeout,
            poll_interval: config.poll_interval,
            state: WaitState::Idle,
            started: None,
            attempts: 0,
            outcome: None,
        }
    }

    pub fn state(&self) -> WaitState {
        self.state
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Idle -> Polling. The first attempt follows immediately.
    pub fn begin(&mut self, now: Instant) {
        if self.state == WaitState::Idle {
            self.started = Some(now);
            self.transition(WaitState::Polling);
        }
    }

    /// Time since `begin`, zero while idle
    pub fn elapsed(&self, now: Instant) -> Duration {
        self.started
            .map(|started| now.saturating_duration_since(started))
            .unwrap_or_default()
    }

    /// Record the result of one capture+match attempt.
    ///
    /// A hit finishes with `Found`. A miss finishes with `TimedOut` once the
    /// elapsed time reaches the timeout, otherwise asks the driver to sleep
    /// `min(poll_interval, remaining)`. Once finished the machine keeps
    /// reporting the same outcome.
    pub fn observe(&mut self, found: Option<T>, now: Instant) -> PollStep<T> {
        if let Some(outcome) = &self.outcome {
            return PollStep::Finish(outcome.clone());
        }
        self.begin(now);
        self.attempts += 1;

        if let Some(value) = found {
            return PollStep::Finish(self.finish(WaitOutcome::Found(value)));
        }

        let elapsed = self.elapsed(now);
        if elapsed >= self.timeout {
            let attempts = self.attempts;
            return PollStep::Finish(self.finish(WaitOutcome::TimedOut { elapsed, attempts }));
        }

        let remaining = self.timeout - elapsed;
        PollStep::Sleep(self.poll_interval.min(remaining))
    }

    /// Stop polling. Has no effect on a machine that already finished.
    pub fn cancel(&mut self, now: Instant) -> WaitOutcome<T> {
        if let Some(outcome) = &self.outcome {
            return outcome.clone();
        }
        let elapsed = self.elapsed(now);
        let attempts = self.attempts;
        self.finish(WaitOutcome::Cancelled { elapsed, attempts })
    }

    fn finish(&mut self, outcome: WaitOutcome<T>) -> WaitOutcome<T> {
        self.transition(outcome.state());
        self.outcome = Some(outcome.clone());
        outcome
    }

    fn transition(&mut self, next: WaitState) {
        log::trace!(
            "🔄 Wait state {:?} -> {:?} after {} attempt(s)",
            self.state,
            next,
            self.attempts
        );
        self.state = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn machine(timeout_ms: u64, interval_ms: u64) -> PollMachine<u32> {
        PollMachine::new(&WaitConfig::new(
            Duration::from_millis(timeout_ms),
            Duration::from_millis(interval_ms),
        ))
    }

    #[test]
    fn test_hit_on_first_attempt() {
        let t0 = Instant::now();
        let mut m = machine(1000, 50);
        assert_eq!(m.state(), WaitState::Idle);
        m.begin(t0);
        assert_eq!(m.state(), WaitState::Polling);

        assert_eq!(m.observe(Some(7), t0), PollStep::Finish(WaitOutcome::Found(7)));
        assert_eq!(m.state(), WaitState::Found);
        assert_eq!(m.attempts(), 1);
    }

    #[test]
    fn test_zero_timeout_makes_exactly_one_attempt() {
        let t0 = Instant::now();
        let mut m = machine(0, 50);
        m.begin(t0);
        assert_eq!(
            m.observe(None, t0),
            PollStep::Finish(WaitOutcome::TimedOut {
                elapsed: Duration::ZERO,
                attempts: 1
            })
        );
        assert_eq!(m.state(), WaitState::TimedOut);
    }

    #[test]
    fn test_sleep_is_capped_by_remaining_time() {
        let t0 = Instant::now();
        let mut m = machine(120, 50);
        m.begin(t0);
        assert_eq!(m.observe(None, t0), PollStep::Sleep(Duration::from_millis(50)));
        assert_eq!(
            m.observe(None, t0 + Duration::from_millis(100)),
            PollStep::Sleep(Duration::from_millis(20))
        );
        let step = m.observe(None, t0 + Duration::from_millis(120));
        assert_eq!(
            step,
            PollStep::Finish(WaitOutcome::TimedOut {
                elapsed: Duration::from_millis(120),
                attempts: 3
            })
        );
    }

    #[test]
    fn test_cancel_is_final() {
        let t0 = Instant::now();
        let mut m = machine(1000, 50);
        m.begin(t0);
        m.observe(None, t0);

        let outcome = m.cancel(t0 + Duration::from_millis(30));
        assert_eq!(
            outcome,
            WaitOutcome::Cancelled {
                elapsed: Duration::from_millis(30),
                attempts: 1
            }
        );
        // A late hit does not revive a cancelled wait
        assert_eq!(
            m.observe(Some(1), t0 + Duration::from_millis(40)),
            PollStep::Finish(outcome)
        );
        assert_eq!(m.state(), WaitState::Cancelled);
    }

    #[test]
    fn test_observe_without_begin_starts_the_clock() {
        let t0 = Instant::now();
        let mut m = machine(100, 10);
        assert_eq!(m.observe(None, t0), PollStep::Sleep(Duration::from_millis(10)));
        assert_eq!(m.elapsed(t0 + Duration::from_millis(5)), Duration::from_millis(5));
    }
}
