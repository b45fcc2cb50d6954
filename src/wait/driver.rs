//! Poll drivers: a blocking loop for thread-per-call use and a tokio loop.
//! Both feed the same `PollMachine`.

use super::cancel::CancelToken;
use super::machine::{PollMachine, PollStep};
use super::timer::{ThreadTimer, Timer};
use super::types::{WaitConfig, WaitOutcome};
use crate::capture::{CaptureSource, Frame};
use crate::error::VisionResult;
use crate::geometry::Region;
use crate::image_store::Pattern;
use crate::matcher::{Match, MatchEngine};
use std::sync::Arc;
use std::time::Instant;

/// Result of one capture+match attempt
enum Probe<T> {
    Done(Option<T>),
    Cancelled,
}

/// Capture `region`, retrying transient failures up to `capture_retries` times
/// in total with `retry_delay` between attempts.
///
/// Returns `Ok(None)` when cancelled between retries.
pub(crate) fn capture_with_retries(
    source: &dyn CaptureSource,
    region: Region,
    config: &WaitConfig,
    cancel: &CancelToken,
) -> VisionResult<Option<Frame>> {
    let attempts = config.capture_retries.max(1);
    let mut attempt = 1;
    loop {
        match source.capture(region) {
            Ok(frame) => return Ok(Some(frame)),
            Err(e) if e.is_transient() && attempt < attempts => {
                log::warn!(
                    "⚠️ Capture of {} failed: {}. Retrying ({}/{})",
                    region,
                    e,
                    attempt,
                    attempts
                );
                if cancel.sleep(config.retry_delay) {
                    return Ok(None);
                }
                attempt += 1;
            }
            Err(e) => return Err(e.with_attempts(attempt)),
        }
    }
}

fn probe_once<T>(
    source: &dyn CaptureSource,
    region: Region,
    config: &WaitConfig,
    cancel: &CancelToken,
    evaluate: impl FnOnce(Frame) -> Option<T>,
) -> VisionResult<Probe<T>> {
    let frame = match capture_with_retries(source, region, config, cancel)? {
        Some(frame) => frame,
        None => return Ok(Probe::Cancelled),
    };
    if cancel.is_cancelled() {
        return Ok(Probe::Cancelled);
    }
    Ok(Probe::Done(evaluate(frame)))
}

fn poll_blocking<T: Clone>(
    timer: &impl Timer,
    config: &WaitConfig,
    cancel: &CancelToken,
    mut attempt: impl FnMut() -> VisionResult<Probe<T>>,
) -> VisionResult<WaitOutcome<T>> {
    let mut machine = PollMachine::new(config);
    machine.begin(timer.now());
    loop {
        if cancel.is_cancelled() {
            return Ok(machine.cancel(timer.now()));
        }
        let found = match attempt()? {
            Probe::Done(found) => found,
            Probe::Cancelled => return Ok(machine.cancel(timer.now())),
        };
        match machine.observe(found, timer.now()) {
            PollStep::Sleep(delay) => {
                if timer.sleep(delay, cancel) {
                    return Ok(machine.cancel(timer.now()));
                }
            }
            PollStep::Finish(outcome) => return Ok(outcome),
        }
    }
}

fn log_outcome<T>(pattern: &Pattern, outcome: &WaitOutcome<T>) {
    match outcome {
        WaitOutcome::Found(_) => log::debug!("✅ Wait for '{}' succeeded", pattern.name()),
        WaitOutcome::TimedOut { elapsed, attempts } => log::debug!(
            "⏰ Wait for '{}' timed out after {:?} ({} attempts)",
            pattern.name(),
            elapsed,
            attempts
        ),
        WaitOutcome::Cancelled { elapsed, .. } => {
            log::debug!("🛑 Wait for '{}' cancelled after {:?}", pattern.name(), elapsed)
        }
    }
}

/// Block the calling thread until `pattern` appears in `region`, the timeout
/// passes or `cancel` fires.
pub fn wait_for(
    source: &dyn CaptureSource,
    region: Region,
    pattern: &Pattern,
    engine: &MatchEngine,
    config: &WaitConfig,
    cancel: &CancelToken,
) -> VisionResult<WaitOutcome> {
    wait_for_with_timer(&ThreadTimer, source, region, pattern, engine, config, cancel)
}

/// [`wait_for`] with an explicit timer
pub fn wait_for_with_timer(
    timer: &impl Timer,
    source: &dyn CaptureSource,
    region: Region,
    pattern: &Pattern,
    engine: &MatchEngine,
    config: &WaitConfig,
    cancel: &CancelToken,
) -> VisionResult<WaitOutcome> {
    log::debug!(
        "⏳ Waiting for '{}' in {} (timeout {:?}, every {:?})",
        pattern.name(),
        region,
        config.timeout,
        config.poll_interval
    );
    let outcome = poll_blocking(timer, config, cancel, || {
        probe_once(source, region, config, cancel, |frame| {
            engine.find_best(frame, pattern)
        })
    })?;
    log_outcome(pattern, &outcome);
    Ok(outcome)
}

/// Block until `pattern` is no longer visible in `region`.
///
/// `Found(())` means the pattern disappeared.
pub fn wait_vanish(
    source: &dyn CaptureSource,
    region: Region,
    pattern: &Pattern,
    engine: &MatchEngine,
    config: &WaitConfig,
    cancel: &CancelToken,
) -> VisionResult<WaitOutcome<()>> {
    log::debug!("⏳ Waiting for '{}' to vanish from {}", pattern.name(), region);
    let outcome = poll_blocking(&ThreadTimer, config, cancel, || {
        probe_once(source, region, config, cancel, |frame| {
            engine.find_best(frame, pattern).is_none().then_some(())
        })
    })?;
    log_outcome(pattern, &outcome);
    Ok(outcome)
}

/// Async [`wait_for`]. Capture and matching run on the blocking pool; the
/// task only suspends while sleeping between attempts.
pub async fn wait_for_async(
    source: Arc<dyn CaptureSource>,
    region: Region,
    pattern: Pattern,
    engine: MatchEngine,
    config: WaitConfig,
    cancel: CancelToken,
) -> VisionResult<WaitOutcome> {
    log::debug!(
        "⏳ Waiting (async) for '{}' in {} (timeout {:?}, every {:?})",
        pattern.name(),
        region,
        config.timeout,
        config.poll_interval
    );
    let mut machine: PollMachine<Match> = PollMachine::new(&config);
    machine.begin(Instant::now());

    let outcome = loop {
        if cancel.is_cancelled() {
            break machine.cancel(Instant::now());
        }

        let probe = {
            let source = Arc::clone(&source);
            let pattern = pattern.clone();
            let engine = engine.clone();
            let cancel = cancel.clone();
            let config = config.clone();
            tokio::task::spawn_blocking(move || {
                probe_once(source.as_ref(), region, &config, &cancel, |frame| {
                    engine.find_best(frame, &pattern)
                })
            })
            .await??
        };

        let found = match probe {
            Probe::Done(found) => found,
            Probe::Cancelled => break machine.cancel(Instant::now()),
        };
        match machine.observe(found, Instant::now()) {
            PollStep::Sleep(delay) => {
                if cancel.sleep_async(delay).await {
                    break machine.cancel(Instant::now());
                }
            }
            PollStep::Finish(outcome) => break outcome,
        }
    };

    log_outcome(&pattern, &outcome);
    Ok(outcome)
}
