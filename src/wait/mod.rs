//! Wait/poll controller: repeat capture+match until a pattern shows up, the
//! timeout passes or the caller cancels.
//!
//! State flow: `Idle -> Polling -> {Found, TimedOut, Cancelled}`.

pub mod cancel;
pub mod driver;
pub mod machine;
pub mod timer;
pub mod types;


pub use cancel::CancelToken;
pub use driver::{wait_for, wait_for_async, wait_for_with_timer, wait_vanish};
pub use machine::{PollMachine, PollStep};
pub use timer::{ThreadTimer, Timer};
pub use types::{WaitConfig, WaitOutcome, WaitState};
