use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::browser::driver::Driver;

/// Fixed attempt count with a fixed pause between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub interval_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            interval_ms: 500,
        }
    }
}

/// Every attempt failed.
#[derive(Debug, Clone, PartialEq)]
pub struct Exhausted<E> {
    pub attempts: u32,
    /// `None` when the policy allowed zero attempts.
    pub last_error: Option<E>,
}

impl<E: fmt::Display> fmt::Display for Exhausted<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.last_error {
            Some(e) => write!(f, "gave up after {} attempts: {}", self.attempts, e),
            None => write!(f, "gave up after {} attempts", self.attempts),
        }
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for Exhausted<E> {}

/// Something that can wait between attempts.
pub trait Pause {
    fn pause(&mut self, ms: u64);
}

impl<D: Driver + ?Sized> Pause for D {
    fn pause(&mut self, ms: u64) {
        self.wait_idle(ms);
    }
}

/// Run `op` until it succeeds or the policy is exhausted. `op` receives the
/// context and the 1-based attempt number; the pause runs only between
/// attempts.
pub fn retry<C, T, E, F>(ctx: &mut C, policy: &RetryPolicy, mut op: F) -> Result<T, Exhausted<E>>
where
    C: Pause + ?Sized,
    F: FnMut(&mut C, u32) -> Result<T, E>,
    E: fmt::Display,
{
    let mut last_error = None;
    for attempt in 1..=policy.max_attempts {
        match op(ctx, attempt) {
            Ok(value) => return Ok(value),
            Err(e) => {
                debug!(attempt, max = policy.max_attempts, error = %e, "attempt failed");
                last_error = Some(e);
            }
        }
        if attempt < policy.max_attempts {
            ctx.pause(policy.interval_ms);
        }
    }
    Err(Exhausted {
        attempts: policy.max_attempts,
        last_error,
    })
}
