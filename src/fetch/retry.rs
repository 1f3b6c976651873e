//! Bounded retry with exponential backoff.

use std::thread;
use std::time::Duration;

use crate::errors::{MediaError, MediaResult};

/// Exponential backoff shape: `base * 2^attempt`.
#[derive(Debug, Clone, Copy)]
pub struct Backoff {
    base: Duration,
}

impl Backoff {
    /// Create a backoff starting at `base`, doubling each attempt.
    pub fn new(base: Duration) -> Self {
        Self { base }
    }

    /// Backoff starting at the given number of seconds.
    pub fn from_secs(secs: u64) -> Self {
        Self::new(Duration::from_secs(secs))
    }

    /// Delay before retrying after the given zero-based attempt.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.base.saturating_mul(factor)
    }
}

/// Run `op` up to `attempts` times, sleeping with backoff between tries.
///
/// Only errors matching `is_retryable` are retried; anything else is
/// returned immediately. After the final attempt the last error is
/// returned unchanged, so the caller sees exactly the documented bound.
pub fn run_with_retry<T>(
    attempts: u32,
    backoff: Backoff,
    is_retryable: impl Fn(&MediaError) -> bool,
    mut op: impl FnMut(u32) -> MediaResult<T>,
) -> MediaResult<T> {
    debug_assert!(attempts > 0);
    let mut last_err = None;

    for attempt in 0..attempts {
        match op(attempt) {
            Ok(value) => return Ok(value),
            Err(e) if is_retryable(&e) && attempt + 1 < attempts => {
                let delay = backoff.delay_for(attempt);
                tracing::warn!(
                    "Attempt {}/{} failed ({}); retrying in {:?}",
                    attempt + 1,
                    attempts,
                    e,
                    delay
                );
                thread::sleep(delay);
                last_err = Some(e);
            }
            Err(e) if is_retryable(&e) => {
                last_err = Some(e);
            }
            Err(e) => return Err(e),
        }
    }

    Err(last_err.unwrap_or_else(|| MediaError::transient_io("retry loop ran zero attempts")))
}
