//! Bounded exponential backoff
//!
//! Confirmation polling waits between membership tests with delays that grow
//! geometrically up to a ceiling. Polling stops after `max_attempts` tests or
//! once `deadline` has elapsed, whichever comes first; the last wait is
//! shortened so that a final test happens right at the deadline.

use std::time::Duration;
use tokio::time::Instant;

/// Backoff policy for confirmation polling
#[derive(Debug, Clone, PartialEq)]
pub struct BackoffPolicy {
    /// Delay after the first failed test
    pub initial_delay: Duration,

    /// Ceiling for a single delay
    pub max_delay: Duration,

    /// Growth factor between consecutive delays
    pub multiplier: f64,

    /// Maximum number of tests, including the first
    pub max_attempts: u32,

    /// Overall time budget
    pub deadline: Duration,
}

/// Polling gave up without the probe succeeding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollExhausted {
    /// Tests performed
    pub attempts: u32,

    /// Time spent
    pub elapsed: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(10),
            multiplier: 2.0,
            max_attempts: 10,
            deadline: Duration::from_secs(60),
        }
    }
}

impl BackoffPolicy {
    /// Delay before retry number `retry` (0-based)
    ///
    /// Total for any field values: a negative product waits zero, and a
    /// non-finite or unrepresentable one waits `max_delay`.
    pub fn delay_for(&self, retry: u32) -> Duration {
        if self.initial_delay.is_zero() {
            return Duration::ZERO;
        }
        let exponent = i32::try_from(retry).unwrap_or(i32::MAX);
        let secs = self.initial_delay.as_secs_f64() * self.multiplier.powi(exponent);
        if !secs.is_finite() || secs >= self.max_delay.as_secs_f64() {
            return self.max_delay;
        }
        Duration::try_from_secs_f64(secs.max(0.0)).unwrap_or(self.max_delay)
    }

    /// Run `probe` until it returns `true` or the budget is spent
    ///
    /// Waiting is a `tokio` sleep, so other tasks keep running between tests.
    ///
    /// # Returns
    /// Number of tests performed on success
    pub async fn poll_until<F>(&self, mut probe: F) -> Result<u32, PollExhausted>
    where
        F: FnMut() -> bool,
    {
        let start = Instant::now();
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            if probe() {
                return Ok(attempts);
            }

            let elapsed = start.elapsed();
            if attempts >= self.max_attempts {
                return Err(PollExhausted { attempts, elapsed });
            }
            let remaining = match self.deadline.checked_sub(elapsed) {
                Some(remaining) if !remaining.is_zero() => remaining,
                _ => return Err(PollExhausted { attempts, elapsed }),
            };

            let delay = self.delay_for(attempts - 1).min(remaining);
            log::debug!("probe attempt {} failed, retrying in {:?}", attempts, delay);
            tokio::time::sleep(delay).await;
        }
    }
}
