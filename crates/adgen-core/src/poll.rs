//! Poll policy for long-running remote jobs

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How the delay between status checks grows
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Backoff {
    /// Same delay before every check
    Fixed,
    /// Delay grows by `step` per check, capped at `max`
    Linear { step: Duration, max: Duration },
    /// Delay multiplies by `factor` per check, capped at `max`
    Exponential { factor: f64, max: Duration },
}

/// Bounded polling schedule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
    pub backoff: Backoff,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            max_attempts: 90,
            backoff: Backoff::Fixed,
        }
    }
}

impl PollPolicy {
    /// Fixed-interval policy
    pub fn fixed(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
            backoff: Backoff::Fixed,
        }
    }

    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Delay before status check number `attempt` (1-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let n = attempt.saturating_sub(1);
        match self.backoff {
            Backoff::Fixed => self.interval,
            Backoff::Linear { step, max } => {
                let grown = self.interval.saturating_add(step.saturating_mul(n));
                grown.min(max)
            }
            Backoff::Exponential { factor, max } => {
                let exponent = i32::try_from(n).unwrap_or(i32::MAX);
                let secs = self.interval.as_secs_f64() * factor.max(1.0).powi(exponent);
                if !secs.is_finite() || secs >= max.as_secs_f64() {
                    max
                } else {
                    Duration::from_secs_f64(secs)
                }
            }
        }
    }

    /// Upper bound on total sleeping time before a stall is reported
    pub fn total_budget(&self) -> Duration {
        let mut total = Duration::ZERO;
        let mut previous = None;
        for attempt in 1..=self.max_attempts {
            let delay = self.delay_for(attempt);
            // Delays never shrink; once they plateau the rest is a multiple
            if previous == Some(delay) {
                let remaining = self.max_attempts - attempt + 1;
                return total.saturating_add(delay.saturating_mul(remaining));
            }
            total = total.saturating_add(delay);
            previous = Some(delay);
        }
        total
    }
}
