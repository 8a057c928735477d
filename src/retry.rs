use std::time::Duration;

/// Bounded retry schedule for out-of-band batch delivery.
///
/// `attempts` is the total number of tries (at least 1). `delays` holds the
/// wait before each re-attempt; when more re-attempts remain than delays,
/// the last delay repeats. The queue worker's retries and the handler's
/// one-shot fallback are independent layers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    attempts: u32,
    delays: Vec<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            delays: vec![
                Duration::from_secs(5),
                Duration::from_secs(10),
                Duration::from_secs(20),
            ],
        }
    }
}

impl RetryPolicy {
    pub fn new(attempts: u32, delays: Vec<Duration>) -> Self {
        Self {
            attempts: attempts.max(1),
            delays,
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn delays(&self) -> &[Duration] {
        &self.delays
    }

    /// Wait before the next try, given how many tries have failed so far.
    /// Returns `None` once the attempt budget is exhausted.
    pub fn delay_before(&self, failed_attempts: u32) -> Option<Duration> {
        if failed_attempts == 0 || failed_attempts >= self.attempts {
            return None;
        }
        let index = ((failed_attempts - 1) as usize).min(self.delays.len().saturating_sub(1));
        Some(self.delays.get(index).copied().unwrap_or(Duration::ZERO))
    }
}
