//! Fixed-interval "poll until predicate" with an attempt budget.

use std::future::Future;
use std::time::Duration;

/// How many times to poll, and how long to wait between polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Total fetches allowed, including the first.
    pub max_attempts: u32,
    /// Delay between consecutive fetches.
    pub interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 100,
            interval: Duration::from_millis(100),
        }
    }
}

impl PollPolicy {
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
        }
    }
}

/// How a poll loop ended when no fetch failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome<T> {
    /// The predicate held for `value` on fetch number `attempts`.
    Satisfied { value: T, attempts: u32 },
    /// Every fetch ran and none satisfied the predicate.
    Exhausted { attempts: u32 },
}

impl<T> PollOutcome<T> {
    pub fn is_satisfied(&self) -> bool {
        matches!(self, Self::Satisfied { .. })
    }
}

/// Call `fetch` sequentially until `done` accepts a value or the budget runs out.
///
/// Sleeps `policy.interval` between fetches but not after the last one.
/// The first fetch error ends the loop and is returned unchanged.
pub async fn poll_until<T, E, F, Fut, P>(
    policy: &PollPolicy,
    mut fetch: F,
    mut done: P,
) -> Result<PollOutcome<T>, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: FnMut(&T) -> bool,
{
    for attempt in 1..=policy.max_attempts {
        let value = fetch().await?;
        if done(&value) {
            return Ok(PollOutcome::Satisfied {
                value,
                attempts: attempt,
            });
        }
        if attempt < policy.max_attempts {
            tracing::trace!(attempt, interval_ms = policy.interval.as_millis() as u64, "poll: waiting");
            tokio::time::sleep(policy.interval).await;
        }
    }
    Ok(PollOutcome::Exhausted {
        attempts: policy.max_attempts,
    })
}
