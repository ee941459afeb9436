//! Bounded polling for page conditions.
//!
//! Every wait against a live page goes through [`wait_until`] so a hung or
//! slow page can never stall a check cycle past its configured bound.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

/// Default interval between condition evaluations.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Result of a bounded wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The condition held before the deadline.
    Ready,
    /// The deadline passed without the condition holding.
    TimedOut,
}

impl WaitOutcome {
    #[must_use]
    pub fn is_ready(self) -> bool {
        matches!(self, WaitOutcome::Ready)
    }
}

/// Polls `condition` every `poll_interval` until it returns `true` or
/// `timeout` elapses.
///
/// The condition is always evaluated at least once, even with a zero
/// timeout. A single evaluation that outlives the deadline (a hung CDP call,
/// for example) is cut off and counts as [`WaitOutcome::TimedOut`].
pub async fn wait_until<F, Fut>(
    timeout: Duration,
    poll_interval: Duration,
    mut condition: F,
) -> WaitOutcome
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let started = Instant::now();
    let deadline = started + timeout;

    loop {
        // Give each evaluation at least one poll interval so a zero timeout
        // still gets a real attempt.
        let eval_deadline = deadline.max(Instant::now() + poll_interval);
        match tokio::time::timeout_at(eval_deadline, condition()).await {
            Ok(true) => return WaitOutcome::Ready,
            Ok(false) => {}
            Err(_) => {
                tracing::debug!(
                    elapsed_ms = started.elapsed().as_millis(),
                    "condition evaluation exceeded wait bound"
                );
                return WaitOutcome::TimedOut;
            }
        }

        let now = Instant::now();
        if now >= deadline {
            return WaitOutcome::TimedOut;
        }
        tokio::time::sleep(poll_interval.min(deadline - now)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn ready_immediately_when_condition_holds() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let outcome = wait_until(Duration::from_secs(5), Duration::from_millis(100), || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                true
            }
        })
        .await;
        assert_eq!(outcome, WaitOutcome::Ready);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn ready_after_several_polls() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let outcome = wait_until(Duration::from_secs(5), Duration::from_millis(100), || {
            let c = Arc::clone(&c);
            async move { c.fetch_add(1, Ordering::SeqCst) >= 3 }
        })
        .await;
        assert!(outcome.is_ready());
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn times_out_when_condition_never_holds() {
        let started = Instant::now();
        let outcome = wait_until(Duration::from_secs(2), Duration::from_millis(250), || async {
            false
        })
        .await;
        assert_eq!(outcome, WaitOutcome::TimedOut);
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(2), "elapsed: {elapsed:?}");
        assert!(elapsed < Duration::from_secs(3), "elapsed: {elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn zero_timeout_still_evaluates_once() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let outcome = wait_until(Duration::ZERO, Duration::from_millis(100), || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                false
            }
        })
        .await;
        assert_eq!(outcome, WaitOutcome::TimedOut);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn hung_condition_is_cut_off_at_deadline() {
        let outcome = wait_until(Duration::from_secs(1), Duration::from_millis(100), || {
            std::future::pending::<bool>()
        })
        .await;
        assert_eq!(outcome, WaitOutcome::TimedOut);
    }
}
