//! Bounded polling

use std::future::Future;
use std::time::Duration;

/// Result of [`poll_until`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollOutcome<T> {
    /// Last value observed
    pub value: T,
    /// Fetches performed
    pub attempts: u32,
    /// Whether `value` is no longer pending
    pub converged: bool,
}

/// Fetch until `pending` returns false or `attempts` fetches have been made
///
/// `interval` is waited between fetches, never before the first one. At least
/// one fetch is always made. On the cap the last value is returned with
/// `converged == false`; that is not an error.
pub async fn poll_until<T, E, F, Fut, P>(
    attempts: u32,
    interval: Duration,
    mut fetch: F,
    pending: P,
) -> Result<PollOutcome<T>, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&T) -> bool,
{
    let cap = attempts.max(1);
    let mut value = fetch().await?;
    let mut made = 1;

    while pending(&value) && made < cap {
        if !interval.is_zero() {
            tokio::time::sleep(interval).await;
        }
        value = fetch().await?;
        made += 1;
    }

    let converged = !pending(&value);
    Ok(PollOutcome {
        value,
        attempts: made,
        converged,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_stops_when_value_settles() {
        let calls = AtomicU32::new(0);
        let outcome = poll_until(
            11,
            Duration::ZERO,
            || async { Ok::<_, ()>(calls.fetch_add(1, Ordering::SeqCst) + 1) },
            |n| *n < 3,
        )
        .await
        .unwrap();

        assert_eq!(outcome.value, 3);
        assert_eq!(outcome.attempts, 3);
        assert!(outcome.converged);
    }

    #[tokio::test]
    async fn test_cap_counts_total_fetches() {
        let calls = AtomicU32::new(0);
        let outcome = poll_until(
            11,
            Duration::ZERO,
            || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, ()>("PENDING")
            },
            |s| *s == "PENDING",
        )
        .await
        .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 11);
        assert_eq!(outcome.attempts, 11);
        assert!(!outcome.converged);
        assert_eq!(outcome.value, "PENDING");
    }

    #[tokio::test]
    async fn test_fetch_error_stops_polling() {
        let calls = AtomicU32::new(0);
        let result = poll_until(
            5,
            Duration::ZERO,
            || async {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                if n == 1 {
                    Err("boom")
                } else {
                    Ok(0)
                }
            },
            |_| true,
        )
        .await;

        assert_eq!(result.unwrap_err(), "boom");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_between_fetches() {
        let start = tokio::time::Instant::now();
        let calls = AtomicU32::new(0);
        poll_until(
            3,
            Duration::from_secs(10),
            || async { Ok::<_, ()>(calls.fetch_add(1, Ordering::SeqCst)) },
            |_| true,
        )
        .await
        .unwrap();

        assert_eq!(start.elapsed(), Duration::from_secs(20));
    }
}
