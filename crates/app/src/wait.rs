//! Cancellation-aware waits.
//!
//! Every sleep of the scheduler races the cancellation token against a timer;
//! cancellation wins as soon as it is observed, whatever time is left.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// How a wait ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wait {
    Elapsed,
    Cancelled,
}

/// Sleep for `duration` unless `token` is cancelled first.
///
/// A zero duration returns immediately without yielding, unless the token is
/// already cancelled.
pub async fn sleep_or_cancel(token: &CancellationToken, duration: Duration) -> Wait {
    if token.is_cancelled() {
        return Wait::Cancelled;
    }
    if duration.is_zero() {
        return Wait::Elapsed;
    }
    tokio::select! {
        biased;
        () = token.cancelled() => Wait::Cancelled,
        () = tokio::time::sleep(duration) => Wait::Elapsed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn should_elapse_when_not_cancelled() {
        let token = CancellationToken::new();
        let start = tokio::time::Instant::now();
        let wait = sleep_or_cancel(&token, Duration::from_secs(90)).await;
        assert_eq!(wait, Wait::Elapsed);
        assert_eq!(start.elapsed(), Duration::from_secs(90));
    }

    #[tokio::test(start_paused = true)]
    async fn should_return_immediately_for_zero_duration() {
        let token = CancellationToken::new();
        let start = tokio::time::Instant::now();
        assert_eq!(sleep_or_cancel(&token, Duration::ZERO).await, Wait::Elapsed);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn should_report_cancelled_when_token_already_cancelled() {
        let token = CancellationToken::new();
        token.cancel();
        assert_eq!(sleep_or_cancel(&token, Duration::ZERO).await, Wait::Cancelled);
        assert_eq!(
            sleep_or_cancel(&token, Duration::from_secs(3600)).await,
            Wait::Cancelled
        );
    }

    #[tokio::test(start_paused = true)]
    async fn should_stop_waiting_as_soon_as_cancelled() {
        let token = CancellationToken::new();
        let start = tokio::time::Instant::now();
        let (wait, ()) = tokio::join!(
            sleep_or_cancel(&token, Duration::from_secs(30 * 60)),
            async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                token.cancel();
            }
        );
        assert_eq!(wait, Wait::Cancelled);
        assert_eq!(start.elapsed(), Duration::from_secs(5));
    }
}
