//! Run Poller — waits for an asynchronous assistant run to reach a terminal
//! state, bounded by a timeout and interruptible by cancellation.

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::analysis::client::{AssistantsApi, RunStatus};

#[derive(Debug, Clone, Copy)]
pub struct PollConfig {
    /// Overall budget; once elapsed, the run is abandoned as timed out.
    pub timeout: Duration,
    /// Delay between status fetches.
    pub interval: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            interval: Duration::from_secs(1),
        }
    }
}

/// How a polling loop ended. `TimedOut` is a local decision — the remote run
/// may still complete after we stop watching it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    Failed(RunStatus),
    TimedOut,
    Cancelled,
}

/// Polls the run until it completes, fails, times out, or the invocation is
/// cancelled. A transport or parse error while fetching status is a tick that
/// did not advance the state machine: it is logged and retried on the next
/// interval, with the timeout bounding how long that can go on.
pub async fn poll_run(
    api: &dyn AssistantsApi,
    thread_id: &str,
    run_id: &str,
    config: PollConfig,
    cancel: &CancellationToken,
) -> RunOutcome {
    let started = Instant::now();

    loop {
        if started.elapsed() >= config.timeout {
            return RunOutcome::TimedOut;
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return RunOutcome::Cancelled,
            fetched = api.run_status(thread_id, run_id) => match fetched {
                Ok(RunStatus::Completed) => return RunOutcome::Completed,
                Ok(status) if status.is_terminal_failure() => {
                    return RunOutcome::Failed(status);
                }
                Ok(status) => debug!(run_id, ?status, "run not finished yet"),
                Err(e) => warn!(run_id, error = %e, "run status fetch failed"),
            },
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return RunOutcome::Cancelled,
            _ = tokio::time::sleep(config.interval) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::analysis::mock::MockApi;

    fn config(timeout_secs: u64) -> PollConfig {
        PollConfig {
            timeout: Duration::from_secs(timeout_secs),
            interval: Duration::from_secs(1),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_completed_status_maps_to_completed() {
        let api = MockApi::default();
        api.script_statuses([Ok(RunStatus::Completed)]);

        let outcome = poll_run(&api, "t1", "r1", config(60), &CancellationToken::new()).await;
        assert_eq!(outcome, RunOutcome::Completed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_terminal_failure_statuses_map_to_failed() {
        for status in [RunStatus::Failed, RunStatus::Cancelled, RunStatus::Expired] {
            let api = MockApi::default();
            api.script_statuses([Ok(status)]);

            let outcome = poll_run(&api, "t1", "r1", config(60), &CancellationToken::new()).await;
            assert_eq!(outcome, RunOutcome::Failed(status));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_through_non_terminal_statuses() {
        let api = MockApi::default();
        api.script_statuses([
            Ok(RunStatus::Queued),
            Ok(RunStatus::InProgress),
            Ok(RunStatus::Completed),
        ]);

        let outcome = poll_run(&api, "t1", "r1", config(60), &CancellationToken::new()).await;
        assert_eq!(outcome, RunOutcome::Completed);
        assert_eq!(api.call_count("run_status"), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_errors_are_retried_until_success() {
        let api = MockApi::default();
        api.script_statuses([Err(()), Err(()), Ok(RunStatus::Completed)]);

        let outcome = poll_run(&api, "t1", "r1", config(60), &CancellationToken::new()).await;
        assert_eq!(outcome, RunOutcome::Completed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out_when_no_terminal_status_observed() {
        // Scripted queue empty: the mock keeps answering `in_progress`.
        let api = MockApi::default();

        let outcome = poll_run(&api, "t1", "r1", config(3), &CancellationToken::new()).await;
        assert_eq!(outcome, RunOutcome::TimedOut);
        // Polls at t=0s, 1s, 2s; the t=3s loop entry trips the timeout first.
        assert_eq!(api.call_count("run_status"), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_persistent_fetch_errors_count_toward_timeout() {
        let api = MockApi::default();
        api.script_statuses([Err(()), Err(()), Err(()), Err(())]);

        let outcome = poll_run(&api, "t1", "r1", config(3), &CancellationToken::new()).await;
        assert_eq!(outcome, RunOutcome::TimedOut);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_interrupts_the_wait() {
        let api = Arc::new(MockApi::default());
        let cancel = CancellationToken::new();

        let handle = {
            let api = api.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move { poll_run(api.as_ref(), "t1", "r1", config(60), &cancel).await })
        };

        // Let the poller take its first tick, then cancel mid-sleep.
        tokio::time::sleep(Duration::from_millis(100)).await;
        cancel.cancel();

        let outcome = handle.await.unwrap();
        assert_eq!(outcome, RunOutcome::Cancelled);
        // Cancelled during the first interval sleep: exactly one fetch happened.
        assert_eq!(api.call_count("run_status"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_already_cancelled_token_returns_before_fetching() {
        let api = MockApi::default();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let outcome = poll_run(&api, "t1", "r1", config(60), &cancel).await;
        assert_eq!(outcome, RunOutcome::Cancelled);
        assert_eq!(api.call_count("run_status"), 0);
    }
}
