//! Scheduled background jobs.
//!
//! Runs the periodic moderation sweep that dismisses stale abuse reports.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::interval;

/// Scheduler configuration.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Interval between report sweeps (default: 1 hour).
    pub sweep_interval: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            sweep_interval: Duration::from_secs(3600),
        }
    }
}

/// Executor trait for the report sweep job.
#[async_trait::async_trait]
pub trait SweepExecutor: Send + Sync {
    /// Dismiss stale pending reports, returning how many were dismissed.
    async fn sweep_expired_reports(&self)
    -> Result<u64, Box<dyn std::error::Error + Send + Sync>>;
}

/// Handle to a running scheduler.
///
/// Dropping the handle leaves the scheduler running; call [`stop`] to shut
/// it down.
///
/// [`stop`]: Self::stop
pub struct SchedulerHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Stop the scheduler and wait for the worker task to finish.
    pub async fn stop(self) {
        // Receiver dropping with the task also ends the loop; the send is
        // best-effort
        let _ = self.shutdown.send(true);
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "Scheduler task panicked");
        }
    }
}

/// Start the scheduler with the given configuration and executor.
///
/// The first sweep runs immediately at startup, then once per interval
/// until [`SchedulerHandle::stop`] is called. A failed sweep is logged and
/// the schedule continues.
pub fn run_scheduler<E: SweepExecutor + 'static>(
    config: SchedulerConfig,
    executor: Arc<E>,
) -> SchedulerHandle {
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

    let task = tokio::spawn(async move {
        let mut interval = interval(config.sweep_interval);
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    match executor.sweep_expired_reports().await {
                        Ok(count) => {
                            if count > 0 {
                                tracing::info!(count, "Report sweep dismissed stale reports");
                            }
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "Report sweep failed");
                        }
                    }
                }
                _ = shutdown_rx.changed() => {
                    tracing::info!("Scheduler shutting down");
                    break;
                }
            }
        }
    });

    SchedulerHandle {
        shutdown: shutdown_tx,
        task,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    struct CountingExecutor {
        runs: AtomicU64,
    }

    #[async_trait::async_trait]
    impl SweepExecutor for CountingExecutor {
        async fn sweep_expired_reports(
            &self,
        ) -> Result<u64, Box<dyn std::error::Error + Send + Sync>> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            Ok(0)
        }
    }

    #[test]
    fn test_scheduler_config_default() {
        let config = SchedulerConfig::default();
        assert_eq!(config.sweep_interval, Duration::from_secs(3600));
    }

    #[tokio::test]
    async fn test_first_sweep_runs_immediately() {
        let executor = Arc::new(CountingExecutor {
            runs: AtomicU64::new(0),
        });

        let config = SchedulerConfig {
            sweep_interval: Duration::from_secs(3600),
        };
        let handle = run_scheduler(config, executor.clone());

        // The interval's first tick fires without waiting for the period
        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.stop().await;

        assert_eq!(executor.runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_stop_ends_the_task() {
        let executor = Arc::new(CountingExecutor {
            runs: AtomicU64::new(0),
        });

        let handle = run_scheduler(SchedulerConfig::default(), executor.clone());
        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.stop().await;
        let after_stop = executor.runs.load(Ordering::SeqCst);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(executor.runs.load(Ordering::SeqCst), after_stop);
    }
}
