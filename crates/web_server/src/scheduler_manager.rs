use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use notification_services::NotificationScheduler;
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::info;

/// Runs the notification sweep on a fixed interval in the background.
/// The interval is only a rate limiter; idempotency comes from the
/// delivery log, so the periodic run and the manual admin trigger can
/// overlap a day without double-sending.
pub struct SchedulerManager {
    scheduler: Arc<NotificationScheduler>,
    sweep_interval: Duration,
    handle: Option<JoinHandle<()>>,
}

impl SchedulerManager {
    /// Creates a manager that is not yet running
    pub fn new(scheduler: Arc<NotificationScheduler>, sweep_interval: Duration) -> Self {
        Self {
            scheduler,
            sweep_interval,
            handle: None,
        }
    }

    /// Starts the periodic sweep loop in a background task
    pub fn start(&mut self) {
        info!(
            "Starting notification sweep loop, interval {:?}",
            self.sweep_interval
        );

        let scheduler = self.scheduler.clone();
        let sweep_interval = self.sweep_interval;

        let handle = tokio::spawn(async move {
            let mut tick = interval(sweep_interval);

            loop {
                tick.tick().await;

                let today = Utc::now().date_naive();
                let summary = scheduler.run_sweep(today).await;
                info!(
                    "Periodic sweep for {}: {} sent, {} errors",
                    today, summary.sent, summary.errors
                );
            }
        });

        self.handle = Some(handle);
    }

    /// Stops the sweep loop
    pub async fn stop(&mut self) {
        info!("Stopping notification sweep loop");

        if let Some(handle) = self.handle.take() {
            handle.abort();
            let _ = handle.await;
        }
    }
}

impl Drop for SchedulerManager {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
