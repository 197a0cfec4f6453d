use crate::core::config::UpsConfig;
use crate::core::status::UpsStatus;
use crate::infrastructure::upsc::StatusSource;
use crate::services::notifier::Notifier;
use chrono::Local;
use tokio::sync::watch;
use tracing::{debug, error, info};

/// The polling loop. Owns the last observed status, reads the current one each
/// cycle, and notifies on every transition. The state starts at the `NONE` sentinel,
/// so the first real reading always counts as a transition.
pub struct WatchLoop<S, N> {
    config: UpsConfig,
    source: S,
    notifier: Option<N>,
    last: UpsStatus,
}

impl<S: StatusSource, N: Notifier> WatchLoop<S, N> {
    pub fn new(config: UpsConfig, source: S, notifier: Option<N>) -> Self {
        Self {
            config,
            source,
            notifier,
            last: UpsStatus::none(),
        }
    }

    pub fn last(&self) -> &UpsStatus {
        &self.last
    }

    pub fn notifier(&self) -> Option<&N> {
        self.notifier.as_ref()
    }

    /// One polling cycle: read, compare, notify on change, record.
    ///
    /// A failed notification is logged and otherwise ignored; `last` is updated
    /// regardless, so the same transition is never re-notified. The next detected
    /// change makes a fresh, independent attempt.
    pub async fn poll_once(&mut self) {
        let status = self.source.read_status(&self.config.name).await;
        debug!("UPS status: {}", status);

        if status == self.last {
            return;
        }

        info!("UPS status changed from {} to {}", self.last, status);

        if let Some(notifier) = &self.notifier {
            let subject = format!("UPS status changed to {}", status);
            let body = format!(
                "UPS {} status changed from {} to {} at {}",
                self.config.name,
                self.last,
                status,
                Local::now().format("%Y-%m-%d %H:%M:%S"),
            );
            if let Err(e) = notifier.notify(&subject, &body).await {
                error!("Failed to send notification: {:#}", e);
            }
        }

        self.last = status;
    }

    /// Poll at the configured interval until the shutdown channel fires. The sleep
    /// itself is cancellable, so shutdown is honored mid-interval.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) {
        info!(
            "Watching UPS {} every {}s",
            self.config.name,
            self.config.poll_interval.as_secs()
        );
        if self.notifier.is_none() {
            info!("No recipient configured, email notification disabled");
        }

        let mut interval = tokio::time::interval(self.config.poll_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => self.poll_once().await,
                _ = shutdown.changed() => {
                    info!("Shutdown requested, stopping watch loop");
                    return;
                }
            }
        }
    }
}
