use crate::core::status::UpsStatus;
use async_trait::async_trait;
use std::time::Duration;
use tokio::process::Command;
use tracing::warn;

/// The NUT variable queried for the status token.
const STATUS_VARIABLE: &str = "ups.status";

/// Source of UPS status readings.
///
/// The contract is infallible: any failure to determine a status resolves to the
/// `UNKNOWN` sentinel rather than an error, so the watch loop treats reader failures
/// as just another status value.
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn read_status(&self, ups_name: &str) -> UpsStatus;
}

/// Reads the status by invoking the external `upsc` tool as
/// `<command> <ups_name> ups.status`, bounded by a timeout so a hung tool cannot
/// stall the watch loop.
pub struct UpscStatusSource {
    command: String,
    timeout: Duration,
}

impl UpscStatusSource {
    pub fn new(command: String, timeout: Duration) -> Self {
        Self { command, timeout }
    }
}

#[async_trait]
impl StatusSource for UpscStatusSource {
    async fn read_status(&self, ups_name: &str) -> UpsStatus {
        let mut cmd = Command::new(&self.command);
        cmd.arg(ups_name).arg(STATUS_VARIABLE);

        match tokio::time::timeout(self.timeout, cmd.output()).await {
            Ok(Ok(output)) if output.status.success() => {
                UpsStatus::from_raw(&String::from_utf8_lossy(&output.stdout))
            }
            Ok(Ok(output)) => {
                warn!(
                    "{} {} {} exited with {}",
                    self.command, ups_name, STATUS_VARIABLE, output.status
                );
                UpsStatus::unknown()
            }
            Ok(Err(e)) => {
                warn!("Failed to run {}: {}", self.command, e);
                UpsStatus::unknown()
            }
            Err(_) => {
                warn!(
                    "{} timed out after {}s",
                    self.command,
                    self.timeout.as_secs()
                );
                UpsStatus::unknown()
            }
        }
    }
}
