use anyhow::Result;
use chrono::Local;
use tracing_subscriber::EnvFilter;

struct PidTime;

impl tracing_subscriber::fmt::time::FormatTime for PidTime {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{} [{}]",
            Local::now().format("%Y-%m-%dT%H:%M:%S%.6f"),
            std::process::id()
        )
    }
}

/// Initialize tracing output to stdout. Default level is `info`, or `debug` when
/// verbose output is requested; `RUST_LOG` overrides both.
pub fn init_logging(verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_timer(PidTime)
        .init();

    Ok(())
}
