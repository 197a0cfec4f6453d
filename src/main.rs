use anyhow::Result;
use clap::Parser;
use tokio::sync::watch;
use tracing::{error, info};
use upswatch::core::cli::Cli;
use upswatch::core::config::AppConfig;
use upswatch::infrastructure::logging;
use upswatch::infrastructure::upsc::UpscStatusSource;
use upswatch::services::notifier::SmtpNotifier;
use upswatch::services::watcher::WatchLoop;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose)?;

    info!("Starting upswatch");

    // Configuration errors are fatal before the loop ever starts.
    let config = AppConfig::load(&cli.config, cli.ups)?;

    let source = UpscStatusSource::new(config.ups.command.clone(), config.ups.timeout);
    let notifier = config.email.map(SmtpNotifier::new);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    });

    let mut watcher = WatchLoop::new(config.ups, source, notifier);
    watcher.run(shutdown_rx).await;

    info!("upswatch stopped");
    Ok(())
}

#[cfg(unix)]
async fn wait_for_shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to install SIGTERM handler: {}", e);
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = sigterm.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
