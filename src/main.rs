mod views;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use mote::config::Config;
use mote::diagnostic;
use mote::server::Server;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Config::load()?;

    let stop = Arc::new(AtomicBool::new(false));
    tokio::spawn({
        let stop = Arc::clone(&stop);
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Shutdown signal received");
                stop.store(true, Ordering::Relaxed);
            }
        }
    });

    // A fatal transport error resets the serving loop, like a device reboot.
    while !stop.load(Ordering::Relaxed) {
        let mut server = Server::new(cfg.server.clone());
        views::register(&mut server, &cfg);

        tracing::info!(listen = %cfg.server.listen_addr(), routes = server.router().len(), "Starting server");

        let continuation = || !stop.load(Ordering::Relaxed);
        if let Err(e) = server.activate(continuation).await {
            let err = anyhow::Error::new(e).context("serving loop failed");
            tracing::error!(error = ?err, "Fatal error, restarting");

            if let Err(log_err) = diagnostic::persist(&cfg.error_log, &err) {
                tracing::warn!(error = %log_err, "Could not persist diagnostic");
            }
            tokio::time::sleep(cfg.restart_delay()).await;
        }
    }

    Ok(())
}
