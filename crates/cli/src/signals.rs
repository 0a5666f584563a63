use tokio_util::sync::CancellationToken;
use tracing::info;

/// Wait for SIGINT or SIGTERM and trigger the cancellation token.
///
/// Cancellation is cooperative: the dispatcher stops handing out new
/// targets, records the run as interrupted, and lets scans already in
/// flight finish. A second signal therefore still does not kill the engine;
/// impatient operators can do that themselves.
pub async fn cancel_on_signal(cancel: CancellationToken) -> std::io::Result<()> {
    #[cfg(unix)]
    {
        let mut terminate =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
        tokio::select! {
            res = tokio::signal::ctrl_c() => res?,
            _ = terminate.recv() => {}
        }
    }
    #[cfg(not(unix))]
    tokio::signal::ctrl_c().await?;

    info!("shutdown signal received, no new scans will start");
    cancel.cancel();
    Ok(())
}
