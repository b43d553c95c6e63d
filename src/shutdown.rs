use anyhow::Result;
use std::future::Future;
use tracing::{info, warn};

/// Resolves once the user presses Ctrl-C.
pub async fn interrupted() -> Result<()> {
    tokio::signal::ctrl_c().await?;
    info!("Received interrupt signal");
    Ok(())
}

/// Outcome of racing a foreground task against Ctrl-C.
#[derive(Debug)]
pub enum Completion<T> {
    Finished(T),
    Interrupted,
}

/// Drive `task` until it finishes or the user interrupts.
///
/// When interrupted the task future is dropped, which kills any child process
/// it spawned with `kill_on_drop`.
pub async fn until_interrupted<F, T>(task: F) -> Completion<T>
where
    F: Future<Output = T>,
{
    tokio::select! {
        result = task => Completion::Finished(result),
        _ = interrupt_or_never() => Completion::Interrupted,
    }
}

async fn interrupt_or_never() {
    if let Err(e) = interrupted().await {
        warn!("Failed to listen for interrupt signal: {}", e);
        std::future::pending::<()>().await;
    }
}
