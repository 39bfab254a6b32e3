// Signal handling module
//
// Supported signals:
// - SIGTERM: Graceful shutdown
// - SIGINT:  Graceful shutdown (Ctrl+C)
// - SIGUSR1: Reopen log files after rotation

use std::sync::Arc;
use tokio::sync::Notify;

use crate::logger;

/// Register signal handlers and forward them from a background task.
///
/// | Signal  | Action              |
/// |---------|---------------------|
/// | SIGTERM | Graceful stop       |
/// | SIGINT  | Graceful stop       |
/// | SIGUSR1 | Reopen log files    |
#[cfg(unix)]
pub fn start_signal_handler(shutdown: Arc<Notify>) -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigusr1 = signal(SignalKind::user_defined1())?;

    logger::log_debug(&format!(
        "[SIGNAL] Handlers registered (SIGTERM, SIGINT, SIGUSR1), pid {}",
        std::process::id()
    ));

    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = sigterm.recv() => {
                    logger::log_info("[SIGNAL] SIGTERM received, shutting down");
                    shutdown.notify_one();
                    break;
                }
                _ = sigint.recv() => {
                    logger::log_info("[SIGNAL] SIGINT received, shutting down");
                    shutdown.notify_one();
                    break;
                }
                _ = sigusr1.recv() => {
                    match logger::reopen() {
                        Ok(()) => logger::log_info("[SIGNAL] SIGUSR1 received, log files reopened"),
                        Err(e) => logger::log_error(&format!("[SIGNAL] Failed to reopen log files: {e}")),
                    }
                }
            }
        }
    });
    Ok(())
}

/// Non-Unix fallback - only handles Ctrl+C
#[cfg(not(unix))]
pub fn start_signal_handler(shutdown: Arc<Notify>) -> std::io::Result<()> {
    tokio::spawn(async move {
        if let Ok(()) = tokio::signal::ctrl_c().await {
            logger::log_info("[SIGNAL] Ctrl+C received, shutting down");
            shutdown.notify_one();
        }
    });
    Ok(())
}
