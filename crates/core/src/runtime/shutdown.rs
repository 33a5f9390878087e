use tokio::signal;
use tokio_util::sync::CancellationToken;

/// Graceful shutdown via CancellationToken, cancelled on SIGTERM or
/// Ctrl+C. Long-lived tasks (engine loop, voice listener) monitor the
/// token and drain on cancellation.
#[derive(Debug, Default)]
pub struct ShutdownGuard {
    token: CancellationToken,
}

impl ShutdownGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cancellation token all tasks should monitor.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Spawn a background task that watches for OS signals and triggers
    /// cancellation.
    pub fn spawn_signal_listener(&self) {
        let token = self.token.clone();
        tokio::spawn(async move {
            #[cfg(unix)]
            {
                let mut sigterm =
                    match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                        Ok(s) => s,
                        Err(e) => {
                            tracing::warn!(error = %e, "failed to register SIGTERM handler");
                            return;
                        }
                    };
                tokio::select! {
                    _ = sigterm.recv() => {
                        tracing::info!("received SIGTERM, initiating shutdown");
                    }
                    result = signal::ctrl_c() => {
                        if result.is_err() {
                            return;
                        }
                        tracing::info!("received Ctrl+C, initiating shutdown");
                    }
                }
            }
            #[cfg(not(unix))]
            {
                if signal::ctrl_c().await.is_err() {
                    return;
                }
                tracing::info!("received Ctrl+C, initiating shutdown");
            }
            token.cancel();
        });
    }
}
