//! Background sweep for expired sessions.

use sqlx::SqlitePool;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Sweep configuration.
pub struct SweepConfig {
    /// Interval between sweep runs.
    pub interval: Duration,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(3600), // 1 hour
        }
    }
}

/// Run a single sweep cycle.
async fn sweep_once(pool: &SqlitePool) {
    match crate::db::delete_expired_sessions(pool).await {
        Ok(count) => {
            if count > 0 {
                tracing::info!(expired_sessions = count, "Cleaned up expired sessions");
            }
        }
        Err(e) => {
            tracing::error!("Failed to delete expired sessions: {e}");
        }
    }
}

/// Run the session sweep worker.
/// Runs once immediately on start, then at the configured interval.
/// Respects the cancellation token for graceful shutdown.
pub async fn run_session_sweep(pool: SqlitePool, config: SweepConfig, shutdown: CancellationToken) {
    tracing::info!(
        interval_secs = config.interval.as_secs(),
        "Starting session sweep"
    );

    // Run immediately on startup
    sweep_once(&pool).await;

    let mut interval = tokio::time::interval(config.interval);
    interval.tick().await; // Skip the first immediate tick (we already swept)

    loop {
        tokio::select! {
            _ = interval.tick() => {
                sweep_once(&pool).await;
            }
            _ = shutdown.cancelled() => {
                tracing::info!("Session sweep shutting down");
                break;
            }
        }
    }
}
