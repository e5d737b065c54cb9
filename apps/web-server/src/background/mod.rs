//! Background maintenance.

mod scheduler;

use std::sync::Arc;

use tokio_cron_scheduler::JobSchedulerError;

use behonest_core::ports::{Cache, RateLimiter};

pub use scheduler::Scheduler;

use crate::state::AppState;

/// Every ten minutes, on the minute.
pub const SWEEP_SCHEDULE: &str = "0 */10 * * * *";

/// Start the scheduler with the session sweep registered.
pub async fn start(state: &AppState) -> Result<Scheduler, JobSchedulerError> {
    let scheduler = Scheduler::new().await?;

    let cache = state.cache.clone();
    let limiter = state.auth_limiter.clone();
    scheduler
        .add_cron(SWEEP_SCHEDULE, move || sweep(cache.clone(), limiter.clone()))
        .await?;

    scheduler.start().await?;
    Ok(scheduler)
}

/// Drop expired sessions and idle rate limiter keys.
pub async fn sweep(cache: Arc<dyn Cache>, limiter: Option<Arc<dyn RateLimiter>>) {
    match cache.purge_expired().await {
        Ok(0) => tracing::debug!("Session sweep: nothing expired"),
        Ok(removed) => tracing::info!(removed, "Session sweep: purged expired entries"),
        Err(e) => tracing::error!(error = %e, "Session sweep failed"),
    }

    if let Some(limiter) = limiter {
        limiter.shrink();
    }
}
