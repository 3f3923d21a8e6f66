//! Background retention job for cancelled orders.

use std::time::Duration;

use chrono::Utc;
use journal::OrderJournal;
use tokio::task::JoinHandle;

/// How often the retention sweep runs.
pub const PURGE_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Spawns a task that periodically purges cancelled orders older than
/// `retention_days`.
///
/// Cancelled is the only purgeable status, so active orders are never
/// touched regardless of age.
pub fn spawn_purge_task<J>(journal: J, retention_days: i64) -> JoinHandle<()>
where
    J: OrderJournal + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(PURGE_INTERVAL);
        // The first tick completes immediately; skip it so the sweep
        // starts one full interval after boot.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let cutoff = Utc::now() - chrono::Duration::days(retention_days);
            let purged = journal.purge_cancelled_before(cutoff).await;
            if purged > 0 {
                tracing::info!(purged, retention_days, "purged aged cancelled orders");
            }
        }
    })
}
