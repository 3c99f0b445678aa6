//! Background archival sweep.

use std::time::Duration;

use chrono::Local;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, error, info, warn};

use crate::manager::SharedManager;

const MIN_PERIOD: Duration = Duration::from_secs(1);

/// Run [`EventManager::archive_sweep`](crate::manager::EventManager::archive_sweep)
/// every `period` until `shutdown` flips to true or its sender is dropped.
///
/// Each sweep first reloads the store, since other processes may have
/// added or deleted events since the last one. The first sweep happens one
/// full period after spawning.
pub fn spawn_archiver(
    manager: SharedManager,
    period: Duration,
    archive_after_years: u32,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let period = if period.is_zero() {
            warn!(fallback = ?MIN_PERIOD, "zero archive period requested");
            MIN_PERIOD
        } else {
            period
        };
        info!(?period, "starting archiver");

        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let today = Local::now().date_naive();
                    let mut manager = manager.lock().await;
                    if let Err(e) = manager.fetch_all() {
                        error!(error = %e, "could not reload events, skipping sweep");
                        continue;
                    }
                    match manager.archive_sweep(today, archive_after_years) {
                        Ok(count) => debug!(count, "archive sweep finished"),
                        Err(e) => error!(error = %e, "archive sweep failed"),
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("archiver stopped");
    })
}
