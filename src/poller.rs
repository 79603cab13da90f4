//! Periodic driver that republishes the CRL once its window runs out.
//!
//! This lives outside the engine: the engine only answers "is it stale?"
//! and "publish now".

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, error, info};

use crate::crl::CrlService;

/// Runs one poll: publishes if stale and reports whether it did.
pub async fn poll_once(service: &CrlService) -> bool {
    match service.publish_if_stale().await {
        Ok(Some(publication)) => {
            info!(
                "Scheduled publication done, next update at {}",
                publication.window.next_update()
            );
            true
        }
        Ok(None) => {
            debug!("CRL still fresh, nothing to publish");
            false
        }
        Err(e) => {
            error!("Scheduled CRL publication failed: {e}");
            false
        }
    }
}

/// Spawns a task polling every `period`; failures wait for the next tick.
pub fn spawn(service: CrlService, period: Duration) -> JoinHandle<()> {
    info!("Starting CRL poller with interval of {period:?}");
    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            poll_once(&service).await;
        }
    })
}
