// Copyright 2024-2026 Model Vault Contributors
// SPDX-License-Identifier: Apache-2.0

//! Optional background refresh.
//!
//! The lazy `ensure_fresh` on every request is what keeps the cache
//! correct. This task only warms the cache ahead of traffic so the first
//! request after a promotion does not pay for the reload.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use super::cache::{RefreshOutcome, ServingCache};

/// Spawn a task calling `ensure_fresh` every `every` until `shutdown` is
/// notified. The blocking refresh runs on the blocking pool.
pub fn spawn_refresher(
    cache: Arc<ServingCache>,
    every: Duration,
    shutdown: Arc<Notify>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = shutdown.notified() => {
                    debug!("refresher stopping");
                    break;
                }
                _ = ticker.tick() => {
                    let cache = Arc::clone(&cache);
                    match tokio::task::spawn_blocking(move || cache.ensure_fresh()).await {
                        Ok(RefreshOutcome::Unchanged) => {}
                        Ok(outcome) => info!(?outcome, "background refresh"),
                        Err(e) => warn!(error = %e, "refresh task failed"),
                    }
                }
            }
        }
    })
}
