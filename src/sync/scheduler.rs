use std::time::Duration;
use tokio::time::interval;

use crate::common::AppState;
use crate::entity::sync_runs::SyncTrigger;
use crate::sync::{sync_alerts, sync_plants};

/// Run the plant sync task on a schedule.
///
/// Ticks every minute; per-org interval alignment inside the sync decides
/// which vendors are actually due, so the tick itself stays cheap.
pub async fn run_plant_sync(state: AppState) {
    let tick_secs = state.config.plant_sync_tick_seconds;

    tracing::info!(tick_secs, "Starting plant sync scheduler");

    let mut ticker = interval(Duration::from_secs(tick_secs));

    // Run initial check immediately
    ticker.tick().await;

    loop {
        if let Err(e) = sync_plants(&state, SyncTrigger::Schedule).await {
            tracing::error!(error = %e, "Scheduled plant sync failed");
        }

        // Wait for next tick
        ticker.tick().await;
    }
}

/// Run the alert sync task on a schedule.
pub async fn run_alert_sync(state: AppState) {
    let interval_secs = state.config.alert_sync_interval_seconds;

    tracing::info!(interval_secs, "Starting alert sync scheduler");

    let mut ticker = interval(Duration::from_secs(interval_secs));

    // Run initial sync immediately
    ticker.tick().await;

    loop {
        if let Err(e) = sync_alerts(&state, SyncTrigger::Schedule).await {
            tracing::error!(error = %e, "Scheduled alert sync failed");
        }

        // Wait for next tick
        ticker.tick().await;
    }
}
