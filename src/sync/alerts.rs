use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use futures::future::join_all;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
};
use std::collections::HashMap;
use std::time::Instant;
use uuid::Uuid;

use crate::common::AppState;
use crate::entity::alerts::{self, AlertStatus};
use crate::entity::sync_runs::{SyncKind, SyncTrigger};
use crate::entity::{plants, vendors};
use crate::error::AppResult;
use crate::vendor::{self, AlertRecord, AlertWindow};

use super::window::{self, RestrictedWindow};
use super::{aggregate, record_run, SyncSummary, VendorOutcome};

/// Fixed page size for the vendor alert search.
pub const ALERT_PAGE_SIZE: u32 = 100;

/// The search window never reaches further back than this.
pub const MAX_LOOKBACK_DAYS: i64 = 365;

/// Lookback when no start date is configured.
pub const DEFAULT_LOOKBACK_DAYS: i64 = 30;

/// Only inverter alerts are synced; collector and meter chatter is dropped.
const DEVICE_TYPE_FILTER: &str = "INVERTER";

/// Sync alerts from every active vendor whose adapter supports alert search.
///
/// Scheduled and cron triggers honor the restricted window; a manual trigger
/// bypasses it. Per-vendor failures are captured in the summary and never
/// abort the run.
///
/// # Errors
///
/// Returns an error only when the vendor query itself fails; everything
/// downstream is collected into the summary.
pub async fn sync_alerts(state: &AppState, trigger: SyncTrigger) -> AppResult<SyncSummary> {
    let started = Utc::now();
    let timer = Instant::now();
    let force = trigger == SyncTrigger::Manual;

    if !force {
        let restricted = RestrictedWindow::parse(&state.config.sync_restricted_window);
        if window::in_restricted_window(
            started,
            state.config.sync_utc_offset_minutes,
            restricted.as_ref(),
        ) {
            tracing::debug!("Alert sync inside restricted window; skipping");
            return Ok(SyncSummary::skipped(
                SyncKind::Alerts,
                trigger,
                "restricted window",
            ));
        }
    }

    let configured_start = parse_start_date(state.config.alert_sync_start_date.as_deref());
    let search_window = lookback_window(started, configured_start);

    let active_vendors = vendors::Entity::find()
        .filter(vendors::Column::IsActive.eq(true))
        .all(&state.db)
        .await?;

    let tasks = active_vendors.into_iter().map(|vendor| {
        let state = state.clone();
        async move { sync_vendor(&state, vendor, &search_window).await }
    });
    let results: Vec<VendorOutcome> = join_all(tasks).await.into_iter().flatten().collect();

    if results.is_empty() {
        tracing::debug!("No alert-capable vendors to sync");
        return Ok(aggregate(SyncKind::Alerts, trigger, results, 0));
    }

    let summary = aggregate(
        SyncKind::Alerts,
        trigger,
        results,
        timer.elapsed().as_millis() as u64,
    );
    record_run(&state.db, &summary, started).await;

    tracing::info!(
        total = summary.total_vendors,
        successful = summary.successful,
        failed = summary.failed,
        synced = summary.synced,
        resolved = summary.resolved,
        "Alert sync completed"
    );
    Ok(summary)
}

fn parse_start_date(configured: Option<&str>) -> Option<NaiveDate> {
    let raw = configured?.trim();
    if raw.is_empty() {
        return None;
    }
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(e) => {
            tracing::warn!(value = raw, error = %e, "Ignoring invalid ALERT_SYNC_START_DATE");
            None
        }
    }
}

/// The search window ending at `now`: the configured start date, or the
/// default lookback, with either capped at one year back.
#[must_use]
pub fn lookback_window(now: DateTime<Utc>, configured_start: Option<NaiveDate>) -> AlertWindow {
    let earliest = now - Duration::days(MAX_LOOKBACK_DAYS);
    let start = match configured_start {
        Some(date) => {
            let start = Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN));
            start.max(earliest)
        }
        None => now - Duration::days(DEFAULT_LOOKBACK_DAYS),
    };
    AlertWindow { start, end: now }
}

/// Status for a new alert: an end time means the fault already cleared.
#[must_use]
pub fn derive_status(end_time: Option<DateTime<Utc>>) -> AlertStatus {
    if end_time.is_some() {
        AlertStatus::Resolved
    } else {
        AlertStatus::Active
    }
}

/// Next status for an existing row. Only ACTIVE rows ever transition through
/// the pipeline; RESOLVED and operator-set ACKNOWLEDGED are left alone.
#[must_use]
pub fn next_status(current: AlertStatus, incoming_end: Option<DateTime<Utc>>) -> AlertStatus {
    match current {
        AlertStatus::Active if incoming_end.is_some() => AlertStatus::Resolved,
        other => other,
    }
}

/// Outage duration in seconds, clamped non-negative; None while still open.
#[must_use]
pub fn grid_down_seconds(
    alert_time: DateTime<Utc>,
    end_time: Option<DateTime<Utc>>,
) -> Option<i64> {
    end_time.map(|end| (end - alert_time).num_seconds().max(0))
}

/// True for alerts the sync keeps. Vendors spell the device type with mixed
/// case; anything that is not an inverter alert is dropped.
#[must_use]
pub fn is_inverter_alert(record: &AlertRecord) -> bool {
    record
        .device_type
        .as_deref()
        .is_some_and(|t| t.eq_ignore_ascii_case(DEVICE_TYPE_FILTER))
}

/// Returns None when the vendor's adapter does not do alerts; such vendors do
/// not appear in the summary at all.
async fn sync_vendor(
    state: &AppState,
    vendor: vendors::Model,
    search_window: &AlertWindow,
) -> Option<VendorOutcome> {
    let adapter = match vendor::adapter_for(&vendor, &state.http) {
        Ok(adapter) => adapter,
        Err(e) => {
            tracing::warn!(vendor = %vendor.name, error = %e, "Alert sync failed for vendor");
            return Some(VendorOutcome::failure(&vendor, e.to_string()));
        }
    };
    if !adapter.capabilities().alerts {
        tracing::debug!(vendor = %vendor.name, "Vendor has no alert search; skipping");
        return None;
    }

    match fetch_and_upsert(state, &vendor, adapter.as_ref(), search_window).await {
        Ok(outcome) => Some(outcome),
        Err(e) => {
            tracing::warn!(vendor = %vendor.name, error = %e, "Alert sync failed for vendor");
            Some(VendorOutcome::failure(&vendor, e.to_string()))
        }
    }
}

async fn fetch_and_upsert(
    state: &AppState,
    vendor: &vendors::Model,
    adapter: &dyn vendor::VendorAdapter,
    search_window: &AlertWindow,
) -> AppResult<VendorOutcome> {
    let token = vendor::ensure_token(
        &state.db,
        &state.token_cache,
        vendor,
        adapter,
        state.config.token_expiry_margin_seconds,
    )
    .await?;

    // vendor_plant_id -> our plant uuid
    let plant_ids: HashMap<String, Uuid> = plants::Entity::find()
        .filter(plants::Column::VendorId.eq(vendor.id))
        .all(&state.db)
        .await?
        .into_iter()
        .map(|p| (p.vendor_plant_id, p.id))
        .collect();

    // Existing alerts keyed by the dedup key (vendor_alert_id, plant_id);
    // grows as we insert so repeats on later pages become updates.
    let mut existing: HashMap<(String, Uuid), alerts::Model> = alerts::Entity::find()
        .filter(alerts::Column::VendorId.eq(vendor.id))
        .all(&state.db)
        .await?
        .into_iter()
        .map(|a| ((a.vendor_alert_id.clone(), a.plant_id), a))
        .collect();

    let mut synced = 0u32;
    let mut created = 0u32;
    let mut updated = 0u32;
    let mut resolved = 0u32;
    let mut unknown_plants = 0u32;
    let mut row_errors = Vec::new();

    let mut page = 1u32;
    loop {
        let records = adapter
            .alert_page(&token, search_window, page, ALERT_PAGE_SIZE)
            .await?;
        if records.is_empty() {
            break;
        }

        for record in records {
            if !is_inverter_alert(&record) {
                continue;
            }

            let Some(plant_id) = plant_ids.get(&record.vendor_plant_id).copied() else {
                unknown_plants += 1;
                tracing::debug!(
                    vendor = %vendor.name,
                    station = %record.vendor_plant_id,
                    "Alert references unknown plant; skipping"
                );
                continue;
            };

            let key = (record.vendor_alert_id.clone(), plant_id);
            match existing.get(&key) {
                Some(current) => {
                    let was_active = current.status == AlertStatus::Active;
                    match update_alert(&state.db, current, &record).await {
                        Ok(model) => {
                            if was_active && model.status == AlertStatus::Resolved {
                                resolved += 1;
                            }
                            existing.insert(key, model);
                            updated += 1;
                            synced += 1;
                        }
                        Err(e) => {
                            tracing::warn!(vendor = %vendor.name, error = %e, "Alert update failed");
                            row_errors.push(e.to_string());
                        }
                    }
                }
                None => match insert_alert(&state.db, vendor, plant_id, &record).await {
                    Ok(model) => {
                        existing.insert(key, model);
                        created += 1;
                        synced += 1;
                    }
                    Err(e) => {
                        tracing::warn!(vendor = %vendor.name, error = %e, "Alert insert failed");
                        row_errors.push(e.to_string());
                    }
                },
            }
        }

        page += 1;
    }

    if unknown_plants > 0 {
        tracing::debug!(
            vendor = %vendor.name,
            count = unknown_plants,
            "Alerts skipped for unknown plants"
        );
    }

    mark_alert_synced(&state.db, vendor).await;

    Ok(VendorOutcome {
        vendor_id: vendor.id,
        vendor_name: vendor.name.clone(),
        vendor_type: vendor.vendor_type,
        success: true,
        synced,
        created,
        updated,
        resolved: Some(resolved),
        error: None,
        row_errors,
    })
}

async fn update_alert(
    db: &DatabaseConnection,
    current: &alerts::Model,
    record: &AlertRecord,
) -> Result<alerts::Model, sea_orm::DbErr> {
    let mut model: alerts::ActiveModel = current.clone().into();
    model.name = Set(record.name.clone());
    model.device_type = Set(record.device_type.clone());
    model.device_sn = Set(record.device_sn.clone());
    model.severity = Set(record.severity);
    model.status = Set(next_status(current.status, record.end_time));
    model.end_time = Set(record.end_time.map(Into::into));
    model.grid_down_seconds = Set(grid_down_seconds(record.alert_time, record.end_time));
    model.updated_at = Set(Some(Utc::now().into()));
    model.update(db).await
}

async fn insert_alert(
    db: &DatabaseConnection,
    vendor: &vendors::Model,
    plant_id: Uuid,
    record: &AlertRecord,
) -> Result<alerts::Model, sea_orm::DbErr> {
    let now = Utc::now();
    let model = alerts::ActiveModel {
        id: Set(Uuid::new_v4()),
        plant_id: Set(plant_id),
        vendor_id: Set(vendor.id),
        vendor_alert_id: Set(record.vendor_alert_id.clone()),
        name: Set(record.name.clone()),
        device_type: Set(record.device_type.clone()),
        device_sn: Set(record.device_sn.clone()),
        severity: Set(record.severity),
        status: Set(derive_status(record.end_time)),
        alert_time: Set(record.alert_time.into()),
        end_time: Set(record.end_time.map(Into::into)),
        grid_down_seconds: Set(grid_down_seconds(record.alert_time, record.end_time)),
        created_at: Set(Some(now.into())),
        updated_at: Set(Some(now.into())),
    };
    model.insert(db).await
}

async fn mark_alert_synced(db: &DatabaseConnection, vendor: &vendors::Model) {
    let now = Utc::now();
    let mut active: vendors::ActiveModel = vendor.clone().into();
    active.last_alert_synced_at = Set(Some(now.into()));
    active.updated_at = Set(Some(now.into()));
    if let Err(e) = active.update(db).await {
        tracing::warn!(vendor = %vendor.name, error = %e, "Failed to update last_alert_synced_at");
    }
}
