use chrono::{DateTime, Utc};
use futures::future::join_all;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
};
use std::collections::{HashMap, HashSet};
use std::time::Instant;
use uuid::Uuid;

use crate::common::AppState;
use crate::entity::sync_runs::{SyncKind, SyncTrigger};
use crate::entity::{organizations, plants, vendors};
use crate::error::AppResult;
use crate::vendor::{self, PlantRecord};

use super::window::{self, RestrictedWindow};
use super::{aggregate, record_run, SyncSummary, VendorOutcome};

/// Upsert batch size; a failed batch falls back to per-row writes.
const UPSERT_BATCH_SIZE: usize = 100;

/// Sync plant lists from every eligible vendor.
///
/// Scheduled and cron triggers honor the restricted window and each
/// organization's interval alignment; a manual trigger bypasses both gates.
/// Inactive vendors are excluded on every path. Per-vendor failures are
/// captured in the summary and never abort the run.
///
/// # Errors
///
/// Returns an error only when the candidate query itself fails; everything
/// downstream is collected into the summary.
pub async fn sync_plants(state: &AppState, trigger: SyncTrigger) -> AppResult<SyncSummary> {
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
            tracing::debug!("Plant sync inside restricted window; skipping");
            return Ok(SyncSummary::skipped(
                SyncKind::Plants,
                trigger,
                "restricted window",
            ));
        }
    }

    let orgs = organizations::Entity::find().all(&state.db).await?;
    let active_vendors = vendors::Entity::find()
        .filter(vendors::Column::IsActive.eq(true))
        .all(&state.db)
        .await?;

    let candidates = eligible_vendors(
        &orgs,
        active_vendors,
        force,
        started,
        state.config.sync_utc_offset_minutes,
    );

    if candidates.is_empty() {
        tracing::debug!("No vendors due for plant sync");
        let summary = aggregate(SyncKind::Plants, trigger, Vec::new(), 0);
        return Ok(summary);
    }

    tracing::info!(vendors = candidates.len(), ?trigger, "Starting plant sync");

    // Vendors are independent; fan out and let each one succeed or fail alone.
    let tasks = candidates.into_iter().map(|vendor| {
        let state = state.clone();
        async move { sync_vendor(&state, vendor).await }
    });
    let results: Vec<VendorOutcome> = join_all(tasks).await;

    let summary = aggregate(
        SyncKind::Plants,
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
        "Plant sync completed"
    );
    Ok(summary)
}

/// Select the vendors a run will touch. Inactive vendors are always excluded;
/// without force, the owning organization must have auto-sync enabled and its
/// interval must be due at `now`.
#[must_use]
pub fn eligible_vendors(
    orgs: &[organizations::Model],
    vendors: Vec<vendors::Model>,
    force: bool,
    now: DateTime<Utc>,
    utc_offset_minutes: i32,
) -> Vec<vendors::Model> {
    let due_orgs: HashSet<Uuid> = orgs
        .iter()
        .filter(|org| {
            force
                || (org.auto_sync_enabled
                    && window::org_interval_due(now, utc_offset_minutes, org.sync_interval_minutes))
        })
        .map(|org| org.id)
        .collect();

    vendors
        .into_iter()
        .filter(|v| v.is_active && due_orgs.contains(&v.organization_id))
        .collect()
}

/// Split incoming records into creates and updates against the vendor's
/// existing plants keyed by `vendor_plant_id`.
#[must_use]
pub fn partition_records(
    existing: &HashMap<String, plants::Model>,
    records: Vec<PlantRecord>,
) -> (Vec<PlantRecord>, Vec<PlantRecord>) {
    records
        .into_iter()
        .partition(|r| !existing.contains_key(&r.vendor_plant_id))
}

async fn sync_vendor(state: &AppState, vendor: vendors::Model) -> VendorOutcome {
    match fetch_and_upsert(state, &vendor).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::warn!(vendor = %vendor.name, error = %e, "Plant sync failed for vendor");
            VendorOutcome::failure(&vendor, e.to_string())
        }
    }
}

async fn fetch_and_upsert(state: &AppState, vendor: &vendors::Model) -> AppResult<VendorOutcome> {
    let adapter = vendor::adapter_for(vendor, &state.http)?;
    let token = vendor::ensure_token(
        &state.db,
        &state.token_cache,
        vendor,
        adapter.as_ref(),
        state.config.token_expiry_margin_seconds,
    )
    .await?;

    let records = adapter.list_plants(&token).await?;
    tracing::debug!(vendor = %vendor.name, plants = records.len(), "Fetched plant list");

    let existing: HashMap<String, plants::Model> = plants::Entity::find()
        .filter(plants::Column::VendorId.eq(vendor.id))
        .all(&state.db)
        .await?
        .into_iter()
        .map(|p| (p.vendor_plant_id.clone(), p))
        .collect();

    let (to_create, to_update) = partition_records(&existing, records);
    let created = to_create.len() as u32;
    let updated = to_update.len() as u32;

    let now = Utc::now();
    let models: Vec<plants::ActiveModel> = to_create
        .iter()
        .chain(to_update.iter())
        .map(|record| plant_model(vendor, record, now))
        .collect();

    let (synced, row_errors) = upsert_batched(&state.db, &vendor.name, models).await;

    if synced > 0 {
        mark_synced(&state.db, vendor).await;
    }

    Ok(VendorOutcome {
        vendor_id: vendor.id,
        vendor_name: vendor.name.clone(),
        vendor_type: vendor.vendor_type,
        success: true,
        synced,
        created,
        updated,
        resolved: None,
        error: None,
        row_errors,
    })
}

fn plant_model(
    vendor: &vendors::Model,
    record: &PlantRecord,
    now: DateTime<Utc>,
) -> plants::ActiveModel {
    plants::ActiveModel {
        id: Set(Uuid::new_v4()),
        vendor_id: Set(vendor.id),
        organization_id: Set(vendor.organization_id),
        vendor_plant_id: Set(record.vendor_plant_id.clone()),
        name: Set(record.name.clone()),
        address: Set(record.address.clone()),
        capacity_kw: Set(record.capacity_kw),
        current_power_kw: Set(record.current_power_kw),
        daily_energy_kwh: Set(record.daily_energy_kwh),
        monthly_energy_kwh: Set(record.monthly_energy_kwh),
        yearly_energy_kwh: Set(record.yearly_energy_kwh),
        total_energy_kwh: Set(record.total_energy_kwh),
        performance_ratio: Set(record.performance_ratio),
        network_status: Set(record.network_status.clone()),
        last_update_time: Set(record.last_update_time.map(Into::into)),
        created_at: Set(Some(now.into())),
        updated_at: Set(Some(now.into())),
    }
}

fn upsert_conflict() -> OnConflict {
    OnConflict::columns([plants::Column::VendorId, plants::Column::VendorPlantId])
        .update_columns([
            plants::Column::Name,
            plants::Column::Address,
            plants::Column::CapacityKw,
            plants::Column::CurrentPowerKw,
            plants::Column::DailyEnergyKwh,
            plants::Column::MonthlyEnergyKwh,
            plants::Column::YearlyEnergyKwh,
            plants::Column::TotalEnergyKwh,
            plants::Column::PerformanceRatio,
            plants::Column::NetworkStatus,
            plants::Column::LastUpdateTime,
            plants::Column::UpdatedAt,
        ])
        .to_owned()
}

/// Upsert in batches; a failed batch is retried row by row so one bad record
/// cannot sink the rest.
async fn upsert_batched(
    db: &DatabaseConnection,
    vendor_name: &str,
    models: Vec<plants::ActiveModel>,
) -> (u32, Vec<String>) {
    let mut synced = 0u32;
    let mut row_errors = Vec::new();

    for chunk in models.chunks(UPSERT_BATCH_SIZE) {
        match plants::Entity::insert_many(chunk.to_vec())
            .on_conflict(upsert_conflict())
            .exec(db)
            .await
        {
            Ok(_) => synced += chunk.len() as u32,
            Err(e) => {
                tracing::warn!(
                    vendor = vendor_name,
                    error = %e,
                    batch_size = chunk.len(),
                    "Plant batch upsert failed; retrying per row"
                );
                for model in chunk {
                    match plants::Entity::insert(model.clone())
                        .on_conflict(upsert_conflict())
                        .exec(db)
                        .await
                    {
                        Ok(_) => synced += 1,
                        Err(e) => {
                            tracing::warn!(vendor = vendor_name, error = %e, "Plant row upsert failed");
                            row_errors.push(e.to_string());
                        }
                    }
                }
            }
        }
    }

    (synced, row_errors)
}

async fn mark_synced(db: &DatabaseConnection, vendor: &vendors::Model) {
    let now = Utc::now();
    let mut active: vendors::ActiveModel = vendor.clone().into();
    active.last_synced_at = Set(Some(now.into()));
    active.updated_at = Set(Some(now.into()));
    if let Err(e) = active.update(db).await {
        tracing::warn!(vendor = %vendor.name, error = %e, "Failed to update last_synced_at");
    }
}
