pub mod alerts;
pub mod plants;
pub mod scheduler;
pub mod window;

pub use alerts::sync_alerts;
pub use plants::sync_plants;

use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ActiveValue::Set, DatabaseConnection};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::sync_runs::{self, SyncKind, SyncTrigger};
use crate::entity::vendors::{self, VendorType};

/// Outcome of one vendor inside a sync run. A vendor-level failure (auth,
/// fetch, adapter construction) sets `success = false`; individual row
/// failures are collected in `row_errors` without failing the vendor.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct VendorOutcome {
    pub vendor_id: Uuid,
    pub vendor_name: String,
    pub vendor_type: VendorType,
    pub success: bool,
    pub synced: u32,
    pub created: u32,
    pub updated: u32,
    /// Alert runs only: ACTIVE rows flipped to RESOLVED.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub row_errors: Vec<String>,
}

impl VendorOutcome {
    #[must_use]
    pub fn failure(vendor: &vendors::Model, error: String) -> Self {
        Self {
            vendor_id: vendor.id,
            vendor_name: vendor.name.clone(),
            vendor_type: vendor.vendor_type,
            success: false,
            synced: 0,
            created: 0,
            updated: 0,
            resolved: None,
            error: Some(error),
            row_errors: Vec::new(),
        }
    }
}

/// Summary of one sync run, returned by the trigger endpoints and persisted
/// as a `sync_runs` row.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SyncSummary {
    pub kind: SyncKind,
    pub trigger: SyncTrigger,
    /// True when a gate (restricted window) blocked a scheduled run.
    pub skipped: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_reason: Option<String>,
    pub total_vendors: u32,
    pub successful: u32,
    pub failed: u32,
    pub synced: u32,
    pub created: u32,
    pub updated: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved: Option<u32>,
    pub duration_ms: u64,
    pub results: Vec<VendorOutcome>,
}

impl SyncSummary {
    #[must_use]
    pub fn skipped(kind: SyncKind, trigger: SyncTrigger, reason: &str) -> Self {
        Self {
            kind,
            trigger,
            skipped: true,
            skip_reason: Some(reason.to_string()),
            total_vendors: 0,
            successful: 0,
            failed: 0,
            synced: 0,
            created: 0,
            updated: 0,
            resolved: None,
            duration_ms: 0,
            results: Vec::new(),
        }
    }
}

/// Roll per-vendor outcomes up into a run summary.
#[must_use]
pub fn aggregate(
    kind: SyncKind,
    trigger: SyncTrigger,
    results: Vec<VendorOutcome>,
    duration_ms: u64,
) -> SyncSummary {
    let successful = results.iter().filter(|r| r.success).count() as u32;
    let resolved = if kind == SyncKind::Alerts {
        Some(results.iter().filter_map(|r| r.resolved).sum())
    } else {
        None
    };

    SyncSummary {
        kind,
        trigger,
        skipped: false,
        skip_reason: None,
        total_vendors: results.len() as u32,
        successful,
        failed: results.len() as u32 - successful,
        synced: results.iter().map(|r| r.synced).sum(),
        created: results.iter().map(|r| r.created).sum(),
        updated: results.iter().map(|r| r.updated).sum(),
        resolved,
        duration_ms,
        results,
    }
}

/// Persist a run summary. Failures are logged and swallowed; bookkeeping must
/// never sink a sync that already happened.
pub async fn record_run(db: &DatabaseConnection, summary: &SyncSummary, started_at: DateTime<Utc>) {
    let results = serde_json::to_value(&summary.results).ok();

    let run = sync_runs::ActiveModel {
        id: Set(Uuid::new_v4()),
        kind: Set(summary.kind),
        trigger: Set(summary.trigger),
        started_at: Set(started_at.into()),
        duration_ms: Set(summary.duration_ms as i64),
        total_vendors: Set(summary.total_vendors as i32),
        successful: Set(summary.successful as i32),
        failed: Set(summary.failed as i32),
        synced: Set(summary.synced as i32),
        created: Set(summary.created as i32),
        updated: Set(summary.updated as i32),
        results: Set(results),
        created_at: Set(Some(Utc::now().into())),
    };

    if let Err(e) = run.insert(db).await {
        tracing::warn!(error = %e, "Failed to record sync run");
    }
}
