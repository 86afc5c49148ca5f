use axum::{
    extract::{Query, State},
    http::HeaderMap,
    Json,
};
use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::common::AppState;
use crate::entity::sync_runs::{self, SyncKind, SyncTrigger};
use crate::error::AppResult;
use crate::routes::require_sync_secret;
use crate::sync::{sync_alerts, sync_plants, SyncSummary};

/// Trigger a plant sync with scheduled semantics
///
/// Intended for external cron. The restricted window and per-org interval
/// gates apply exactly as they do for the background scheduler.
#[utoipa::path(
    get,
    path = "/api/sync/plants",
    responses(
        (status = 200, description = "Run summary (check per-vendor success flags)", body = SyncSummary),
        (status = 401, description = "Missing or wrong bearer secret"),
    ),
    tag = "sync"
)]
pub async fn trigger_plant_sync(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<SyncSummary>> {
    require_sync_secret(&headers, &state.config)?;
    let summary = sync_plants(&state, SyncTrigger::Cron).await?;
    Ok(Json(summary))
}

/// Force a plant sync for all active vendors
///
/// Bypasses the restricted window and interval gates. Inactive vendors are
/// still excluded.
#[utoipa::path(
    post,
    path = "/api/sync/plants",
    responses(
        (status = 200, description = "Run summary (check per-vendor success flags)", body = SyncSummary),
        (status = 401, description = "Missing or wrong bearer secret"),
    ),
    tag = "sync"
)]
pub async fn force_plant_sync(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<SyncSummary>> {
    require_sync_secret(&headers, &state.config)?;
    let summary = sync_plants(&state, SyncTrigger::Manual).await?;
    Ok(Json(summary))
}

/// Trigger an alert sync with scheduled semantics
#[utoipa::path(
    get,
    path = "/api/sync/alerts",
    responses(
        (status = 200, description = "Run summary (check per-vendor success flags)", body = SyncSummary),
        (status = 401, description = "Missing or wrong bearer secret"),
    ),
    tag = "sync"
)]
pub async fn trigger_alert_sync(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<SyncSummary>> {
    require_sync_secret(&headers, &state.config)?;
    let summary = sync_alerts(&state, SyncTrigger::Cron).await?;
    Ok(Json(summary))
}

/// Force an alert sync for all alert-capable vendors
#[utoipa::path(
    post,
    path = "/api/sync/alerts",
    responses(
        (status = 200, description = "Run summary (check per-vendor success flags)", body = SyncSummary),
        (status = 401, description = "Missing or wrong bearer secret"),
    ),
    tag = "sync"
)]
pub async fn force_alert_sync(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<SyncSummary>> {
    require_sync_secret(&headers, &state.config)?;
    let summary = sync_alerts(&state, SyncTrigger::Manual).await?;
    Ok(Json(summary))
}

/// Persisted run summary
#[derive(Debug, Serialize, ToSchema)]
pub struct SyncRunResponse {
    pub id: Uuid,
    pub kind: SyncKind,
    pub trigger: SyncTrigger,
    pub started_at: DateTime<Utc>,
    pub duration_ms: i64,
    pub total_vendors: i32,
    pub successful: i32,
    pub failed: i32,
    pub synced: i32,
    pub created: i32,
    pub updated: i32,
    /// Per-vendor outcomes as persisted
    pub results: Option<serde_json::Value>,
}

/// Query parameters for the sync run history
#[derive(Debug, Deserialize, IntoParams)]
pub struct SyncRunsQuery {
    /// Filter by run kind (PLANTS or ALERTS)
    pub kind: Option<SyncKind>,
    /// Maximum rows returned (default 20, max 100)
    #[serde(default = "default_limit")]
    pub limit: u64,
}

fn default_limit() -> u64 {
    20
}

/// List recent sync runs, newest first
#[utoipa::path(
    get,
    path = "/api/sync/runs",
    params(SyncRunsQuery),
    responses(
        (status = 200, description = "Sync runs retrieved successfully", body = Vec<SyncRunResponse>),
    ),
    tag = "sync"
)]
pub async fn list_sync_runs(
    State(state): State<AppState>,
    Query(query): Query<SyncRunsQuery>,
) -> AppResult<Json<Vec<SyncRunResponse>>> {
    let mut db_query = sync_runs::Entity::find();

    if let Some(kind) = query.kind {
        db_query = db_query.filter(sync_runs::Column::Kind.eq(kind));
    }

    let limit = query.limit.clamp(1, 100);
    let runs = db_query
        .order_by_desc(sync_runs::Column::StartedAt)
        .limit(limit)
        .all(&state.db)
        .await?;

    let response: Vec<SyncRunResponse> = runs
        .into_iter()
        .map(|r| SyncRunResponse {
            id: r.id,
            kind: r.kind,
            trigger: r.trigger,
            started_at: r.started_at.with_timezone(&Utc),
            duration_ms: r.duration_ms,
            total_vendors: r.total_vendors,
            successful: r.successful,
            failed: r.failed,
            synced: r.synced,
            created: r.created,
            updated: r.updated,
            results: r.results,
        })
        .collect();

    Ok(Json(response))
}
