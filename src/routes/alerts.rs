use axum::{
    extract::{Query, State},
    http::header::{self, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveEnum, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::common::AppState;
use crate::entity::alerts::{self, AlertSeverity, AlertStatus};
use crate::error::{AppError, AppResult};

#[derive(Debug, Serialize, ToSchema)]
pub struct AlertResponse {
    pub id: Uuid,
    pub plant_id: Uuid,
    pub vendor_id: Uuid,
    pub name: String,
    pub device_type: Option<String>,
    pub device_sn: Option<String>,
    pub severity: AlertSeverity,
    pub status: AlertStatus,
    pub alert_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub grid_down_seconds: Option<i64>,
    /// Human-readable outage duration
    pub duration: String,
}

impl From<alerts::Model> for AlertResponse {
    fn from(a: alerts::Model) -> Self {
        let duration = format_duration(a.grid_down_seconds);
        Self {
            id: a.id,
            plant_id: a.plant_id,
            vendor_id: a.vendor_id,
            name: a.name,
            device_type: a.device_type,
            device_sn: a.device_sn,
            severity: a.severity,
            status: a.status,
            alert_time: a.alert_time.with_timezone(&Utc),
            end_time: a.end_time.map(|t| t.with_timezone(&Utc)),
            grid_down_seconds: a.grid_down_seconds,
            duration,
        }
    }
}

/// Query parameters for the alerts endpoint
#[derive(Debug, Deserialize, IntoParams)]
pub struct AlertsQuery {
    /// Filter by status (ACTIVE, RESOLVED, ACKNOWLEDGED)
    pub status: Option<AlertStatus>,
    /// Filter by severity (LOW, MEDIUM, HIGH, CRITICAL)
    pub severity: Option<AlertSeverity>,
    /// Filter by plant
    pub plant_id: Option<Uuid>,
    /// Start of time range (ISO 8601), matched against alert_time
    pub start: Option<DateTime<Utc>>,
    /// End of time range (ISO 8601), matched against alert_time
    pub end: Option<DateTime<Utc>>,
    /// Page number (1-indexed)
    #[serde(default = "default_page")]
    pub page: i32,
    /// Page size (max 1000)
    #[serde(default = "default_page_size")]
    pub page_size: i32,
    /// Response format: json (default), csv
    #[serde(default = "default_format")]
    pub format: String,
}

fn default_page() -> i32 {
    1
}

fn default_page_size() -> i32 {
    100
}

fn default_format() -> String {
    "json".to_string()
}

/// Paginated alerts response
#[derive(Debug, Serialize, ToSchema)]
pub struct AlertsListResponse {
    pub alerts: Vec<AlertResponse>,
    pub total: i64,
    pub page: i32,
    pub page_size: i32,
}

/// List alerts with filtering and pagination
///
/// With `format=csv` the full filtered set is exported and pagination
/// parameters are ignored; bound the export with `start`/`end`.
#[utoipa::path(
    get,
    path = "/api/alerts",
    params(AlertsQuery),
    responses(
        (status = 200, description = "Alerts retrieved successfully", body = AlertsListResponse),
        (status = 400, description = "Invalid query parameters"),
    ),
    tag = "alerts"
)]
pub async fn list_alerts(
    State(state): State<AppState>,
    Query(query): Query<AlertsQuery>,
) -> AppResult<Response> {
    if let (Some(start), Some(end)) = (query.start, query.end) {
        if end <= start {
            return Err(AppError::BadRequest(
                "end time must be after start time".to_string(),
            ));
        }
    }

    let mut db_query = alerts::Entity::find();

    if let Some(status) = query.status {
        db_query = db_query.filter(alerts::Column::Status.eq(status));
    }
    if let Some(severity) = query.severity {
        db_query = db_query.filter(alerts::Column::Severity.eq(severity));
    }
    if let Some(plant_id) = query.plant_id {
        db_query = db_query.filter(alerts::Column::PlantId.eq(plant_id));
    }
    if let Some(start) = query.start {
        db_query = db_query.filter(alerts::Column::AlertTime.gte(start));
    }
    if let Some(end) = query.end {
        db_query = db_query.filter(alerts::Column::AlertTime.lte(end));
    }

    let db_query = db_query.order_by_desc(alerts::Column::AlertTime);

    if query.format.eq_ignore_ascii_case("csv") {
        let alerts_list = db_query.all(&state.db).await?;
        return build_csv_response(&alerts_list);
    }

    // Get total count
    let total = db_query.clone().count(&state.db).await? as i64;

    // Apply pagination
    let page_size = query.page_size.clamp(1, 1000);
    let offset = ((query.page - 1).max(0) * page_size) as u64;

    let alerts_list = db_query
        .offset(offset)
        .limit(page_size as u64)
        .all(&state.db)
        .await?;

    Ok(Json(AlertsListResponse {
        alerts: alerts_list.into_iter().map(Into::into).collect(),
        total,
        page: query.page,
        page_size,
    })
    .into_response())
}

/// List only active alerts
#[utoipa::path(
    get,
    path = "/api/alerts/active",
    responses(
        (status = 200, description = "Active alerts retrieved successfully", body = Vec<AlertResponse>),
    ),
    tag = "alerts"
)]
pub async fn list_active_alerts(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<AlertResponse>>> {
    let alerts_list = alerts::Entity::find()
        .filter(alerts::Column::Status.eq(AlertStatus::Active))
        .order_by_desc(alerts::Column::AlertTime)
        .all(&state.db)
        .await?;

    Ok(Json(alerts_list.into_iter().map(Into::into).collect()))
}

fn build_csv_response(alerts_list: &[alerts::Model]) -> AppResult<Response> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record([
        "id",
        "plant_id",
        "name",
        "device_type",
        "device_sn",
        "severity",
        "status",
        "alert_time",
        "end_time",
        "grid_down_seconds",
    ])
    .map_err(|e| AppError::Internal(e.to_string()))?;

    for a in alerts_list {
        wtr.write_record([
            a.id.to_string(),
            a.plant_id.to_string(),
            a.name.clone(),
            a.device_type.clone().unwrap_or_default(),
            a.device_sn.clone().unwrap_or_default(),
            a.severity.to_value(),
            a.status.to_value(),
            a.alert_time.with_timezone(&Utc).to_rfc3339(),
            a.end_time
                .map(|t| t.with_timezone(&Utc).to_rfc3339())
                .unwrap_or_default(),
            a.grid_down_seconds.map(|s| s.to_string()).unwrap_or_default(),
        ])
        .map_err(|e| AppError::Internal(e.to_string()))?;
    }

    let bytes = wtr
        .into_inner()
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Response::builder()
        .header(header::CONTENT_TYPE, HeaderValue::from_static("text/csv"))
        .body(axum::body::Body::from(bytes))
        .map_err(|e| AppError::Internal(e.to_string()))
}

/// Format outage seconds to a human-readable string
fn format_duration(grid_down_seconds: Option<i64>) -> String {
    match grid_down_seconds {
        Some(secs) if secs > 0 => {
            let days = secs / 86400;
            let hours = (secs % 86400) / 3600;
            let mins = (secs % 3600) / 60;

            if days > 0 {
                format!("{}d {}h {}m", days, hours, mins)
            } else if hours > 0 {
                format!("{}h {}m", hours, mins)
            } else {
                format!("{}m", mins.max(1))
            }
        }
        _ => "ongoing".to_string(),
    }
}
