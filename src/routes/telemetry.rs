use axum::{
    extract::{Path, Query, State},
    http::header::{self, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Duration, NaiveDate, Utc};
use sea_orm::EntityTrait;
use serde::{Deserialize, Serialize};
use tokio_stream::wrappers::ReceiverStream;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::common::AppState;
use crate::entity::{plants, vendors};
use crate::error::{AppError, AppResult};
use crate::vendor::{
    self, TelemetryGranularity, TelemetryRange, TelemetryRecord, VendorError,
};

fn default_format() -> String {
    "json".to_string()
}

/// Query parameters for the telemetry proxy
#[derive(Debug, Deserialize, IntoParams)]
pub struct TelemetryQuery {
    /// Aggregation granularity: daily, monthly, yearly or total
    pub granularity: TelemetryGranularity,
    /// Start date (YYYY-MM-DD). Defaults to a granularity-sized lookback.
    pub start: Option<NaiveDate>,
    /// End date (YYYY-MM-DD). Defaults to today.
    pub end: Option<NaiveDate>,
    /// Response format: json (default), csv
    #[serde(default = "default_format")]
    pub format: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TelemetryResponse {
    pub plant_id: Uuid,
    pub vendor_plant_id: String,
    pub granularity: TelemetryGranularity,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub records: Vec<TelemetryRecord>,
}

/// Get generation telemetry for a plant, proxied live from its vendor
///
/// Nothing is persisted; each request hits the vendor portal with the
/// plant's cached token. Vendors that do not expose the requested
/// granularity yield a 400.
#[utoipa::path(
    get,
    path = "/api/plants/{plant_id}/telemetry",
    params(
        ("plant_id" = Uuid, Path, description = "Plant UUID"),
        TelemetryQuery
    ),
    responses(
        (status = 200, description = "Telemetry retrieved successfully", body = TelemetryResponse),
        (status = 400, description = "Invalid parameters or unsupported granularity"),
        (status = 404, description = "Plant not found"),
        (status = 502, description = "Vendor API failure"),
    ),
    tag = "telemetry"
)]
pub async fn get_plant_telemetry(
    State(state): State<AppState>,
    Path(plant_id): Path<Uuid>,
    Query(query): Query<TelemetryQuery>,
) -> AppResult<Response> {
    let plant = plants::Entity::find_by_id(plant_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Plant not found".to_string()))?;
    let vendor = vendors::Entity::find_by_id(plant.vendor_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Vendor not found".to_string()))?;

    if let (Some(start), Some(end)) = (query.start, query.end) {
        if end < start {
            return Err(AppError::BadRequest(
                "end date must not be before start date".to_string(),
            ));
        }
    }
    let range = default_range(query.granularity, query.start, query.end);

    let adapter = vendor::adapter_for(&vendor, &state.http)?;
    // Checked before token exchange so unsupported requests cost nothing
    if !adapter.capabilities().supports(query.granularity) {
        return Err(VendorError::Unsupported(granularity_label(query.granularity)).into());
    }

    let token = vendor::ensure_token(
        &state.db,
        &state.token_cache,
        &vendor,
        adapter.as_ref(),
        state.config.token_expiry_margin_seconds,
    )
    .await?;

    let records = vendor::adapter::telemetry_by_granularity(
        adapter.as_ref(),
        &token,
        &plant.vendor_plant_id,
        query.granularity,
        &range,
    )
    .await?;

    if query.format.eq_ignore_ascii_case("csv") {
        return build_csv_response(records);
    }

    Ok(Json(TelemetryResponse {
        plant_id: plant.id,
        vendor_plant_id: plant.vendor_plant_id,
        granularity: query.granularity,
        start: range.start,
        end: range.end,
        records,
    })
    .into_response())
}

/// Fill missing bounds: end defaults to today, start to one screenful of
/// history for the granularity (30 days, 12 months, 5 years).
fn default_range(
    granularity: TelemetryGranularity,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> TelemetryRange {
    let end = end.unwrap_or_else(|| Utc::now().date_naive());
    let start = start.unwrap_or_else(|| match granularity {
        TelemetryGranularity::Daily => end - Duration::days(29),
        TelemetryGranularity::Monthly => end - Duration::days(364),
        TelemetryGranularity::Yearly | TelemetryGranularity::Total => {
            end - Duration::days(365 * 5)
        }
    });
    TelemetryRange { start, end }
}

fn granularity_label(granularity: TelemetryGranularity) -> &'static str {
    match granularity {
        TelemetryGranularity::Daily => "daily telemetry",
        TelemetryGranularity::Monthly => "monthly telemetry",
        TelemetryGranularity::Yearly => "yearly telemetry",
        TelemetryGranularity::Total => "lifetime telemetry",
    }
}

fn build_csv_response(records: Vec<TelemetryRecord>) -> AppResult<Response> {
    let (tx, rx) = tokio::sync::mpsc::channel::<Result<String, std::io::Error>>(100);

    tokio::spawn(async move {
        // Header row
        let _ = tx
            .send(Ok("period,energy_kwh,peak_power_kw\n".to_string()))
            .await;

        // Data rows
        for record in records {
            let mut row = record.period.clone();
            row.push(',');
            if let Some(v) = record.energy_kwh {
                row.push_str(&v.to_string());
            }
            row.push(',');
            if let Some(v) = record.peak_power_kw {
                row.push_str(&v.to_string());
            }
            row.push('\n');
            if tx.send(Ok(row)).await.is_err() {
                break;
            }
        }
    });

    let stream = ReceiverStream::new(rx);
    let body = axum::body::Body::from_stream(stream);

    Response::builder()
        .header(header::CONTENT_TYPE, HeaderValue::from_static("text/csv"))
        .body(body)
        .map_err(|e| AppError::Internal(e.to_string()))
}
