use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::common::AppState;
use crate::entity::plants;
use crate::error::{AppError, AppResult};

#[derive(Debug, Serialize, ToSchema)]
pub struct PlantResponse {
    pub id: Uuid,
    pub vendor_id: Uuid,
    pub organization_id: Uuid,
    /// The vendor portal's own station id
    pub vendor_plant_id: String,
    pub name: String,
    pub address: Option<String>,
    pub capacity_kw: Option<f64>,
    pub current_power_kw: Option<f64>,
    pub daily_energy_kwh: Option<f64>,
    pub monthly_energy_kwh: Option<f64>,
    pub yearly_energy_kwh: Option<f64>,
    pub total_energy_kwh: Option<f64>,
    pub performance_ratio: Option<f64>,
    pub network_status: Option<String>,
    pub last_update_time: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<plants::Model> for PlantResponse {
    fn from(p: plants::Model) -> Self {
        Self {
            id: p.id,
            vendor_id: p.vendor_id,
            organization_id: p.organization_id,
            vendor_plant_id: p.vendor_plant_id,
            name: p.name,
            address: p.address,
            capacity_kw: p.capacity_kw,
            current_power_kw: p.current_power_kw,
            daily_energy_kwh: p.daily_energy_kwh,
            monthly_energy_kwh: p.monthly_energy_kwh,
            yearly_energy_kwh: p.yearly_energy_kwh,
            total_energy_kwh: p.total_energy_kwh,
            performance_ratio: p.performance_ratio,
            network_status: p.network_status,
            last_update_time: p.last_update_time.map(|t| t.with_timezone(&Utc)),
            updated_at: p.updated_at.map(|t| t.with_timezone(&Utc)),
        }
    }
}

/// Query parameters for the plants listing
#[derive(Debug, Deserialize, IntoParams)]
pub struct PlantsQuery {
    /// Filter by vendor
    pub vendor_id: Option<Uuid>,
    /// Filter by organization
    pub organization_id: Option<Uuid>,
    /// Page number (1-indexed)
    #[serde(default = "default_page")]
    pub page: i32,
    /// Page size (max 1000)
    #[serde(default = "default_page_size")]
    pub page_size: i32,
}

fn default_page() -> i32 {
    1
}

fn default_page_size() -> i32 {
    100
}

/// Paginated plants response
#[derive(Debug, Serialize, ToSchema)]
pub struct PlantsListResponse {
    pub plants: Vec<PlantResponse>,
    pub total: i64,
    pub page: i32,
    pub page_size: i32,
}

/// List plants with filtering and pagination
#[utoipa::path(
    get,
    path = "/api/plants",
    params(PlantsQuery),
    responses(
        (status = 200, description = "Plants retrieved successfully", body = PlantsListResponse),
    ),
    tag = "plants"
)]
pub async fn list_plants(
    State(state): State<AppState>,
    Query(query): Query<PlantsQuery>,
) -> AppResult<Json<PlantsListResponse>> {
    let mut db_query = plants::Entity::find();

    if let Some(vendor_id) = query.vendor_id {
        db_query = db_query.filter(plants::Column::VendorId.eq(vendor_id));
    }
    if let Some(org_id) = query.organization_id {
        db_query = db_query.filter(plants::Column::OrganizationId.eq(org_id));
    }

    // Get total count
    let total = db_query.clone().count(&state.db).await? as i64;

    // Apply pagination and ordering
    let page_size = query.page_size.clamp(1, 1000);
    let offset = ((query.page - 1).max(0) * page_size) as u64;

    let plants_list = db_query
        .order_by_asc(plants::Column::Name)
        .offset(offset)
        .limit(page_size as u64)
        .all(&state.db)
        .await?;

    Ok(Json(PlantsListResponse {
        plants: plants_list.into_iter().map(Into::into).collect(),
        total,
        page: query.page,
        page_size,
    }))
}

/// Get a specific plant by ID
#[utoipa::path(
    get,
    path = "/api/plants/{plant_id}",
    params(
        ("plant_id" = Uuid, Path, description = "Plant UUID"),
    ),
    responses(
        (status = 200, description = "Plant retrieved successfully", body = PlantResponse),
        (status = 404, description = "Plant not found"),
    ),
    tag = "plants"
)]
pub async fn get_plant(
    State(state): State<AppState>,
    Path(plant_id): Path<Uuid>,
) -> AppResult<Json<PlantResponse>> {
    let plant = plants::Entity::find_by_id(plant_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Plant not found".to_string()))?;

    Ok(Json(plant.into()))
}
