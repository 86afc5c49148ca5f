use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    Json,
};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter, QueryOrder,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::common::AppState;
use crate::entity::organizations;
use crate::entity::vendors::{self, VendorType};
use crate::error::{AppError, AppResult};
use crate::routes::require_sync_secret;

/// Vendor without its credentials. Credentials are write-only; they are
/// accepted on create and update but never echoed back.
#[derive(Debug, Serialize, ToSchema)]
pub struct VendorResponse {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub name: String,
    pub vendor_type: VendorType,
    pub base_url: Option<String>,
    pub is_active: bool,
    pub last_synced_at: Option<DateTime<Utc>>,
    pub last_alert_synced_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<vendors::Model> for VendorResponse {
    fn from(v: vendors::Model) -> Self {
        Self {
            id: v.id,
            organization_id: v.organization_id,
            name: v.name,
            vendor_type: v.vendor_type,
            base_url: v.base_url,
            is_active: v.is_active,
            last_synced_at: v.last_synced_at.map(|t| t.with_timezone(&Utc)),
            last_alert_synced_at: v.last_alert_synced_at.map(|t| t.with_timezone(&Utc)),
            created_at: v.created_at.map(|t| t.with_timezone(&Utc)),
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct VendorsQuery {
    /// Filter by organization
    pub organization_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateVendorRequest {
    pub organization_id: Uuid,
    pub name: String,
    pub vendor_type: VendorType,
    /// Portal credentials as a JSON object; shape depends on vendor_type
    pub credentials: serde_json::Value,
    /// Override for the portal base URL (testing, regional gateways)
    pub base_url: Option<String>,
    /// Defaults to true
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateVendorRequest {
    pub name: Option<String>,
    /// Replaces the stored credentials entirely, dropping any cached token
    pub credentials: Option<serde_json::Value>,
    pub base_url: Option<String>,
    pub is_active: Option<bool>,
}

/// List vendors
#[utoipa::path(
    get,
    path = "/api/vendors",
    params(VendorsQuery),
    responses(
        (status = 200, description = "Vendors retrieved successfully", body = Vec<VendorResponse>),
    ),
    tag = "vendors"
)]
pub async fn list_vendors(
    State(state): State<AppState>,
    Query(query): Query<VendorsQuery>,
) -> AppResult<Json<Vec<VendorResponse>>> {
    let mut db_query = vendors::Entity::find();

    if let Some(org_id) = query.organization_id {
        db_query = db_query.filter(vendors::Column::OrganizationId.eq(org_id));
    }

    let vendors_list = db_query
        .order_by_asc(vendors::Column::Name)
        .all(&state.db)
        .await?;

    Ok(Json(vendors_list.into_iter().map(Into::into).collect()))
}

/// Register a vendor for an organization
#[utoipa::path(
    post,
    path = "/api/vendors",
    request_body = CreateVendorRequest,
    responses(
        (status = 200, description = "Vendor created", body = VendorResponse),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Missing or wrong bearer secret"),
    ),
    tag = "vendors"
)]
pub async fn create_vendor(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<CreateVendorRequest>,
) -> AppResult<Json<VendorResponse>> {
    require_sync_secret(&headers, &state.config)?;

    let name = body.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::BadRequest("name must not be empty".to_string()));
    }
    if !body.credentials.is_object() {
        return Err(AppError::BadRequest(
            "credentials must be a JSON object".to_string(),
        ));
    }

    let org = organizations::Entity::find_by_id(body.organization_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::BadRequest("organization_id does not exist".to_string()))?;

    let now = Utc::now();
    let model = vendors::ActiveModel {
        id: Set(Uuid::new_v4()),
        organization_id: Set(org.id),
        name: Set(name),
        vendor_type: Set(body.vendor_type),
        credentials: Set(body.credentials),
        base_url: Set(body.base_url),
        is_active: Set(body.is_active.unwrap_or(true)),
        last_synced_at: Set(None),
        last_alert_synced_at: Set(None),
        created_at: Set(Some(now.into())),
        updated_at: Set(Some(now.into())),
    };
    let vendor = model.insert(&state.db).await?;

    tracing::info!(
        vendor = %vendor.name,
        vendor_type = ?vendor.vendor_type,
        organization = %org.name,
        "Registered vendor"
    );
    Ok(Json(vendor.into()))
}

/// Update a vendor
#[utoipa::path(
    patch,
    path = "/api/vendors/{vendor_id}",
    params(
        ("vendor_id" = Uuid, Path, description = "Vendor UUID"),
    ),
    request_body = UpdateVendorRequest,
    responses(
        (status = 200, description = "Vendor updated", body = VendorResponse),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Missing or wrong bearer secret"),
        (status = 404, description = "Vendor not found"),
    ),
    tag = "vendors"
)]
pub async fn update_vendor(
    State(state): State<AppState>,
    Path(vendor_id): Path<Uuid>,
    headers: HeaderMap,
    Json(body): Json<UpdateVendorRequest>,
) -> AppResult<Json<VendorResponse>> {
    require_sync_secret(&headers, &state.config)?;

    let vendor = vendors::Entity::find_by_id(vendor_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Vendor not found".to_string()))?;

    let mut active: vendors::ActiveModel = vendor.into();
    if let Some(name) = body.name {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::BadRequest("name must not be empty".to_string()));
        }
        active.name = Set(name);
    }
    if let Some(credentials) = body.credentials {
        if !credentials.is_object() {
            return Err(AppError::BadRequest(
                "credentials must be a JSON object".to_string(),
            ));
        }
        active.credentials = Set(credentials);
        // New credentials invalidate whatever token we were reusing
        state.token_cache.invalidate(&vendor_id).await;
    }
    if let Some(base_url) = body.base_url {
        active.base_url = Set(Some(base_url));
    }
    if let Some(is_active) = body.is_active {
        active.is_active = Set(is_active);
    }
    active.updated_at = Set(Some(Utc::now().into()));

    let updated = active.update(&state.db).await?;
    Ok(Json(updated.into()))
}
