use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use chrono::{DateTime, Utc};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ActiveValue::Set, Condition, EntityTrait, QueryFilter,
    QueryOrder,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::common::AppState;
use crate::entity::organizations;
use crate::error::{AppError, AppResult};
use crate::routes::require_sync_secret;

#[derive(Debug, Serialize, ToSchema)]
pub struct OrganizationResponse {
    pub id: Uuid,
    pub name: String,
    pub auto_sync_enabled: bool,
    pub sync_interval_minutes: i32,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<organizations::Model> for OrganizationResponse {
    fn from(o: organizations::Model) -> Self {
        Self {
            id: o.id,
            name: o.name,
            auto_sync_enabled: o.auto_sync_enabled,
            sync_interval_minutes: o.sync_interval_minutes,
            created_at: o.created_at.map(|t| t.with_timezone(&Utc)),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrganizationRequest {
    pub name: String,
    /// Defaults to true
    pub auto_sync_enabled: Option<bool>,
    /// Defaults to 15
    pub sync_interval_minutes: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrganizationRequest {
    pub name: Option<String>,
    pub auto_sync_enabled: Option<bool>,
    pub sync_interval_minutes: Option<i32>,
}

/// List organizations
#[utoipa::path(
    get,
    path = "/api/organizations",
    responses(
        (status = 200, description = "Organizations retrieved successfully", body = Vec<OrganizationResponse>),
    ),
    tag = "organizations"
)]
pub async fn list_organizations(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<OrganizationResponse>>> {
    let orgs = organizations::Entity::find()
        .order_by_asc(organizations::Column::Name)
        .all(&state.db)
        .await?;

    Ok(Json(orgs.into_iter().map(Into::into).collect()))
}

/// Create an organization
#[utoipa::path(
    post,
    path = "/api/organizations",
    request_body = CreateOrganizationRequest,
    responses(
        (status = 200, description = "Organization created", body = OrganizationResponse),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Missing or wrong bearer secret"),
    ),
    tag = "organizations"
)]
pub async fn create_organization(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<CreateOrganizationRequest>,
) -> AppResult<Json<OrganizationResponse>> {
    require_sync_secret(&headers, &state.config)?;

    let name = body.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::BadRequest("name must not be empty".to_string()));
    }
    if let Some(interval) = body.sync_interval_minutes {
        validate_interval(interval)?;
    }

    // Names are unique case-insensitively
    let duplicate = organizations::Entity::find()
        .filter(
            Condition::all()
                .add(Expr::cust_with_values("LOWER(name) = LOWER($1)", [name.as_str()])),
        )
        .one(&state.db)
        .await?;
    if duplicate.is_some() {
        return Err(AppError::BadRequest(format!(
            "Organization '{name}' already exists"
        )));
    }

    let now = Utc::now();
    let model = organizations::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        auto_sync_enabled: Set(body.auto_sync_enabled.unwrap_or(true)),
        sync_interval_minutes: Set(body.sync_interval_minutes.unwrap_or(15)),
        created_at: Set(Some(now.into())),
        updated_at: Set(Some(now.into())),
    };
    let org = model.insert(&state.db).await?;

    tracing::info!(organization = %org.name, "Created organization");
    Ok(Json(org.into()))
}

/// Update an organization
#[utoipa::path(
    patch,
    path = "/api/organizations/{org_id}",
    params(
        ("org_id" = Uuid, Path, description = "Organization UUID"),
    ),
    request_body = UpdateOrganizationRequest,
    responses(
        (status = 200, description = "Organization updated", body = OrganizationResponse),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Missing or wrong bearer secret"),
        (status = 404, description = "Organization not found"),
    ),
    tag = "organizations"
)]
pub async fn update_organization(
    State(state): State<AppState>,
    Path(org_id): Path<Uuid>,
    headers: HeaderMap,
    Json(body): Json<UpdateOrganizationRequest>,
) -> AppResult<Json<OrganizationResponse>> {
    require_sync_secret(&headers, &state.config)?;

    let org = organizations::Entity::find_by_id(org_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Organization not found".to_string()))?;

    let mut active: organizations::ActiveModel = org.into();
    if let Some(name) = body.name {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::BadRequest("name must not be empty".to_string()));
        }
        active.name = Set(name);
    }
    if let Some(enabled) = body.auto_sync_enabled {
        active.auto_sync_enabled = Set(enabled);
    }
    if let Some(interval) = body.sync_interval_minutes {
        validate_interval(interval)?;
        active.sync_interval_minutes = Set(interval);
    }
    active.updated_at = Set(Some(Utc::now().into()));

    let updated = active.update(&state.db).await?;
    Ok(Json(updated.into()))
}

fn validate_interval(interval: i32) -> AppResult<()> {
    if interval < 1 {
        return Err(AppError::BadRequest(
            "sync_interval_minutes must be positive".to_string(),
        ));
    }
    Ok(())
}
