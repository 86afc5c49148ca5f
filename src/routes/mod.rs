pub mod alerts;
pub mod health;
pub mod organizations;
pub mod plants;
mod rate_limit;
pub mod sync;
pub mod telemetry;
pub mod vendors;

use axum::{
    http::{header, HeaderMap},
    routing::{get, patch},
    Router,
};
use std::sync::Arc;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};

use rate_limit::FallbackIpKeyExtractor;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::common::AppState;
use crate::config::Config;
use crate::entity::alerts::{AlertSeverity, AlertStatus};
use crate::entity::sync_runs::{SyncKind, SyncTrigger};
use crate::entity::vendors::VendorType;
use crate::error::{AppError, AppResult};
use crate::sync::{SyncSummary, VendorOutcome};
use crate::vendor::{TelemetryGranularity, TelemetryRecord};

/// Check the shared bearer secret carried by sync triggers and admin mutations.
pub(crate) fn require_sync_secret(headers: &HeaderMap, config: &Config) -> AppResult<()> {
    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .is_some_and(|token| token == config.sync_trigger_secret);

    if authorized {
        Ok(())
    } else {
        Err(AppError::Unauthorized)
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthz,
        sync::trigger_plant_sync,
        sync::force_plant_sync,
        sync::trigger_alert_sync,
        sync::force_alert_sync,
        sync::list_sync_runs,
        organizations::list_organizations,
        organizations::create_organization,
        organizations::update_organization,
        vendors::list_vendors,
        vendors::create_vendor,
        vendors::update_vendor,
        plants::list_plants,
        plants::get_plant,
        alerts::list_alerts,
        alerts::list_active_alerts,
        telemetry::get_plant_telemetry,
    ),
    components(
        schemas(
            SyncSummary,
            VendorOutcome,
            SyncKind,
            SyncTrigger,
            VendorType,
            AlertSeverity,
            AlertStatus,
            TelemetryGranularity,
            TelemetryRecord,
            sync::SyncRunResponse,
            organizations::OrganizationResponse,
            organizations::CreateOrganizationRequest,
            organizations::UpdateOrganizationRequest,
            vendors::VendorResponse,
            vendors::CreateVendorRequest,
            vendors::UpdateVendorRequest,
            plants::PlantResponse,
            plants::PlantsListResponse,
            alerts::AlertResponse,
            alerts::AlertsListResponse,
            telemetry::TelemetryResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "sync", description = "Sync triggers and run history"),
        (name = "organizations", description = "Tenant organizations"),
        (name = "vendors", description = "Vendor portal integrations"),
        (name = "plants", description = "Synced solar plants"),
        (name = "alerts", description = "Synced plant alerts"),
        (name = "telemetry", description = "Live generation history"),
    ),
    info(
        title = "Helio Sync API",
        description = "Multi-vendor solar plant telemetry and alert sync",
        version = "0.1.0"
    )
)]
struct ApiDoc;

pub fn build_router(state: AppState) -> Router {
    let config = &state.config;

    if config.disable_rate_limiting {
        tracing::warn!("Rate limiting DISABLED");
    } else {
        tracing::info!(
            api_rate = %format!("{}/s burst {}", config.rate_limit_api_per_second, config.rate_limit_api_burst),
            "Rate limiting configured"
        );
    }

    // Base routes without rate limiting
    let api_routes_base = Router::new()
        .route(
            "/organizations",
            get(organizations::list_organizations).post(organizations::create_organization),
        )
        .route(
            "/organizations/{org_id}",
            patch(organizations::update_organization),
        )
        .route(
            "/vendors",
            get(vendors::list_vendors).post(vendors::create_vendor),
        )
        .route("/vendors/{vendor_id}", patch(vendors::update_vendor))
        .route("/plants", get(plants::list_plants))
        .route("/plants/{plant_id}", get(plants::get_plant))
        .route(
            "/plants/{plant_id}/telemetry",
            get(telemetry::get_plant_telemetry),
        )
        .route("/alerts", get(alerts::list_alerts))
        .route("/alerts/active", get(alerts::list_active_alerts))
        .route(
            "/sync/plants",
            get(sync::trigger_plant_sync).post(sync::force_plant_sync),
        )
        .route(
            "/sync/alerts",
            get(sync::trigger_alert_sync).post(sync::force_alert_sync),
        )
        .route("/sync/runs", get(sync::list_sync_runs));

    // Apply rate limiting unless disabled. One bucket for the whole API;
    // the secret-guarded endpoints see cron-scale traffic and fit under it.
    let api_routes = if config.disable_rate_limiting {
        api_routes_base
    } else {
        let api_limiter = GovernorConfigBuilder::default()
            .key_extractor(FallbackIpKeyExtractor)
            .per_second(config.rate_limit_api_per_second)
            .burst_size(config.rate_limit_api_burst)
            .finish()
            .expect("Failed to create API rate limiter");

        api_routes_base.layer(GovernorLayer {
            config: Arc::new(api_limiter),
        })
    }
    .layer(RequestBodyLimitLayer::new(1024 * 1024)); // 1MB body limit

    // Health check routes (NO rate limiting)
    let health_routes = Router::new().route("/healthz", get(health::healthz));

    // OpenAPI documentation
    let docs_routes = Router::new().merge(Scalar::with_url("/docs", ApiDoc::openapi()));

    // Combine all routes
    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .merge(docs_routes)
        .layer(CompressionLayer::new())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
