//! Shipyard API Library
//!
//! Backend for the shipyard work order console: dashboard rollups, vessel
//! summaries and the work verification pipeline.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod auth;
pub mod commands;
pub mod config;
pub mod db;
pub mod dto;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod middleware_helpers;
pub mod openapi;
pub mod queries;
pub mod rollup;
pub mod services;
pub mod tracing;

use axum::{
    extract::State,
    response::Json,
    routing::{delete, get, post},
    Router,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::db::DbPool;
use crate::rollup::RollupOptions;
use crate::services::{DashboardService, VerificationService, VesselService, WorkOrderService};

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DbPool>,
    pub config: config::AppConfig,
    pub dashboard: DashboardService,
    pub vessels: VesselService,
    pub verification: VerificationService,
    pub work_orders: WorkOrderService,
}

impl AppState {
    /// Wires every service onto one shared connection pool.
    pub fn new(db: Arc<DbPool>, config: config::AppConfig) -> Self {
        let options = RollupOptions {
            upcoming_window: config.upcoming_deadline_window(),
            status_rule: config.status_rule,
        };
        let dashboard =
            DashboardService::new(db.clone(), options, config.dashboard_fetch_timeout());

        Self {
            vessels: VesselService::new(db.clone()),
            verification: VerificationService::new(db.clone()),
            work_orders: WorkOrderService::new(db.clone()),
            dashboard,
            db,
            config,
        }
    }
}

// Common response wrappers
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub errors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

#[derive(Serialize, ToSchema)]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub timestamp: String,
}

impl ResponseMeta {
    fn capture() -> Self {
        Self {
            request_id: crate::tracing::current_request_id().map(|rid| rid.as_str().to_string()),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn validation_errors(errors: Vec<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some("Validation failed".to_string()),
            errors: Some(errors),
            meta: Some(ResponseMeta::capture()),
        }
    }
}


/// Standard API result type for JSON responses
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, errors::ServiceError>;

pub fn api_v1_routes() -> Router<AppState> {
    let views = Router::new()
        .route("/dashboard", get(handlers::dashboard::get_dashboard))
        .route("/vessels", get(handlers::vessels::list_vessels))
        .route("/verification", get(handlers::verification::get_pipeline));

    let writes = Router::new()
        .route(
            "/work-details/:id/progress",
            post(handlers::progress::record_progress),
        )
        .route(
            "/work-details/:id/verification",
            post(handlers::verification::verify_work_details),
        )
        .route(
            "/verifications/:id",
            delete(handlers::verification::revoke_verification),
        )
        .route(
            "/work-orders/:id/permit",
            post(handlers::permits::mark_permit_uploaded),
        );

    Router::new()
        .route("/status", get(api_status))
        .route("/health", get(health_check))
        .merge(views)
        .merge(writes)
}

async fn api_status(State(state): State<AppState>) -> ApiResult<Value> {
    let status_data = json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "git": option_env!("GIT_HASH").unwrap_or("unknown"),
        "service": "shipyard-api",
        "timestamp": Utc::now().to_rfc3339(),
        "environment": state.config.environment,
    });

    Ok(Json(ApiResponse::success(status_data)))
}

async fn health_check(State(state): State<AppState>) -> ApiResult<Value> {
    let db_status = match state.db.ping().await {
        Ok(_) => "healthy",
        Err(err) => {
            ::tracing::warn!(error = %err, "database ping failed");
            "unhealthy"
        }
    };

    let health_data = json!({
        "status": db_status,
        "checks": {
            "database": db_status,
        },
        "timestamp": Utc::now().to_rfc3339(),
    });

    Ok(Json(ApiResponse::success(health_data)))
}
