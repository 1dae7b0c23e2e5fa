use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;

use crate::handlers::AppState;
use crate::rollup::{VesselQuery, VesselSummary};
use crate::services::ViewEnvelope;
use crate::{ApiResponse, ApiResult};

#[utoipa::path(
    get,
    path = "/api/v1/vessels",
    summary = "Vessel summaries",
    description = "Work order counts per vessel, filtered and sorted",
    params(VesselQuery),
    responses(
        (status = 200, description = "Vessel summaries built", body = ApiResponse<ViewEnvelope<Vec<VesselSummary>>>),
        (status = 400, description = "Invalid query parameters", body = crate::errors::ErrorResponse),
        (status = 500, description = "Fetch failed and no earlier snapshot exists", body = crate::errors::ErrorResponse),
    ),
    tag = "Vessels"
)]
pub async fn list_vessels(
    State(state): State<AppState>,
    Query(query): Query<VesselQuery>,
) -> ApiResult<ViewEnvelope<Vec<VesselSummary>>> {
    let envelope = state.vessels.refresh(&query, Utc::now()).await?;
    Ok(Json(ApiResponse::success(envelope)))
}
