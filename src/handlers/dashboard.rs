use axum::{extract::State, Json};
use chrono::Utc;

use crate::handlers::AppState;
use crate::rollup::DashboardView;
use crate::services::ViewEnvelope;
use crate::{ApiResponse, ApiResult};

#[utoipa::path(
    get,
    path = "/api/v1/dashboard",
    summary = "Dashboard",
    description = "Work order statistics, prioritized alerts and the work order table. \
                   `stale` is set when the latest refresh failed and the previous snapshot is served.",
    responses(
        (status = 200, description = "Dashboard built", body = ApiResponse<ViewEnvelope<DashboardView>>,
            headers(("X-Request-Id" = String, description = "Unique request id"))
        ),
        (status = 500, description = "Fetch failed and no earlier snapshot exists", body = crate::errors::ErrorResponse),
        (status = 504, description = "Fetch timed out and no earlier snapshot exists", body = crate::errors::ErrorResponse),
    ),
    tag = "Dashboard"
)]
pub async fn get_dashboard(State(state): State<AppState>) -> ApiResult<ViewEnvelope<DashboardView>> {
    let envelope = state.dashboard.refresh(Utc::now()).await?;
    Ok(Json(ApiResponse::success(envelope)))
}
