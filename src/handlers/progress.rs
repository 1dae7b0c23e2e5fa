use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;

use crate::auth::CurrentUser;
use crate::commands::RecordProgressCommand;
use crate::dto::{ProgressRecord, RecordProgressRequest};
use crate::errors::ServiceError;
use crate::handlers::{validate_request, AppState};
use crate::ApiResponse;

#[utoipa::path(
    post,
    path = "/api/v1/work-details/{id}/progress",
    summary = "Record progress",
    description = "Append a progress report to a work details item. The newest report \
                   (by report date) becomes its current progress.",
    params(("id" = i64, Path, description = "Work details id")),
    request_body = RecordProgressRequest,
    responses(
        (status = 201, description = "Progress recorded", body = ApiResponse<ProgressRecord>),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 401, description = "Missing caller identity", body = crate::errors::ErrorResponse),
        (status = 404, description = "Work details not found", body = crate::errors::ErrorResponse),
    ),
    tag = "Work Details"
)]
pub async fn record_progress(
    State(state): State<AppState>,
    Path(work_details_id): Path<i64>,
    user: CurrentUser,
    Json(request): Json<RecordProgressRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ProgressRecord>>), ServiceError> {
    if let Err(rejection) = validate_request(&request) {
        return Ok(rejection);
    }

    let command = RecordProgressCommand {
        work_details_id,
        progress: request.progress,
        report_date: request
            .report_date
            .unwrap_or_else(|| Utc::now().date_naive()),
        notes: request.notes,
        evidence_url: request.evidence_url,
        reported_by: user.audit_name(),
    };
    let record = state.work_orders.record_progress(command).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(record))))
}
