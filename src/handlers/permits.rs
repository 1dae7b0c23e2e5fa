use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::auth::CurrentUser;
use crate::commands::MarkPermitUploadedCommand;
use crate::dto::{MarkPermitUploadedRequest, PermitRecord};
use crate::errors::ServiceError;
use crate::handlers::{validate_request, AppState};
use crate::ApiResponse;

#[utoipa::path(
    post,
    path = "/api/v1/work-orders/{id}/permit",
    summary = "Mark permit uploaded",
    description = "Record the uploaded permit to work for a work order. Clears the \
                   `missing_permit` alert on the next dashboard refresh.",
    params(("id" = i64, Path, description = "Work order id")),
    request_body = MarkPermitUploadedRequest,
    responses(
        (status = 200, description = "Permit recorded", body = ApiResponse<PermitRecord>),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 401, description = "Missing caller identity", body = crate::errors::ErrorResponse),
        (status = 404, description = "Work order not found", body = crate::errors::ErrorResponse),
    ),
    tag = "Work Orders"
)]
pub async fn mark_permit_uploaded(
    State(state): State<AppState>,
    Path(work_order_id): Path<i64>,
    user: CurrentUser,
    Json(request): Json<MarkPermitUploadedRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PermitRecord>>), ServiceError> {
    if let Err(rejection) = validate_request(&request) {
        return Ok(rejection);
    }

    let command = MarkPermitUploadedCommand {
        work_order_id,
        document_url: request.document_url,
        uploaded_by: user.audit_name(),
    };
    let record = state.work_orders.mark_permit_uploaded(command).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(record))))
}
