use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;

use crate::auth::CurrentUser;
use crate::commands::{RevokeVerificationCommand, VerifyWorkDetailsCommand};
use crate::dto::{VerificationRecord, VerifyWorkDetailsRequest};
use crate::errors::ServiceError;
use crate::handlers::{validate_request, AppState};
use crate::rollup::{VerificationFilter, VerificationPipeline};
use crate::services::ViewEnvelope;
use crate::{ApiResponse, ApiResult};

#[utoipa::path(
    get,
    path = "/api/v1/verification",
    summary = "Verification pipeline",
    description = "Completed work details split into pending (with and without BASTP) and verified, \
                   grouped by BASTP",
    params(VerificationFilter),
    responses(
        (status = 200, description = "Pipeline built", body = ApiResponse<ViewEnvelope<VerificationPipeline>>),
        (status = 400, description = "Invalid query parameters", body = crate::errors::ErrorResponse),
        (status = 500, description = "Fetch failed and no earlier snapshot exists", body = crate::errors::ErrorResponse),
    ),
    tag = "Verification"
)]
pub async fn get_pipeline(
    State(state): State<AppState>,
    Query(filter): Query<VerificationFilter>,
) -> ApiResult<ViewEnvelope<VerificationPipeline>> {
    let envelope = state.verification.refresh(&filter).await?;
    Ok(Json(ApiResponse::success(envelope)))
}

#[utoipa::path(
    post,
    path = "/api/v1/work-details/{id}/verification",
    summary = "Verify work details",
    description = "Record a verification for a work details item whose current progress is 100",
    params(("id" = i64, Path, description = "Work details id")),
    request_body = VerifyWorkDetailsRequest,
    responses(
        (status = 201, description = "Verification recorded", body = ApiResponse<VerificationRecord>),
        (status = 400, description = "Invalid request or work not complete", body = crate::errors::ErrorResponse),
        (status = 401, description = "Missing caller identity", body = crate::errors::ErrorResponse),
        (status = 404, description = "Work details not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Already verified", body = crate::errors::ErrorResponse),
    ),
    tag = "Verification"
)]
pub async fn verify_work_details(
    State(state): State<AppState>,
    Path(work_details_id): Path<i64>,
    user: CurrentUser,
    Json(request): Json<VerifyWorkDetailsRequest>,
) -> Result<(StatusCode, Json<ApiResponse<VerificationRecord>>), ServiceError> {
    if let Err(rejection) = validate_request(&request) {
        return Ok(rejection);
    }

    let command = VerifyWorkDetailsCommand {
        work_details_id,
        verification_date: request
            .verification_date
            .unwrap_or_else(|| Utc::now().date_naive()),
        notes: request.notes,
        verified_by: user.audit_name(),
    };
    let record = state.verification.verify(command).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(record))))
}

#[utoipa::path(
    delete,
    path = "/api/v1/verifications/{id}",
    summary = "Revoke verification",
    description = "Soft-delete a verification; the work details item returns to pending",
    params(("id" = i64, Path, description = "Verification id")),
    responses(
        (status = 200, description = "Verification revoked", body = ApiResponse<VerificationRecord>),
        (status = 401, description = "Missing caller identity", body = crate::errors::ErrorResponse),
        (status = 404, description = "Verification not found", body = crate::errors::ErrorResponse),
    ),
    tag = "Verification"
)]
pub async fn revoke_verification(
    State(state): State<AppState>,
    Path(verification_id): Path<i64>,
    user: CurrentUser,
) -> ApiResult<VerificationRecord> {
    let command = RevokeVerificationCommand {
        verification_id,
        revoked_by: user.audit_name(),
    };
    let record = state.verification.revoke(command).await?;
    Ok(Json(ApiResponse::success(record)))
}
