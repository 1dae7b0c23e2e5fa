use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Shipyard API",
        version = "1.0.0",
        description = r#"
# Shipyard Work Order Console API

Status rollups for ship repair work orders.

## Features

- **Dashboard**: work order statistics and prioritized alerts (missing permits, overdue and upcoming deadlines, ready to start)
- **Vessels**: per-vessel counts of total, active, completed, pending-document and overdue work orders
- **Verification**: completed work grouped by BASTP (handover report), with verify and revoke
- **Progress**: append-only progress reports per work details item

## Identity

Write endpoints expect the caller resolved upstream in `x-user-id` (and optionally `x-user-email`).

## Freshness

Read endpoints wrap their payload in a view envelope. When a refresh fails but an earlier
snapshot exists, the earlier snapshot is returned with `stale = true` and the error message.
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "Dashboard", description = "Dashboard statistics and alerts"),
        (name = "Vessels", description = "Vessel summaries"),
        (name = "Verification", description = "Work verification pipeline"),
        (name = "Work Details", description = "Work details progress reporting"),
        (name = "Work Orders", description = "Work order documents")
    ),
    paths(
        crate::handlers::dashboard::get_dashboard,
        crate::handlers::vessels::list_vessels,
        crate::handlers::verification::get_pipeline,
        crate::handlers::verification::verify_work_details,
        crate::handlers::verification::revoke_verification,
        crate::handlers::progress::record_progress,
        crate::handlers::permits::mark_permit_uploaded,
    ),
    components(
        schemas(
            crate::ApiResponse<serde_json::Value>,
            crate::ResponseMeta,

            crate::rollup::DashboardView,
            crate::rollup::DashboardStats,
            crate::rollup::WorkOrderSummary,
            crate::rollup::Alert,
            crate::rollup::AlertKind,
            crate::rollup::AlertPriority,
            crate::rollup::WorkOrderStatus,
            crate::rollup::ProgressState,
            crate::rollup::VesselSummary,
            crate::rollup::VesselSortKey,
            crate::rollup::SortDirection,
            crate::rollup::VerificationPipeline,
            crate::rollup::VerificationSummary,
            crate::rollup::BastpGroup,
            crate::rollup::VerificationItem,

            crate::dto::WorkOrderRecord,
            crate::dto::WorkDetailsRecord,
            crate::dto::WorkOrderRef,
            crate::dto::VesselRecord,
            crate::dto::ProgressRecord,
            crate::dto::PermitRecord,
            crate::dto::BastpRecord,
            crate::dto::VerificationRecord,
            crate::dto::RecordProgressRequest,
            crate::dto::VerifyWorkDetailsRequest,
            crate::dto::MarkPermitUploadedRequest,
            crate::entities::bastp::BastpStatus,

            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_every_route() {
        let openapi = ApiDocV1::openapi();
        let json = serde_json::to_string_pretty(&openapi).unwrap();
        assert!(json.contains("Shipyard API"));
        for path in [
            "/api/v1/dashboard",
            "/api/v1/vessels",
            "/api/v1/verification",
            "/api/v1/work-details/{id}/progress",
            "/api/v1/work-details/{id}/verification",
            "/api/v1/verifications/{id}",
            "/api/v1/work-orders/{id}/permit",
        ] {
            assert!(json.contains(path), "missing {path}");
        }
    }

    #[test]
    fn alert_kinds_are_documented() {
        let json = serde_json::to_string(&ApiDocV1::openapi()).unwrap();
        assert!(json.contains("missing_permit"));
        assert!(json.contains("upcoming_deadline"));
    }
}
