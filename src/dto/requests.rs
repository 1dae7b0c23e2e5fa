use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct RecordProgressRequest {
    /// Percentage complete
    #[validate(range(min = 0, max = 100))]
    #[schema(example = 50, minimum = 0, maximum = 100)]
    pub progress: i32,
    /// Defaults to today (UTC)
    pub report_date: Option<NaiveDate>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
    /// Blob-store reference to photo evidence
    #[validate(length(min = 1, max = 2048))]
    pub evidence_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate, ToSchema)]
pub struct VerifyWorkDetailsRequest {
    /// Defaults to today (UTC)
    pub verification_date: Option<NaiveDate>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct MarkPermitUploadedRequest {
    /// Blob-store reference returned by the upload
    #[validate(length(min = 1, max = 2048))]
    #[schema(example = "permits/wo-12/ptw.pdf")]
    pub document_url: String,
}
