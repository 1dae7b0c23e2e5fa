use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use utoipa::ToSchema;

use crate::entities::bastp::BastpStatus;
use crate::entities::{
    bastp, permit_to_work, vessel, work_details, work_order, work_progress, work_verification,
};

pub const MIN_PROGRESS: i32 = 0;
pub const MAX_PROGRESS: i32 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct VesselRecord {
    pub id: i64,
    pub name: String,
    pub vessel_type: Option<String>,
    pub company: Option<String>,
}

impl From<vessel::Model> for VesselRecord {
    fn from(model: vessel::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            vessel_type: model.vessel_type,
            company: model.company,
        }
    }
}

/// One dated progress report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ProgressRecord {
    pub id: i64,
    /// Percentage complete, always within 0..=100.
    pub progress: i32,
    pub report_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl From<work_progress::Model> for ProgressRecord {
    fn from(model: work_progress::Model) -> Self {
        let progress = clamp_progress(model.id, model.progress);
        Self {
            id: model.id,
            progress,
            report_date: model.report_date,
            created_at: model.created_at,
        }
    }
}

fn clamp_progress(row_id: i64, value: i32) -> i32 {
    let clamped = value.clamp(MIN_PROGRESS, MAX_PROGRESS);
    if clamped != value {
        warn!(
            progress_id = row_id,
            value, clamped, "progress outside 0..=100, clamping"
        );
    }
    clamped
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PermitRecord {
    pub id: i64,
    pub is_uploaded: bool,
    pub document_url: Option<String>,
}

impl From<permit_to_work::Model> for PermitRecord {
    fn from(model: permit_to_work::Model) -> Self {
        Self {
            id: model.id,
            is_uploaded: model.is_uploaded,
            document_url: model.document_url,
        }
    }
}

/// Work order summary embedded in a work details row for the verification view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct WorkOrderRef {
    pub id: i64,
    pub customer_wo_number: Option<String>,
    pub shipyard_wo_number: Option<String>,
    pub vessel_id: Option<i64>,
    /// Resolved vessel row; `None` when unassigned or not found
    pub vessel: Option<VesselRecord>,
}

impl WorkOrderRef {
    pub fn from_model(model: &work_order::Model, vessel: Option<VesselRecord>) -> Self {
        Self {
            id: model.id,
            customer_wo_number: model.customer_wo_number.clone(),
            shipyard_wo_number: model.shipyard_wo_number.clone(),
            vessel_id: model.vessel_id,
            vessel,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct WorkDetailsRecord {
    pub id: i64,
    pub work_order_id: i64,
    pub description: Option<String>,
    pub location: Option<String>,
    pub pic: Option<String>,
    pub is_bastp_included: bool,
    pub bastp_id: Option<i64>,
    pub storage_path: Option<String>,
    pub progress: Vec<ProgressRecord>,
    pub work_order: Option<WorkOrderRef>,
}

impl WorkDetailsRecord {
    pub fn from_model(
        model: work_details::Model,
        progress: Vec<ProgressRecord>,
        work_order: Option<WorkOrderRef>,
    ) -> Self {
        Self {
            id: model.id,
            work_order_id: model.work_order_id,
            description: model.description,
            location: model.location,
            pic: model.pic,
            is_bastp_included: model.is_bastp_included,
            bastp_id: model.bastp_id,
            storage_path: model.storage_path,
            progress,
            work_order,
        }
    }

    /// Both the inclusion flag and the reference are set.
    pub fn bastp_group(&self) -> Option<i64> {
        if self.is_bastp_included {
            self.bastp_id
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct WorkOrderRecord {
    pub id: i64,
    pub vessel_id: Option<i64>,
    pub vessel: Option<VesselRecord>,
    pub customer_wo_number: Option<String>,
    pub shipyard_wo_number: Option<String>,
    pub planned_start_date: Option<DateTime<Utc>>,
    pub target_close_date: Option<DateTime<Utc>>,
    pub actual_start_date: Option<DateTime<Utc>>,
    pub actual_close_date: Option<DateTime<Utc>>,
    pub wo_document_status: bool,
    pub details: Vec<WorkDetailsRecord>,
    /// Progress rows attached to the work order itself.
    pub progress: Vec<ProgressRecord>,
    pub permits: Vec<PermitRecord>,
}

impl WorkOrderRecord {
    pub fn from_model(
        model: work_order::Model,
        vessel: Option<VesselRecord>,
        details: Vec<WorkDetailsRecord>,
        progress: Vec<ProgressRecord>,
        permits: Vec<PermitRecord>,
    ) -> Self {
        let wo_document_status = model.has_complete_documents();
        Self {
            id: model.id,
            vessel_id: model.vessel_id,
            vessel,
            customer_wo_number: model.customer_wo_number,
            shipyard_wo_number: model.shipyard_wo_number,
            planned_start_date: model.planned_start_date,
            target_close_date: model.target_close_date,
            actual_start_date: model.actual_start_date,
            actual_close_date: model.actual_close_date,
            wo_document_status,
            details,
            progress,
            permits,
        }
    }

    pub fn has_uploaded_permit(&self) -> bool {
        self.permits.iter().any(|p| p.is_uploaded)
    }

    pub fn vessel_name(&self) -> Option<&str> {
        self.vessel.as_ref().map(|v| v.name.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BastpRecord {
    pub id: i64,
    pub number: String,
    pub date: NaiveDate,
    pub delivery_date: Option<NaiveDate>,
    pub status: BastpStatus,
    pub vessel_id: Option<i64>,
}

impl From<bastp::Model> for BastpRecord {
    fn from(model: bastp::Model) -> Self {
        Self {
            id: model.id,
            number: model.number,
            date: model.date,
            delivery_date: model.delivery_date,
            status: model.status,
            vessel_id: model.vessel_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct VerificationRecord {
    pub id: i64,
    pub work_details_id: i64,
    pub verification_date: NaiveDate,
    pub verified_by: String,
    pub verification_notes: Option<String>,
}

impl From<work_verification::Model> for VerificationRecord {
    fn from(model: work_verification::Model) -> Self {
        Self {
            id: model.id,
            work_details_id: model.work_details_id,
            verification_date: model.verification_date,
            verified_by: model.verified_by,
            verification_notes: model.verification_notes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    fn progress_row(progress: i32) -> work_progress::Model {
        work_progress::Model {
            id: 1,
            work_details_id: Some(1),
            work_order_id: None,
            progress,
            report_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            notes: None,
            evidence_url: None,
            reported_by: None,
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap(),
        }
    }

    #[rstest]
    #[case(-5, 0)]
    #[case(0, 0)]
    #[case(55, 55)]
    #[case(100, 100)]
    #[case(140, 100)]
    fn progress_is_clamped_at_the_boundary(#[case] raw: i32, #[case] expected: i32) {
        assert_eq!(ProgressRecord::from(progress_row(raw)).progress, expected);
    }

    fn work_order_model() -> work_order::Model {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        work_order::Model {
            id: 9,
            vessel_id: Some(1),
            customer_wo_number: Some("C-1".into()),
            customer_wo_date: Some(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()),
            shipyard_wo_number: Some("S-1".into()),
            shipyard_wo_date: None,
            planned_start_date: None,
            target_close_date: None,
            actual_start_date: None,
            actual_close_date: None,
            wo_document_delivery_date: None,
            wo_document_status: true,
            created_by: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[test]
    fn document_status_is_rederived_from_fields() {
        let record = WorkOrderRecord::from_model(work_order_model(), None, vec![], vec![], vec![]);
        assert!(!record.wo_document_status);

        let mut model = work_order_model();
        model.shipyard_wo_date = Some(NaiveDate::from_ymd_opt(2024, 2, 2).unwrap());
        let record = WorkOrderRecord::from_model(model, None, vec![], vec![], vec![]);
        assert!(record.wo_document_status);
    }

    #[test]
    fn bastp_group_requires_flag_and_reference() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        let model = work_details::Model {
            id: 3,
            work_order_id: 9,
            description: None,
            location: None,
            quantity: None,
            uom: None,
            pic: None,
            planned_start_date: None,
            target_close_date: None,
            actual_start_date: None,
            actual_close_date: None,
            storage_path: None,
            is_bastp_included: false,
            bastp_id: Some(4),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        let mut record = WorkDetailsRecord::from_model(model, vec![], None);
        assert_eq!(record.bastp_group(), None);

        record.is_bastp_included = true;
        assert_eq!(record.bastp_group(), Some(4));

        record.bastp_id = None;
        assert_eq!(record.bastp_group(), None);
    }
}
