//! Record builders shared by the engine's unit tests.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

use crate::dto::{
    BastpRecord, PermitRecord, ProgressRecord, VerificationRecord, VesselRecord,
    WorkDetailsRecord, WorkOrderRecord, WorkOrderRef,
};
use crate::entities::bastp::BastpStatus;

pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
}

pub fn day(n: i64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap() + Duration::days(n)
}

pub fn at_hour(n: i64, hour: u32) -> DateTime<Utc> {
    Utc.from_utc_datetime(&day(n).and_hms_opt(hour, 0, 0).unwrap())
}

pub fn progress(id: i64, pct: i32, report_day: i64) -> ProgressRecord {
    ProgressRecord {
        id,
        progress: pct,
        report_date: day(report_day),
        created_at: at_hour(report_day, 12),
    }
}

pub fn vessel(id: i64, name: &str) -> VesselRecord {
    VesselRecord {
        id,
        name: name.to_string(),
        vessel_type: None,
        company: None,
    }
}

pub fn permit(id: i64, uploaded: bool) -> PermitRecord {
    PermitRecord {
        id,
        is_uploaded: uploaded,
        document_url: uploaded.then(|| format!("permits/{id}.pdf")),
    }
}

pub fn work_order(id: i64) -> WorkOrderRecord {
    WorkOrderRecord {
        id,
        vessel_id: None,
        vessel: None,
        customer_wo_number: None,
        shipyard_wo_number: None,
        planned_start_date: None,
        target_close_date: None,
        actual_start_date: None,
        actual_close_date: None,
        wo_document_status: false,
        details: Vec::new(),
        progress: Vec::new(),
        permits: Vec::new(),
    }
}

pub fn details(id: i64, work_order_id: i64, progress: Vec<ProgressRecord>) -> WorkDetailsRecord {
    WorkDetailsRecord {
        id,
        work_order_id,
        description: None,
        location: None,
        pic: None,
        is_bastp_included: false,
        bastp_id: None,
        storage_path: None,
        progress,
        work_order: None,
    }
}

pub fn completed_details(id: i64, vessel: Option<VesselRecord>) -> WorkDetailsRecord {
    let mut record = details(id, 1, vec![progress(id * 10, 100, 1)]);
    record.work_order = Some(WorkOrderRef {
        id: 1,
        customer_wo_number: None,
        shipyard_wo_number: None,
        vessel_id: vessel.as_ref().map(|v| v.id),
        vessel,
    });
    record
}

pub fn bastp(id: i64, number: &str, date_day: i64) -> BastpRecord {
    BastpRecord {
        id,
        number: number.to_string(),
        date: day(date_day),
        delivery_date: None,
        status: BastpStatus::Submitted,
        vessel_id: None,
    }
}

pub fn verification(id: i64, work_details_id: i64) -> VerificationRecord {
    VerificationRecord {
        id,
        work_details_id,
        verification_date: day(2),
        verified_by: "qa@shipyard.test".to_string(),
        verification_notes: None,
    }
}
