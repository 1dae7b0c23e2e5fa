use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use utoipa::ToSchema;

use crate::dto::{ProgressRecord, WorkDetailsRecord, WorkOrderRecord};

/// Current progress of one parent row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ProgressState {
    pub current: i32,
    pub has_data: bool,
    pub latest_date: Option<NaiveDate>,
}

impl ProgressState {
    pub const EMPTY: ProgressState = ProgressState {
        current: 0,
        has_data: false,
        latest_date: None,
    };

    pub fn is_complete(&self) -> bool {
        self.current >= 100
    }
}

impl Default for ProgressState {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Report date, then creation time, then id. The greatest row is current.
fn report_order(a: &ProgressRecord, b: &ProgressRecord) -> Ordering {
    a.report_date
        .cmp(&b.report_date)
        .then_with(|| a.created_at.cmp(&b.created_at))
        .then_with(|| a.id.cmp(&b.id))
}

pub fn latest_progress(rows: &[ProgressRecord]) -> ProgressState {
    rows.iter()
        .max_by(|a, b| report_order(a, b))
        .map(|row| ProgressState {
            current: row.progress,
            has_data: true,
            latest_date: Some(row.report_date),
        })
        .unwrap_or_default()
}

pub fn details_progress(details: &WorkDetailsRecord) -> ProgressState {
    latest_progress(&details.progress)
}

/// Progress of a work order.
///
/// With line items the value is the floored mean of their current progress,
/// so it reaches 100 only when every line item does. Without line items the
/// work order's own progress rows are used.
pub fn work_order_progress(record: &WorkOrderRecord) -> ProgressState {
    if record.details.is_empty() {
        return latest_progress(&record.progress);
    }

    let states: Vec<ProgressState> = record.details.iter().map(details_progress).collect();
    let sum: i64 = states.iter().map(|s| i64::from(s.current)).sum();
    let current = (sum / states.len() as i64) as i32;

    ProgressState {
        current,
        has_data: states.iter().any(|s| s.has_data),
        latest_date: states.iter().filter_map(|s| s.latest_date).max(),
    }
}
