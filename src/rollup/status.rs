use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::dto::WorkOrderRecord;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ToSchema,
    strum::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum WorkOrderStatus {
    Planned,
    ReadyToStart,
    InProgress,
    Completed,
}

/// Which signals count towards a work order's status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StatusRule {
    /// Only the actual and planned dates decide
    DatesOnly,
    /// Dates, plus reported progress (100 completes, above 0 starts)
    #[default]
    DatesAndProgress,
}

/// Classifies a work order under `rule`. The first matching rule wins:
/// closed is `Completed`, started is `InProgress`, a planned start at or
/// before `now` is `ReadyToStart`, anything else is `Planned`. With
/// `DatesAndProgress`, 100% also completes and anything above 0% starts.
pub fn classify_with(
    record: &WorkOrderRecord,
    progress: i32,
    now: DateTime<Utc>,
    rule: StatusRule,
) -> WorkOrderStatus {
    let by_progress = rule == StatusRule::DatesAndProgress;
    if record.actual_close_date.is_some() || (by_progress && progress >= 100) {
        WorkOrderStatus::Completed
    } else if record.actual_start_date.is_some() || (by_progress && progress > 0) {
        WorkOrderStatus::InProgress
    } else if record.planned_start_date.is_some_and(|planned| planned <= now) {
        WorkOrderStatus::ReadyToStart
    } else {
        WorkOrderStatus::Planned
    }
}

/// Progress-aware classification, the rule alerts and vessel counts use.
pub fn classify(record: &WorkOrderRecord, progress: i32, now: DateTime<Utc>) -> WorkOrderStatus {
    classify_with(record, progress, now, StatusRule::DatesAndProgress)
}
