use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::dto::WorkOrderRecord;
use crate::rollup::status::WorkOrderStatus;

const DAY_MS: i64 = 86_400_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AlertKind {
    MissingPermit,
    Overdue,
    UpcomingDeadline,
    ReadyToStart,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AlertPriority {
    Low,
    Medium,
    High,
}

impl AlertPriority {
    pub fn rank(self) -> u8 {
        match self {
            AlertPriority::High => 3,
            AlertPriority::Medium => 2,
            AlertPriority::Low => 1,
        }
    }
}

impl AlertKind {
    pub fn priority(self) -> AlertPriority {
        match self {
            AlertKind::MissingPermit | AlertKind::Overdue => AlertPriority::High,
            AlertKind::UpcomingDeadline => AlertPriority::Medium,
            AlertKind::ReadyToStart => AlertPriority::Low,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Alert {
    pub kind: AlertKind,
    pub priority: AlertPriority,
    pub work_order_id: i64,
    pub work_order_number: Option<String>,
    pub vessel_name: Option<String>,
    pub message: String,
    /// Days overdue or remaining, when the alert is date based
    pub days: Option<i64>,
}

/// Whole days covering `delta`, rounded up. `delta` must be positive.
pub fn ceil_days(delta: Duration) -> i64 {
    let ms = delta.num_milliseconds();
    (ms + DAY_MS - 1).div_euclid(DAY_MS)
}

fn plural(n: i64) -> &'static str {
    if n == 1 {
        "day"
    } else {
        "days"
    }
}

fn label(record: &WorkOrderRecord) -> String {
    record
        .shipyard_wo_number
        .clone()
        .or_else(|| record.customer_wo_number.clone())
        .unwrap_or_else(|| format!("#{}", record.id))
}

fn make_alert(record: &WorkOrderRecord, kind: AlertKind, message: String, days: Option<i64>) -> Alert {
    Alert {
        kind,
        priority: kind.priority(),
        work_order_id: record.id,
        work_order_number: record
            .shipyard_wo_number
            .clone()
            .or_else(|| record.customer_wo_number.clone()),
        vessel_name: record.vessel_name().map(str::to_string),
        message,
        days,
    }
}

/// Alerts raised by one work order, in check order. Completed work orders
/// raise nothing.
pub fn alerts_for(
    record: &WorkOrderRecord,
    status: WorkOrderStatus,
    now: DateTime<Utc>,
    upcoming_window: Duration,
) -> Vec<Alert> {
    let mut alerts = Vec::new();
    if status == WorkOrderStatus::Completed {
        return alerts;
    }

    let name = label(record);
    let vessel = record.vessel_name().unwrap_or("unassigned vessel");
    let permit_uploaded = record.has_uploaded_permit();

    if !permit_uploaded {
        alerts.push(make_alert(
            record,
            AlertKind::MissingPermit,
            format!("Work order {name} ({vessel}) has no uploaded permit to work"),
            None,
        ));
    }

    if let Some(target) = record.target_close_date {
        if target < now {
            let days = ceil_days(now - target);
            alerts.push(make_alert(
                record,
                AlertKind::Overdue,
                format!(
                    "Work order {name} ({vessel}) is overdue by {days} {}",
                    plural(days)
                ),
                Some(days),
            ));
        } else if now < target && target <= now + upcoming_window {
            let days = ceil_days(target - now);
            alerts.push(make_alert(
                record,
                AlertKind::UpcomingDeadline,
                format!(
                    "Work order {name} ({vessel}) is due in {days} {}",
                    plural(days)
                ),
                Some(days),
            ));
        }
    }

    if permit_uploaded
        && record.actual_start_date.is_none()
        && record.planned_start_date.is_some_and(|planned| planned <= now)
    {
        alerts.push(make_alert(
            record,
            AlertKind::ReadyToStart,
            format!("Work order {name} ({vessel}) has its permit and can start"),
            None,
        ));
    }

    alerts
}

/// Highest priority first; equal priorities keep their relative order.
pub fn sort_by_priority(alerts: &mut [Alert]) {
    alerts.sort_by(|a, b| b.priority.rank().cmp(&a.priority.rank()));
}
