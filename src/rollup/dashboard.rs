use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use utoipa::ToSchema;

use crate::dto::WorkOrderRecord;
use crate::rollup::alerts::{alerts_for, sort_by_priority, Alert, AlertKind};
use crate::rollup::progress::work_order_progress;
use crate::rollup::status::{classify, classify_with, WorkOrderStatus};
use crate::rollup::RollupOptions;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DashboardStats {
    pub total_work_orders: usize,
    pub planned: usize,
    pub ready_to_start: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub overdue: usize,
    pub upcoming_deadlines: usize,
    pub missing_permits: usize,
    pub pending_documents: usize,
    pub total_vessels: usize,
    /// Floored mean of work order progress, 0 when there are none
    pub average_progress: i32,
}

/// One row of the dashboard work order table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct WorkOrderSummary {
    pub id: i64,
    pub customer_wo_number: Option<String>,
    pub shipyard_wo_number: Option<String>,
    pub vessel_id: Option<i64>,
    pub vessel_name: Option<String>,
    pub status: WorkOrderStatus,
    pub progress: i32,
    pub has_progress_data: bool,
    pub latest_progress_date: Option<NaiveDate>,
    pub target_close_date: Option<DateTime<Utc>>,
    pub is_overdue: bool,
    pub permit_uploaded: bool,
    pub wo_document_status: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DashboardView {
    pub stats: DashboardStats,
    pub alerts: Vec<Alert>,
    pub work_orders: Vec<WorkOrderSummary>,
}

pub fn build_dashboard(
    work_orders: &[WorkOrderRecord],
    now: DateTime<Utc>,
    options: &RollupOptions,
) -> DashboardView {
    let mut stats = DashboardStats {
        total_work_orders: work_orders.len(),
        ..Default::default()
    };
    let mut alerts = Vec::new();
    let mut rows = Vec::with_capacity(work_orders.len());
    let mut vessels = HashSet::new();
    let mut progress_sum: i64 = 0;

    for record in work_orders {
        let progress = work_order_progress(record);
        let status = classify_with(record, progress.current, now, options.status_rule);

        match status {
            WorkOrderStatus::Planned => stats.planned += 1,
            WorkOrderStatus::ReadyToStart => stats.ready_to_start += 1,
            WorkOrderStatus::InProgress => stats.in_progress += 1,
            WorkOrderStatus::Completed => stats.completed += 1,
        }
        if !record.wo_document_status {
            stats.pending_documents += 1;
        }
        if let Some(vessel_id) = record.vessel_id {
            vessels.insert(vessel_id);
        }
        progress_sum += i64::from(progress.current);

        // Alerts always follow the progress-aware rule.
        let alert_status = classify(record, progress.current, now);
        let raised = alerts_for(record, alert_status, now, options.upcoming_window);
        for alert in &raised {
            match alert.kind {
                AlertKind::Overdue => stats.overdue += 1,
                AlertKind::UpcomingDeadline => stats.upcoming_deadlines += 1,
                AlertKind::MissingPermit => stats.missing_permits += 1,
                AlertKind::ReadyToStart => {}
            }
        }
        let is_overdue = raised.iter().any(|a| a.kind == AlertKind::Overdue);
        alerts.extend(raised);

        rows.push(WorkOrderSummary {
            id: record.id,
            customer_wo_number: record.customer_wo_number.clone(),
            shipyard_wo_number: record.shipyard_wo_number.clone(),
            vessel_id: record.vessel_id,
            vessel_name: record.vessel_name().map(str::to_string),
            status,
            progress: progress.current,
            has_progress_data: progress.has_data,
            latest_progress_date: progress.latest_date,
            target_close_date: record.target_close_date,
            is_overdue,
            permit_uploaded: record.has_uploaded_permit(),
            wo_document_status: record.wo_document_status,
        });
    }

    sort_by_priority(&mut alerts);

    stats.total_vessels = vessels.len();
    if !work_orders.is_empty() {
        stats.average_progress = (progress_sum / work_orders.len() as i64) as i32;
    }

    DashboardView {
        stats,
        alerts,
        work_orders: rows,
    }
}
