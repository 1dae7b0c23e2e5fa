use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use utoipa::{IntoParams, ToSchema};

use crate::dto::{VesselRecord, WorkOrderRecord};
use crate::rollup::progress::work_order_progress;
use crate::rollup::status::{classify, WorkOrderStatus};
use crate::rollup::{contains_folded, fold};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct VesselSummary {
    pub vessel_id: i64,
    /// Empty when the vessel row could not be resolved
    pub name: String,
    pub vessel_type: Option<String>,
    pub company: Option<String>,
    pub total: usize,
    pub active: usize,
    pub completed: usize,
    pub pending_documents: usize,
    pub overdue: usize,
}

impl VesselSummary {
    fn empty(vessel_id: i64, vessel: Option<&VesselRecord>) -> Self {
        Self {
            vessel_id,
            name: vessel.map(|v| v.name.clone()).unwrap_or_default(),
            vessel_type: vessel.and_then(|v| v.vessel_type.clone()),
            company: vessel.and_then(|v| v.company.clone()),
            total: 0,
            active: 0,
            completed: 0,
            pending_documents: 0,
            overdue: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum VesselSortKey {
    #[default]
    Name,
    Total,
    Active,
    Overdue,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct VesselQuery {
    /// Case-insensitive match on name, type or company
    pub search: Option<String>,
    #[serde(default)]
    pub sort_by: VesselSortKey,
    #[serde(default)]
    pub direction: SortDirection,
}

/// Per-vessel counts. Work orders without a vessel are left out; vessels
/// from `vessels` with no work orders appear with zero counts.
pub fn summarize_vessels(
    work_orders: &[WorkOrderRecord],
    vessels: &[VesselRecord],
    now: DateTime<Utc>,
) -> Vec<VesselSummary> {
    let lookup: BTreeMap<i64, &VesselRecord> = vessels.iter().map(|v| (v.id, v)).collect();
    let mut summaries: BTreeMap<i64, VesselSummary> = vessels
        .iter()
        .map(|v| (v.id, VesselSummary::empty(v.id, Some(v))))
        .collect();

    for record in work_orders {
        let Some(vessel_id) = record.vessel_id else {
            continue;
        };
        let summary = summaries.entry(vessel_id).or_insert_with(|| {
            let vessel = record.vessel.as_ref().or_else(|| lookup.get(&vessel_id).copied());
            VesselSummary::empty(vessel_id, vessel)
        });

        let progress = work_order_progress(record);
        summary.total += 1;
        match classify(record, progress.current, now) {
            WorkOrderStatus::InProgress => summary.active += 1,
            WorkOrderStatus::Completed => summary.completed += 1,
            WorkOrderStatus::Planned | WorkOrderStatus::ReadyToStart => {}
        }
        if !record.wo_document_status {
            summary.pending_documents += 1;
        }
        if record.target_close_date.is_some_and(|t| t < now) && progress.current < 100 {
            summary.overdue += 1;
        }
    }

    summaries.into_values().collect()
}

fn compare_names(a: &VesselSummary, b: &VesselSummary) -> Ordering {
    fold(&a.name)
        .cmp(&fold(&b.name))
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.vessel_id.cmp(&b.vessel_id))
}

/// Filters by `query.search` and orders by `query.sort_by`. Count keys fall
/// back to name order on ties.
pub fn apply_vessel_query(mut summaries: Vec<VesselSummary>, query: &VesselQuery) -> Vec<VesselSummary> {
    if let Some(needle) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let needle = fold(needle);
        summaries.retain(|s| {
            contains_folded(Some(&s.name), &needle)
                || contains_folded(s.vessel_type.as_deref(), &needle)
                || contains_folded(s.company.as_deref(), &needle)
        });
    }

    let key = |s: &VesselSummary| match query.sort_by {
        VesselSortKey::Name => 0,
        VesselSortKey::Total => s.total,
        VesselSortKey::Active => s.active,
        VesselSortKey::Overdue => s.overdue,
    };

    summaries.sort_by(|a, b| {
        let primary = key(a).cmp(&key(b));
        let ordering = match query.direction {
            SortDirection::Asc => primary,
            SortDirection::Desc => primary.reverse(),
        };
        ordering.then_with(|| match (query.sort_by, query.direction) {
            (VesselSortKey::Name, SortDirection::Desc) => compare_names(b, a),
            _ => compare_names(a, b),
        })
    });

    summaries
}
