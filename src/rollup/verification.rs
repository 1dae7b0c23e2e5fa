use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use utoipa::{IntoParams, ToSchema};

use crate::dto::{BastpRecord, VerificationRecord, WorkDetailsRecord};
use crate::rollup::progress::{details_progress, ProgressState};
use crate::rollup::{contains_folded, fold};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct VerificationFilter {
    /// Case-insensitive match on description, location, PIC, order numbers,
    /// vessel name or vessel company
    pub search: Option<String>,
    /// Restrict to one vessel; 0 means all vessels
    #[serde(default)]
    pub vessel_id: i64,
}

impl VerificationFilter {
    fn matches(&self, details: &WorkDetailsRecord, needle: Option<&str>) -> bool {
        let work_order = details.work_order.as_ref();
        let vessel = work_order.and_then(|wo| wo.vessel.as_ref());

        if self.vessel_id != 0 && work_order.and_then(|wo| wo.vessel_id) != Some(self.vessel_id) {
            return false;
        }

        let Some(needle) = needle else {
            return true;
        };
        [
            details.description.as_deref(),
            details.location.as_deref(),
            details.pic.as_deref(),
            work_order.and_then(|wo| wo.customer_wo_number.as_deref()),
            work_order.and_then(|wo| wo.shipyard_wo_number.as_deref()),
            vessel.map(|v| v.name.as_str()),
            vessel.and_then(|v| v.company.as_deref()),
        ]
        .into_iter()
        .any(|field| contains_folded(field, needle))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct VerificationItem {
    pub details: WorkDetailsRecord,
    pub progress: ProgressState,
    /// Active verification, present only in the verified pipeline
    pub verification: Option<VerificationRecord>,
}

/// Work details sharing one BASTP reference. `bastp` is `None` when the
/// reference could not be resolved or the details carry no BASTP at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BastpGroup {
    pub bastp_id: Option<i64>,
    pub bastp: Option<BastpRecord>,
    pub items: Vec<VerificationItem>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct VerificationSummary {
    pub completed: usize,
    pub pending: usize,
    pub verified: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct VerificationPipeline {
    pub summary: VerificationSummary,
    pub pending_no_bastp: Vec<VerificationItem>,
    pub pending_with_bastp: Vec<BastpGroup>,
    pub verified: Vec<BastpGroup>,
}

/// Unresolved groups first, then newest BASTP date, then highest id.
fn group_order(a: &BastpGroup, b: &BastpGroup) -> Ordering {
    match (&a.bastp, &b.bastp) {
        (None, None) => a.bastp_id.cmp(&b.bastp_id),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => y.date.cmp(&x.date).then_with(|| y.id.cmp(&x.id)),
    }
}

fn into_groups(
    grouped: BTreeMap<Option<i64>, Vec<VerificationItem>>,
    bastps: &HashMap<i64, &BastpRecord>,
) -> Vec<BastpGroup> {
    let mut groups: Vec<BastpGroup> = grouped
        .into_iter()
        .map(|(bastp_id, items)| BastpGroup {
            bastp_id,
            bastp: bastp_id.and_then(|id| bastps.get(&id).map(|b| (*b).clone())),
            items,
        })
        .collect();
    groups.sort_by(group_order);
    groups
}

/// Splits completed work details into the pending and verified pipelines.
///
/// A work details row is completed when its current progress is 100. It is
/// verified when any active verification references it. Every completed row
/// lands in exactly one bucket, and groups whose BASTP cannot be resolved
/// are kept with `bastp = None` in both pipelines.
pub fn build_pipeline(
    details: &[WorkDetailsRecord],
    verifications: &[VerificationRecord],
    bastps: &[BastpRecord],
    filter: &VerificationFilter,
) -> VerificationPipeline {
    let mut verified_by_details: HashMap<i64, &VerificationRecord> = HashMap::new();
    for verification in verifications {
        verified_by_details
            .entry(verification.work_details_id)
            .and_modify(|current| {
                if verification.id > current.id {
                    *current = verification;
                }
            })
            .or_insert(verification);
    }
    let bastp_lookup: HashMap<i64, &BastpRecord> = bastps.iter().map(|b| (b.id, b)).collect();

    let needle = filter
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(fold);

    let mut pipeline = VerificationPipeline::default();
    let mut pending_groups: BTreeMap<Option<i64>, Vec<VerificationItem>> = BTreeMap::new();
    let mut verified_groups: BTreeMap<Option<i64>, Vec<VerificationItem>> = BTreeMap::new();

    for record in details {
        let progress = details_progress(record);
        if !progress.is_complete() || !filter.matches(record, needle.as_deref()) {
            continue;
        }
        pipeline.summary.completed += 1;

        let verification = verified_by_details.get(&record.id).map(|v| (*v).clone());
        let is_verified = verification.is_some();
        let group = record.bastp_group();
        let item = VerificationItem {
            details: record.clone(),
            progress,
            verification,
        };

        if is_verified {
            pipeline.summary.verified += 1;
            verified_groups.entry(group).or_default().push(item);
        } else {
            pipeline.summary.pending += 1;
            match group {
                Some(bastp_id) => pending_groups.entry(Some(bastp_id)).or_default().push(item),
                None => pipeline.pending_no_bastp.push(item),
            }
        }
    }

    pipeline.pending_with_bastp = into_groups(pending_groups, &bastp_lookup);
    pipeline.verified = into_groups(verified_groups, &bastp_lookup);
    pipeline
}
