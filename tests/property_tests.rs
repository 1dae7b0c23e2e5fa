//! Property-based tests for the status rollup engine.
//!
//! These tests use proptest to check the counting and ordering invariants
//! across generated fleets, which fixed scenarios tend to miss.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use proptest::prelude::*;
use shipyard_api::dto::{
    PermitRecord, ProgressRecord, VerificationRecord, VesselRecord, WorkDetailsRecord,
    WorkOrderRecord,
};
use shipyard_api::rollup::alerts::{ceil_days, sort_by_priority};
use shipyard_api::rollup::{
    build_dashboard, build_pipeline, latest_progress, summarize_vessels, work_order_progress,
    Alert, AlertKind, RollupOptions, VerificationFilter,
};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
}

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
}

// Strategies for generating test data
fn progress_rows_strategy() -> impl Strategy<Value = Vec<ProgressRecord>> {
    prop::collection::vec((0i32..=100, 0i64..20, 0i64..48), 0..8).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(idx, (pct, day, hour))| ProgressRecord {
                id: idx as i64 + 1,
                progress: pct,
                report_date: base_date() + Duration::days(day),
                created_at: now() - Duration::hours(hour),
            })
            .collect()
    })
}

fn details_strategy(work_order_id: i64) -> impl Strategy<Value = WorkDetailsRecord> {
    (
        any::<u16>(),
        progress_rows_strategy(),
        prop::option::of(1i64..4),
    )
        .prop_map(move |(seed, progress, bastp_id)| WorkDetailsRecord {
            id: work_order_id * 1_000 + i64::from(seed % 1_000),
            work_order_id,
            description: Some(format!("item {seed}")),
            location: None,
            pic: None,
            is_bastp_included: bastp_id.is_some(),
            bastp_id,
            storage_path: None,
            progress,
            work_order: None,
        })
}

fn offset_strategy() -> impl Strategy<Value = Option<DateTime<Utc>>> {
    prop::option::of((-30i64..30).prop_map(|days| now() + Duration::hours(days * 13)))
}

fn work_order_strategy(id: i64) -> impl Strategy<Value = WorkOrderRecord> {
    (
        prop::option::of(1i64..5),
        offset_strategy(),
        offset_strategy(),
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        prop::collection::vec(details_strategy(id), 0..3),
        progress_rows_strategy(),
    )
        .prop_map(
            move |(vessel_id, planned, target, started, permit, documents, details, progress)| {
                WorkOrderRecord {
                    id,
                    vessel_id,
                    vessel: vessel_id.map(|v| VesselRecord {
                        id: v,
                        name: format!("Vessel {v}"),
                        vessel_type: None,
                        company: None,
                    }),
                    customer_wo_number: None,
                    shipyard_wo_number: Some(format!("SY-{id}")),
                    planned_start_date: planned,
                    target_close_date: target,
                    actual_start_date: started.then(|| now() - Duration::days(3)),
                    actual_close_date: None,
                    wo_document_status: documents,
                    details,
                    progress,
                    permits: vec![PermitRecord {
                        id,
                        is_uploaded: permit,
                        document_url: None,
                    }],
                }
            },
        )
}

fn fleet_strategy() -> impl Strategy<Value = Vec<WorkOrderRecord>> {
    (0usize..12).prop_flat_map(|n| {
        (1..=n as i64)
            .map(work_order_strategy)
            .collect::<Vec<_>>()
    })
}

fn report_key(row: &ProgressRecord) -> (NaiveDate, DateTime<Utc>, i64) {
    (row.report_date, row.created_at, row.id)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn latest_progress_is_the_newest_report(rows in progress_rows_strategy()) {
        let state = latest_progress(&rows);
        match rows.iter().max_by_key(|r| report_key(r)) {
            Some(newest) => {
                prop_assert!(state.has_data);
                prop_assert_eq!(state.current, newest.progress);
                prop_assert_eq!(state.latest_date, Some(newest.report_date));
            }
            None => {
                prop_assert!(!state.has_data);
                prop_assert_eq!(state.current, 0);
            }
        }
    }

    #[test]
    fn latest_progress_ignores_input_order(rows in progress_rows_strategy()) {
        let mut reversed = rows.clone();
        reversed.reverse();
        prop_assert_eq!(latest_progress(&rows), latest_progress(&reversed));
    }

    #[test]
    fn every_work_order_lands_in_exactly_one_status_bucket(fleet in fleet_strategy()) {
        let view = build_dashboard(&fleet, now(), &RollupOptions::default());
        let stats = &view.stats;
        prop_assert_eq!(
            stats.planned + stats.ready_to_start + stats.in_progress + stats.completed,
            stats.total_work_orders
        );
        prop_assert_eq!(view.work_orders.len(), fleet.len());
        prop_assert!((0..=100).contains(&stats.average_progress));
    }

    #[test]
    fn alert_counts_match_stats(fleet in fleet_strategy()) {
        let view = build_dashboard(&fleet, now(), &RollupOptions::default());
        let count = |kind: AlertKind| view.alerts.iter().filter(|a| a.kind == kind).count();
        prop_assert_eq!(count(AlertKind::Overdue), view.stats.overdue);
        prop_assert_eq!(count(AlertKind::UpcomingDeadline), view.stats.upcoming_deadlines);
        prop_assert_eq!(count(AlertKind::MissingPermit), view.stats.missing_permits);

        // Overdue and upcoming never fire together for one work order.
        for wo in &fleet {
            let kinds: Vec<AlertKind> = view
                .alerts
                .iter()
                .filter(|a| a.work_order_id == wo.id)
                .map(|a| a.kind)
                .collect();
            prop_assert!(
                !(kinds.contains(&AlertKind::Overdue) && kinds.contains(&AlertKind::UpcomingDeadline))
            );
        }
    }

    #[test]
    fn open_work_past_target_is_overdue_by_ceiled_days(fleet in fleet_strategy()) {
        let view = build_dashboard(&fleet, now(), &RollupOptions::default());
        for wo in &fleet {
            let overdue: Vec<&Alert> = view
                .alerts
                .iter()
                .filter(|a| a.work_order_id == wo.id && a.kind == AlertKind::Overdue)
                .collect();
            let past_target = wo.target_close_date.filter(|target| *target < now());

            match past_target {
                Some(target)
                    if wo.actual_close_date.is_none() && work_order_progress(wo).current < 100 =>
                {
                    prop_assert_eq!(overdue.len(), 1);
                    prop_assert_eq!(overdue[0].days, Some(ceil_days(now() - target)));
                }
                _ => prop_assert!(overdue.is_empty()),
            }
        }
    }

    #[test]
    fn alerts_are_sorted_by_priority_and_stable(fleet in fleet_strategy()) {
        let view = build_dashboard(&fleet, now(), &RollupOptions::default());
        let ranks: Vec<u8> = view.alerts.iter().map(|a| a.priority.rank()).collect();
        prop_assert!(ranks.windows(2).all(|w| w[0] >= w[1]));

        let mut resorted: Vec<Alert> = view.alerts.clone();
        sort_by_priority(&mut resorted);
        prop_assert_eq!(resorted, view.alerts);
    }

    #[test]
    fn vessel_totals_cover_every_assigned_work_order(fleet in fleet_strategy()) {
        let summaries = summarize_vessels(&fleet, &[], now());
        let assigned = fleet.iter().filter(|wo| wo.vessel_id.is_some()).count();
        prop_assert_eq!(summaries.iter().map(|s| s.total).sum::<usize>(), assigned);
        for summary in &summaries {
            prop_assert!(summary.active + summary.completed <= summary.total);
            prop_assert!(summary.overdue <= summary.total);
        }
    }

    #[test]
    fn verification_buckets_partition_completed_work(
        fleet in fleet_strategy(),
        verified_mask in prop::collection::vec(any::<bool>(), 64),
    ) {
        let details: Vec<WorkDetailsRecord> =
            fleet.into_iter().flat_map(|wo| wo.details).collect();
        let verifications: Vec<VerificationRecord> = details
            .iter()
            .enumerate()
            .filter(|(idx, _)| verified_mask[idx % verified_mask.len()])
            .map(|(idx, d)| VerificationRecord {
                id: idx as i64 + 1,
                work_details_id: d.id,
                verification_date: base_date(),
                verified_by: "qc".into(),
                verification_notes: None,
            })
            .collect();

        let pipeline = build_pipeline(&details, &verifications, &[], &VerificationFilter::default());
        let summary = pipeline.summary;
        prop_assert_eq!(summary.pending + summary.verified, summary.completed);

        let grouped_pending: usize = pipeline.pending_with_bastp.iter().map(|g| g.items.len()).sum();
        prop_assert_eq!(pipeline.pending_no_bastp.len() + grouped_pending, summary.pending);
        let grouped_verified: usize = pipeline.verified.iter().map(|g| g.items.len()).sum();
        prop_assert_eq!(grouped_verified, summary.verified);

        for item in pipeline.pending_no_bastp.iter() {
            prop_assert!(item.progress.is_complete());
            prop_assert!(item.verification.is_none());
        }
    }

    #[test]
    fn ceil_days_covers_the_duration(ms in 1i64..(400 * 86_400_000)) {
        let days = ceil_days(Duration::milliseconds(ms));
        prop_assert!(days * 86_400_000 >= ms);
        prop_assert!((days - 1) * 86_400_000 < ms);
    }
}
