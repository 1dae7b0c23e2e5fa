mod common;

use axum::http::{Method, StatusCode};
use chrono::{Duration, Utc};
use common::{read_json, today, TestApp, WorkOrderSeed};
use serde_json::Value;

fn kinds(alerts: &Value) -> Vec<(String, i64)> {
    alerts
        .as_array()
        .expect("alerts array")
        .iter()
        .map(|a| {
            (
                a["kind"].as_str().unwrap_or_default().to_string(),
                a["work_order_id"].as_i64().unwrap_or_default(),
            )
        })
        .collect()
}

#[tokio::test]
async fn empty_database_yields_zeroed_dashboard() {
    let app = TestApp::new().await;

    let envelope = app.get_data("/api/v1/dashboard").await;
    assert_eq!(envelope["stale"], false);
    assert_eq!(envelope["sequence"], 1);

    let stats = &envelope["data"]["stats"];
    assert_eq!(stats["total_work_orders"], 0);
    assert_eq!(stats["average_progress"], 0);
    assert_eq!(envelope["data"]["alerts"], Value::Array(vec![]));
}

#[tokio::test]
async fn dashboard_rolls_up_status_and_alerts() {
    let app = TestApp::new().await;
    let bahari = app.seed_vessel("KM Bahari", Some("PT Samudra")).await;
    let nusantara = app.seed_vessel("MV Nusantara", None).await;

    // Started, 40% done, target passed 47 hours ago.
    let overdue = app
        .seed_work_order(WorkOrderSeed {
            vessel_id: Some(bahari.id),
            shipyard_wo_number: Some("SY-100".into()),
            target_close_date: Some(Utc::now() - Duration::hours(47)),
            actual_start_date: Some(Utc::now() - Duration::days(20)),
            complete_documents: true,
            ..Default::default()
        })
        .await;
    let hull = app.seed_details(overdue.id, "Hull blasting", None).await;
    app.seed_progress(hull.id, 40, today()).await;
    app.seed_permit(overdue.id, true).await;

    // Not started, no permit, due in just under five days.
    let upcoming = app
        .seed_work_order(WorkOrderSeed {
            vessel_id: Some(nusantara.id),
            shipyard_wo_number: Some("SY-101".into()),
            planned_start_date: Some(Utc::now() + Duration::days(10)),
            target_close_date: Some(Utc::now() + Duration::days(5) - Duration::hours(1)),
            ..Default::default()
        })
        .await;

    // Finished work on a past target raises nothing.
    let done = app
        .seed_work_order(WorkOrderSeed {
            vessel_id: Some(bahari.id),
            shipyard_wo_number: Some("SY-102".into()),
            target_close_date: Some(Utc::now() - Duration::days(30)),
            complete_documents: true,
            ..Default::default()
        })
        .await;
    let paint = app.seed_details(done.id, "Topside painting", None).await;
    app.seed_progress(paint.id, 100, today()).await;
    app.seed_permit(done.id, true).await;

    let envelope = app.get_data("/api/v1/dashboard").await;
    let view = &envelope["data"];
    let stats = &view["stats"];

    assert_eq!(stats["total_work_orders"], 3);
    assert_eq!(stats["planned"], 1);
    assert_eq!(stats["ready_to_start"], 0);
    assert_eq!(stats["in_progress"], 1);
    assert_eq!(stats["completed"], 1);
    assert_eq!(stats["overdue"], 1);
    assert_eq!(stats["upcoming_deadlines"], 1);
    assert_eq!(stats["missing_permits"], 1);
    assert_eq!(stats["pending_documents"], 1);
    assert_eq!(stats["total_vessels"], 2);
    assert_eq!(stats["average_progress"], 46);

    assert_eq!(
        kinds(&view["alerts"]),
        vec![
            ("missing_permit".to_string(), upcoming.id),
            ("overdue".to_string(), overdue.id),
            ("upcoming_deadline".to_string(), upcoming.id),
        ]
    );
    let overdue_alert = &view["alerts"][1];
    assert_eq!(overdue_alert["priority"], "high");
    assert_eq!(overdue_alert["days"], 2);
    assert_eq!(overdue_alert["vessel_name"], "KM Bahari");
    assert_eq!(view["alerts"][2]["days"], 5);

    // Newest work order first.
    let rows = view["work_orders"].as_array().expect("work order rows");
    let ids: Vec<i64> = rows.iter().filter_map(|r| r["id"].as_i64()).collect();
    assert_eq!(ids, vec![done.id, upcoming.id, overdue.id]);
    assert_eq!(rows[0]["status"], "completed");
    assert_eq!(rows[1]["status"], "planned");
    assert_eq!(rows[1]["has_progress_data"], false);
    assert_eq!(rows[2]["status"], "in_progress");
    assert_eq!(rows[2]["progress"], 40);
    assert_eq!(rows[2]["is_overdue"], true);
}

#[tokio::test]
async fn uploading_the_permit_clears_the_missing_permit_alert() {
    let app = TestApp::new().await;
    let vessel = app.seed_vessel("TB Perkasa", None).await;
    let wo = app
        .seed_work_order(WorkOrderSeed {
            vessel_id: Some(vessel.id),
            shipyard_wo_number: Some("SY-200".into()),
            planned_start_date: Some(Utc::now() - Duration::days(1)),
            ..Default::default()
        })
        .await;

    let before = app.get_data("/api/v1/dashboard").await;
    assert_eq!(
        kinds(&before["data"]["alerts"]),
        vec![("missing_permit".to_string(), wo.id)]
    );
    assert_eq!(before["data"]["stats"]["ready_to_start"], 1);

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/work-orders/{}/permit", wo.id),
            Some(serde_json::json!({ "document_url": "permits/sy-200.pdf" })),
            Some("planner"),
        )
        .await;
    let (status, body) = read_json(response).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["is_uploaded"], true);

    let after = app.get_data("/api/v1/dashboard").await;
    assert_eq!(
        kinds(&after["data"]["alerts"]),
        vec![("ready_to_start".to_string(), wo.id)]
    );
    assert_eq!(after["data"]["alerts"][0]["priority"], "low");
    assert_eq!(after["sequence"], 2);
}

#[tokio::test]
async fn soft_deleted_work_orders_are_ignored() {
    use sea_orm::{ActiveModelTrait, IntoActiveModel, Set};

    let app = TestApp::new().await;
    let wo = app
        .seed_work_order(WorkOrderSeed {
            target_close_date: Some(Utc::now() - Duration::days(3)),
            ..Default::default()
        })
        .await;
    let mut active = wo.into_active_model();
    active.deleted_at = Set(Some(Utc::now()));
    active.update(app.db()).await.expect("soft delete");

    let envelope = app.get_data("/api/v1/dashboard").await;
    assert_eq!(envelope["data"]["stats"]["total_work_orders"], 0);
    assert_eq!(envelope["data"]["stats"]["overdue"], 0);
}
