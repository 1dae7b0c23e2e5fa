#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    middleware, Router,
};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use sea_orm::{ActiveModelTrait, Set};
use serde_json::Value;
use shipyard_api::{
    auth::{USER_EMAIL_HEADER, USER_ID_HEADER},
    config::AppConfig,
    db,
    entities::{bastp, permit_to_work, vessel, work_details, work_order, work_progress},
    AppState,
};
use tower::ServiceExt;

/// Helper harness for spinning up an application state backed by an in-memory SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
}

/// Work order columns the rollup tests care about.
#[derive(Default)]
pub struct WorkOrderSeed {
    pub vessel_id: Option<i64>,
    pub shipyard_wo_number: Option<String>,
    pub planned_start_date: Option<DateTime<Utc>>,
    pub target_close_date: Option<DateTime<Utc>>,
    pub actual_start_date: Option<DateTime<Utc>>,
    pub complete_documents: bool,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        // One connection keeps every query on the same in-memory database.
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;
        cfg.cors_allow_any_origin = true;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::create_schema(&pool)
            .await
            .expect("failed to create schema in tests");

        let state = AppState::new(Arc::new(pool), cfg);
        let router = Router::new()
            .nest("/api/v1", shipyard_api::api_v1_routes())
            .layer(middleware::from_fn(
                shipyard_api::middleware_helpers::request_id_middleware,
            ))
            .with_state(state.clone());

        Self { router, state }
    }

    pub fn db(&self) -> &db::DbPool {
        &self.state.db
    }

    /// Send a request against the router, optionally as a known user.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        user: Option<&str>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(user) = user {
            builder = builder
                .header(USER_ID_HEADER, user)
                .header(USER_EMAIL_HEADER, format!("{user}@yard.test"));
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// GET and unwrap the `data` field of a 200 response.
    pub async fn get_data(&self, uri: &str) -> Value {
        let response = self.request(Method::GET, uri, None, None).await;
        let (status, body) = read_json(response).await;
        assert_eq!(status, StatusCode::OK, "GET {uri} failed: {body}");
        body["data"].clone()
    }

    pub async fn seed_vessel(&self, name: &str, company: Option<&str>) -> vessel::Model {
        vessel::ActiveModel {
            name: Set(name.to_string()),
            vessel_type: Set(Some("Tug".to_string())),
            company: Set(company.map(str::to_string)),
            ..Default::default()
        }
        .insert(self.db())
        .await
        .expect("seed vessel")
    }

    pub async fn seed_work_order(&self, seed: WorkOrderSeed) -> work_order::Model {
        let doc_date = seed.complete_documents.then(|| date(2024, 5, 1));
        work_order::ActiveModel {
            vessel_id: Set(seed.vessel_id),
            customer_wo_number: Set(seed.complete_documents.then(|| "CUST-001".to_string())),
            customer_wo_date: Set(doc_date),
            shipyard_wo_number: Set(seed
                .shipyard_wo_number
                .or_else(|| seed.complete_documents.then(|| "SY-001".to_string()))),
            shipyard_wo_date: Set(doc_date),
            planned_start_date: Set(seed.planned_start_date),
            target_close_date: Set(seed.target_close_date),
            actual_start_date: Set(seed.actual_start_date),
            ..Default::default()
        }
        .insert(self.db())
        .await
        .expect("seed work order")
    }

    pub async fn seed_details(
        &self,
        work_order_id: i64,
        description: &str,
        bastp_id: Option<i64>,
    ) -> work_details::Model {
        work_details::ActiveModel {
            work_order_id: Set(work_order_id),
            description: Set(Some(description.to_string())),
            location: Set(Some("Dock 2".to_string())),
            pic: Set(Some("Hendra".to_string())),
            is_bastp_included: Set(bastp_id.is_some()),
            bastp_id: Set(bastp_id),
            ..Default::default()
        }
        .insert(self.db())
        .await
        .expect("seed work details")
    }

    pub async fn seed_progress(
        &self,
        work_details_id: i64,
        progress: i32,
        report_date: NaiveDate,
    ) -> work_progress::Model {
        work_progress::ActiveModel {
            work_details_id: Set(Some(work_details_id)),
            work_order_id: Set(None),
            progress: Set(progress),
            report_date: Set(report_date),
            ..Default::default()
        }
        .insert(self.db())
        .await
        .expect("seed progress")
    }

    pub async fn seed_permit(&self, work_order_id: i64, uploaded: bool) -> permit_to_work::Model {
        permit_to_work::ActiveModel {
            work_order_id: Set(work_order_id),
            is_uploaded: Set(uploaded),
            document_url: Set(uploaded.then(|| format!("permits/{work_order_id}.pdf"))),
            ..Default::default()
        }
        .insert(self.db())
        .await
        .expect("seed permit")
    }

    pub async fn seed_bastp(&self, number: &str, date: NaiveDate) -> bastp::Model {
        bastp::ActiveModel {
            number: Set(number.to_string()),
            date: Set(date),
            ..Default::default()
        }
        .insert(self.db())
        .await
        .expect("seed bastp")
    }
}

pub async fn read_json(response: axum::response::Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read response body");
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub fn days_from_now(days: i64) -> DateTime<Utc> {
    Utc::now() + Duration::days(days)
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}
