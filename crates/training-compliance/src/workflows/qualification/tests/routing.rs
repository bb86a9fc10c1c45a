use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{header, Request, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use super::common::*;
use crate::workflows::qualification::router::{volunteer_handler, AsOfQuery};
use crate::workflows::qualification::QualificationService;

#[tokio::test]
async fn positions_route_lists_requirement_trees() {
    let router = router_with_service(build_service());

    let response = router
        .oneshot(
            Request::get("/api/v1/positions")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload[0]["id"], json!("interior-ff"));
    assert_eq!(payload[0]["county_requirements"]["logic"], json!("AND"));
    assert_eq!(payload[1]["avfrd_requirements"]["count"], json!(2));
}

#[tokio::test]
async fn volunteer_route_honours_as_of() {
    let router = router_with_service(build_service());

    let response = router
        .oneshot(
            Request::get("/api/v1/volunteers/102/qualifications?as_of=2022-06-01")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["as_of"], json!("2022-06-01"));
    let interior = &payload["qualifications"][0];
    assert_eq!(interior["county_qualified"], json!(false));
    assert_eq!(interior["missing_county"].as_array().map(Vec::len), Some(1));
    assert_eq!(interior["missing_county"][0]["id"], json!("ff1"));
}

#[tokio::test]
async fn volunteer_handler_returns_not_found() {
    let service = Arc::new(build_service());

    let response = volunteer_handler::<MemoryRepository>(
        State(service),
        Path("999".to_string()),
        Query(AsOfQuery { as_of: Some(as_of()) }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let payload = read_json_body(response).await;
    assert_eq!(payload["volunteer_id"], json!("999"));
}

#[tokio::test]
async fn evaluate_route_accepts_camel_case_payloads() {
    let router = router_with_service(build_service());
    let body = json!({ "completedTrainingIds": ["evoc", "pump"] });

    let response = router
        .oneshot(
            Request::post("/api/v1/qualifications/evaluate")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body).expect("serializes")))
                .expect("request builds"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload[1]["position_id"], json!("driver"));
    assert_eq!(payload[1]["county_qualified"], json!(true));
}

#[tokio::test]
async fn impact_route_reports_counts() {
    let router = router_with_service(build_service());
    let body = json!({ "training_id": "pump", "rule_set": "county", "as_of": "2025-06-01" });

    let response = router
        .oneshot(
            Request::post("/api/v1/impact")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body).expect("serializes")))
                .expect("request builds"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["newly_qualified"], json!(2));
    assert_eq!(payload["by_position"]["driver"], json!(2));
    assert_eq!(payload["rule_set"], json!("county"));
}

#[tokio::test]
async fn ranking_route_defaults_to_department_rules() {
    let router = router_with_service(build_service());

    let response = router
        .oneshot(
            Request::get("/api/v1/reports/training-impact?as_of=2025-06-01")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload[0]["training_id"], json!("ff2"));
    assert_eq!(payload[0]["rule_set"], json!("avfrd"));
}

#[tokio::test]
async fn repository_outage_is_a_server_error() {
    let router = crate::workflows::qualification::qualification_router(Arc::new(
        QualificationService::new(Arc::new(UnavailableRepository)),
    ));

    let response = router
        .oneshot(
            Request::get("/api/v1/reports/positions")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let payload = read_json_body(response).await;
    assert!(payload["error"]
        .as_str()
        .unwrap_or_default()
        .starts_with("could not compute qualifications"));
}
