use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use serde_json::json;
use std::sync::Arc;
use training_compliance::workflows::qualification::{
    qualification_router, ComplianceRepository, QualificationService,
};

pub(crate) fn with_qualification_routes<R>(service: Arc<QualificationService<R>>) -> axum::Router
where
    R: ComplianceRepository + 'static,
{
    qualification_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::InMemoryComplianceRepository;
    use axum::body::Body;
    use axum::http::Request;
    use chrono::NaiveDate;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::atomic::AtomicBool;
    use tower::ServiceExt;
    use training_compliance::workflows::qualification::Requirement;
    use training_compliance::workflows::roster::domain::{
        CompletionStatus, Position, PositionId, RosterSnapshot, Training, TrainingCompletion,
        TrainingId, Volunteer, VolunteerId,
    };

    fn roster() -> RosterSnapshot {
        let training = |id: &str, title: &str| Training {
            id: TrainingId::new(id),
            title: title.to_string(),
            category: "Operations".to_string(),
            description: None,
            duration_hours: 16.0,
            expires_after_years: None,
        };

        RosterSnapshot {
            trainings: vec![training("evoc", "EVOC"), training("pump", "Pump Operations")],
            positions: vec![Position {
                id: PositionId::from("driver"),
                title: "Engine Driver".to_string(),
                department: None,
                description: None,
                county_requirements: Requirement::all_of(["evoc"]),
                avfrd_requirements: Requirement::all_of(["evoc", "pump"]),
            }],
            volunteers: vec![Volunteer {
                id: VolunteerId::from("201"),
                first_name: "Jordan".to_string(),
                last_name: "Hale".to_string(),
                department: Some("Station 2".to_string()),
                active: true,
            }],
            completions: vec![TrainingCompletion {
                volunteer_id: VolunteerId::from("201"),
                training_id: TrainingId::new("evoc"),
                completed_on: NaiveDate::from_ymd_opt(2024, 4, 12).expect("valid"),
                status: CompletionStatus::Completed,
                instructor: None,
                notes: None,
            }],
        }
    }

    fn app(ready: bool) -> axum::Router {
        let state = AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
        };
        let repository = Arc::new(InMemoryComplianceRepository::new(roster()));
        with_qualification_routes(Arc::new(QualificationService::new(repository)))
            .layer(Extension(state))
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .expect("read body");
        serde_json::from_slice(&bytes).expect("json payload")
    }

    #[tokio::test]
    async fn healthcheck_reports_ok() {
        let Json(body) = healthcheck().await;
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn readiness_reflects_flag() {
        let request = || Request::get("/ready").body(Body::empty()).expect("request");

        let response = app(false).oneshot(request()).await.expect("response");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json_body(response).await["status"], "initializing");

        let state_app = app(true);
        let response = state_app.oneshot(request()).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn metrics_are_plain_text() {
        let response = app(true)
            .oneshot(Request::get("/metrics").body(Body::empty()).expect("request"))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; version=0.0.4"
        );
    }

    #[tokio::test]
    async fn qualification_routes_are_mounted() {
        let response = app(true)
            .oneshot(
                Request::get("/api/v1/volunteers/201/qualifications?as_of=2025-06-01")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        let driver = &body["qualifications"][0];
        assert_eq!(driver["county_qualified"], true);
        assert_eq!(driver["avfrd_qualified"], false);
        assert_eq!(driver["missing_avfrd"][0]["id"], "pump");
    }

    #[tokio::test]
    async fn impact_route_counts_newly_qualified_drivers() {
        let response = app(true)
            .oneshot(
                Request::post("/api/v1/impact")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        r#"{"training_id":"pump","rule_set":"avfrd","as_of":"2025-06-01"}"#,
                    ))
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["by_position"]["driver"], 1);
        assert_eq!(body["newly_qualified"], 1);
    }
}
