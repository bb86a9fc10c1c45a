use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Deserializer};
use serde_json::json;
use tracing::error;

use super::aggregator::RuleSet;
use super::repository::ComplianceRepository;
use super::service::{QualificationService, QualificationServiceError};
use crate::workflows::roster::domain::{TrainingId, VolunteerId};

/// Router builder exposing qualification lookups, what-if simulation, and reports.
pub fn qualification_router<R>(service: Arc<QualificationService<R>>) -> Router
where
    R: ComplianceRepository + 'static,
{
    Router::new()
        .route("/api/v1/positions", get(positions_handler::<R>))
        .route(
            "/api/v1/volunteers/:volunteer_id/qualifications",
            get(volunteer_handler::<R>),
        )
        .route(
            "/api/v1/qualifications/evaluate",
            post(evaluate_handler::<R>),
        )
        .route("/api/v1/impact", post(impact_handler::<R>))
        .route("/api/v1/reports/positions", get(summary_handler::<R>))
        .route(
            "/api/v1/reports/training-impact",
            get(ranking_handler::<R>),
        )
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct AsOfQuery {
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub(crate) as_of: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RankingQuery {
    #[serde(default)]
    pub(crate) rule_set: Option<RuleSet>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub(crate) as_of: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EvaluateRequest {
    #[serde(alias = "completedTrainingIds")]
    pub(crate) completed_training_ids: Vec<TrainingId>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ImpactRequest {
    pub(crate) training_id: TrainingId,
    #[serde(default)]
    pub(crate) rule_set: Option<RuleSet>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub(crate) as_of: Option<NaiveDate>,
}

pub(crate) async fn positions_handler<R>(
    State(service): State<Arc<QualificationService<R>>>,
) -> Response
where
    R: ComplianceRepository + 'static,
{
    match service.positions() {
        Ok(positions) => (StatusCode::OK, Json(positions)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn volunteer_handler<R>(
    State(service): State<Arc<QualificationService<R>>>,
    Path(volunteer_id): Path<String>,
    Query(query): Query<AsOfQuery>,
) -> Response
where
    R: ComplianceRepository + 'static,
{
    let id = VolunteerId(volunteer_id);
    match service.volunteer_qualifications(&id, as_of_or_today(query.as_of)) {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn evaluate_handler<R>(
    State(service): State<Arc<QualificationService<R>>>,
    Json(request): Json<EvaluateRequest>,
) -> Response
where
    R: ComplianceRepository + 'static,
{
    match service.evaluate_completed(request.completed_training_ids) {
        Ok(statuses) => (StatusCode::OK, Json(statuses)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn impact_handler<R>(
    State(service): State<Arc<QualificationService<R>>>,
    Json(request): Json<ImpactRequest>,
) -> Response
where
    R: ComplianceRepository + 'static,
{
    let rule_set = request.rule_set.unwrap_or_default();
    match service.training_impact(&request.training_id, rule_set, as_of_or_today(request.as_of)) {
        Ok(by_position) => {
            let payload = json!({
                "training_id": request.training_id,
                "rule_set": rule_set,
                "newly_qualified": by_position.values().sum::<usize>(),
                "by_position": by_position,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn summary_handler<R>(
    State(service): State<Arc<QualificationService<R>>>,
    Query(query): Query<AsOfQuery>,
) -> Response
where
    R: ComplianceRepository + 'static,
{
    match service.position_summaries(as_of_or_today(query.as_of)) {
        Ok(summaries) => (StatusCode::OK, Json(summaries)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn ranking_handler<R>(
    State(service): State<Arc<QualificationService<R>>>,
    Query(query): Query<RankingQuery>,
) -> Response
where
    R: ComplianceRepository + 'static,
{
    let rule_set = query.rule_set.unwrap_or_default();
    match service.training_impact_ranking(rule_set, as_of_or_today(query.as_of)) {
        Ok(ranking) => (StatusCode::OK, Json(ranking)).into_response(),
        Err(err) => error_response(err),
    }
}

fn error_response(err: QualificationServiceError) -> Response {
    match err {
        QualificationServiceError::VolunteerNotFound(id) => {
            let payload = json!({
                "error": "volunteer not found",
                "volunteer_id": id,
            });
            (StatusCode::NOT_FOUND, Json(payload)).into_response()
        }
        QualificationServiceError::Repository(source) => {
            error!(error = %source, "qualification request failed");
            let payload = json!({
                "error": format!("could not compute qualifications: {source}"),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

fn as_of_or_today(as_of: Option<NaiveDate>) -> NaiveDate {
    as_of.unwrap_or_else(|| Local::now().date_naive())
}

fn deserialize_optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    opt.filter(|value| !value.trim().is_empty())
        .map(|value| {
            NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|err| {
                serde::de::Error::custom(format!(
                    "failed to parse '{value}' as YYYY-MM-DD ({err})"
                ))
            })
        })
        .transpose()
}
