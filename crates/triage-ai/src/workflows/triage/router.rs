use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

use super::domain::{validate_ranges, AttributeValue, PatientAttributes};
use super::service::{TriageAssessment, TriageService};
use crate::error::AppError;

/// Router builder exposing the triage assessment endpoints.
pub fn triage_router(service: Arc<TriageService>) -> Router {
    Router::new()
        .route("/api/v1/triage/assessments", post(assess_handler))
        .route("/api/v1/triage/rules", get(rules_handler))
        .with_state(service)
}

pub(crate) async fn assess_handler(
    State(service): State<Arc<TriageService>>,
    payload: Result<Json<BTreeMap<String, AttributeValue>>, JsonRejection>,
) -> Result<Json<TriageAssessment>, AppError> {
    let Json(raw) = payload?;
    let attributes = PatientAttributes::from_raw(raw)?;
    validate_ranges(&attributes)?;
    let assessment = service.assess(&attributes)?;
    Ok(Json(assessment))
}

pub(crate) async fn rules_handler(State(service): State<Arc<TriageService>>) -> Response {
    (StatusCode::OK, Json(service.registry())).into_response()
}
