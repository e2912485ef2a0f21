use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{
    ApplicationId, ApplicationStatus, ApplicationStatusView, ApplicationSubmission, CandidateId,
    OpportunityId,
};
use super::error::ApplicationError;
use super::notifications::Notifier;
use super::repository::{ApplicationRepository, ProfileDirectory};
use super::service::InternshipApplicationService;

type SharedService<R, D, N> = Arc<InternshipApplicationService<R, D, N>>;

#[derive(Debug, Deserialize)]
pub struct TransitionRequest {
    pub target_status: ApplicationStatus,
    #[serde(default)]
    pub feedback: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WithdrawRequest {
    pub candidate_id: CandidateId,
}

/// Router builder exposing the lifecycle and eligibility endpoints.
pub fn application_router<R, D, N>(service: SharedService<R, D, N>) -> Router
where
    R: ApplicationRepository + 'static,
    D: ProfileDirectory + 'static,
    N: Notifier + 'static,
{
    Router::new()
        .route("/api/v1/applications", post(apply_handler::<R, D, N>))
        .route(
            "/api/v1/applications/:application_id",
            get(status_handler::<R, D, N>),
        )
        .route(
            "/api/v1/applications/:application_id/transition",
            post(transition_handler::<R, D, N>),
        )
        .route(
            "/api/v1/applications/:application_id/withdraw",
            post(withdraw_handler::<R, D, N>),
        )
        .route(
            "/api/v1/candidates/:candidate_id/applications",
            get(candidate_applications_handler::<R, D, N>),
        )
        .route(
            "/api/v1/opportunities/:opportunity_id/applications",
            get(opportunity_applications_handler::<R, D, N>),
        )
        .route(
            "/api/v1/eligibility/:candidate_id/:opportunity_id",
            get(eligibility_handler::<R, D, N>),
        )
        .with_state(service)
}

pub(crate) fn error_status(error: &ApplicationError) -> StatusCode {
    match error {
        ApplicationError::DuplicateApplication { .. }
        | ApplicationError::InvalidTransition { .. } => StatusCode::CONFLICT,
        ApplicationError::OpportunityClosed { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        ApplicationError::ApplicationNotFound(_)
        | ApplicationError::CandidateNotFound(_)
        | ApplicationError::OpportunityNotFound(_) => StatusCode::NOT_FOUND,
        ApplicationError::Unauthorized { .. } => StatusCode::FORBIDDEN,
        ApplicationError::CollaboratorUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
    }
}

fn error_response(error: ApplicationError) -> Response {
    let payload = json!({
        "error": error.to_string(),
    });
    (error_status(&error), axum::Json(payload)).into_response()
}

fn status_response(status: StatusCode, view: ApplicationStatusView) -> Response {
    (status, axum::Json(view)).into_response()
}

pub(crate) async fn apply_handler<R, D, N>(
    State(service): State<SharedService<R, D, N>>,
    axum::Json(submission): axum::Json<ApplicationSubmission>,
) -> Response
where
    R: ApplicationRepository + 'static,
    D: ProfileDirectory + 'static,
    N: Notifier + 'static,
{
    match service.apply(submission) {
        Ok(record) => status_response(StatusCode::CREATED, record.status_view()),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn status_handler<R, D, N>(
    State(service): State<SharedService<R, D, N>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    D: ProfileDirectory + 'static,
    N: Notifier + 'static,
{
    match service.get(&ApplicationId(application_id)) {
        Ok(record) => status_response(StatusCode::OK, record.status_view()),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn transition_handler<R, D, N>(
    State(service): State<SharedService<R, D, N>>,
    Path(application_id): Path<String>,
    axum::Json(request): axum::Json<TransitionRequest>,
) -> Response
where
    R: ApplicationRepository + 'static,
    D: ProfileDirectory + 'static,
    N: Notifier + 'static,
{
    let id = ApplicationId(application_id);
    match service.transition_application(&id, request.target_status, request.feedback) {
        Ok(record) => status_response(StatusCode::OK, record.status_view()),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn withdraw_handler<R, D, N>(
    State(service): State<SharedService<R, D, N>>,
    Path(application_id): Path<String>,
    axum::Json(request): axum::Json<WithdrawRequest>,
) -> Response
where
    R: ApplicationRepository + 'static,
    D: ProfileDirectory + 'static,
    N: Notifier + 'static,
{
    let id = ApplicationId(application_id);
    match service.withdraw(&id, &request.candidate_id) {
        Ok(record) => status_response(StatusCode::OK, record.status_view()),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn candidate_applications_handler<R, D, N>(
    State(service): State<SharedService<R, D, N>>,
    Path(candidate_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    D: ProfileDirectory + 'static,
    N: Notifier + 'static,
{
    match service.applications_for_candidate(&CandidateId(candidate_id)) {
        Ok(records) => {
            let views: Vec<ApplicationStatusView> =
                records.iter().map(|record| record.status_view()).collect();
            (StatusCode::OK, axum::Json(views)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn opportunity_applications_handler<R, D, N>(
    State(service): State<SharedService<R, D, N>>,
    Path(opportunity_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    D: ProfileDirectory + 'static,
    N: Notifier + 'static,
{
    match service.applications_for_opportunity(&OpportunityId(opportunity_id)) {
        Ok(records) => {
            let views: Vec<ApplicationStatusView> =
                records.iter().map(|record| record.status_view()).collect();
            (StatusCode::OK, axum::Json(views)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn eligibility_handler<R, D, N>(
    State(service): State<SharedService<R, D, N>>,
    Path((candidate_id, opportunity_id)): Path<(String, String)>,
) -> Response
where
    R: ApplicationRepository + 'static,
    D: ProfileDirectory + 'static,
    N: Notifier + 'static,
{
    match service.compute_eligibility(&CandidateId(candidate_id), &OpportunityId(opportunity_id)) {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}
