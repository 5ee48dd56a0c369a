use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tracing::{error, warn};

use super::domain::{MortgageId, MortgageSubmission};
use super::repository::{MortgageRepository, RepositoryError};
use super::service::{MortgageService, MortgageServiceError, RatedMortgage};

/// Router builder exposing record CRUD and ad hoc rating endpoints.
pub fn mortgage_router<R>(service: Arc<MortgageService<R>>) -> Router
where
    R: MortgageRepository + 'static,
{
    Router::new()
        .route(
            "/api/mortgages",
            post(create_handler::<R>).get(list_handler::<R>),
        )
        .route(
            "/api/mortgages/:id",
            get(fetch_handler::<R>)
                .put(update_handler::<R>)
                .delete(delete_handler::<R>),
        )
        .route("/api/calculate-rating", post(calculate_handler::<R>))
        .with_state(service)
}

pub(crate) async fn create_handler<R>(
    State(service): State<Arc<MortgageService<R>>>,
    payload: Result<Json<MortgageSubmission>, JsonRejection>,
) -> Response
where
    R: MortgageRepository + 'static,
{
    let Json(submission) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(rejection),
    };

    match run_blocking(service, move |service| service.create(submission)).await {
        Ok(rated) => (
            StatusCode::CREATED,
            Json(rated_payload("Mortgage created successfully", rated)),
        )
            .into_response(),
        Err(response) => response,
    }
}

pub(crate) async fn list_handler<R>(State(service): State<Arc<MortgageService<R>>>) -> Response
where
    R: MortgageRepository + 'static,
{
    match run_blocking(service, |service| service.list()).await {
        Ok(mortgages) => (StatusCode::OK, Json(mortgages)).into_response(),
        Err(response) => response,
    }
}

pub(crate) async fn fetch_handler<R>(
    State(service): State<Arc<MortgageService<R>>>,
    Path(id): Path<u64>,
) -> Response
where
    R: MortgageRepository + 'static,
{
    match run_blocking(service, move |service| service.get(MortgageId(id))).await {
        Ok(mortgage) => (StatusCode::OK, Json(mortgage)).into_response(),
        Err(response) => response,
    }
}

pub(crate) async fn update_handler<R>(
    State(service): State<Arc<MortgageService<R>>>,
    Path(id): Path<u64>,
    payload: Result<Json<MortgageSubmission>, JsonRejection>,
) -> Response
where
    R: MortgageRepository + 'static,
{
    let Json(submission) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(rejection),
    };

    match run_blocking(service, move |service| {
        service.update(MortgageId(id), submission)
    })
    .await
    {
        Ok(rated) => (
            StatusCode::OK,
            Json(rated_payload("Mortgage updated successfully", rated)),
        )
            .into_response(),
        Err(response) => response,
    }
}

pub(crate) async fn delete_handler<R>(
    State(service): State<Arc<MortgageService<R>>>,
    Path(id): Path<u64>,
) -> Response
where
    R: MortgageRepository + 'static,
{
    match run_blocking(service, move |service| service.delete(MortgageId(id))).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "message": "Mortgage deleted successfully" })),
        )
            .into_response(),
        Err(response) => response,
    }
}

pub(crate) async fn calculate_handler<R>(
    State(service): State<Arc<MortgageService<R>>>,
    payload: Result<Json<MortgageSubmission>, JsonRejection>,
) -> Response
where
    R: MortgageRepository + 'static,
{
    let Json(submission) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(rejection),
    };

    match run_blocking(service, move |service| service.calculate(submission)).await {
        Ok(assessment) => (StatusCode::OK, Json(assessment)).into_response(),
        Err(response) => response,
    }
}

/// Run a service call on the blocking pool; the store may hold locks across file I/O.
async fn run_blocking<R, T, F>(
    service: Arc<MortgageService<R>>,
    call: F,
) -> Result<T, Response>
where
    R: MortgageRepository + 'static,
    T: Send + 'static,
    F: FnOnce(&MortgageService<R>) -> Result<T, MortgageServiceError> + Send + 'static,
{
    match tokio::task::spawn_blocking(move || call(service.as_ref())).await {
        Ok(result) => result.map_err(error_response),
        Err(err) => {
            error!(error = %err, "mortgage service task failed");
            let payload = json!({ "error": "Internal server error" });
            Err((StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response())
        }
    }
}

fn rejection_response(rejection: JsonRejection) -> Response {
    let message = rejection.body_text();
    warn!(error = %message, "rejected mortgage payload");
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
}

fn rated_payload(message: &str, rated: RatedMortgage) -> serde_json::Value {
    let RatedMortgage {
        mortgage,
        assessment,
    } = rated;

    json!({
        "message": message,
        "mortgage": mortgage,
        "creditRating": assessment.credit_rating,
        "riskScore": assessment.risk_score,
    })
}

fn error_response(err: MortgageServiceError) -> Response {
    match err {
        MortgageServiceError::Validation(error) => {
            let payload = json!({
                "error": error.to_string(),
                "field": error.field(),
            });
            (StatusCode::BAD_REQUEST, Json(payload)).into_response()
        }
        MortgageServiceError::Repository(RepositoryError::NotFound(_)) => {
            let payload = json!({ "error": "Mortgage not found" });
            (StatusCode::NOT_FOUND, Json(payload)).into_response()
        }
        MortgageServiceError::Repository(other) => {
            error!(error = %other, "mortgage store failure");
            let payload = json!({ "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}
