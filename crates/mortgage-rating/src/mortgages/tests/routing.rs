use super::common::*;
use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;

use crate::mortgages::router::{create_handler, list_handler};
use crate::mortgages::domain::{MortgageApplication, MortgageFields, MortgageId, MortgagePatch};
use crate::mortgages::repository::{MortgageRepository, RepositoryError};
use crate::mortgages::MortgageService;

fn json_request(method: &str, uri: &str, payload: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(payload).expect("serializes")))
        .expect("request builds")
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request builds")
}

#[tokio::test]
async fn create_route_returns_created_with_rating() {
    let (service, repository) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(json_request("POST", "/api/mortgages", &reference_payload()))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    assert_eq!(payload["message"], "Mortgage created successfully");
    assert_eq!(payload["creditRating"], "AAA");
    assert_eq!(payload["riskScore"], -3);
    assert_eq!(payload["mortgage"]["id"], 1);
    assert_eq!(payload["mortgage"]["creditScore"], 750);
    assert_eq!(payload["mortgage"]["loanType"], "fixed");
    assert!(payload["mortgage"]["createdAt"].is_string());
    assert_eq!(repository.len(), 1);
}

#[tokio::test]
async fn create_route_rejects_missing_field() {
    let (service, repository) = build_service();
    let router = router_with_service(service);
    let mut body = reference_payload();
    body.as_object_mut()
        .expect("object payload")
        .remove("propertyValue");

    let response = router
        .oneshot(json_request("POST", "/api/mortgages", &body))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = read_json_body(response).await;
    assert_eq!(payload["error"], "Missing required field: propertyValue");
    assert_eq!(payload["field"], "propertyValue");
    assert_eq!(repository.len(), 0);
}

#[tokio::test]
async fn fetch_route_returns_not_found_for_unknown_id() {
    let (service, repository) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(empty_request("GET", "/api/mortgages/999"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let payload = read_json_body(response).await;
    assert_eq!(payload, json!({ "error": "Mortgage not found" }));
    assert_eq!(repository.len(), 0);
}

#[tokio::test]
async fn fetch_route_returns_record_without_rating() {
    let repository = Arc::new(MemoryRepository::seeded(vec![reference_fields()]));
    let router = mortgage_router_for(repository);

    let response = router
        .oneshot(empty_request("GET", "/api/mortgages/1"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["id"], 1);
    assert_eq!(payload["propertyType"], "single_family");
    assert!(payload.get("creditRating").is_none());
}

#[tokio::test]
async fn update_route_merges_and_rerates() {
    let repository = Arc::new(MemoryRepository::seeded(vec![reference_fields()]));
    let router = mortgage_router_for(repository);

    let response = router
        .oneshot(json_request(
            "PUT",
            "/api/mortgages/1",
            &json!({ "creditScore": 720, "loanType": "adjustable", "loanAmount": 320000 }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["message"], "Mortgage updated successfully");
    assert_eq!(payload["mortgage"]["creditScore"], 720);
    assert_eq!(payload["mortgage"]["loanType"], "adjustable");
    assert_eq!(payload["mortgage"]["annualIncome"], 80000.0);
    // ltv 80 -> 0, dti 0, credit -1, adjustable +1, single family 0, own average -1
    assert_eq!(payload["riskScore"], -1);
    assert_eq!(payload["creditRating"], "AAA");
}

#[tokio::test]
async fn update_route_returns_not_found_for_unknown_id() {
    let (service, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(json_request(
            "PUT",
            "/api/mortgages/999",
            &json!({ "creditScore": 720 }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_route_removes_record() {
    let repository = Arc::new(MemoryRepository::seeded(vec![reference_fields()]));
    let router = mortgage_router_for(repository.clone());

    let response = router
        .clone()
        .oneshot(empty_request("DELETE", "/api/mortgages/1"))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(repository.len(), 0);

    let response = router
        .oneshot(empty_request("DELETE", "/api/mortgages/1"))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn calculate_route_surfaces_every_component() {
    let (service, repository) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/calculate-rating",
            &reference_payload(),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["creditRating"], "AAA");
    assert_eq!(payload["riskScore"], -3);
    assert_eq!(
        payload["components"],
        json!({
            "loanToValue": 0,
            "debtToIncome": 0,
            "creditScore": -1,
            "loanType": -1,
            "propertyType": 0,
            "avgCreditScore": -1
        })
    );
    assert_eq!(repository.len(), 0);
}

#[tokio::test]
async fn calculate_route_rejects_malformed_numbers() {
    let (service, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/calculate-rating",
            &json!({ "annualIncome": "plenty" }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = read_json_body(response).await;
    assert_eq!(payload["field"], "annualIncome");
}

#[tokio::test]
async fn handlers_return_internal_error_on_store_failure() {
    let service = Arc::new(MortgageService::new(Arc::new(UnavailableRepository)));

    let response = create_handler::<UnavailableRepository>(
        State(service.clone()),
        Ok(axum::Json(submission(reference_payload()))),
    )
    .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let response = list_handler::<UnavailableRepository>(State(service)).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let payload = read_json_body(response).await;
    assert_eq!(
        payload["error"],
        "repository unavailable: database offline"
    );
}

#[tokio::test]
async fn list_route_returns_records_in_insertion_order() {
    let repository = Arc::new(MemoryRepository::seeded(vec![
        reference_fields(),
        condo_fields(680),
    ]));
    let router = mortgage_router_for(repository);

    let response = router
        .oneshot(empty_request("GET", "/api/mortgages"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    let records = payload.as_array().expect("array payload");
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["id"], 1);
    assert_eq!(records[1]["propertyType"], "condo");
}

#[tokio::test]
async fn create_route_requires_json_content_type() {
    let (service, repository) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(
            Request::post("/api/mortgages")
                .body(Body::from(reference_payload().to_string()))
                .expect("request builds"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = read_json_body(response).await;
    assert!(payload["error"]
        .as_str()
        .expect("error message")
        .contains("Content-Type"));
    assert_eq!(repository.len(), 0);
}

#[tokio::test]
async fn array_bodies_are_rejected_as_json_errors() {
    let (service, repository) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/mortgages",
            &json!([750, 300000, 400000, 80000, 20000, "fixed", "single_family"]),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = read_json_body(response).await;
    assert!(payload["error"].is_string());
    assert_eq!(repository.len(), 0);
}

#[tokio::test]
async fn null_fields_count_as_missing() {
    let (service, repository) = build_service();
    let router = router_with_service(service);
    let mut body = reference_payload();
    body["debtAmount"] = Value::Null;

    let response = router
        .oneshot(json_request("POST", "/api/mortgages", &body))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = read_json_body(response).await;
    assert_eq!(payload["field"], "debtAmount");
    assert_eq!(repository.len(), 0);
}

#[tokio::test]
async fn malformed_json_on_calculate_is_a_json_error() {
    let (service, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(
            Request::post("/api/calculate-rating")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{\"creditScore\": "))
                .expect("request builds"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = read_json_body(response).await;
    assert!(payload["error"].is_string());
}

/// Holds every insert until the test releases it.
struct GatedRepository {
    inner: MemoryRepository,
    release: Mutex<mpsc::Receiver<()>>,
}

impl MortgageRepository for GatedRepository {
    fn insert(&self, fields: MortgageFields) -> Result<MortgageApplication, RepositoryError> {
        let _ = self
            .release
            .lock()
            .expect("release mutex poisoned")
            .recv_timeout(Duration::from_secs(5));
        self.inner.insert(fields)
    }

    fn fetch(&self, id: MortgageId) -> Result<MortgageApplication, RepositoryError> {
        self.inner.fetch(id)
    }

    fn list(&self) -> Result<Vec<MortgageApplication>, RepositoryError> {
        self.inner.list()
    }

    fn update(
        &self,
        id: MortgageId,
        patch: &MortgagePatch,
    ) -> Result<MortgageApplication, RepositoryError> {
        self.inner.update(id, patch)
    }

    fn delete(&self, id: MortgageId) -> Result<(), RepositoryError> {
        self.inner.delete(id)
    }

    fn average_credit_score(
        &self,
        exclude: Option<MortgageId>,
    ) -> Result<Option<f64>, RepositoryError> {
        self.inner.average_credit_score(exclude)
    }
}

#[tokio::test]
async fn slow_store_writes_do_not_stall_other_requests() {
    let (release, gate) = mpsc::channel();
    let repository = Arc::new(GatedRepository {
        inner: MemoryRepository::default(),
        release: Mutex::new(gate),
    });
    let router = crate::mortgages::mortgage_router(Arc::new(MortgageService::new(
        repository.clone(),
    )));

    let pending_create = tokio::spawn(
        router
            .clone()
            .oneshot(json_request("POST", "/api/mortgages", &reference_payload())),
    );
    tokio::task::yield_now().await;

    let response = tokio::time::timeout(
        Duration::from_secs(2),
        router.oneshot(json_request(
            "POST",
            "/api/calculate-rating",
            &reference_payload(),
        )),
    )
    .await
    .expect("scoring is not blocked by the pending write")
    .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);

    release.send(()).expect("writer still waiting");
    let response = pending_create
        .await
        .expect("create task joins")
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(repository.inner.len(), 1);
}

fn mortgage_router_for(repository: Arc<MemoryRepository>) -> axum::Router {
    crate::mortgages::mortgage_router(Arc::new(MortgageService::new(repository)))
}
