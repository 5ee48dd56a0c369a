use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::Utc;
use serde_json::{json, Value};

use crate::mortgages::domain::{
    LoanType, MortgageApplication, MortgageFields, MortgageId, MortgagePatch,
    MortgageSubmission, PropertyType,
};
use crate::mortgages::repository::{mean_credit_score, MortgageRepository, RepositoryError};
use crate::mortgages::{mortgage_router, MortgageService};

pub(super) fn reference_fields() -> MortgageFields {
    MortgageFields {
        credit_score: 750,
        loan_amount: 300_000.0,
        property_value: 400_000.0,
        annual_income: 80_000.0,
        debt_amount: 20_000.0,
        loan_type: LoanType::Fixed,
        property_type: PropertyType::SingleFamily,
    }
}

pub(super) fn condo_fields(credit_score: i64) -> MortgageFields {
    MortgageFields {
        credit_score,
        loan_amount: 200_000.0,
        property_value: 250_000.0,
        annual_income: 65_000.0,
        debt_amount: 30_000.0,
        loan_type: LoanType::Adjustable,
        property_type: PropertyType::Condo,
    }
}

pub(super) fn reference_payload() -> Value {
    json!({
        "creditScore": 750,
        "loanAmount": 300000,
        "propertyValue": 400000,
        "annualIncome": 80000,
        "debtAmount": 20000,
        "loanType": "fixed",
        "propertyType": "single_family"
    })
}

pub(super) fn submission(payload: Value) -> MortgageSubmission {
    serde_json::from_value(payload).expect("payload deserializes")
}

pub(super) fn build_service() -> (MortgageService<MemoryRepository>, Arc<MemoryRepository>) {
    let repository = Arc::new(MemoryRepository::default());
    let service = MortgageService::new(repository.clone());
    (service, repository)
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    state: Arc<Mutex<MemoryState>>,
}

#[derive(Default)]
struct MemoryState {
    next_id: u64,
    records: BTreeMap<MortgageId, MortgageApplication>,
}

impl MemoryRepository {
    pub(super) fn seeded(fields: Vec<MortgageFields>) -> Self {
        let repository = Self::default();
        for entry in fields {
            repository.insert(entry).expect("seed insert");
        }
        repository
    }

    pub(super) fn len(&self) -> usize {
        self.state.lock().expect("repository mutex poisoned").records.len()
    }
}

impl MortgageRepository for MemoryRepository {
    fn insert(&self, fields: MortgageFields) -> Result<MortgageApplication, RepositoryError> {
        let mut guard = self.state.lock().expect("repository mutex poisoned");
        guard.next_id += 1;
        let record = MortgageApplication {
            id: MortgageId(guard.next_id),
            fields,
            created_at: Utc::now(),
        };
        guard.records.insert(record.id, record.clone());
        Ok(record)
    }

    fn fetch(&self, id: MortgageId) -> Result<MortgageApplication, RepositoryError> {
        let guard = self.state.lock().expect("repository mutex poisoned");
        guard
            .records
            .get(&id)
            .cloned()
            .ok_or(RepositoryError::NotFound(id))
    }

    fn list(&self) -> Result<Vec<MortgageApplication>, RepositoryError> {
        let guard = self.state.lock().expect("repository mutex poisoned");
        Ok(guard.records.values().cloned().collect())
    }

    fn update(
        &self,
        id: MortgageId,
        patch: &MortgagePatch,
    ) -> Result<MortgageApplication, RepositoryError> {
        let mut guard = self.state.lock().expect("repository mutex poisoned");
        let record = guard
            .records
            .get_mut(&id)
            .ok_or(RepositoryError::NotFound(id))?;
        patch.apply_to(&mut record.fields);
        Ok(record.clone())
    }

    fn delete(&self, id: MortgageId) -> Result<(), RepositoryError> {
        let mut guard = self.state.lock().expect("repository mutex poisoned");
        guard
            .records
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound(id))
    }

    fn average_credit_score(
        &self,
        exclude: Option<MortgageId>,
    ) -> Result<Option<f64>, RepositoryError> {
        let guard = self.state.lock().expect("repository mutex poisoned");
        Ok(mean_credit_score(guard.records.values(), exclude))
    }
}

pub(super) struct UnavailableRepository;

impl MortgageRepository for UnavailableRepository {
    fn insert(&self, _fields: MortgageFields) -> Result<MortgageApplication, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: MortgageId) -> Result<MortgageApplication, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list(&self) -> Result<Vec<MortgageApplication>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(
        &self,
        _id: MortgageId,
        _patch: &MortgagePatch,
    ) -> Result<MortgageApplication, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn delete(&self, _id: MortgageId) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn average_credit_score(
        &self,
        _exclude: Option<MortgageId>,
    ) -> Result<Option<f64>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn router_with_service(service: MortgageService<MemoryRepository>) -> axum::Router {
    mortgage_router(Arc::new(service))
}
