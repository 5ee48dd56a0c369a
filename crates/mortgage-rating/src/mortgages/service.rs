use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tracing::{info, warn};

use super::domain::{MortgageApplication, MortgageId, MortgageSubmission};
use super::intake::{self, ValidationError};
use super::repository::{MortgageRepository, RepositoryError};
use super::risk::{self, RiskAssessment};

/// Service composing intake validation, the repository, and the risk rules.
///
/// Create, update, and delete run their read-average, score, write sequence behind a
/// single write gate, so writers going through the same service instance always score
/// against the population the previous writer left behind. Reads and ad hoc scoring do
/// not take the gate and may observe an average that is about to change.
pub struct MortgageService<R> {
    repository: Arc<R>,
    write_gate: Mutex<()>,
}

/// A stored application together with the rating computed for it at write time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatedMortgage {
    pub mortgage: MortgageApplication,
    pub assessment: RiskAssessment,
}

impl<R> MortgageService<R>
where
    R: MortgageRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            repository,
            write_gate: Mutex::new(()),
        }
    }

    /// Validate, score against the current population, and persist a new application.
    pub fn create(
        &self,
        submission: MortgageSubmission,
    ) -> Result<RatedMortgage, MortgageServiceError> {
        let fields = intake::required_fields(submission)?;

        let _gate = self.lock_writes();
        let population = self.repository.average_credit_score(None)?;
        let average = risk::resolve_average(population, &fields);
        info!(average_credit_score = average, "average credit score for calculation");

        let assessment = risk::assess(&fields, average);
        let mortgage = self.repository.insert(fields)?;
        info!(
            id = %mortgage.id,
            rating = assessment.credit_rating.label(),
            risk_score = assessment.risk_score,
            "created mortgage"
        );

        Ok(RatedMortgage {
            mortgage,
            assessment,
        })
    }

    pub fn get(&self, id: MortgageId) -> Result<MortgageApplication, MortgageServiceError> {
        let mortgage = self.repository.fetch(id).inspect_err(log_missing)?;
        info!(%id, "retrieved mortgage");
        Ok(mortgage)
    }

    pub fn list(&self) -> Result<Vec<MortgageApplication>, MortgageServiceError> {
        let mortgages = self.repository.list()?;
        info!(count = mortgages.len(), "retrieved mortgages");
        Ok(mortgages)
    }

    /// Merge a partial submission onto a stored application and re-rate it.
    ///
    /// The population average excludes the record being updated; when it is the only
    /// record, the merged credit score stands in.
    pub fn update(
        &self,
        id: MortgageId,
        submission: MortgageSubmission,
    ) -> Result<RatedMortgage, MortgageServiceError> {
        let _gate = self.lock_writes();
        let existing = self.repository.fetch(id).inspect_err(log_missing)?;
        let patch = intake::patch_from_submission(submission)?;

        let mut merged = existing.fields;
        patch.apply_to(&mut merged);

        let population = self.repository.average_credit_score(Some(id))?;
        let average = risk::resolve_average(population, &merged);
        info!(%id, average_credit_score = average, "average credit score for calculation");

        let assessment = risk::assess(&merged, average);
        let mortgage = self.repository.update(id, &patch)?;
        info!(
            %id,
            rating = assessment.credit_rating.label(),
            risk_score = assessment.risk_score,
            "updated mortgage"
        );

        Ok(RatedMortgage {
            mortgage,
            assessment,
        })
    }

    pub fn delete(&self, id: MortgageId) -> Result<(), MortgageServiceError> {
        let _gate = self.lock_writes();
        self.repository.delete(id).inspect_err(log_missing)?;
        info!(%id, "deleted mortgage");
        Ok(())
    }

    /// Score a submission against the current population without persisting it.
    pub fn calculate(
        &self,
        submission: MortgageSubmission,
    ) -> Result<RiskAssessment, MortgageServiceError> {
        let fields = intake::fields_with_defaults(submission)?;
        let population = self.repository.average_credit_score(None)?;
        let average = risk::resolve_average(population, &fields);

        let assessment = risk::assess(&fields, average);
        info!(
            rating = assessment.credit_rating.label(),
            risk_score = assessment.risk_score,
            "calculated credit rating"
        );
        Ok(assessment)
    }

    fn lock_writes(&self) -> MutexGuard<'_, ()> {
        // Poisoning is irrelevant here: the gate guards no data.
        self.write_gate
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

fn log_missing(error: &RepositoryError) {
    if let RepositoryError::NotFound(id) = error {
        warn!(%id, "mortgage not found");
    }
}

/// Error raised by the mortgage service.
#[derive(Debug, thiserror::Error)]
pub enum MortgageServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
