//! Mortgage application intake, risk rating, and record management.

pub mod domain;
pub mod import;
pub mod intake;
pub mod repository;
pub mod risk;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    LoanType, MortgageApplication, MortgageFields, MortgageId, MortgagePatch,
    MortgageSubmission, PropertyType,
};
pub use import::{BatchOutcome, MortgageBatchScorer, MortgageImportError};
pub use intake::ValidationError;
pub use repository::{mean_credit_score, MortgageRepository, RepositoryError};
pub use risk::{assess, calculate_credit_rating, CreditRating, RiskAssessment, RiskComponents};
pub use router::mortgage_router;
pub use service::{MortgageService, MortgageServiceError, RatedMortgage};
