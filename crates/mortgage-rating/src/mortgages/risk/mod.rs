//! Risk scoring for mortgage applications.
//!
//! Everything here is side-effect free. The population average credit score is an
//! explicit argument: callers resolve it from the repository (see
//! [`resolve_average`]) so that this module never touches storage.

mod rating;
pub mod rules;

pub use rating::{calculate_credit_rating, CreditRating};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::domain::MortgageFields;
use rules::{
    average_credit_process, credit_score_check, debt_to_income, loan_to_value,
    loan_type_process, property_type_process,
};

/// Point delta contributed by each rule, surfaced so callers can audit the total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskComponents {
    pub loan_to_value: i32,
    pub debt_to_income: i32,
    pub credit_score: i32,
    pub loan_type: i32,
    pub property_type: i32,
    pub avg_credit_score: i32,
}

impl RiskComponents {
    pub fn evaluate(fields: &MortgageFields, average_credit_score: f64) -> Self {
        Self {
            loan_to_value: loan_to_value(fields.loan_amount, fields.property_value),
            debt_to_income: debt_to_income(fields.debt_amount, fields.annual_income),
            credit_score: credit_score_check(fields.credit_score),
            loan_type: loan_type_process(&fields.loan_type),
            property_type: property_type_process(&fields.property_type),
            avg_credit_score: average_credit_process(average_credit_score),
        }
    }

    pub fn total(&self) -> i32 {
        self.loan_to_value
            + self.debt_to_income
            + self.credit_score
            + self.loan_type
            + self.property_type
            + self.avg_credit_score
    }
}

/// Outcome of scoring one application against one population average.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    pub credit_rating: CreditRating,
    pub risk_score: i32,
    pub average_credit_score: f64,
    pub components: RiskComponents,
}

/// Score `fields` against an already resolved population average.
pub fn assess(fields: &MortgageFields, average_credit_score: f64) -> RiskAssessment {
    let components = RiskComponents::evaluate(fields, average_credit_score);
    let risk_score = components.total();
    let credit_rating = calculate_credit_rating(risk_score);

    debug!(
        ?components,
        risk_score,
        rating = credit_rating.label(),
        "risk assessment complete"
    );

    RiskAssessment {
        credit_rating,
        risk_score,
        average_credit_score,
        components,
    }
}

/// The applicant's own credit score stands in when the population is empty.
pub fn resolve_average(population_average: Option<f64>, fields: &MortgageFields) -> f64 {
    population_average.unwrap_or(fields.credit_score as f64)
}
