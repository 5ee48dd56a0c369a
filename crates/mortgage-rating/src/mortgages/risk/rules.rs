//! The six rule evaluators. Each one is a pure function returning a point delta.

use tracing::debug;

use super::super::domain::{LoanType, PropertyType};

/// Points assigned when a ratio cannot be computed because its denominator is zero.
pub const DEGENERATE_RATIO_POINTS: i32 = 2;

/// Loan amount as a percentage of property value.
pub fn loan_to_value(loan_amount: f64, property_value: f64) -> i32 {
    if property_value == 0.0 {
        debug!("property value is zero, assigning maximal loan-to-value risk");
        return DEGENERATE_RATIO_POINTS;
    }

    let ltv = loan_amount / property_value * 100.0;
    let points = if ltv > 90.0 {
        2
    } else if ltv > 80.0 {
        1
    } else {
        0
    };
    debug!(ltv, points, "loan-to-value evaluated");
    points
}

/// Debt amount as a percentage of annual income.
pub fn debt_to_income(debt_amount: f64, annual_income: f64) -> i32 {
    if annual_income == 0.0 {
        debug!("annual income is zero, assigning maximal debt-to-income risk");
        return DEGENERATE_RATIO_POINTS;
    }

    let dti = debt_amount / annual_income * 100.0;
    let points = if dti > 50.0 {
        2
    } else if dti > 40.0 {
        1
    } else {
        0
    };
    debug!(dti, points, "debt-to-income evaluated");
    points
}

pub fn credit_score_check(credit_score: i64) -> i32 {
    let points = if credit_score >= 700 {
        -1
    } else if credit_score >= 650 {
        0
    } else {
        1
    };
    debug!(credit_score, points, "credit score evaluated");
    points
}

/// Anything other than `fixed` carries adjustable-rate risk.
pub fn loan_type_process(loan_type: &LoanType) -> i32 {
    let points = match loan_type {
        LoanType::Fixed => -1,
        LoanType::Adjustable | LoanType::Other(_) => 1,
    };
    debug!(loan_type = loan_type.as_str(), points, "loan type evaluated");
    points
}

/// Anything other than `single_family` carries condo risk.
pub fn property_type_process(property_type: &PropertyType) -> i32 {
    let points = match property_type {
        PropertyType::SingleFamily => 0,
        PropertyType::Condo | PropertyType::Other(_) => 1,
    };
    debug!(
        property_type = property_type.as_str(),
        points, "property type evaluated"
    );
    points
}

pub fn average_credit_process(average_credit_score: f64) -> i32 {
    let points = if average_credit_score >= 700.0 {
        -1
    } else if average_credit_score < 650.0 {
        1
    } else {
        0
    };
    debug!(average_credit_score, points, "population average evaluated");
    points
}
