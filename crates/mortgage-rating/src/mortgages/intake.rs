use serde_json::Value;

use super::domain::{LoanType, MortgageFields, MortgagePatch, MortgageSubmission, PropertyType};

pub const CREDIT_SCORE: &str = "creditScore";
pub const LOAN_AMOUNT: &str = "loanAmount";
pub const PROPERTY_VALUE: &str = "propertyValue";
pub const ANNUAL_INCOME: &str = "annualIncome";
pub const DEBT_AMOUNT: &str = "debtAmount";
pub const LOAN_TYPE: &str = "loanType";
pub const PROPERTY_TYPE: &str = "propertyType";

/// Rejections raised while turning a raw submission into scoring inputs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    #[error("Invalid value for {field}: {reason}")]
    Malformed { field: &'static str, reason: String },
}

impl ValidationError {
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::MissingField(field) => field,
            ValidationError::Malformed { field, .. } => field,
        }
    }
}

/// Coerce every present field; absent fields stay `None`.
pub fn patch_from_submission(
    submission: MortgageSubmission,
) -> Result<MortgagePatch, ValidationError> {
    let MortgageSubmission {
        credit_score,
        loan_amount,
        property_value,
        annual_income,
        debt_amount,
        loan_type,
        property_type,
    } = submission;

    Ok(MortgagePatch {
        credit_score: credit_score
            .map(|value| parse_integer(CREDIT_SCORE, value))
            .transpose()?,
        loan_amount: loan_amount
            .map(|value| parse_decimal(LOAN_AMOUNT, value))
            .transpose()?,
        property_value: property_value
            .map(|value| parse_decimal(PROPERTY_VALUE, value))
            .transpose()?,
        annual_income: annual_income
            .map(|value| parse_decimal(ANNUAL_INCOME, value))
            .transpose()?,
        debt_amount: debt_amount
            .map(|value| parse_decimal(DEBT_AMOUNT, value))
            .transpose()?,
        loan_type: loan_type
            .map(|value| parse_category(LOAN_TYPE, value).map(LoanType::from))
            .transpose()?,
        property_type: property_type
            .map(|value| parse_category(PROPERTY_TYPE, value).map(PropertyType::from))
            .transpose()?,
    })
}

/// Creation path: all seven fields must be present.
///
/// Fields are checked in declaration order, so the first missing one is the one reported.
pub fn required_fields(submission: MortgageSubmission) -> Result<MortgageFields, ValidationError> {
    let presence = [
        (CREDIT_SCORE, submission.credit_score.is_some()),
        (LOAN_AMOUNT, submission.loan_amount.is_some()),
        (PROPERTY_VALUE, submission.property_value.is_some()),
        (ANNUAL_INCOME, submission.annual_income.is_some()),
        (DEBT_AMOUNT, submission.debt_amount.is_some()),
        (LOAN_TYPE, submission.loan_type.is_some()),
        (PROPERTY_TYPE, submission.property_type.is_some()),
    ];
    if let Some((field, _)) = presence.iter().find(|(_, present)| !present) {
        return Err(ValidationError::MissingField(*field));
    }

    let mut fields = MortgageFields::default();
    patch_from_submission(submission)?.apply_to(&mut fields);
    Ok(fields)
}

/// Ad hoc scoring path: absent numbers become 0, absent categories become
/// `fixed` / `single_family`.
pub fn fields_with_defaults(
    submission: MortgageSubmission,
) -> Result<MortgageFields, ValidationError> {
    let mut fields = MortgageFields::default();
    patch_from_submission(submission)?.apply_to(&mut fields);
    Ok(fields)
}

fn parse_decimal(field: &'static str, value: Value) -> Result<f64, ValidationError> {
    let parsed = match &value {
        Value::Number(number) => number.as_f64(),
        Value::String(raw) => raw.trim().parse::<f64>().ok(),
        _ => None,
    };

    match parsed {
        Some(number) if number.is_finite() => Ok(number),
        _ => Err(malformed(field, &value, "expected a number")),
    }
}

fn parse_integer(field: &'static str, value: Value) -> Result<i64, ValidationError> {
    let parsed = match &value {
        Value::Number(number) => number.as_i64().or_else(|| {
            number
                .as_f64()
                .filter(|float| float.is_finite())
                .map(|float| float.trunc() as i64)
        }),
        Value::String(raw) => raw.trim().parse::<i64>().ok(),
        _ => None,
    };

    parsed.ok_or_else(|| malformed(field, &value, "expected an integer"))
}

fn parse_category(field: &'static str, value: Value) -> Result<String, ValidationError> {
    match value {
        Value::String(raw) => Ok(raw),
        other => Err(malformed(field, &other, "expected a string")),
    }
}

fn malformed(field: &'static str, value: &Value, expectation: &str) -> ValidationError {
    ValidationError::Malformed {
        field,
        reason: format!("{expectation}, found {value}"),
    }
}
