use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Store-assigned identity of a mortgage application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MortgageId(pub u64);

impl fmt::Display for MortgageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Interest structure of the loan. Values outside the known pair are kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LoanType {
    #[default]
    Fixed,
    Adjustable,
    Other(String),
}

impl LoanType {
    pub fn as_str(&self) -> &str {
        match self {
            LoanType::Fixed => "fixed",
            LoanType::Adjustable => "adjustable",
            LoanType::Other(raw) => raw,
        }
    }
}

impl From<String> for LoanType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "fixed" => LoanType::Fixed,
            "adjustable" => LoanType::Adjustable,
            _ => LoanType::Other(value),
        }
    }
}

impl From<&str> for LoanType {
    fn from(value: &str) -> Self {
        LoanType::from(value.to_string())
    }
}

impl From<LoanType> for String {
    fn from(value: LoanType) -> Self {
        match value {
            LoanType::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

/// Kind of property securing the loan. Values outside the known pair are kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PropertyType {
    #[default]
    SingleFamily,
    Condo,
    Other(String),
}

impl PropertyType {
    pub fn as_str(&self) -> &str {
        match self {
            PropertyType::SingleFamily => "single_family",
            PropertyType::Condo => "condo",
            PropertyType::Other(raw) => raw,
        }
    }
}

impl From<String> for PropertyType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "single_family" => PropertyType::SingleFamily,
            "condo" => PropertyType::Condo,
            _ => PropertyType::Other(value),
        }
    }
}

impl From<&str> for PropertyType {
    fn from(value: &str) -> Self {
        PropertyType::from(value.to_string())
    }
}

impl From<PropertyType> for String {
    fn from(value: PropertyType) -> Self {
        match value {
            PropertyType::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

/// The seven scoring inputs of an application, after coercion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MortgageFields {
    pub credit_score: i64,
    pub loan_amount: f64,
    pub property_value: f64,
    pub annual_income: f64,
    pub debt_amount: f64,
    pub loan_type: LoanType,
    pub property_type: PropertyType,
}

/// A persisted application. Ratings are never stored; they are derived on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MortgageApplication {
    pub id: MortgageId,
    #[serde(flatten)]
    pub fields: MortgageFields,
    pub created_at: DateTime<Utc>,
}

/// Raw request payload as received from callers.
///
/// Every field is optional so that the intake layer can report which one is missing or
/// malformed instead of failing the whole body. Numbers may arrive as JSON numbers or as
/// numeric strings. Only a JSON object deserializes; `null` counts as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "Map<String, Value>")]
pub struct MortgageSubmission {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit_score: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loan_amount: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annual_income: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debt_amount: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loan_type: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_type: Option<Value>,
}

impl From<Map<String, Value>> for MortgageSubmission {
    fn from(mut object: Map<String, Value>) -> Self {
        let mut take = |key: &str| object.remove(key).filter(|value| !value.is_null());
        Self {
            credit_score: take("creditScore"),
            loan_amount: take("loanAmount"),
            property_value: take("propertyValue"),
            annual_income: take("annualIncome"),
            debt_amount: take("debtAmount"),
            loan_type: take("loanType"),
            property_type: take("propertyType"),
        }
    }
}

impl From<&MortgageFields> for MortgageSubmission {
    fn from(fields: &MortgageFields) -> Self {
        Self {
            credit_score: Some(Value::from(fields.credit_score)),
            loan_amount: Some(Value::from(fields.loan_amount)),
            property_value: Some(Value::from(fields.property_value)),
            annual_income: Some(Value::from(fields.annual_income)),
            debt_amount: Some(Value::from(fields.debt_amount)),
            loan_type: Some(Value::from(fields.loan_type.as_str())),
            property_type: Some(Value::from(fields.property_type.as_str())),
        }
    }
}

/// Coerced partial update; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MortgagePatch {
    pub credit_score: Option<i64>,
    pub loan_amount: Option<f64>,
    pub property_value: Option<f64>,
    pub annual_income: Option<f64>,
    pub debt_amount: Option<f64>,
    pub loan_type: Option<LoanType>,
    pub property_type: Option<PropertyType>,
}

impl MortgagePatch {
    pub fn apply_to(&self, fields: &mut MortgageFields) {
        if let Some(score) = self.credit_score {
            fields.credit_score = score;
        }
        if let Some(amount) = self.loan_amount {
            fields.loan_amount = amount;
        }
        if let Some(value) = self.property_value {
            fields.property_value = value;
        }
        if let Some(income) = self.annual_income {
            fields.annual_income = income;
        }
        if let Some(debt) = self.debt_amount {
            fields.debt_amount = debt;
        }
        if let Some(loan_type) = &self.loan_type {
            fields.loan_type = loan_type.clone();
        }
        if let Some(property_type) = &self.property_type {
            fields.property_type = property_type.clone();
        }
    }
}
