//! Batch scoring of CSV exports.
//!
//! Each row is rated as though every other valid row in the file were the stored
//! population, which mirrors how an update is scored against the records around it.

use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::domain::{MortgageFields, MortgageSubmission};
use super::intake::{self, ValidationError};
use super::risk::{self, RiskAssessment};

#[derive(Debug)]
pub enum MortgageImportError {
    Io(std::io::Error),
    Csv(csv::Error),
}

impl std::fmt::Display for MortgageImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MortgageImportError::Io(err) => write!(f, "failed to read mortgage export: {}", err),
            MortgageImportError::Csv(err) => write!(f, "invalid mortgage CSV data: {}", err),
        }
    }
}

impl std::error::Error for MortgageImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MortgageImportError::Io(err) => Some(err),
            MortgageImportError::Csv(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for MortgageImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for MortgageImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Result of scoring one CSV row. `line` is 1-based and counts the header.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutcome {
    pub line: usize,
    pub result: Result<(MortgageFields, RiskAssessment), ValidationError>,
}

pub struct MortgageBatchScorer;

impl MortgageBatchScorer {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<BatchOutcome>, MortgageImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<BatchOutcome>, MortgageImportError> {
        let submissions = parse_submissions(reader)?;
        Ok(score_submissions(submissions))
    }
}

/// Read CSV rows keyed by the camelCase field names. Blank cells count as missing.
pub fn parse_submissions<R: Read>(reader: R) -> Result<Vec<MortgageSubmission>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut submissions = Vec::new();

    for record in csv_reader.deserialize::<MortgageRow>() {
        submissions.push(record?.into_submission());
    }

    Ok(submissions)
}

fn score_submissions(submissions: Vec<MortgageSubmission>) -> Vec<BatchOutcome> {
    let validated: Vec<_> = submissions
        .into_iter()
        .map(intake::required_fields)
        .collect();

    let (sum, count) = validated
        .iter()
        .filter_map(|result| result.as_ref().ok())
        .fold((0.0_f64, 0_u64), |(sum, count), fields| {
            (sum + fields.credit_score as f64, count + 1)
        });

    validated
        .into_iter()
        .enumerate()
        .map(|(index, result)| BatchOutcome {
            line: index + 2,
            result: result.map(|fields| {
                let others = count - 1;
                let population = (others > 0)
                    .then(|| (sum - fields.credit_score as f64) / others as f64);
                let average = risk::resolve_average(population, &fields);
                let assessment = risk::assess(&fields, average);
                (fields, assessment)
            }),
        })
        .collect()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MortgageRow {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    credit_score: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    loan_amount: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    property_value: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    annual_income: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    debt_amount: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    loan_type: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    property_type: Option<String>,
}

impl MortgageRow {
    fn into_submission(self) -> MortgageSubmission {
        MortgageSubmission {
            credit_score: self.credit_score.map(Value::String),
            loan_amount: self.loan_amount.map(Value::String),
            property_value: self.property_value.map(Value::String),
            annual_income: self.annual_income.map(Value::String),
            debt_amount: self.debt_amount.map(Value::String),
            loan_type: self.loan_type.map(Value::String),
            property_type: self.property_type.map(Value::String),
        }
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
